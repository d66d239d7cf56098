mod openai_embedder;
mod sse_decoder;
mod streaming_client;

pub use openai_embedder::OpenAiEmbedder;
pub use sse_decoder::{SseData, SseLineDecoder};
pub use streaming_client::{StreamingLlmClient, create_streaming_llm_client, parse_completion_chunk};

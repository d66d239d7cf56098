mod in_memory_vector_store;
mod json_snapshot_store;

pub use in_memory_vector_store::InMemoryVectorStore;
pub use json_snapshot_store::JsonSnapshotStore;

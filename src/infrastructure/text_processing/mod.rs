mod recursive_character_splitter;
mod text_directory_loader;

pub use recursive_character_splitter::{DEFAULT_SEPARATORS, RecursiveCharacterSplitter};
pub use text_directory_loader::TextDirectoryLoader;

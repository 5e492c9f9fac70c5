//! Document ingestion: parsing and page-aware chunking

mod chunker;
mod loader;
mod parser;

pub use chunker::{RecursiveTextSplitter, DEFAULT_SEPARATORS};
pub use loader::DocumentLoader;
pub use parser::{FileParser, ParsedDocument};

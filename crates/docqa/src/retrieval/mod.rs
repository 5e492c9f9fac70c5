//! Question-to-chunk retrieval

mod retriever;

pub use retriever::{Retriever, DEFAULT_TOP_K};

//! Vector index over embedded chunks
//!
//! An index is built in one pass from a document's chunks and is never
//! updated in place; re-processing a document builds a new one.

mod builder;
mod persist;
mod vector;

pub use builder::IndexBuilder;
pub use persist::{INDEX_FILE, INDEX_FORMAT_VERSION};
pub use vector::{cosine_distance, IndexEntry, VectorIndex};

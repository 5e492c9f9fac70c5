//! Document, page, and chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported input formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// Text extracted from one logical page
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Normalised page text
    pub text: String,
}

/// Where a chunk came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Path of the source document
    pub source: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Total pages in the source document
    pub total_pages: u32,
    /// Position of the chunk in the document's chunk sequence
    pub chunk_index: usize,
}

/// A contiguous slice of document text, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Source metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Chunk with placeholder metadata, for text that has no file behind it
    pub fn from_text(text: impl Into<String>, chunk_index: usize) -> Self {
        Self::new(
            text,
            ChunkMetadata {
                source: String::new(),
                page: 1,
                total_pages: 1,
                chunk_index,
            },
        )
    }

    /// Leading `max_chars` characters, with "..." appended when truncated
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.text.char_indices();
        match chars.nth(max_chars) {
            Some((byte_idx, _)) => format!("{}...", &self.text[..byte_idx]),
            None => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_path() {
        assert_eq!(FileType::from_path(Path::new("data/uploaded.PDF")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("notes.md")), FileType::Markdown);
        assert_eq!(FileType::from_path(Path::new("archive.zip")), FileType::Unknown);
        assert_eq!(FileType::from_path(Path::new("README")), FileType::Unknown);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let chunk = Chunk::from_text("héllo wörld", 0);
        assert_eq!(chunk.preview(4), "héll...");
        assert_eq!(chunk.preview(100), "héllo wörld");
    }
}

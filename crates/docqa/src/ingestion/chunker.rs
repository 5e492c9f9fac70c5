//! Recursive text splitting with overlap
//!
//! Text is cut at the coarsest separator that occurs in it (paragraph, line,
//! sentence, word) and the pieces are merged back into windows of at most
//! `chunk_size` characters. Pieces that are still too long are split again
//! with the next separator; the empty separator cuts between characters.
//! Lengths are counted in `char`s, not bytes.

use std::borrow::Cow;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkMetadata, PageText};

/// Separators in descending granularity; `""` is the raw character cut
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Text splitter with configurable size and overlap
#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters carried over between consecutive chunks
    chunk_overlap: usize,
}

impl RecursiveTextSplitter {
    /// Create a splitter with the default separator hierarchy
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split raw text into trimmed, non-empty chunks
    ///
    /// When the text is longer than `chunk_size` and `chunk_overlap > 0`,
    /// every chunk after the first starts with text that ends the chunk
    /// before it.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if char_len(trimmed) <= self.chunk_size {
            return vec![trimmed.to_string()];
        }

        // Room for a full overlap in front of any single piece
        let limit = self.chunk_size - self.chunk_overlap;
        let mut pieces = Vec::new();
        collect_pieces(trimmed, &DEFAULT_SEPARATORS, limit, &mut pieces);
        self.merge(&pieces)
    }

    /// Split each page on its own and tag chunks with page metadata
    ///
    /// `chunk_index` runs across all pages.
    pub fn split_pages(&self, pages: &[PageText], source: &str, total_pages: u32) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for text in self.split_text(&page.text) {
                let metadata = ChunkMetadata {
                    source: source.to_string(),
                    page: page.page_number,
                    total_pages,
                    chunk_index: chunks.len(),
                };
                chunks.push(Chunk::new(text, metadata));
            }
        }

        chunks
    }

    /// Greedily merge pieces into windows of at most `chunk_size` characters
    ///
    /// Trailing pieces totalling up to `chunk_overlap` characters are carried
    /// into the next window. When the last piece alone is longer than that,
    /// the tail of the window is carried instead.
    fn merge<'a>(&self, pieces: &[&'a str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(Cow<'a, str>, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                let joined: String = window.iter().map(|(s, _)| &**s).collect();
                push_trimmed(&mut chunks, &joined);

                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }

                if self.chunk_overlap > 0 && window.iter().all(|(s, _)| s.trim().is_empty()) {
                    window.clear();
                    total = 0;

                    let tail = overlap_tail(&joined, self.chunk_overlap);
                    if !tail.is_empty() {
                        let tail_len = char_len(&tail);
                        window.push_back((Cow::Owned(tail), tail_len));
                        total = tail_len;
                    }
                }
            }

            window.push_back((Cow::Borrowed(*piece), len));
            total += len;
        }

        if !window.is_empty() {
            let joined: String = window.iter().map(|(s, _)| &**s).collect();
            push_trimmed(&mut chunks, &joined);
        }

        chunks
    }
}

/// Cut `text` into pieces of at most `limit` characters, preferring the
/// coarsest separator; concatenating the pieces gives back `text`
fn collect_pieces<'a>(text: &'a str, separators: &[&str], limit: usize, out: &mut Vec<&'a str>) {
    // First separator present in the text; "" always matches
    let position = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(*sep));
    let (separator, remaining) = match position {
        Some(i) => (separators[i], &separators[i + 1..]),
        None => ("", &separators[separators.len()..]),
    };

    for segment in split_keeping_separator(text, separator) {
        if char_len(segment) <= limit || remaining.is_empty() {
            out.push(segment);
        } else {
            collect_pieces(segment, remaining, limit, out);
        }
    }
}

/// Last characters of `text`, at most `overlap` of them, ending in content
///
/// Trailing whitespace is kept so the carried text stays separated from
/// what follows. The cut moves forward to a word start when one fits.
fn overlap_tail(text: &str, overlap: usize) -> String {
    let content = text.trim_end();
    if content.is_empty() || overlap == 0 {
        return String::new();
    }

    let trailing = &text[content.len()..];
    let trailing_len = char_len(trailing);
    let (budget, gap) = if trailing_len < overlap {
        (overlap - trailing_len, trailing)
    } else if overlap > 1 {
        let first = trailing.chars().next().map_or(0, char::len_utf8);
        (overlap - 1, &trailing[..first])
    } else {
        (1, "")
    };

    let start = content
        .char_indices()
        .rev()
        .nth(budget - 1)
        .map_or(0, |(i, _)| i);
    let mut tail = &content[start..];

    let cut_mid_word = content[..start]
        .chars()
        .next_back()
        .is_some_and(|c| !c.is_whitespace());
    if cut_mid_word {
        if let Some(pos) = tail.find(char::is_whitespace) {
            tail = tail[pos..].trim_start();
        }
    }

    format!("{}{}", tail, gap)
}

fn push_trimmed(chunks: &mut Vec<String>, joined: &str) {
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split text at a separator while keeping the separator attached to the preceding segment
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("word{:03}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Length of the longest suffix of `prev` that is also a prefix of `next`
    fn shared_boundary(prev: &str, next: &str) -> usize {
        next.char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .filter(|&end| prev.ends_with(&next[..end]))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_short_text_yields_single_chunk() {
        let splitter = RecursiveTextSplitter::new(1000, 200).unwrap();
        let chunks = splitter.split_text("Sentence one. Sentence two. Sentence three.");
        assert_eq!(chunks, vec!["Sentence one. Sentence two. Sentence three."]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let splitter = RecursiveTextSplitter::new(100, 10).unwrap();
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(
            RecursiveTextSplitter::new(100, 100),
            Err(Error::Config(_))
        ));
        assert!(matches!(RecursiveTextSplitter::new(0, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let splitter = RecursiveTextSplitter::new(100, 30).unwrap();
        let chunks = splitter.split_text(&numbered_words(200));

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let shared = shared_boundary(&pair[0], &pair[1]);
            assert!(shared >= "word000".len(), "no overlap between {:?} and {:?}", pair[0], pair[1]);
            assert!(shared <= 30);
        }
    }

    #[test]
    fn test_paragraph_boundaries_preferred() {
        let para_a = "a".repeat(40);
        let para_b = "b".repeat(40);
        let para_c = "c".repeat(40);
        let text = format!("{}\n\n{}\n\n{}", para_a, para_b, para_c);

        let splitter = RecursiveTextSplitter::new(90, 10).unwrap();
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n\n{}", para_a, para_b));
        // The second paragraph is too long to carry whole, so its tail is
        assert_eq!(chunks[1], format!("{}\n\n{}", "b".repeat(8), para_c));
        assert!(shared_boundary(&chunks[0], &chunks[1]) > 0);
    }

    #[test]
    fn test_long_paragraphs_still_overlap() {
        let text = format!("{}\n\n{}", "a".repeat(150), "b".repeat(150));
        let splitter = RecursiveTextSplitter::new(200, 50).unwrap();
        let chunks = splitter.split_text(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(150));
        assert!(chunks[1].ends_with(&"b".repeat(150)));
        let shared = shared_boundary(&chunks[0], &chunks[1]);
        assert!(shared > 0 && shared <= 50, "shared {}", shared);
        assert!(chunks.iter().all(|c| c.chars().count() <= 200));
    }

    #[test]
    fn test_overlap_tail_prefers_word_start() {
        assert_eq!(overlap_tail("alpha beta gamma", 8), "gamma");
        assert_eq!(overlap_tail("alpha beta\n\n", 8), "beta\n\n");
        assert_eq!(overlap_tail("abcdefgh", 3), "fgh");
        assert_eq!(overlap_tail("   ", 3), "");
    }

    #[test]
    fn test_sentence_boundaries_before_words() {
        let text = "The first sentence is here. The second sentence is here. The third sentence is here.";
        let splitter = RecursiveTextSplitter::new(60, 0).unwrap();
        let chunks = splitter.split_text(text);

        assert_eq!(
            chunks,
            vec![
                "The first sentence is here. The second sentence is here.",
                "The third sentence is here.",
            ]
        );
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveTextSplitter::new(10, 2).unwrap();
        let chunks = splitter.split_text(&"x".repeat(25));

        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0], "x".repeat(10));
        assert!(chunks.len() >= 3);
    }

    #[test]
    fn test_multibyte_text_is_counted_in_chars() {
        let splitter = RecursiveTextSplitter::new(5, 1).unwrap();
        let chunks = splitter.split_text("ééééééééé");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert_eq!(chunks[0], "ééééé");
    }

    #[test]
    fn test_split_pages_tags_metadata() {
        let splitter = RecursiveTextSplitter::new(1000, 200).unwrap();
        let pages = vec![
            PageText { page_number: 1, text: "Intro page.".to_string() },
            PageText { page_number: 2, text: String::new() },
            PageText { page_number: 3, text: "Closing page.".to_string() },
        ];

        let chunks = splitter.split_pages(&pages, "data/uploaded.pdf", 3);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.page, 1);
        assert_eq!(chunks[0].metadata.chunk_index, 0);
        assert_eq!(chunks[1].metadata.page, 3);
        assert_eq!(chunks[1].metadata.chunk_index, 1);
        assert_eq!(chunks[1].metadata.source, "data/uploaded.pdf");
        assert_eq!(chunks[1].metadata.total_pages, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn chunks_respect_size_and_keep_every_word(
            words in proptest::collection::vec("[a-z]{1,12}", 1..300),
            chunk_size in 40usize..200,
            overlap_pct in 0usize..50,
        ) {
            let chunk_overlap = chunk_size * overlap_pct / 100;
            let splitter = RecursiveTextSplitter::new(chunk_size, chunk_overlap).unwrap();
            let text = words.join(" ");
            let chunks = splitter.split_text(&text);

            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= chunk_size);
            }
            for word in &words {
                prop_assert!(chunks.iter().any(|c| c.contains(word.as_str())));
            }
            if chunk_overlap > 0 {
                for pair in chunks.windows(2) {
                    let shared = shared_boundary(&pair[0], &pair[1]);
                    prop_assert!(shared > 0, "no overlap between {:?} and {:?}", pair[0], pair[1]);
                }
            }
        }
    }
}

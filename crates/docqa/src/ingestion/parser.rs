//! Page-level text extraction for PDF and plain-text documents

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{FileType, PageText};

/// Text extracted from a document, one entry per page
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Detected file type
    pub file_type: FileType,
    /// Pages in document order; pages without text are kept with empty text
    pub pages: Vec<PageText>,
    /// Page count of the source document
    pub total_pages: u32,
}

impl ParsedDocument {
    /// True when no page produced any text
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file's bytes based on the path's extension
    pub fn parse(path: &Path, data: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_path(path);

        let parsed = match file_type {
            FileType::Pdf => Self::parse_pdf(path, data)?,
            FileType::Txt | FileType::Markdown => Self::parse_text(data, file_type),
            FileType::Unknown => {
                return Err(Error::parse(path, "unsupported file type, expected .pdf, .txt or .md"));
            }
        };

        if parsed.is_blank() {
            return Err(Error::parse(path, "no text content could be extracted"));
        }

        Ok(parsed)
    }

    /// Parse a PDF page by page, falling back to whole-document extraction
    fn parse_pdf(path: &Path, data: &[u8]) -> Result<ParsedDocument> {
        Self::parse_pdf_with(path, data, Self::extract_whole_pdf)
    }

    /// Per-page lopdf extraction; `whole` runs when lopdf cannot load the
    /// file or finds no text on any page
    fn parse_pdf_with<F>(path: &Path, data: &[u8], whole: F) -> Result<ParsedDocument>
    where
        F: FnOnce(&Path, &[u8]) -> Result<String>,
    {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    "lopdf could not load {}: {}, trying pdf-extract",
                    path.display(),
                    e
                );
                let text = whole(path, data).map_err(|fallback| {
                    let detail = match fallback {
                        Error::Parse { message, .. } => message,
                        other => other.to_string(),
                    };
                    Error::parse(path, format!("failed to load PDF: {}; {}", e, detail))
                })?;
                return Ok(ParsedDocument {
                    file_type: FileType::Pdf,
                    pages: vec![PageText {
                        page_number: 1,
                        text: clean_text(&text),
                    }],
                    total_pages: 1,
                });
            }
        };

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total_pages = page_numbers.len() as u32;

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page_number in page_numbers {
            let text = match doc.extract_text(&[page_number]) {
                Ok(text) => clean_text(&text),
                Err(e) => {
                    tracing::debug!("Could not extract text from page {}: {}", page_number, e);
                    String::new()
                }
            };
            pages.push(PageText { page_number, text });
        }

        let mut parsed = ParsedDocument {
            file_type: FileType::Pdf,
            pages,
            total_pages,
        };

        if parsed.is_blank() {
            tracing::warn!(
                "Per-page extraction produced no text for {}, trying pdf-extract",
                path.display()
            );
            let text = clean_text(&whole(path, data)?);
            parsed.pages = vec![PageText { page_number: 1, text }];
            parsed.total_pages = total_pages.max(1);
        }

        Ok(parsed)
    }

    /// Whole-document extraction with pdf-extract, which copes with more font encodings
    fn extract_whole_pdf(path: &Path, data: &[u8]) -> Result<String> {
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::parse(path, format!("pdf-extract failed: {}", e))),
            Err(_) => Err(Error::parse(path, "pdf-extract panicked on malformed content")),
        }
    }

    /// Plain text and markdown are a single page
    fn parse_text(data: &[u8], file_type: FileType) -> ParsedDocument {
        let text = clean_text(&String::from_utf8_lossy(data));

        ParsedDocument {
            file_type,
            pages: vec![PageText { page_number: 1, text }],
            total_pages: 1,
        }
    }
}

/// Normalise extracted text: drop NULs, map typographic glyphs to ASCII,
/// trim lines, and collapse runs of blank lines into one paragraph break
fn clean_text(text: &str) -> String {
    let replaced = text
        .replace('\0', "")
        .replace('\r', "")
        .replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl");

    let mut out = String::with_capacity(replaced.len());
    let mut blank_run = false;

    for line in replaced.lines().map(str::trim) {
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }

    out
}

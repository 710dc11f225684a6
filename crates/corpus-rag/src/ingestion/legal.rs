//! Section-oriented legal document loading
//!
//! Legal documents are organized by short all-caps headings; the runs of
//! paragraphs between headings are the retrievable units, which keeps
//! citations at section granularity instead of arbitrary paragraph cuts.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Locator, RawUnit};

use super::pdf::file_name;

/// A paragraph is a header when its trimmed text is entirely upper-case or
/// ends with a colon, and it is shorter than this many characters.
const HEADER_MAX_CHARS: usize = 100;

/// Loads a paragraph-structured DOCX document, one raw unit per detected
/// section
pub struct LegalDocLoader;

impl LegalDocLoader {
    /// Extract section units in document order.
    ///
    /// `flush_chars` is the minimum joined length for a section to be kept;
    /// shorter runs are dropped as non-substantial. Unreadable or
    /// unparseable files are fatal for this document and propagate.
    pub fn load(path: &Path, flush_chars: usize) -> Result<Vec<RawUnit>> {
        let source = file_name(path);
        tracing::info!(%source, "loading legal document");

        let data = std::fs::read(path)
            .map_err(|e| Error::file_parse(&source, format!("failed to read file: {e}")))?;
        let docx = docx_rs::read_docx(&data)
            .map_err(|e| Error::file_parse(&source, format!("failed to parse DOCX: {e}")))?;

        let paragraphs = extract_paragraphs(&docx);
        let units = sections_from_paragraphs(&paragraphs, &source, flush_chars);
        tracing::info!(
            %source,
            paragraphs = paragraphs.len(),
            sections = units.len(),
            "extracted sections"
        );
        Ok(units)
    }
}

/// Collect trimmed, non-empty paragraph texts in document order
fn extract_paragraphs(docx: &docx_rs::Docx) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut text = String::new();
            for child in &paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in &run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            let text = text.trim();
            if !text.is_empty() {
                paragraphs.push(text.to_string());
            }
        }
    }
    paragraphs
}

/// True when the paragraph looks like a section heading
fn is_header(text: &str) -> bool {
    let trimmed = text.trim();
    let upper = trimmed.chars().any(|c| c.is_uppercase())
        && !trimmed.chars().any(|c| c.is_lowercase());
    (upper || trimmed.ends_with(':')) && trimmed.chars().count() < HEADER_MAX_CHARS
}

/// Fold paragraphs into section units.
///
/// The accumulator is owned local state: paragraphs append to the current
/// section until a header arrives, at which point the accumulated section is
/// flushed (when long enough) and a new one starts with the header text.
fn sections_from_paragraphs(paragraphs: &[String], source: &str, flush_chars: usize) -> Vec<RawUnit> {
    let mut units = Vec::new();
    let mut section: Vec<&str> = Vec::new();
    let mut section_num = 0u32;

    let flush = |section: &[&str], section_num: u32, units: &mut Vec<RawUnit>| {
        let text = section.join("\n");
        if text.chars().count() > flush_chars {
            units.push(RawUnit::new(
                text,
                source,
                Locator::Section {
                    section: section_num,
                },
            ));
        }
    };

    for paragraph in paragraphs {
        let paragraph = paragraph.as_str();
        if is_header(paragraph) && !section.is_empty() {
            flush(&section, section_num, &mut units);
            section = vec![paragraph];
            section_num += 1;
        } else {
            section.push(paragraph);
        }
    }
    if !section.is_empty() {
        flush(&section, section_num, &mut units);
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_detection() {
        assert!(is_header("ARTICLE 5"));
        assert!(is_header("Scope of application:"));
        assert!(is_header("DEFINITIONS:"));
        assert!(!is_header("This sentence has lower case and no colon"));
        let long_caps = "A".repeat(120);
        assert!(!is_header(&long_caps));
    }

    #[test]
    fn short_first_section_is_dropped() {
        // "TITLE:" + "Body text one." joins to 21 chars, below the flush
        // threshold, so only the second section survives.
        let paragraphs = strings(&[
            "TITLE:",
            "Body text one.",
            "SECTION TWO:",
            "Body text two that is long enough to pass the hundred character minimum threshold for section retention here.",
        ]);

        let units = sections_from_paragraphs(&paragraphs, "act.docx", 100);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].locator, Locator::Section { section: 1 });
        assert!(units[0].text.starts_with("SECTION TWO:\nBody text two"));
    }

    #[test]
    fn both_sections_survive_when_long_enough() {
        let body_one = "Body text one, padded out well past the one hundred character retention threshold for sections.";
        let body_two = "Body text two, likewise padded far enough past the one hundred character retention threshold.";
        let paragraphs = strings(&["TITLE:", body_one, "SECTION TWO:", body_two]);

        let units = sections_from_paragraphs(&paragraphs, "act.docx", 100);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].locator, Locator::Section { section: 0 });
        assert_eq!(units[0].text, format!("TITLE:\n{body_one}"));
        assert_eq!(units[1].locator, Locator::Section { section: 1 });
        assert_eq!(units[1].text, format!("SECTION TWO:\n{body_two}"));
    }

    #[test]
    fn leading_header_starts_the_first_section() {
        // A header with nothing accumulated yet does not flush; it opens
        // section 0.
        let body = "Opening provisions described at sufficient length to exceed the retention threshold applied to sections.";
        let paragraphs = strings(&["PREAMBLE:", body]);

        let units = sections_from_paragraphs(&paragraphs, "act.docx", 100);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].locator, Locator::Section { section: 0 });
        assert!(units[0].text.starts_with("PREAMBLE:\n"));
    }

    #[test]
    fn non_header_paragraphs_accumulate() {
        let paragraphs = strings(&[
            "GENERAL OBLIGATIONS",
            "First clause of the section with some descriptive text.",
            "Second clause of the section with some more descriptive text.",
            "ANNEX I",
            "Tail clause long enough on its own to pass the minimum retention threshold for a trailing section.",
        ]);

        let units = sections_from_paragraphs(&paragraphs, "act.docx", 100);
        assert_eq!(units.len(), 2);
        assert_eq!(
            units[0].text,
            "GENERAL OBLIGATIONS\nFirst clause of the section with some descriptive text.\nSecond clause of the section with some more descriptive text."
        );
        assert_eq!(units[1].locator, Locator::Section { section: 1 });
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = LegalDocLoader::load(Path::new("/nope/missing.docx"), 100).unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }
}

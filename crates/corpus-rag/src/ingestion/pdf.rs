//! Page-oriented PDF loading

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Locator, RawUnit};

/// Loads a page-structured technical document, one raw unit per page with
/// extractable text
pub struct PdfLoader;

impl PdfLoader {
    /// Extract raw page units in page order.
    ///
    /// Pages whose trimmed text is shorter than `min_chars` are skipped as
    /// content-free (cover pages, figure-only pages). An unreadable or
    /// unparseable file is fatal for this document and propagates.
    pub fn load(path: &Path, min_chars: usize) -> Result<Vec<RawUnit>> {
        let source = file_name(path);
        tracing::info!(%source, "loading PDF");

        // Validate the container first; lopdf gives the page count and a
        // much better diagnostic than a failed text extraction.
        let document = lopdf::Document::load(path)
            .map_err(|e| Error::file_parse(&source, format!("failed to load PDF: {e}")))?;
        let total_pages = document.get_pages().len();

        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| Error::file_parse(&source, format!("failed to extract text: {e}")))?;

        let units = pages_to_units(pages, &source, min_chars);
        tracing::info!(
            %source,
            total_pages,
            extracted = units.len(),
            "extracted pages with content"
        );
        Ok(units)
    }
}

/// Turn per-page text into raw units, skipping content-free pages
fn pages_to_units(pages: Vec<String>, source: &str, min_chars: usize) -> Vec<RawUnit> {
    let mut units = Vec::new();
    for (index, raw) in pages.into_iter().enumerate() {
        let text = cleanup_glyphs(&raw);
        let text = text.trim();
        if text.chars().count() < min_chars {
            continue;
        }
        units.push(RawUnit::new(
            text,
            source,
            Locator::Page {
                page: index as u32 + 1,
            },
        ));
    }
    units
}

/// Replace typographic glyphs PDF fonts tend to emit with their ASCII
/// approximations so downstream splitting sees plain sentence punctuation
fn cleanup_glyphs(text: &str) -> String {
    text.replace('\u{2010}', "-") // hyphen
        .replace('\u{2011}', "-") // non-breaking hyphen
        .replace('\u{2013}', "-") // en dash
        .replace('\u{2014}', "--") // em dash
        .replace('\u{2018}', "'") // left single quote
        .replace('\u{2019}', "'") // right single quote
        .replace('\u{201C}', "\"") // left double quote
        .replace('\u{201D}', "\"") // right double quote
        .replace('\u{2022}', "* ") // bullet
        .replace('\u{2026}', "...") // ellipsis
        .replace('\u{00A0}', " ") // non-breaking space
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\0', "")
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentKind;

    #[test]
    fn skips_pages_below_minimum() {
        let pages = vec![
            "Cover".to_string(),
            "This page carries enough body text to clear the fifty character floor easily.".to_string(),
            "   ".to_string(),
            "Another page with substantial content, long enough to be kept around for chunking.".to_string(),
        ];

        let units = pages_to_units(pages, "paper.pdf", 50);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].locator, Locator::Page { page: 2 });
        assert_eq!(units[1].locator, Locator::Page { page: 4 });
        assert!(units.iter().all(|u| u.kind() == DocumentKind::Pdf));
        assert!(units.iter().all(|u| u.source == "paper.pdf"));
    }

    #[test]
    fn pages_keep_document_order() {
        let filler = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
        let pages: Vec<String> = (0..5).map(|i| format!("Page {i} {filler}")).collect();

        let units = pages_to_units(pages, "paper.pdf", 50);
        let numbers: Vec<u32> = units
            .iter()
            .map(|u| match u.locator {
                Locator::Page { page } => page,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn glyph_cleanup_normalizes_typography() {
        let cleaned = cleanup_glyphs("e\u{FB03}cient \u{2018}quote\u{2019} \u{2013} dash\u{2026}");
        assert_eq!(cleaned, "efficient 'quote' - dash...");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = PdfLoader::load(Path::new("/nope/missing.pdf"), 50).unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }
}

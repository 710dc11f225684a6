//! Document kinds and the raw units extracted by the format loaders

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported document kinds in the corpus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Page-oriented technical document (PDF)
    Pdf,
    /// Section-oriented legal prose (DOCX)
    LegalDoc,
    /// Row-oriented numeric tables (XLSX/XLS/CSV)
    Tabular,
}

impl DocumentKind {
    /// Detect document kind from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::LegalDoc),
            "xlsx" | "xls" | "csv" => Some(Self::Tabular),
            _ => None,
        }
    }

    /// Stable identifier used in metadata records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::LegalDoc => "legal_doc",
            Self::Tabular => "tabular",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row reference within a sheet: a concrete data row, the sheet summary, or a
/// decade rollup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRef {
    /// Sheet-level summary unit
    Summary,
    /// 1-indexed sheet row of a data row
    Line(u32),
    /// Decade rollup unit (e.g. 1950 for the 1950s)
    Decade(i32),
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => f.write_str("summary"),
            Self::Line(row) => write!(f, "{row}"),
            Self::Decade(decade) => write!(f, "decade_{decade}"),
        }
    }
}

// Serialized as the original registry did: numbers for data rows, strings for
// the summary and decade markers.
impl Serialize for RowRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Line(row) => serializer.serialize_u32(*row),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RowRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(row) => Ok(Self::Line(row)),
            Repr::Text(text) if text == "summary" => Ok(Self::Summary),
            Repr::Text(text) => {
                if let Some(rest) = text.strip_prefix("decade_") {
                    let decade = rest
                        .parse()
                        .map_err(|_| serde::de::Error::custom(format!("invalid decade row '{text}'")))?;
                    Ok(Self::Decade(decade))
                } else {
                    let row = text
                        .parse()
                        .map_err(|_| serde::de::Error::custom(format!("invalid row reference '{text}'")))?;
                    Ok(Self::Line(row))
                }
            }
        }
    }
}

/// Structural position of a raw unit inside its source document, enough to
/// regenerate a citation later
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// 1-indexed page of a PDF
    Page { page: u32 },
    /// 0-indexed section of a legal document
    Section { section: u32 },
    /// Sheet, row and optional year/decade of a tabular unit
    Row {
        sheet: String,
        row: RowRef,
        year: Option<i32>,
        decade: Option<i32>,
    },
}

impl Locator {
    /// Document kind implied by this locator
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Page { .. } => DocumentKind::Pdf,
            Self::Section { .. } => DocumentKind::LegalDoc,
            Self::Row { .. } => DocumentKind::Tabular,
        }
    }
}

/// A format-native piece of extracted content, produced by a loader and
/// consumed once by the splitter
#[derive(Debug, Clone)]
pub struct RawUnit {
    /// Extracted text, non-empty after trimming
    pub text: String,
    /// Originating document file name
    pub source: String,
    /// Structural position within the source
    pub locator: Locator,
}

impl RawUnit {
    pub fn new(text: impl Into<String>, source: impl Into<String>, locator: Locator) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            locator,
        }
    }

    /// Document kind of this unit
    pub fn kind(&self) -> DocumentKind {
        self.locator.kind()
    }
}

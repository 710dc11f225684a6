//! Text normalization applied before splitting

use regex::Regex;

/// Collapses whitespace and strips control characters from extracted text.
///
/// Total and pure: garbage in, empty string out, never an error.
#[derive(Debug, Clone)]
pub struct Normalizer {
    whitespace: Regex,
    control: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            control: Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f-\x9f]")
                .expect("control pattern is valid"),
        }
    }

    /// Collapse whitespace runs (newlines included) to single spaces, strip
    /// non-printable control characters and trim
    pub fn normalize(&self, raw: &str) -> String {
        let collapsed = self.whitespace.replace_all(raw, " ");
        let cleaned = self.control.replace_all(&collapsed, "");
        cleaned.trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn strips_control_characters() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("ab\u{0000}cd\u{001f}e\u{009f}f"), "abcdef");
    }

    #[test]
    fn total_on_degenerate_input() {
        let n = Normalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \n\t  "), "");
        assert_eq!(n.normalize("\u{0007}\u{0008}"), "");
    }

    #[test]
    fn trims_edges() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("  hello world  "), "hello world");
    }
}

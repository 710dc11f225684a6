//! Recursive separator-preference splitting with overlap
//!
//! Splits text at the most structural separator that applies, recursing into
//! looser separators for any piece still over the target length, and finally
//! falling back to a hard character cut. Adjacent chunks share
//! `overlap_chars` of trailing text. Lengths are counted in characters, not
//! bytes.

use std::collections::VecDeque;

use crate::config::TypeChunking;

/// Character-bounded recursive splitter for one document kind
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    target_chars: usize,
    overlap_chars: usize,
    separators: Vec<String>,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl RecursiveSplitter {
    pub fn new(config: &TypeChunking) -> Self {
        Self {
            target_chars: config.target_chars,
            overlap_chars: config.overlap_chars,
            separators: config.separators.clone(),
        }
    }

    /// Split `text` into spans no longer than the target length, overlapping
    /// by the configured amount at interior boundaries
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator actually present in the text wins; the empty
        // string is the hard cut of last resort.
        let mut chosen = None;
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                return self.hard_cut(text);
            }
            if text.contains(sep.as_str()) {
                chosen = Some((i, sep.as_str()));
                break;
            }
        }
        let Some((index, separator)) = chosen else {
            // Nothing applies and no hard cut configured: pass through.
            return self.merge_pieces(&[text]);
        };
        let remaining = &separators[index + 1..];

        let mut chunks = Vec::new();
        let mut within_target: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.target_chars {
                within_target.push(piece);
            } else {
                if !within_target.is_empty() {
                    chunks.extend(self.merge_pieces(&within_target));
                    within_target.clear();
                }
                if remaining.is_empty() {
                    chunks.push(piece.to_string());
                } else {
                    chunks.extend(self.split_with(piece, remaining));
                }
            }
        }
        if !within_target.is_empty() {
            chunks.extend(self.merge_pieces(&within_target));
        }
        chunks
    }

    /// Merge separator-delimited pieces into chunks up to the target length,
    /// retaining up to `overlap_chars` of trailing pieces for the next chunk
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.target_chars && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    chunks.push(chunk);
                }
                while total > self.overlap_chars
                    || (total + len > self.target_chars && total > 0)
                {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }
        chunks
    }

    /// Last-resort cut at exactly the target length, stepping by
    /// `target - overlap` characters
    fn hard_cut(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        let target = self.target_chars.max(1);
        let step = target.saturating_sub(self.overlap_chars).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + target).min(chars.len());
            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

/// Split on a separator keeping it attached to the start of the following
/// piece, so rejoining pieces reproduces the original text
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut boundaries = vec![0];
    boundaries.extend(text.match_indices(separator).map(|(i, _)| i));
    boundaries.push(text.len());

    boundaries
        .windows(2)
        .map(|pair| &text[pair[0]..pair[1]])
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn join_trimmed(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

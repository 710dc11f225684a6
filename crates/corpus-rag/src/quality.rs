//! Chunk quality diagnostics
//!
//! Advisory checks over a finished chunk sequence: size conformance,
//! coherence, metadata completeness, overlap effectiveness and distribution
//! skew. Never blocks the pipeline; the output is a report with
//! recommendations.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DocumentKind, ProcessedChunk};

/// Outcome of one quality check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Good,
    Warning,
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => f.write_str("good"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Preferred chunk size band for a document kind
fn optimal_range(kind: DocumentKind) -> (usize, usize) {
    match kind {
        DocumentKind::Pdf => (1000, 1800),
        DocumentKind::LegalDoc => (900, 1500),
        DocumentKind::Tabular => (200, 600),
    }
}

/// Size statistics for one document kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSizeStats {
    pub count: usize,
    pub avg_chars: usize,
    pub min_chars: usize,
    pub max_chars: usize,
    pub optimal_pct: f32,
    pub too_small: usize,
    pub too_large: usize,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub by_type: BTreeMap<DocumentKind, TypeSizeStats>,
    pub issues: Vec<String>,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coherence {
    pub clean_breaks: usize,
    pub broken: usize,
    pub score_pct: f32,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataCompleteness {
    /// (chunk_id, missing field) pairs
    pub missing: Vec<(String, String)>,
    pub citation_pct: f32,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapStats {
    pub comparisons: usize,
    pub detected: usize,
    pub rate_pct: f32,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diversity {
    /// Percentage of total chunks per document
    pub distribution: BTreeMap<String, f32>,
    pub issues: Vec<String>,
    pub status: CheckStatus,
}

/// Full quality report over one chunk sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub size: SizeDistribution,
    pub coherence: Coherence,
    pub metadata: MetadataCompleteness,
    pub overlap: OverlapStats,
    pub diversity: Diversity,
    pub recommendations: Vec<String>,
}

impl QualityReport {
    pub fn overall(&self) -> CheckStatus {
        let statuses = [
            self.size.status,
            self.coherence.status,
            self.metadata.status,
            self.overlap.status,
            self.diversity.status,
        ];
        if statuses.contains(&CheckStatus::Error) {
            CheckStatus::Error
        } else if statuses.iter().filter(|s| **s == CheckStatus::Warning).count() > 2 {
            CheckStatus::Warning
        } else {
            CheckStatus::Good
        }
    }

    /// Human-readable assessment
    pub fn render(&self) -> String {
        let mut out = String::from("Chunk quality analysis\n");

        out.push_str("\n1. Size distribution\n");
        for (kind, stats) in &self.size.by_type {
            let (lo, hi) = optimal_range(*kind);
            out.push_str(&format!(
                "  {kind} ({} chunks): target {lo}-{hi}, avg {}, range {}-{}, in target {:.1}% [{}]\n",
                stats.count, stats.avg_chars, stats.min_chars, stats.max_chars,
                stats.optimal_pct, stats.status
            ));
        }
        out.push_str("\n2. Coherence\n");
        out.push_str(&format!(
            "  clean breaks: {}/{} ({:.1}%) [{}]\n",
            self.coherence.clean_breaks,
            self.coherence.clean_breaks + self.coherence.broken,
            self.coherence.score_pct,
            self.coherence.status
        ));
        out.push_str("\n3. Metadata completeness\n");
        out.push_str(&format!(
            "  missing fields: {}, citation locators: {:.1}% [{}]\n",
            self.metadata.missing.len(),
            self.metadata.citation_pct,
            self.metadata.status
        ));
        out.push_str("\n4. Overlap effectiveness\n");
        out.push_str(&format!(
            "  overlaps detected: {}/{} ({:.1}%) [{}]\n",
            self.overlap.detected, self.overlap.comparisons, self.overlap.rate_pct, self.overlap.status
        ));
        out.push_str("\n5. Content diversity\n");
        for (doc, pct) in &self.diversity.distribution {
            out.push_str(&format!("  {doc}: {pct:.1}%\n"));
        }
        for issue in &self.diversity.issues {
            out.push_str(&format!("  issue: {issue}\n"));
        }

        out.push_str(&format!("\nOverall: {}\n", self.overall()));
        if !self.recommendations.is_empty() {
            out.push_str("Recommendations:\n");
            for rec in &self.recommendations {
                out.push_str(&format!("  - {rec}\n"));
            }
        }
        out
    }
}

/// Analyze and evaluate chunk quality
pub struct QualityAnalyzer<'a> {
    chunks: &'a [ProcessedChunk],
}

impl<'a> QualityAnalyzer<'a> {
    pub fn new(chunks: &'a [ProcessedChunk]) -> Self {
        Self { chunks }
    }

    /// Run all quality checks
    pub fn analyze(&self) -> QualityReport {
        let size = self.size_distribution();
        let coherence = self.coherence();
        let metadata = self.metadata_completeness();
        let overlap = self.overlap_effectiveness();
        let diversity = self.content_diversity();
        let recommendations =
            self.recommendations(&size, &coherence, &overlap, &diversity);

        QualityReport {
            size,
            coherence,
            metadata,
            overlap,
            diversity,
            recommendations,
        }
    }

    fn size_distribution(&self) -> SizeDistribution {
        let mut by_kind: BTreeMap<DocumentKind, Vec<usize>> = BTreeMap::new();
        for chunk in self.chunks {
            by_kind
                .entry(chunk.metadata.doc_type())
                .or_default()
                .push(chunk.metadata.char_count);
        }

        let mut by_type = BTreeMap::new();
        let mut issues = Vec::new();
        for (kind, sizes) in by_kind {
            let (lo, hi) = optimal_range(kind);
            let count = sizes.len();
            let too_small = sizes.iter().filter(|&&s| s < lo / 2).count();
            let too_large = sizes.iter().filter(|&&s| s as f32 > hi as f32 * 1.2).count();
            let optimal = sizes.iter().filter(|&&s| (lo..=hi).contains(&s)).count();
            let optimal_pct = optimal as f32 / count as f32 * 100.0;

            let mut type_issues = Vec::new();
            if too_small as f32 > count as f32 * 0.1 {
                type_issues.push(format!("{kind}: too many small chunks ({too_small})"));
            }
            if too_large as f32 > count as f32 * 0.1 {
                type_issues.push(format!("{kind}: too many large chunks ({too_large})"));
            }
            if optimal_pct < 60.0 {
                type_issues.push(format!("{kind}: only {optimal_pct:.0}% in target range"));
            }

            let status = if type_issues.is_empty() {
                CheckStatus::Good
            } else {
                CheckStatus::Warning
            };
            issues.extend(type_issues);

            by_type.insert(
                kind,
                TypeSizeStats {
                    count,
                    avg_chars: sizes.iter().sum::<usize>() / count,
                    min_chars: sizes.iter().copied().min().unwrap_or(0),
                    max_chars: sizes.iter().copied().max().unwrap_or(0),
                    optimal_pct,
                    too_small,
                    too_large,
                    status,
                },
            );
        }

        let status = if issues.is_empty() {
            CheckStatus::Good
        } else {
            CheckStatus::Warning
        };
        SizeDistribution {
            by_type,
            issues,
            status,
        }
    }

    fn coherence(&self) -> Coherence {
        let mut clean_breaks = 0usize;
        let mut broken = 0usize;
        for chunk in self.chunks {
            let text = chunk.text.as_str();
            let starts_lowercase = text.chars().next().is_some_and(|c| c.is_lowercase());
            let ends_clean = text
                .trim_end()
                .chars()
                .last()
                .is_some_and(|c| matches!(c, '.' | '!' | '?' | '\n'));
            if starts_lowercase || !ends_clean {
                broken += 1;
            } else {
                clean_breaks += 1;
            }
        }

        let total = self.chunks.len().max(1);
        let score_pct = clean_breaks as f32 / total as f32 * 100.0;
        Coherence {
            clean_breaks,
            broken,
            score_pct,
            status: if score_pct > 70.0 {
                CheckStatus::Good
            } else {
                CheckStatus::Warning
            },
        }
    }

    fn metadata_completeness(&self) -> MetadataCompleteness {
        const REQUIRED: [&str; 5] = ["source", "doc_name", "doc_type", "chunk_index", "char_count"];
        const LOCATORS: [&str; 3] = ["page", "section", "row"];

        let mut missing = Vec::new();
        let mut with_citation = 0usize;
        for chunk in self.chunks {
            // Check the serialized record, the form downstream consumers see.
            let record = serde_json::to_value(&chunk.metadata).unwrap_or_default();
            for field in REQUIRED {
                if record.get(field).is_none() {
                    missing.push((chunk.chunk_id.clone(), field.to_string()));
                }
            }
            if LOCATORS.iter().any(|field| record.get(field).is_some()) {
                with_citation += 1;
            }
        }

        let total = self.chunks.len().max(1);
        let citation_pct = with_citation as f32 / total as f32 * 100.0;
        MetadataCompleteness {
            status: if missing.is_empty() {
                CheckStatus::Good
            } else {
                CheckStatus::Error
            },
            missing,
            citation_pct,
        }
    }

    fn overlap_effectiveness(&self) -> OverlapStats {
        let mut by_source: BTreeMap<&str, Vec<&ProcessedChunk>> = BTreeMap::new();
        for chunk in self.chunks {
            by_source
                .entry(chunk.metadata.source.as_str())
                .or_default()
                .push(chunk);
        }

        let mut comparisons = 0usize;
        let mut detected = 0usize;
        for chunks in by_source.values_mut() {
            chunks.sort_by_key(|c| c.metadata.chunk_index);
            for pair in chunks.windows(2) {
                comparisons += 1;
                let tail = last_chars(&pair[0].text, 100);
                let head = first_chars(&pair[1].text, 100);
                let head_words: HashSet<&str> = head.split_whitespace().collect();
                let tail_words: Vec<&str> =
                    tail.split_whitespace().rev().take(10).collect();
                if tail_words.iter().any(|word| head_words.contains(word)) {
                    detected += 1;
                }
            }
        }

        let rate_pct = if comparisons > 0 {
            detected as f32 / comparisons as f32 * 100.0
        } else {
            0.0
        };
        OverlapStats {
            comparisons,
            detected,
            rate_pct,
            status: if (20.0..=60.0).contains(&rate_pct) {
                CheckStatus::Good
            } else {
                CheckStatus::Warning
            },
        }
    }

    fn content_diversity(&self) -> Diversity {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for chunk in self.chunks {
            *counts.entry(chunk.metadata.doc_name.clone()).or_default() += 1;
        }

        let total = self.chunks.len().max(1);
        let distribution: BTreeMap<String, f32> = counts
            .into_iter()
            .map(|(doc, count)| (doc, count as f32 / total as f32 * 100.0))
            .collect();

        let mut issues = Vec::new();
        if let Some((doc, pct)) = distribution
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
        {
            if *pct > 60.0 {
                issues.push(format!("one document dominates: {doc} ({pct:.0}%)"));
            }
        }
        if let Some((doc, pct)) = distribution
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
        {
            if *pct < 5.0 {
                issues.push(format!("under-represented document: {doc} ({pct:.1}%)"));
            }
        }

        let status = if issues.is_empty() {
            CheckStatus::Good
        } else {
            CheckStatus::Warning
        };
        Diversity {
            distribution,
            issues,
            status,
        }
    }

    fn recommendations(
        &self,
        size: &SizeDistribution,
        coherence: &Coherence,
        overlap: &OverlapStats,
        diversity: &Diversity,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        for (kind, stats) in &size.by_type {
            if stats.status == CheckStatus::Warning && stats.optimal_pct < 60.0 {
                let knob = match kind {
                    DocumentKind::Pdf => "chunking.pdf.target_chars",
                    DocumentKind::LegalDoc => "chunking.legal.target_chars",
                    DocumentKind::Tabular => "chunking.tabular.target_chars",
                };
                recommendations.push(format!(
                    "{kind}: adjust {knob} ({:.0}% of chunks in target range)",
                    stats.optimal_pct
                ));
            }
        }
        if coherence.score_pct < 70.0 {
            recommendations
                .push("adjust separator preferences for cleaner chunk breaks".to_string());
        }
        if overlap.rate_pct < 20.0 {
            recommendations
                .push("increase overlap_chars to preserve more cross-boundary context".to_string());
        } else if overlap.rate_pct > 60.0 {
            recommendations.push("decrease overlap_chars to reduce redundancy".to_string());
        }
        if !diversity.issues.is_empty() {
            recommendations.push(
                "consider per-document chunking parameters if one document stays dominant"
                    .to_string(),
            );
        }
        if recommendations.is_empty() {
            recommendations.push("chunking quality looks good, ready for embedding".to_string());
        }
        recommendations
    }
}

fn first_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn last_chars(text: &str, n: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(n)).collect()
}

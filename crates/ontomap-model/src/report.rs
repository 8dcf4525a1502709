use serde::{Deserialize, Serialize};

use crate::matching::MatchResult;

/// Mapped/unmapped statistics for one reconciliation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationReport {
    /// De-duplicated, non-empty queries.
    pub n_total: usize,
    pub n_mapped: usize,
    pub n_unmapped: usize,
    /// Input entries dropped before matching (null, blank or repeated).
    pub n_empty_or_duplicate: usize,
    /// Percentage of `n_total` that mapped; 100 when nothing was queried.
    pub fraction_mapped: f64,
}

impl CurationReport {
    /// Aggregates per-query results.
    ///
    /// `matches` holds one entry per unique query; `n_input` is the size of
    /// the batch before normalization.
    pub fn from_matches(matches: &[MatchResult], n_input: usize) -> Self {
        let n_total = matches.len();
        let n_mapped = matches.iter().filter(|m| m.matched).count();
        Self::from_counts(n_total, n_mapped, n_input.saturating_sub(n_total))
    }

    pub fn from_counts(n_total: usize, n_mapped: usize, n_empty_or_duplicate: usize) -> Self {
        let n_mapped = n_mapped.min(n_total);
        let fraction_mapped = if n_total == 0 {
            100.0
        } else {
            100.0 * n_mapped as f64 / n_total as f64
        };
        Self {
            n_total,
            n_mapped,
            n_unmapped: n_total - n_mapped,
            n_empty_or_duplicate,
            fraction_mapped,
        }
    }

    pub fn fraction_unmapped(&self) -> f64 {
        100.0 - self.fraction_mapped
    }

    pub fn is_complete(&self) -> bool {
        self.n_unmapped == 0
    }

    /// One-line summary, e.g. `2 of 3 terms mapped (66.7%)`.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} terms mapped ({:.1}%)",
            self.n_mapped, self.n_total, self.fraction_mapped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_reports_fully_mapped() {
        let report = CurationReport::from_matches(&[], 0);
        assert_eq!(report.n_total, 0);
        assert_eq!(report.n_mapped, 0);
        assert_eq!(report.n_unmapped, 0);
        assert_eq!(report.fraction_mapped, 100.0);
        assert!(report.is_complete());
    }

    #[test]
    fn counts_partition_the_batch() {
        let matches = vec![
            MatchResult::synonym("ASP", "A1CF", Some("A1CF".to_string())),
            MatchResult::exact("A1BG", "A1BG", Some("A1BG".to_string())),
            MatchResult::unmatched("unknown"),
        ];
        let report = CurationReport::from_matches(&matches, 5);
        assert_eq!(report.n_total, 3);
        assert_eq!(report.n_mapped, 2);
        assert_eq!(report.n_unmapped, 1);
        assert_eq!(report.n_empty_or_duplicate, 2);
        assert_eq!(report.n_mapped + report.n_unmapped, report.n_total);
        insta::assert_snapshot!(report.summary(), @"2 of 3 terms mapped (66.7%)");
    }

    #[test]
    fn report_serializes() {
        let report = CurationReport::from_counts(4, 3, 0);
        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["fraction_mapped"], 75.0);
        let round: CurationReport = serde_json::from_value(json).expect("deserialize report");
        assert_eq!(round, report);
    }
}

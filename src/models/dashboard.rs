//! Usage aggregates shown on the dashboard.

use serde::{Deserialize, Serialize};

/// Labelled counts.
///
/// Each chart endpoint names its label array differently (`months`,
/// `courses`, `sentiments`, `emotions`); all decode into `labels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    #[serde(
        alias = "months",
        alias = "courses",
        alias = "sentiments",
        alias = "emotions"
    )]
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl Series {
    /// Label/count pairs. Extra entries on either side are dropped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.pairs()
            .fold(0u64, |total, (_, count)| total.saturating_add(count))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.counts.is_empty()
    }
}

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_users: u64,
    pub total_queries: u64,
    pub queries_by_month: Series,
    pub queries_by_course: Series,
    pub sentiments: Series,
    pub emotions: Series,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_each_label_key() {
        for key in ["months", "courses", "sentiments", "emotions"] {
            let json = format!(r#"{{"{key}": ["a", "b"], "counts": [3, 4]}}"#);
            let series: Series = serde_json::from_str(&json).unwrap();
            assert_eq!(series.labels, vec!["a", "b"]);
            assert_eq!(series.total(), 7);
        }
    }

    #[test]
    fn test_total_saturates() {
        let series = Series {
            labels: vec!["a".into(), "b".into()],
            counts: vec![u64::MAX, 5],
        };
        assert_eq!(series.total(), u64::MAX);
    }

    #[test]
    fn test_pairs_truncate_to_shorter_side() {
        let series = Series {
            labels: vec!["Jan".into(), "Feb".into(), "Mar".into()],
            counts: vec![10, 20],
        };
        let pairs: Vec<_> = series.pairs().collect();
        assert_eq!(pairs, vec![("Jan", 10), ("Feb", 20)]);
    }
}

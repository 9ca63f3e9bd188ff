//! Observable record of per-field skips
//!
//! Field-match and gate failures are not errors: a skipped target field is
//! simply left at its zero value. The tracker makes every skip observable
//! instead of silent, collecting them into a serializable report the caller
//! can inspect alongside the mapped target.

use crate::schema::ContextToken;
use serde::Serialize;

/// Why a target field was left at its zero value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    /// No unclaimed source field carried the resolved name
    NoSourceMatch,
    /// The target field carries no mapping directive
    NoDirective,
    /// The directive's context tokens exclude the session token
    ContextGated,
    /// The matched source field held a null value
    NullSource,
    /// A lazy collection was not materialized; an empty output was produced
    LazyUninitialized,
}

/// One recorded skip
#[derive(Debug, Clone, Serialize)]
pub struct SkipItem {
    pub reason: SkipReason,
    /// Dotted field path from the mapping root, with bracketed element
    /// indices (`items[1].sku`)
    pub path: String,
    pub message: String,
}

/// Per-reason counts over a report
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipSummary {
    pub total: usize,
    pub no_source_match: usize,
    pub no_directive: usize,
    pub context_gated: usize,
    pub null_source: usize,
    pub lazy_uninitialized: usize,
}

/// Complete skip report for one top-level mapping
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipReport {
    pub items: Vec<SkipItem>,
    pub summary: SkipSummary,
}

impl SkipReport {
    /// True when every directive-gated field was mapped
    pub fn is_clean(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        self.items.iter().filter(|item| item.reason == reason).count()
    }
}

/// Collects skips during one mapping session
#[derive(Debug, Default)]
pub struct SkipTracker {
    items: Vec<SkipItem>,
}

impl SkipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_no_source_match(&mut self, path: &str, resolved_name: &str) {
        self.items.push(SkipItem {
            reason: SkipReason::NoSourceMatch,
            path: path.to_string(),
            message: format!("no source field named '{resolved_name}' remains unclaimed"),
        });
    }

    pub fn add_no_directive(&mut self, path: &str) {
        self.items.push(SkipItem {
            reason: SkipReason::NoDirective,
            path: path.to_string(),
            message: "target field carries no mapping directive".to_string(),
        });
    }

    pub fn add_context_gated(&mut self, path: &str, token: &ContextToken) {
        self.items.push(SkipItem {
            reason: SkipReason::ContextGated,
            path: path.to_string(),
            message: format!("directive does not list context '{token}'"),
        });
    }

    pub fn add_null_source(&mut self, path: &str, source_field: &str) {
        self.items.push(SkipItem {
            reason: SkipReason::NullSource,
            path: path.to_string(),
            message: format!("source field '{source_field}' holds a null value"),
        });
    }

    pub fn add_lazy_uninitialized(&mut self, path: &str) {
        self.items.push(SkipItem {
            reason: SkipReason::LazyUninitialized,
            path: path.to_string(),
            message: "lazy collection not materialized; produced empty output".to_string(),
        });
    }

    pub fn build_report(self) -> SkipReport {
        let mut summary = SkipSummary {
            total: self.items.len(),
            ..SkipSummary::default()
        };
        for item in &self.items {
            match item.reason {
                SkipReason::NoSourceMatch => summary.no_source_match += 1,
                SkipReason::NoDirective => summary.no_directive += 1,
                SkipReason::ContextGated => summary.context_gated += 1,
                SkipReason::NullSource => summary.null_source += 1,
                SkipReason::LazyUninitialized => summary.lazy_uninitialized += 1,
            }
        }
        SkipReport {
            items: self.items,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        let report = SkipTracker::new().build_report();
        assert!(report.is_clean());
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn test_summary_counts() {
        let mut tracker = SkipTracker::new();
        tracker.add_no_source_match("a", "x");
        tracker.add_context_gated("b", &ContextToken::new("SUMMARY"));
        tracker.add_context_gated("c", &ContextToken::new("SUMMARY"));
        tracker.add_null_source("d", "y");

        let report = tracker.build_report();
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.no_source_match, 1);
        assert_eq!(report.summary.context_gated, 2);
        assert_eq!(report.summary.null_source, 1);
        assert_eq!(report.count(SkipReason::ContextGated), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_report_serializes() {
        let mut tracker = SkipTracker::new();
        tracker.add_lazy_uninitialized("items");
        let report = tracker.build_report();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["lazy_uninitialized"], 1);
        assert_eq!(json["items"][0]["path"], "items");
    }
}

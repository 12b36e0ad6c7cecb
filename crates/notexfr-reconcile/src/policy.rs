//! Decisions the matchers defer: which candidate wins an ambiguous bucket,
//! and what happens to a record with no candidates.

use std::cell::RefCell;

/// Hook consulted by the matchers.
///
/// Implementations must be deterministic: the same candidates in the same
/// order must yield the same choice.
pub trait MatchPolicy {
    /// Pick one of `candidates` (source ids, in source order) for the target
    /// record `target_id`. `candidates` is never empty. Returning `None`
    /// drops the target record.
    fn choose(&self, target_id: &str, candidates: &[&str]) -> Option<usize>;

    /// Called for a target record whose link value matched no source record.
    fn unmatched(&self, target_id: &str) {
        let _ = target_id;
    }
}

/// Take the first candidate; say nothing about unmatched records.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstWins;

impl MatchPolicy for FirstWins {
    fn choose(&self, _target_id: &str, _candidates: &[&str]) -> Option<usize> {
        Some(0)
    }
}

/// Same choices as [`FirstWins`], but remembers which target records were
/// resolved from several candidates and which had none.
#[derive(Debug, Default)]
pub struct Reporting {
    report: RefCell<MatchReport>,
}

/// What a [`Reporting`] policy observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Target ids matched out of a bucket with more than one candidate.
    pub ambiguous: Vec<String>,
    /// Target ids with no candidate at all.
    pub unmatched: Vec<String>,
}

impl Reporting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> MatchReport {
        self.report.borrow().clone()
    }

    pub fn into_report(self) -> MatchReport {
        self.report.into_inner()
    }
}

impl MatchPolicy for Reporting {
    fn choose(&self, target_id: &str, candidates: &[&str]) -> Option<usize> {
        if candidates.len() > 1 {
            self.report.borrow_mut().ambiguous.push(target_id.to_string());
        }
        Some(0)
    }

    fn unmatched(&self, target_id: &str) {
        self.report.borrow_mut().unmatched.push(target_id.to_string());
    }
}

//! Processing statistics tracking.
//!
//! Thread-safe counters for the failure categories seen during a run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Thread-safe failure counters.
///
/// Every [`FailureKind`] is initialized to zero on creation, so lookups never
/// miss. Shareable across tasks behind an `Arc`.
pub struct ProcessingStats {
    failures: HashMap<FailureKind, AtomicUsize>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }
        ProcessingStats { failures }
    }

    pub fn increment(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map",
                kind
            );
        }
    }

    pub fn get_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Sum of fetch failures, excluding CSV write failures.
    pub fn total_fetch_failures(&self) -> usize {
        FailureKind::iter()
            .filter(|kind| *kind != FailureKind::Write)
            .map(|kind| self.get_count(kind))
            .sum()
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

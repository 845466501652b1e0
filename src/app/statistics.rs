//! End-of-run statistics logging.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{FailureKind, ProcessingStats};

/// Logs the per-category failure counts, skipping categories that never fired.
pub fn log_failure_statistics(stats: &ProcessingStats) {
    let total: usize = FailureKind::iter().map(|kind| stats.get_count(kind)).sum();
    if total == 0 {
        info!("No failures recorded");
        return;
    }

    info!("Failure counts:");
    for kind in FailureKind::iter() {
        let count = stats.get_count(kind);
        if count > 0 {
            info!("   {}: {}", kind.as_str(), count);
        }
    }
}

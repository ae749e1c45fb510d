//! Batch outcome reporting.

use crate::coord::TileCoord;

/// A tile that could not be updated, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    /// The tile the failure occurred on.
    pub tile: TileCoord,
    /// Human-readable cause.
    pub reason: String,
}

/// Outcome of one Modify batch.
///
/// Every tile the batch touched lands in exactly one bucket: committed
/// (written to disk, including propagated descendants), skipped (file
/// absent - a normal condition, not an error) or failed (with the
/// per-tile reason). The caller never receives a single opaque failure
/// for a batch that got as far as touching tiles.
#[derive(Debug, Clone, Default)]
pub struct ModifyReport {
    /// Tiles whose files were rewritten.
    pub committed: Vec<TileCoord>,
    /// Viewport tiles whose files did not exist.
    pub skipped: Vec<TileCoord>,
    /// Tiles that failed, each with its reason.
    pub failed: Vec<TileFailure>,
    /// Whether the batch was cancelled before finishing.
    pub cancelled: bool,
}

impl ModifyReport {
    /// Whether every touched tile committed successfully.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    /// Fold another outcome bucket set into this report.
    pub(crate) fn merge(&mut self, other: ModifyReport) {
        self.committed.extend(other.committed);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
        self.cancelled |= other.cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_succeeds() {
        assert!(ModifyReport::default().all_succeeded());
    }

    #[test]
    fn test_failure_marks_report() {
        let mut report = ModifyReport::default();
        report.failed.push(TileFailure {
            tile: TileCoord::new(18, 1, 2),
            reason: "corrupt tile: short header".into(),
        });
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_merge_accumulates_buckets() {
        let mut left = ModifyReport {
            committed: vec![TileCoord::new(18, 0, 0)],
            ..Default::default()
        };
        let right = ModifyReport {
            committed: vec![TileCoord::new(18, 1, 0)],
            skipped: vec![TileCoord::new(18, 1, 1)],
            cancelled: true,
            ..Default::default()
        };
        left.merge(right);
        assert_eq!(left.committed.len(), 2);
        assert_eq!(left.skipped.len(), 1);
        assert!(left.cancelled);
    }
}

use crate::analysis::{AnalysisContext, Category, Warning};

use super::AnalysisRule;

/// Bytes per megabyte in the disk warning.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

// ============================================================
// DiskSpaceLowRule
// ============================================================

pub struct DiskSpaceLowRule;

impl AnalysisRule for DiskSpaceLowRule {
    fn id(&self) -> &'static str {
        "disk_space_low"
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> Option<Warning> {
        if ctx.record.disk_usage() <= ctx.thresholds.disk {
            return None;
        }

        // Whole megabytes, rounded down.
        let free_mb = ctx.record.free_disk() / BYTES_PER_MB;

        Some(Warning {
            rule_id: "disk_space_low",
            category: Category::Disk,
            value: free_mb as f64,
            message: format!("Free disk space is too low: {free_mb} Mb left"),
        })
    }
}

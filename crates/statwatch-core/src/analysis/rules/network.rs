use crate::analysis::{AnalysisContext, Category, Warning};

use super::AnalysisRule;

/// Bytes per second in one Mbit/s, with a binary megabit (1024 * 1024 bits).
///
/// Free bandwidth is reported as `free_bytes / (1024 * 1024) * 8`.
pub const NET_BYTES_PER_MBIT: f64 = (1024 * 1024) as f64 / 8.0;

// ============================================================
// NetworkBandwidthLowRule
// ============================================================

pub struct NetworkBandwidthLowRule;

impl AnalysisRule for NetworkBandwidthLowRule {
    fn id(&self) -> &'static str {
        "network_bandwidth_low"
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> Option<Warning> {
        if ctx.record.network_usage() <= ctx.thresholds.network {
            return None;
        }

        let free_mbit = ctx.record.free_network() as f64 / NET_BYTES_PER_MBIT;

        Some(Warning {
            rule_id: "network_bandwidth_low",
            category: Category::Network,
            value: free_mbit,
            message: format!("Network bandwidth usage high: {free_mbit:.2} Mbit/s available"),
        })
    }
}

use crate::analysis::{AnalysisContext, Category, Warning};

use super::AnalysisRule;

// ============================================================
// MemoryUsageHighRule
// ============================================================

pub struct MemoryUsageHighRule;

impl AnalysisRule for MemoryUsageHighRule {
    fn id(&self) -> &'static str {
        "memory_usage_high"
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> Option<Warning> {
        let usage = ctx.record.memory_usage();
        if usage <= ctx.thresholds.memory {
            return None;
        }

        let used_pct = (usage * 100.0).round();

        Some(Warning {
            rule_id: "memory_usage_high",
            category: Category::Memory,
            value: used_pct,
            message: format!("Memory usage too high: {}%", used_pct as u64),
        })
    }
}

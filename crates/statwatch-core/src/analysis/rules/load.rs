use crate::analysis::rules::AnalysisRule;
use crate::analysis::{AnalysisContext, Category, Warning};

// ============================================================
// LoadAverageHighRule — load average exceeds the configured limit
// ============================================================

pub struct LoadAverageHighRule;

impl AnalysisRule for LoadAverageHighRule {
    fn id(&self) -> &'static str {
        "load_average_high"
    }

    fn evaluate(&self, ctx: &AnalysisContext) -> Option<Warning> {
        let la = ctx.record.load_average;
        if la <= ctx.thresholds.load {
            return None;
        }

        Some(Warning {
            rule_id: "load_average_high",
            category: Category::Cpu,
            value: la,
            message: format!("Load Average is too high: {la:.2}"),
        })
    }
}

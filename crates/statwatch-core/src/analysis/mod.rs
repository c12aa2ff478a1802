pub mod rules;

use crate::config::Thresholds;
use crate::model::StatsRecord;

// ============================================================
// Core types
// ============================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Disk => "disk",
            Category::Network => "network",
        }
    }
}

/// A threshold that was exceeded in one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Warning {
    pub rule_id: &'static str,
    pub category: Category,
    /// The computed value the message reports (load, %, MB, Mbit/s).
    pub value: f64,
    /// The line printed to standard output.
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================
// Analysis context passed to each rule
// ============================================================

pub struct AnalysisContext<'a> {
    pub record: &'a StatsRecord,
    pub thresholds: &'a Thresholds,
}

/// Runs every rule against `record`, in rule order.
pub fn analyze(record: &StatsRecord, thresholds: &Thresholds) -> Vec<Warning> {
    let ctx = AnalysisContext { record, thresholds };
    rules::all_rules()
        .iter()
        .filter_map(|rule| rule.evaluate(&ctx))
        .collect()
}

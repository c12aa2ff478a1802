pub mod disk;
pub mod load;
pub mod memory;
pub mod network;

use super::{AnalysisContext, Warning};

pub trait AnalysisRule: Send + Sync {
    fn id(&self) -> &'static str;
    fn evaluate(&self, ctx: &AnalysisContext) -> Option<Warning>;
}

/// Rules in the order their warnings are printed.
pub fn all_rules() -> Vec<Box<dyn AnalysisRule>> {
    vec![
        Box::new(load::LoadAverageHighRule),
        Box::new(memory::MemoryUsageHighRule),
        Box::new(disk::DiskSpaceLowRule),
        Box::new(network::NetworkBandwidthLowRule),
    ]
}

//! Statistics record reported by the monitored server.

use thiserror::Error;

/// One sample of server statistics, as returned by the `_stats` endpoint.
///
/// Built only by [`crate::collector::parse_stats`] once every field has
/// converted. Memory and disk are in bytes, network in bytes per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsRecord {
    pub load_average: f64,
    pub total_memory: u64,
    pub used_memory: u64,
    pub total_disk: u64,
    pub used_disk: u64,
    pub total_network: u64,
    pub used_network: u64,
}

/// Resource whose totals are checked by [`StatsRecord::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Memory,
    Disk,
    Network,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Memory => "memory",
            Resource::Disk => "disk",
            Resource::Network => "network bandwidth",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that parsed but cannot be evaluated meaningfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("total {0} is zero")]
    ZeroTotal(Resource),
    #[error("used {resource} ({used}) exceeds total ({total})")]
    UsedExceedsTotal {
        resource: Resource,
        used: u64,
        total: u64,
    },
}

impl StatsRecord {
    /// Rejects zero totals and used values above their total.
    ///
    /// Checked in order memory, disk, network; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (resource, total, used) in [
            (Resource::Memory, self.total_memory, self.used_memory),
            (Resource::Disk, self.total_disk, self.used_disk),
            (Resource::Network, self.total_network, self.used_network),
        ] {
            if total == 0 {
                return Err(ValidationError::ZeroTotal(resource));
            }
            if used > total {
                return Err(ValidationError::UsedExceedsTotal {
                    resource,
                    used,
                    total,
                });
            }
        }
        Ok(())
    }

    pub fn memory_usage(&self) -> f64 {
        ratio(self.used_memory, self.total_memory)
    }

    pub fn disk_usage(&self) -> f64 {
        ratio(self.used_disk, self.total_disk)
    }

    pub fn network_usage(&self) -> f64 {
        ratio(self.used_network, self.total_network)
    }

    pub fn free_disk(&self) -> u64 {
        self.total_disk.saturating_sub(self.used_disk)
    }

    pub fn free_network(&self) -> u64 {
        self.total_network.saturating_sub(self.used_network)
    }
}

/// `used / total`, or 0.0 for an empty total.
fn ratio(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StatsRecord {
        StatsRecord {
            load_average: 1.0,
            total_memory: 1000,
            used_memory: 500,
            total_disk: 2000,
            used_disk: 1000,
            total_network: 100,
            used_network: 10,
        }
    }

    #[test]
    fn test_validate_accepts_consistent_record() {
        assert_eq!(record().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_total() {
        let r = StatsRecord {
            total_disk: 0,
            used_disk: 0,
            ..record()
        };
        assert_eq!(r.validate(), Err(ValidationError::ZeroTotal(Resource::Disk)));
    }

    #[test]
    fn test_validate_rejects_used_above_total() {
        let r = StatsRecord {
            used_network: 101,
            ..record()
        };
        assert_eq!(
            r.validate(),
            Err(ValidationError::UsedExceedsTotal {
                resource: Resource::Network,
                used: 101,
                total: 100,
            })
        );
    }

    #[test]
    fn test_validate_reports_memory_first() {
        let r = StatsRecord {
            total_memory: 0,
            used_memory: 0,
            total_network: 0,
            used_network: 0,
            ..record()
        };
        assert_eq!(
            r.validate(),
            Err(ValidationError::ZeroTotal(Resource::Memory))
        );
    }

    #[test]
    fn test_usage_ratios() {
        let r = record();
        assert_eq!(r.memory_usage(), 0.5);
        assert_eq!(r.disk_usage(), 0.5);
        assert_eq!(r.network_usage(), 0.1);
        assert_eq!(r.free_disk(), 1000);
        assert_eq!(r.free_network(), 90);
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::UsedExceedsTotal {
            resource: Resource::Memory,
            used: 12,
            total: 10,
        };
        assert_eq!(err.to_string(), "used memory (12) exceeds total (10)");
        assert_eq!(
            ValidationError::ZeroTotal(Resource::Network).to_string(),
            "total network bandwidth is zero"
        );
    }
}

//! The poll loop: fetch → parse → validate → evaluate → sleep.
//!
//! [`Poller::poll_once`] runs a single cycle and never sleeps, so the
//! failure policy can be tested without timers. [`Poller::run`] repeats
//! cycles until the failure ceiling is reached or the running flag clears.
//!
//! Warnings and diagnostics are written to the poller's output (standard
//! output in the daemon), not through `tracing`, so they are printed even
//! when logging is silenced.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analysis::{Warning, analyze};
use crate::collector::{FetchError, ParseError, StatsSource, parse_stats};
use crate::config::PollerConfig;
use crate::fmt::{FmtStyle, format_bytes, format_duration};
use crate::model::{StatsRecord, ValidationError};

/// Line printed once when the failure ceiling is reached.
pub const GIVE_UP_MESSAGE: &str = "Unable to fetch server statistic.";

/// Granularity at which the inter-cycle sleep checks the running flag.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Any failure that makes a cycle unsuccessful.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("validation failed: {0}")]
    Validate(#[from] ValidationError),
}

impl CycleError {
    /// The one-line diagnostic printed for this failure.
    pub fn diagnostic(&self) -> String {
        match self {
            CycleError::Fetch(FetchError::Transport(e)) => {
                format!("Error fetching server statistic: {e}")
            }
            CycleError::Fetch(FetchError::Status(code)) => {
                format!("Unexpected response status: {code}")
            }
            CycleError::Fetch(FetchError::BodyRead(e)) => {
                format!("Error reading response body: {e}")
            }
            CycleError::Parse(ParseError::Encoding | ParseError::Format { .. }) => {
                "Invalid data format.".to_string()
            }
            CycleError::Parse(ParseError::Field { field, source }) => {
                format!("Error parsing {field}: {source}")
            }
            CycleError::Validate(e) => format!("Invalid server statistic: {e}"),
        }
    }
}

/// Consecutive-failure bookkeeping carried from one cycle to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    consecutive_failures: u32,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Resets the counter; returns how many failures preceded this success.
    pub fn record_success(&mut self) -> u32 {
        std::mem::take(&mut self.consecutive_failures)
    }

    /// Bumps the counter and returns the new value.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The record was fetched and evaluated; `warnings` may be empty.
    Healthy {
        record: StatsRecord,
        warnings: Vec<Warning>,
    },
    /// The cycle failed but the ceiling has not been reached.
    Failed {
        error: CycleError,
        consecutive_failures: u32,
    },
    /// The cycle failed and the ceiling was reached. Terminal.
    GaveUp { error: CycleError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Failure ceiling reached.
    GaveUp,
    /// Running flag cleared from outside (Ctrl-C).
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub reason: StopReason,
}

/// Drives a [`StatsSource`] through repeated poll cycles.
pub struct Poller<S: StatsSource, W: Write> {
    source: S,
    out: W,
    config: PollerConfig,
    state: PollState,
}

impl<S: StatsSource, W: Write> Poller<S, W> {
    pub fn new(source: S, config: PollerConfig, out: W) -> Self {
        Self {
            source,
            out,
            config,
            state: PollState::new(),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the poller, returning the output writer.
    pub fn into_output(self) -> W {
        self.out
    }

    fn collect(&mut self) -> Result<StatsRecord, CycleError> {
        let raw = self.source.fetch()?;
        let record = parse_stats(&raw)?;
        record.validate()?;
        Ok(record)
    }

    /// Runs exactly one cycle without sleeping.
    ///
    /// Output write failures are the only error returned; cycle failures
    /// are reported through [`CycleOutcome`].
    pub fn poll_once(&mut self) -> io::Result<CycleOutcome> {
        match self.collect() {
            Ok(record) => {
                let recovered_from = self.state.record_success();
                if recovered_from > 0 {
                    info!("Recovered after {} failed cycle(s)", recovered_from);
                }
                debug!(
                    "Stats: load={:.2}, mem={}/{} ({:.1}%), disk={}/{} ({:.1}%), net={:.1}%",
                    record.load_average,
                    format_bytes(record.used_memory, FmtStyle::Compact),
                    format_bytes(record.total_memory, FmtStyle::Compact),
                    record.memory_usage() * 100.0,
                    format_bytes(record.used_disk, FmtStyle::Compact),
                    format_bytes(record.total_disk, FmtStyle::Compact),
                    record.disk_usage() * 100.0,
                    record.network_usage() * 100.0,
                );

                let warnings = analyze(&record, &self.config.thresholds);
                for warning in &warnings {
                    debug!(
                        "Rule {} [{}] fired (value {:.2})",
                        warning.rule_id,
                        warning.category.as_str(),
                        warning.value
                    );
                    writeln!(self.out, "{}", warning)?;
                }
                self.out.flush()?;

                Ok(CycleOutcome::Healthy { record, warnings })
            }
            Err(error) => {
                let failures = self.state.record_failure();
                warn!(
                    "Cycle failed ({}/{}): {}",
                    failures, self.config.max_failures, error
                );
                writeln!(self.out, "{}", error.diagnostic())?;

                let outcome = if failures >= self.config.max_failures {
                    error!("Giving up after {} consecutive failures", failures);
                    writeln!(self.out, "{}", GIVE_UP_MESSAGE)?;
                    CycleOutcome::GaveUp { error }
                } else {
                    CycleOutcome::Failed {
                        error,
                        consecutive_failures: failures,
                    }
                };
                self.out.flush()?;

                Ok(outcome)
            }
        }
    }

    /// Polls until the failure ceiling is reached or `running` clears.
    ///
    /// The full interval is waited after every cycle, successful or not.
    pub fn run(&mut self, running: &AtomicBool) -> io::Result<RunSummary> {
        info!(
            "Polling {} every {}",
            self.source.describe(),
            format_duration(self.config.interval, FmtStyle::Detail)
        );

        let mut cycles: u64 = 0;
        while running.load(Ordering::SeqCst) {
            cycles += 1;
            debug!("Cycle #{}", cycles);

            if let CycleOutcome::GaveUp { .. } = self.poll_once()? {
                return Ok(RunSummary {
                    cycles,
                    reason: StopReason::GaveUp,
                });
            }

            sleep_while_running(self.config.interval, running);
        }

        Ok(RunSummary {
            cycles,
            reason: StopReason::Stopped,
        })
    }
}

/// Sleeps for `duration` in short slices, returning early once `running` clears.
fn sleep_while_running(duration: Duration, running: &AtomicBool) {
    let mut remaining = duration;
    while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
        let sleep_time = remaining.min(SLEEP_SLICE);
        std::thread::sleep(sleep_time);
        remaining = remaining.saturating_sub(sleep_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockSource, StatsField};
    use crate::model::Resource;

    const HEALTHY: &str = "1.0,1000,100,1000,100,1000,100";

    fn poller(source: MockSource) -> Poller<MockSource, Vec<u8>> {
        let config = PollerConfig::default().with_interval(Duration::ZERO);
        Poller::new(source, config, Vec::new())
    }

    fn output(p: Poller<MockSource, Vec<u8>>) -> Vec<String> {
        String::from_utf8(p.into_output())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_poll_state_counts_and_resets() {
        let mut state = PollState::new();
        assert_eq!(state.record_failure(), 1);
        assert_eq!(state.record_failure(), 2);
        assert_eq!(state.record_success(), 2);
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn test_healthy_cycle_prints_warnings() {
        let mut p = poller(MockSource::new().with_body("31.5,1000,850,1000,100,1000,100"));

        let outcome = p.poll_once().unwrap();
        let CycleOutcome::Healthy { warnings, .. } = outcome else {
            panic!("expected healthy outcome, got {outcome:?}");
        };
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            output(p),
            vec!["Load Average is too high: 31.50", "Memory usage too high: 85%"]
        );
    }

    #[test]
    fn test_healthy_cycle_without_warnings_prints_nothing() {
        let mut p = poller(MockSource::new().with_body(HEALTHY));
        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::Healthy { .. }
        ));
        assert!(output(p).is_empty());
    }

    #[test]
    fn test_failure_diagnostics() {
        let cases = [
            (
                CycleError::Fetch(FetchError::Transport("connection refused".into())),
                "Error fetching server statistic: connection refused",
            ),
            (
                CycleError::Fetch(FetchError::Status(404)),
                "Unexpected response status: 404",
            ),
            (
                CycleError::Fetch(FetchError::BodyRead("unexpected EOF".into())),
                "Error reading response body: unexpected EOF",
            ),
            (
                CycleError::Parse(ParseError::Format { fields: 3 }),
                "Invalid data format.",
            ),
            (
                CycleError::Validate(ValidationError::ZeroTotal(Resource::Disk)),
                "Invalid server statistic: total disk is zero",
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.diagnostic(), expected);
        }
    }

    #[test]
    fn test_field_error_diagnostic_names_field() {
        let mut p = poller(MockSource::new().with_body("1.0,1000,100,1000,x,1000,100"));

        let outcome = p.poll_once().unwrap();
        let CycleOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        let CycleError::Parse(parse) = &error else {
            panic!("expected parse error, got {error:?}");
        };
        assert_eq!(parse.field(), Some(StatsField::UsedDisk));
        assert_eq!(
            output(p),
            vec!["Error parsing used disk: invalid digit found in string"]
        );
    }

    #[test]
    fn test_three_failures_give_up_once() {
        let source = MockSource::new()
            .with_error(FetchError::Transport("refused".into()))
            .with_error(FetchError::Transport("refused".into()))
            .with_error(FetchError::Transport("refused".into()));
        let mut p = poller(source);

        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::Failed {
                consecutive_failures: 1,
                ..
            }
        ));
        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::Failed {
                consecutive_failures: 2,
                ..
            }
        ));
        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::GaveUp { .. }
        ));

        let lines = output(p);
        assert_eq!(lines.iter().filter(|l| *l == GIVE_UP_MESSAGE).count(), 1);
        assert_eq!(lines.last().map(String::as_str), Some(GIVE_UP_MESSAGE));
    }

    #[test]
    fn test_success_resets_failure_counter() {
        let source = MockSource::new()
            .with_error(FetchError::Status(500))
            .with_error(FetchError::Status(500))
            .with_body(HEALTHY)
            .with_error(FetchError::Status(500))
            .with_error(FetchError::Status(500));
        let mut p = poller(source);

        for _ in 0..5 {
            let outcome = p.poll_once().unwrap();
            assert!(!matches!(outcome, CycleOutcome::GaveUp { .. }));
        }
        assert_eq!(p.state().consecutive_failures(), 2);
    }

    #[test]
    fn test_parse_and_validation_failures_count() {
        let source = MockSource::new()
            .with_body("garbage")
            .with_body("1.0,0,0,1000,100,1000,100")
            .with_body("1.0,1000,100,1000,1001,1000,100");
        let mut p = poller(source);

        p.poll_once().unwrap();
        p.poll_once().unwrap();
        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::GaveUp {
                error: CycleError::Validate(ValidationError::UsedExceedsTotal { .. })
            }
        ));
        assert_eq!(
            output(p),
            vec![
                "Invalid data format.",
                "Invalid server statistic: total memory is zero",
                "Invalid server statistic: used disk (1001) exceeds total (1000)",
                GIVE_UP_MESSAGE,
            ]
        );
    }

    #[test]
    fn test_run_stops_at_ceiling() {
        let source = MockSource::new().with_body(HEALTHY).with_body(HEALTHY);
        let mut p = poller(source);
        let running = AtomicBool::new(true);

        let summary = p.run(&running).unwrap();

        // Two successes, then the exhausted script fails three times.
        assert_eq!(
            summary,
            RunSummary {
                cycles: 5,
                reason: StopReason::GaveUp
            }
        );
        assert_eq!(p.source().fetches(), 5);
    }

    #[test]
    fn test_run_honours_cleared_flag() {
        let mut p = poller(MockSource::new().with_body(HEALTHY));
        let running = AtomicBool::new(false);

        let summary = p.run(&running).unwrap();
        assert_eq!(summary.cycles, 0);
        assert_eq!(summary.reason, StopReason::Stopped);
        assert_eq!(p.source().fetches(), 0);
    }

    #[test]
    fn test_custom_ceiling() {
        let config = PollerConfig::default()
            .with_interval(Duration::ZERO)
            .with_max_failures(1);
        let mut p = Poller::new(MockSource::new(), config, Vec::new());

        assert!(matches!(
            p.poll_once().unwrap(),
            CycleOutcome::GaveUp { .. }
        ));
    }
}

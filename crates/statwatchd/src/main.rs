//! statwatchd - Server health poller.
//!
//! Periodically fetches the `_stats` line from a server, checks load,
//! memory, disk and network against fixed thresholds and prints a warning
//! line for each one exceeded. Gives up after a run of failed cycles.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use statwatch_core::collector::HttpSource;
use statwatch_core::fmt::{FmtStyle, format_duration};
use statwatch_core::{Poller, PollerConfig, StopReason, Thresholds};

/// Server health poller.
#[derive(Parser)]
#[command(name = "statwatchd", about = "Server health poller", version)]
struct Args {
    /// URL of the statistics endpoint.
    #[arg(
        long,
        env = "STATWATCH_ENDPOINT",
        default_value = statwatch_core::config::DEFAULT_ENDPOINT
    )]
    endpoint: String,

    /// Poll interval in seconds.
    #[arg(short, long, env = "STATWATCH_INTERVAL", default_value = "30")]
    interval: u64,

    /// Consecutive failed cycles before giving up.
    #[arg(
        long,
        env = "STATWATCH_MAX_FAILURES",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_failures: u32,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "STATWATCH_TIMEOUT", default_value = "10")]
    timeout: u64,

    /// Load average above which a warning is printed.
    #[arg(long, env = "STATWATCH_MAX_LOAD", default_value = "30.0", value_parser = parse_load)]
    max_load: f64,

    /// Memory usage ratio (0..1] above which a warning is printed.
    #[arg(long, env = "STATWATCH_MAX_MEMORY", default_value = "0.8", value_parser = parse_ratio)]
    max_memory: f64,

    /// Disk usage ratio (0..1] above which a warning is printed.
    #[arg(long, env = "STATWATCH_MAX_DISK", default_value = "0.9", value_parser = parse_ratio)]
    max_disk: f64,

    /// Network usage ratio (0..1] above which a warning is printed.
    #[arg(long, env = "STATWATCH_MAX_NETWORK", default_value = "0.9", value_parser = parse_ratio)]
    max_network: f64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors. Warnings are still printed to stdout.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn to_config(&self) -> PollerConfig {
        PollerConfig {
            endpoint: self.endpoint.clone(),
            interval: Duration::from_secs(self.interval),
            max_failures: self.max_failures,
            timeout: Duration::from_secs(self.timeout),
            thresholds: Thresholds {
                load: self.max_load,
                memory: self.max_memory,
                disk: self.max_disk,
                network: self.max_network,
            },
        }
    }
}

/// Parses a usage ratio, accepting values in `(0, 1]`.
fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid ratio '{}': {}", s, e))?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(format!("ratio '{}' must be in (0, 1]", s));
    }
    Ok(value)
}

/// Parses a load average limit, accepting finite non-negative values.
fn parse_load(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid load '{}': {}", s, e))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("load '{}' must be a non-negative number", s));
    }
    Ok(value)
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
/// Logs go to stderr so stdout carries only warning lines.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("statwatchd={}", level).parse().unwrap())
        .add_directive(format!("statwatch_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.to_config();

    info!("statwatchd {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: endpoint={}, interval={}, timeout={}, max_failures={}",
        config.endpoint,
        format_duration(config.interval, FmtStyle::Compact),
        format_duration(config.timeout, FmtStyle::Compact),
        config.max_failures
    );
    info!(
        "Thresholds: load>{}, memory>{}, disk>{}, network>{}",
        config.thresholds.load,
        config.thresholds.memory,
        config.thresholds.disk,
        config.thresholds.network
    );

    let source = match HttpSource::new(&config.endpoint, config.timeout) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut poller = Poller::new(source, config, io::stdout());

    match poller.run(&running) {
        Ok(summary) => {
            match summary.reason {
                StopReason::GaveUp => info!("Stopped after {} cycles: giving up", summary.cycles),
                StopReason::Stopped => info!("Stopped after {} cycles", summary.cycles),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to write to stdout: {}", e);
            ExitCode::FAILURE
        }
    }
}

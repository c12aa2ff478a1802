//! Abstraction over where statistics payloads come from.
//!
//! The `StatsSource` trait lets the poll loop run against the real HTTP
//! endpoint in production and against a scripted [`MockSource`] in tests.
//!
//! [`MockSource`]: crate::collector::MockSource

use thiserror::Error;

/// Failure to obtain a payload from the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection-level failure: DNS, refused connection, timeout.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a status other than 200 OK.
    #[error("status {0}")]
    Status(u16),
    /// The status was OK but reading the body failed.
    #[error("{0}")]
    BodyRead(String),
}

/// Source of raw `_stats` payloads.
pub trait StatsSource {
    /// Performs one fetch and returns the full response body.
    fn fetch(&mut self) -> Result<Vec<u8>, FetchError>;

    /// Human-readable description of the source, for logging.
    fn describe(&self) -> String;
}

impl<S: StatsSource + ?Sized> StatsSource for Box<S> {
    fn fetch(&mut self) -> Result<Vec<u8>, FetchError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

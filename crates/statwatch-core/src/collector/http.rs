//! Blocking HTTP source for the `_stats` endpoint.

use std::error::Error;
use std::io;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{debug, trace};

use super::traits::{FetchError, StatsSource};

/// Fetches payloads with a blocking HTTP GET.
///
/// The response is owned by `fetch` and dropped before it returns, so the
/// connection goes back to the pool on every path. Bodies of non-200
/// responses are drained first so the connection stays reusable.
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    /// Creates a source for `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

/// Formats an error followed by each of its sources, separated by `": "`.
fn error_chain(err: &dyn Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Timeouts are transport failures whichever phase they hit.
fn read_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport(error_chain(&e))
    } else {
        FetchError::BodyRead(error_chain(&e))
    }
}

impl StatsSource for HttpSource {
    fn fetch(&mut self) -> Result<Vec<u8>, FetchError> {
        trace!("GET {}", self.endpoint);

        let mut response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|e| FetchError::Transport(error_chain(&e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            if let Err(e) = response.copy_to(&mut io::sink()) {
                debug!("Failed to drain body of {} response: {}", status, e);
            }
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().map_err(read_error)?;
        debug!("Fetched {} bytes from {}", body.len(), self.endpoint);

        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}

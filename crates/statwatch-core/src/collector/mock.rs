//! Scripted statistics source for testing the poll loop without a network.

use std::collections::VecDeque;

use super::traits::{FetchError, StatsSource};

/// In-memory source that replays a queue of canned fetch results.
///
/// Once the script is exhausted every further fetch fails with a
/// transport error, which lets tests drive the loop to its failure ceiling.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    script: VecDeque<Result<Vec<u8>, FetchError>>,
    fetches: usize,
}

impl MockSource {
    /// Creates a source with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response with the given body.
    pub fn push_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.script.push_back(Ok(body.into()));
        self
    }

    /// Queues a failed fetch.
    pub fn push_error(&mut self, error: FetchError) -> &mut Self {
        self.script.push_back(Err(error));
        self
    }

    /// Builder-style variant of [`MockSource::push_body`].
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.push_body(body);
        self
    }

    /// Builder-style variant of [`MockSource::push_error`].
    pub fn with_error(mut self, error: FetchError) -> Self {
        self.push_error(error);
        self
    }

    /// Number of fetches performed so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Number of scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl StatsSource for MockSource {
    fn fetch(&mut self) -> Result<Vec<u8>, FetchError> {
        self.fetches += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("mock script exhausted".to_string())))
    }

    fn describe(&self) -> String {
        format!("mock ({} scripted responses)", self.script.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_replays_in_order() {
        let mut source = MockSource::new()
            .with_body("first")
            .with_error(FetchError::Status(500))
            .with_body("second");

        assert_eq!(source.remaining(), 3);
        assert_eq!(source.fetch(), Ok(b"first".to_vec()));
        assert_eq!(source.fetch(), Err(FetchError::Status(500)));
        assert_eq!(source.fetch(), Ok(b"second".to_vec()));
        assert_eq!(source.fetches(), 3);
    }

    #[test]
    fn test_mock_exhausted_is_transport_error() {
        let mut source = MockSource::new();
        assert!(matches!(source.fetch(), Err(FetchError::Transport(_))));
        assert!(matches!(source.fetch(), Err(FetchError::Transport(_))));
        assert_eq!(source.fetches(), 2);
    }
}

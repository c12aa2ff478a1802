//! Statistics collection: fetching the raw payload and parsing it.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Poller                     │
//! │   fetch() ──► parse_stats() ──► validate()    │
//! └──────┬────────────────────────────────────────┘
//!        │
//!  ┌─────▼───────┐
//!  │ StatsSource │ (trait)
//!  └─────┬───────┘
//!        │
//!   ┌────┴──────────┐
//!   │               │
//! ┌─▼──────────┐ ┌──▼─────────┐
//! │ HttpSource │ │ MockSource │
//! │ (reqwest)  │ │ (testing)  │
//! └────────────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use statwatch_core::collector::{MockSource, StatsSource, parse_stats};
//!
//! let mut source = MockSource::new().with_body("1.5,100,50,100,50,100,50");
//! let raw = source.fetch().unwrap();
//! let record = parse_stats(&raw).unwrap();
//! assert_eq!(record.used_disk, 50);
//! ```

mod http;
pub mod mock;
pub mod parser;
pub mod traits;

pub use http::HttpSource;
pub use mock::MockSource;
pub use parser::{FIELD_COUNT, FieldError, ParseError, StatsField, parse_stats};
pub use traits::{FetchError, StatsSource};

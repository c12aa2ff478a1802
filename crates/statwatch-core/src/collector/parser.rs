//! Parser for the `_stats` payload.
//!
//! The payload is a single line of seven comma-separated values:
//!
//! ```text
//! <load avg>,<total mem>,<used mem>,<total disk>,<used disk>,<total net>,<used net>
//! ```
//!
//! Parsing is purely syntactic. Range checks live in
//! [`StatsRecord::validate`](crate::model::StatsRecord::validate).

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::model::StatsRecord;

/// Number of comma-separated fields in a well-formed payload.
pub const FIELD_COUNT: usize = 7;

/// Semantic name of each payload position, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsField {
    LoadAverage,
    TotalMemory,
    UsedMemory,
    TotalDisk,
    UsedDisk,
    TotalNetwork,
    UsedNetwork,
}

impl StatsField {
    pub const ALL: [StatsField; FIELD_COUNT] = [
        StatsField::LoadAverage,
        StatsField::TotalMemory,
        StatsField::UsedMemory,
        StatsField::TotalDisk,
        StatsField::UsedDisk,
        StatsField::TotalNetwork,
        StatsField::UsedNetwork,
    ];

    pub fn position(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StatsField::LoadAverage => "load average",
            StatsField::TotalMemory => "total memory",
            StatsField::UsedMemory => "used memory",
            StatsField::TotalDisk => "total disk",
            StatsField::UsedDisk => "used disk",
            StatsField::TotalNetwork => "total network bandwidth",
            StatsField::UsedNetwork => "used network bandwidth",
        }
    }
}

impl std::fmt::Display for StatsField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a single field failed to convert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error(transparent)]
    Integer(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    #[error("value {0} is not a finite non-negative number")]
    OutOfRange(f64),
}

/// Error type for payload parsing failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("payload is not valid UTF-8")]
    Encoding,
    #[error("expected 7 fields, got {fields}")]
    Format { fields: usize },
    #[error("invalid {field}: {source}")]
    Field {
        field: StatsField,
        #[source]
        source: FieldError,
    },
}

impl ParseError {
    /// The field that failed conversion, if this is a field error.
    pub fn field(&self) -> Option<StatsField> {
        match self {
            ParseError::Field { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Parses a raw `_stats` body into a [`StatsRecord`].
///
/// Fields are converted in wire order and parsing stops at the first field
/// that fails, so the reported field is always the earliest bad one.
pub fn parse_stats(raw: &[u8]) -> Result<StatsRecord, ParseError> {
    let content = std::str::from_utf8(raw).map_err(|_| ParseError::Encoding)?;

    let fields: Vec<&str> = content.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::Format {
            fields: fields.len(),
        });
    }

    let parse_u64 = |field: StatsField| -> Result<u64, ParseError> {
        fields[field.position()]
            .parse::<u64>()
            .map_err(|e| ParseError::Field {
                field,
                source: e.into(),
            })
    };

    Ok(StatsRecord {
        load_average: parse_load(fields[StatsField::LoadAverage.position()])?,
        total_memory: parse_u64(StatsField::TotalMemory)?,
        used_memory: parse_u64(StatsField::UsedMemory)?,
        total_disk: parse_u64(StatsField::TotalDisk)?,
        used_disk: parse_u64(StatsField::UsedDisk)?,
        total_network: parse_u64(StatsField::TotalNetwork)?,
        used_network: parse_u64(StatsField::UsedNetwork)?,
    })
}

fn parse_load(s: &str) -> Result<f64, ParseError> {
    let field = StatsField::LoadAverage;
    let value: f64 = s.parse().map_err(|e: ParseFloatError| ParseError::Field {
        field,
        source: e.into(),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::Field {
            field,
            source: FieldError::OutOfRange(value),
        });
    }
    Ok(value)
}

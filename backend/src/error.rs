//! Error types for the covidviz pipeline.
//!
//! One error type per layer:
//!
//! - [`FetchError`] - network failures while retrieving the dataset
//! - [`CsvError`] - malformed CSV or missing columns
//! - [`TransformError`] - an invariant of the derived tables did not hold
//! - [`PipelineError`] - top-level fetch + transform orchestration
//! - [`ServerError`] - HTTP surface
//!
//! Conversions are provided via `From`, so `?` works across layers.

use thiserror::Error;

// =============================================================================
// Network Errors
// =============================================================================

/// Errors while retrieving the CSV resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local file could not be read.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while parsing the CSV body.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The body contains no header line.
    #[error("CSV body is empty")]
    EmptyFile,

    /// A required column is absent from the header.
    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    /// Structural CSV error (ragged row, bad quoting, ...).
    #[error("Invalid CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        CsvError::Malformed {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Computation Errors
// =============================================================================

/// An invariant of the derived tables was violated.
///
/// The transformation is total over a well-formed [`crate::models::RawTable`],
/// so this only surfaces programming mistakes.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Output row count does not match the filtered input.
    #[error("{table}: expected {expected} rows, produced {actual}")]
    RowCount {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Ranks in a region are not the contiguous sequence 1..k.
    #[error("Rank '{column}' is not contiguous for region '{region}'")]
    RankGap { column: &'static str, region: String },

    /// A delta was set on a region's first row, or missing elsewhere.
    #[error("Delta '{column}' nullness mismatch for region '{region}' on {date}")]
    DeltaNullness {
        column: &'static str,
        region: String,
        date: chrono::NaiveDate,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error of a fetch + transform cycle.
///
/// Any variant aborts the whole cycle: there is no partial-data fallback.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Dataset could not be retrieved.
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// Dataset could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] CsvError),

    /// Derived tables failed their consistency checks.
    #[error("Computation error: {0}")]
    Computation(#[from] TransformError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket bind / serve failure.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::MissingColumn("deces".into());
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().starts_with("Parse error"));
        assert!(pipeline_err.to_string().contains("deces"));

        let fetch_err = FetchError::Status {
            url: "http://example.test/data.csv".into(),
            status: 404,
        };
        let pipeline_err: PipelineError = fetch_err.into();
        assert!(pipeline_err.to_string().starts_with("Network error"));
        assert!(pipeline_err.to_string().contains("404"));
    }

    #[test]
    fn test_rank_gap_format() {
        let err = TransformError::RankGap {
            column: "days_after_5_deaths",
            region: "Grand Est".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("days_after_5_deaths"));
        assert!(msg.contains("Grand Est"));
    }
}

//! # covidviz - Covid-19 France dashboard data pipeline
//!
//! Downloads the opencovid19-fr consolidated dataset and reshapes it into the
//! two tables a dashboard needs: a national long-form series and a regional
//! series with day-over-day deltas, fatality rate and outbreak-relative day
//! indexes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV (HTTP) │────▶│   Loader    │────▶│  Transform  │────▶│    View     │
//! │ chiffres-   │     │ parse+cache │     │ national +  │     │ filter +    │
//! │ cles.csv    │     │   by URL    │     │  regional   │     │  charts     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use covidviz::{load_dashboard, DataLoader, DEFAULT_DATA_URL};
//!
//! #[tokio::main]
//! async fn main() {
//!     let loader = DataLoader::new();
//!     let data = load_dashboard(&loader, DEFAULT_DATA_URL).await.unwrap();
//!     println!("{} regions", data.regions.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Raw and derived row types
//! - [`parser`] - CSV parsing with encoding/delimiter detection
//! - [`cache`] - URL-keyed table cache
//! - [`loader`] - HTTP source and memoizing loader
//! - [`transform`] - National and regional tables
//! - [`view`] - Region filter, chart datasets, annotations
//! - [`config`] - Environment settings
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod cache;
pub mod loader;
pub mod parser;

// Transformation
pub mod transform;

// Presentation data
pub mod view;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CsvError, FetchError, PipelineError, ServerError, TransformError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Metric,
    NationalSeriesRow,
    RawRecord,
    RawTable,
    RegionalSeriesRow,
    SkippedRow,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{load_file, CsvSource, DataLoader, HttpSource, DEFAULT_DATA_URL};
pub use parser::{decode_content, detect_delimiter, detect_encoding, parse_bytes_auto};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::pipeline::{
    build_dashboard,
    load_dashboard,
    load_dashboard_file,
    transform,
    DashboardData,
    SourceInfo,
};

// =============================================================================
// Re-exports - View
// =============================================================================

pub use view::{annotations, charts, distinct_regions, filter_regions, Chart, ChartMode, Scale};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Settings;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}

//! Dataset loader: download, parse, and memoize by URL.
//!
//! ```rust,ignore
//! use covidviz::{DataLoader, DEFAULT_DATA_URL};
//!
//! let loader = DataLoader::new();
//! let table = loader.fetch(DEFAULT_DATA_URL).await?;   // network
//! let again = loader.fetch(DEFAULT_DATA_URL).await?;   // cache
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::logs::{log_info, log_success, log_warning, Stage};
use crate::cache::TableCache;
use crate::error::{FetchError, FetchResult, PipelineResult};
use crate::models::RawTable;
use crate::parser::parse_bytes_auto;

/// Where the opencovid19-fr project publishes its consolidated figures.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/opencovid19-fr/data/master/dist/chiffres-cles.csv";

/// Something that can return the raw bytes behind a URL.
pub trait CsvSource: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = FetchResult<Vec<u8>>> + Send;
}

/// HTTP source backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl CsvSource for HttpSource {
    fn get(&self, url: &str) -> impl Future<Output = FetchResult<Vec<u8>>> + Send {
        let request = self.client.get(url);
        let url = url.to_string();

        async move {
            let response = request.send().await.map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await.map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

            Ok(body.to_vec())
        }
    }
}

/// Fetches and parses datasets, keeping every successful result for the
/// lifetime of the loader.
///
/// The cache lock is held across the download, so concurrent requests for
/// the same URL result in a single network round-trip. Failures are not
/// cached; the next call retries.
pub struct DataLoader<S = HttpSource> {
    source: S,
    cache: Mutex<TableCache>,
}

impl DataLoader<HttpSource> {
    pub fn new() -> Self {
        Self::with_source(HttpSource::new())
    }
}

impl Default for DataLoader<HttpSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CsvSource> DataLoader<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            cache: Mutex::new(TableCache::new()),
        }
    }

    /// Return the parsed table behind `url`, downloading it on first use.
    pub async fn fetch(&self, url: &str) -> PipelineResult<Arc<RawTable>> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.get(url) {
            log_info(
                Stage::Fetch,
                format!(
                    "Cache hit for {} ({} rows, fetched {}, hit {} times)",
                    url,
                    entry.table.len(),
                    entry.fetched_at.to_rfc3339(),
                    entry.hits
                ),
            );
            return Ok(Arc::clone(&entry.table));
        }

        log_info(Stage::Fetch, format!("GET {}", url));
        let bytes = self.source.get(url).await?;
        log_success(Stage::Fetch, format!("Downloaded {} bytes", bytes.len()));

        let table = parse_bytes_auto(&bytes)?;
        report_parse(&table);

        Ok(cache.insert(url, table))
    }

    /// URLs currently held in the cache
    pub async fn cached_urls(&self) -> Vec<String> {
        self.cache.lock().await.urls()
    }

    /// Forget one URL so the next fetch downloads it again
    pub async fn invalidate(&self, url: &str) -> bool {
        self.cache.lock().await.invalidate(url)
    }

    /// Forget every URL
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }
}

/// Parse a local CSV file. Not cached.
pub async fn load_file(path: &Path) -> PipelineResult<RawTable> {
    log_info(Stage::Fetch, format!("Reading {}", path.display()));
    let bytes = tokio::fs::read(path).await.map_err(FetchError::from)?;

    let table = parse_bytes_auto(&bytes)?;
    report_parse(&table);
    Ok(table)
}

fn report_parse(table: &RawTable) {
    log_success(
        Stage::Parse,
        format!(
            "Read {} rows ({}, delimiter '{}', {} columns)",
            table.len(),
            table.encoding,
            table.delimiter,
            table.headers.len()
        ),
    );

    if !table.skipped.is_empty() {
        log_warning(Stage::Parse, format!("{} rows skipped", table.skipped.len()));
        for skip in table.skipped.iter().take(3) {
            log_warning(Stage::Parse, format!("• line {}: {}", skip.line, skip.reason));
        }
    }
}

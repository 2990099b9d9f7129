//! Runtime settings from the environment (and `.env`).
//!
//! | Variable            | Default                     |
//! |---------------------|-----------------------------|
//! | `COVIDVIZ_DATA_URL` | [`DEFAULT_DATA_URL`]        |
//! | `COVIDVIZ_PORT`     | `3000`                      |
//!
//! Command-line flags take precedence over both.

use std::env;

use crate::loader::DEFAULT_DATA_URL;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// CSV source URL
    pub data_url: String,
    /// HTTP API port
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    ///
    /// Blank values and unparsable ports fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            data_url: value("COVIDVIZ_DATA_URL").unwrap_or(defaults.data_url),
            port: value("COVIDVIZ_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, data_url: Option<String>, port: Option<u16>) -> Self {
        if let Some(url) = data_url {
            self.data_url = url;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

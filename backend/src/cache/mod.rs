//! Table Cache - memoize parsed datasets by source URL
//!
//! Parsed tables live for the lifetime of the process. There is no expiry:
//! a long-running process serves the first successful download until the
//! entry is invalidated or the process restarts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::RawTable;

/// A cached table with fetch metadata
#[derive(Debug, Clone)]
pub struct CachedTable {
    /// Parsed table, shared with every caller
    pub table: Arc<RawTable>,
    /// When the table was downloaded
    pub fetched_at: DateTime<Utc>,
    /// Number of times served from cache
    pub hits: u32,
}

/// URL -> parsed table map
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<String, CachedTable>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry, counting the hit
    pub fn get(&mut self, url: &str) -> Option<&CachedTable> {
        let entry = self.entries.get_mut(url)?;
        entry.hits += 1;
        Some(entry)
    }

    /// Store a freshly parsed table, replacing any previous entry
    pub fn insert(&mut self, url: &str, table: RawTable) -> Arc<RawTable> {
        let table = Arc::new(table);
        self.entries.insert(
            url.to_string(),
            CachedTable {
                table: Arc::clone(&table),
                fetched_at: Utc::now(),
                hits: 0,
            },
        );
        table
    }

    /// Cached URLs, sorted
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.entries.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Drop one entry. Returns whether it existed.
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get_shares_table() {
        let mut cache = TableCache::new();
        let inserted = cache.insert("http://a.test/data.csv", RawTable::default());

        let before = Utc::now();
        cache.get("http://a.test/data.csv").unwrap();
        let got = cache.get("http://a.test/data.csv").unwrap();
        assert!(Arc::ptr_eq(&inserted, &got.table));
        assert_eq!(got.hits, 2);
        assert!(got.fetched_at <= before);
    }

    #[test]
    fn test_miss() {
        let mut cache = TableCache::new();
        assert!(cache.get("http://a.test/data.csv").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = TableCache::new();
        cache.insert("http://b.test/x.csv", RawTable::default());
        cache.insert("http://a.test/x.csv", RawTable::default());
        assert_eq!(cache.urls(), vec!["http://a.test/x.csv", "http://b.test/x.csv"]);

        assert!(cache.invalidate("http://a.test/x.csv"));
        assert!(!cache.invalidate("http://a.test/x.csv"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}

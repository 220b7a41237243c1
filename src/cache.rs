use std::time::Duration;

use moka::sync::Cache;
use once_cell::sync::Lazy;

use crate::{
    config::SETTINGS,
    extractor::{ExtractionResult, ExtractionStatus},
};

/// Short-lived cache of finished extractions, keyed by stock symbol.
///
/// Only complete results are remembered; a partial one would pin incomplete
/// figures for the whole TTL while a retry might well succeed.
pub static TTL: Lazy<ExtractionCache> = Lazy::new(Default::default);

pub struct ExtractionCache {
    results: Cache<String, ExtractionResult>,
}

impl ExtractionCache {
    pub fn new() -> Self {
        ExtractionCache {
            results: Cache::builder()
                .max_capacity(64)
                .time_to_live(Duration::from_secs(SETTINGS.cache.ttl_seconds))
                .build(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<ExtractionResult> {
        self.results.get(symbol)
    }

    /// Stores the result when it is complete; partial results are dropped.
    pub fn remember(&self, symbol: &str, result: &ExtractionResult) {
        if result.status == ExtractionStatus::Complete {
            self.results.insert(symbol.to_string(), result.clone());
        }
    }
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new()
    }
}

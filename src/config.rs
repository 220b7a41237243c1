use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

const CRAWLER_BASE_URL: &str = "CRAWLER_BASE_URL";
const EXTRACTOR_POLL_INTERVAL_MS: &str = "EXTRACTOR_POLL_INTERVAL_MS";
const EXTRACTOR_EXPAND_TIMEOUT_MS: &str = "EXTRACTOR_EXPAND_TIMEOUT_MS";
const CACHE_TTL_SECONDS: &str = "CACHE_TTL_SECONDS";

pub static SETTINGS: Lazy<App> = Lazy::new(App::new);

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub crawler: Crawler,
    #[serde(default)]
    pub extractor: Extractor,
    #[serde(default)]
    pub cache: Cache,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Crawler {
    /// Host of the fundamentals-data site the company pages are fetched from.
    #[serde(default = "Crawler::default_base_url")]
    pub base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Extractor {
    /// Interval between hidden-row polls, in milliseconds.
    #[serde(default = "Extractor::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Total time budget for the expansion wait, in milliseconds.
    #[serde(default = "Extractor::default_expand_timeout_ms")]
    pub expand_timeout_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Cache {
    /// How long the most recent complete extraction stays cached, in seconds.
    #[serde(default = "Cache::default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Crawler {
    fn default_base_url() -> String {
        "https://www.screener.in".to_string()
    }
}

impl Extractor {
    fn default_poll_interval_ms() -> u64 {
        crate::declare::POLL_INTERVAL.as_millis() as u64
    }

    fn default_expand_timeout_ms() -> u64 {
        crate::declare::EXPAND_TIMEOUT.as_millis() as u64
    }
}

impl Cache {
    fn default_ttl_seconds() -> u64 {
        300
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Crawler {
            base_url: Self::default_base_url(),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            poll_interval_ms: Self::default_poll_interval_ms(),
            expand_timeout_ms: Self::default_expand_timeout_ms(),
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            ttl_seconds: Self::default_ttl_seconds(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        App {
            crawler: Default::default(),
            extractor: Default::default(),
            cache: Default::default(),
        }
    }
}

impl App {
    pub fn new() -> Self {
        App::get().unwrap_or_default()
    }

    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// Environment variables win over values from `app.json`.
    fn override_with_env(mut self) -> Self {
        if let Ok(base_url) = env::var(CRAWLER_BASE_URL) {
            self.crawler.base_url = base_url;
        }

        if let Ok(interval) = env::var(EXTRACTOR_POLL_INTERVAL_MS) {
            if let Ok(ms) = u64::from_str(&interval) {
                self.extractor.poll_interval_ms = ms;
            }
        }

        if let Ok(timeout) = env::var(EXTRACTOR_EXPAND_TIMEOUT_MS) {
            if let Ok(ms) = u64::from_str(&timeout) {
                self.extractor.expand_timeout_ms = ms;
            }
        }

        if let Ok(ttl) = env::var(CACHE_TTL_SECONDS) {
            if let Ok(seconds) = u64::from_str(&ttl) {
                self.cache.ttl_seconds = seconds;
            }
        }

        self
    }
}

fn config_path() -> PathBuf {
    let mut path = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    path.push(CONFIG_PATH);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let app = App::default();
        assert_eq!(app.extractor.poll_interval_ms, 500);
        assert_eq!(app.extractor.expand_timeout_ms, 5000);
        assert!(app.crawler.base_url.starts_with("https://"));
    }

    #[test]
    fn test_override_with_env() {
        env::set_var(EXTRACTOR_EXPAND_TIMEOUT_MS, "1234");
        let app = App::default().override_with_env();
        assert_eq!(app.extractor.expand_timeout_ms, 1234);
        env::remove_var(EXTRACTOR_EXPAND_TIMEOUT_MS);
    }
}

//! Runtime configuration.
//!
//! Defaults are compiled in and can be overridden by an optional
//! `chalupy-scout.toml` next to the binary and by `CHALUPY_` environment
//! variables (nested keys separated by `__`, e.g.
//! `CHALUPY_RETRY_DELAY__MAX_MS=5000`).

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const CONFIG_FILE: &str = "chalupy-scout.toml";
pub const ENV_PREFIX: &str = "CHALUPY_";

/// Inclusive range a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Draw a uniformly jittered delay from the range.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Root of the listing site; its host is the only one we ever contact.
    pub base_url: String,
    /// Hard limit for a single HTTP attempt.
    pub request_timeout_secs: u64,
    /// Additional attempts after the first one fails.
    pub max_retries: u32,
    /// Pause before the first request of every operation.
    pub politeness_delay: DelayRange,
    /// Pause before each retry attempt.
    pub retry_delay: DelayRange,
    /// Lifetime of the region and feature catalog caches.
    pub catalog_ttl_secs: u64,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.e-chalupy.cz".to_string(),
            request_timeout_secs: 30,
            max_retries: 2,
            politeness_delay: DelayRange::new(500, 1500),
            retry_delay: DelayRange::new(1000, 3000),
            catalog_ttl_secs: 3600,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from defaults, the optional TOML file and the environment.
    pub fn load() -> Result<Self> {
        let config: ScoutConfig = Self::figment()
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(ScoutConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject settings the scraper cannot run with.
    pub fn validate(&self) -> Result<()> {
        let base = self.base()?;
        if base.scheme() != "https" {
            bail!("base_url must use https, got '{}'", base.scheme());
        }
        if base.host_str().is_none() {
            bail!("base_url must include a host");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        for (name, range) in [
            ("politeness_delay", self.politeness_delay),
            ("retry_delay", self.retry_delay),
        ] {
            if range.min_ms > range.max_ms {
                bail!("{name}: min_ms ({}) exceeds max_ms ({})", range.min_ms, range.max_ms);
            }
        }
        Ok(())
    }

    /// Parsed form of `base_url`.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("Invalid base_url '{}'", self.base_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn catalog_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.catalog_ttl_secs as i64)
    }
}

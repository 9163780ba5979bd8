use std::{net::IpAddr, sync::Arc, time::Duration};

use chrono_tz::Tz;
use tokio::fs;
use uci_meal_api::{
    fetch::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT},
    time::CAMPUS_TZ,
    cache::DEFAULT_MEMORY_CAPACITY,
    ApiSource, CampusClock, MenuSource, ScrapeSource, Upstream,
};

pub async fn read() -> anyhow::Result<Config> {
    let config_path = "uci_web_api.toml";

    let canon = tokio::fs::canonicalize(".").await?;
    tracing::info!("try reading config file {config_path} at {canon:?}");

    let config = if fs::try_exists(config_path).await? {
        tracing::info!("found config");

        let config = fs::read_to_string(config_path).await?;
        let config = toml::from_str(&config)?;
        tracing::info!("read config");
        config
    } else {
        tracing::info!("config does not exist, using default config");
        Config::default()
    };

    tracing::info!("using config: {config:#?}");
    Ok(config)
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub db: Option<DbConfig>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub prefetch: PrefetchConfig,
}

#[derive(Debug, serde::Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub database: String,
    #[serde(default = "DbConfig::default_collection")]
    pub collection: String,
}

impl DbConfig {
    fn default_collection() -> String { format!("menus") }
}

#[derive(Debug, serde::Deserialize)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        #[cfg(not(debug_assertions))]
        tracing::warn!("using default server config in release");

        ServerConfig {
            address: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default] Api,
    Scrape,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub strategy: Strategy,
    pub base_url: String,
    pub timeout_secs: u64,
    /// IANA name, e.g. `America/Los_Angeles`
    pub timezone: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            timezone: CAMPUS_TZ.name().into(),
        }
    }
}

impl UpstreamConfig {
    pub fn clock(&self) -> anyhow::Result<CampusClock> {
        let tz: Tz = self.timezone.parse()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {e}", self.timezone))?;
        Ok(CampusClock::new(tz))
    }

    pub fn source(&self, clock: &CampusClock) -> anyhow::Result<Arc<dyn MenuSource>> {
        let upstream = Upstream::new(&self.base_url, Duration::from_secs(self.timeout_secs))?;
        tracing::info!("reading menus from {} using {:?} strategy", upstream.base_url(), self.strategy);

        Ok(match self.strategy {
            Strategy::Api => Arc::new(ApiSource::new(upstream, clock.clone())),
            Strategy::Scrape => Arc::new(ScrapeSource::new(upstream)),
        })
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// documents kept in memory in front of the db
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    pub enabled: bool,
    pub days: u64,
    /// cron expression
    pub schedule: String,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            days: 7,
            // every night at 00:01
            schedule: format!("0 1 0 1/1 * ? *"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = toml::from_str(r#"
            [server]
            address = "127.0.0.1"
            port = 8080

            [db]
            url = "mongodb://db:27017"
            database = "meals"

            [upstream]
            strategy = "scrape"
            timeout_secs = 5
        "#).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.db.as_ref().unwrap().collection, "menus");
        assert_eq!(config.upstream.strategy, Strategy::Scrape);
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.timezone, "America/Los_Angeles");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.memory_capacity, DEFAULT_MEMORY_CAPACITY);
        assert_eq!(config.prefetch.days, 7);
    }

    #[test]
    fn cache_capacity_is_configurable() {
        let config: Config = toml::from_str("[cache]\nmemory_capacity = 64").unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.memory_capacity, 64);
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.db.is_none());
        assert_eq!(config.upstream.strategy, Strategy::Api);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn upstream_section_builds_clock_and_source() {
        let config: Config = toml::from_str(r#"
            [upstream]
            strategy = "scrape"
            base_url = "http://localhost:8081/"
            timezone = "America/New_York"
        "#).unwrap();

        let clock = config.upstream.clock().unwrap();
        assert_eq!(clock.timezone(), chrono_tz::America::New_York);
        assert!(config.upstream.source(&clock).is_ok());
    }

    #[test]
    fn timezone_is_validated() {
        let mut upstream = UpstreamConfig::default();
        assert_eq!(upstream.clock().unwrap().timezone(), CAMPUS_TZ);
        upstream.timezone = "Mars/Olympus_Mons".into();
        assert!(upstream.clock().is_err());
    }
}

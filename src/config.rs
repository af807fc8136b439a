use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::browser::LaunchOptions;
use crate::error::{AppError, Result};
use crate::normalize::search_engine_host;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub webdriver_url: String,
    pub log_level: tracing::Level,
    pub request_timeout: Duration,
    pub tracker: TrackerConfig,
}

/// Knobs for a single rank-tracking run.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    /// Pause between consecutive keywords of one batch.
    pub keyword_delay: Duration,
    /// Minimum spacing between navigations to one host across all batches.
    pub host_interval: Duration,
    pub user_agent: String,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Number of eligible results scanned per keyword.
    pub result_window: usize,
    pub default_search_host: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            navigation_timeout: Duration::from_secs(30),
            selector_timeout: Duration::from_secs(10),
            keyword_delay: Duration::from_secs(2),
            host_interval: Duration::from_secs(2),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            window_size: (1920, 1080),
            result_window: 100,
            default_search_host: "google.com".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            user_agent: self.user_agent.clone(),
            headless: self.headless,
            window_size: self.window_size,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TrackerConfig::default();

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let server_addr = SocketAddr::new(ip, port);

        let webdriver_url =
            lookup("WEBDRIVER_URL").unwrap_or_else(|| "http://localhost:9515".to_string());

        let log_level = match lookup("LOG_LEVEL") {
            Some(level) => tracing::Level::from_str(&level)
                .map_err(|e| AppError::ConfigError(format!("Invalid log level: {}", e)))?,
            None => tracing::Level::INFO,
        };

        let request_timeout = Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 600)?);

        let raw_search_host =
            lookup("DEFAULT_SEARCH_HOST").unwrap_or(defaults.default_search_host);
        let default_search_host = search_engine_host(&raw_search_host).ok_or_else(|| {
            AppError::ConfigError(format!(
                "Invalid DEFAULT_SEARCH_HOST: {:?} is not a search engine host",
                raw_search_host
            ))
        })?;

        let tracker = TrackerConfig {
            navigation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "NAVIGATION_TIMEOUT_SECS",
                defaults.navigation_timeout.as_secs(),
            )?),
            selector_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SELECTOR_TIMEOUT_SECS",
                defaults.selector_timeout.as_secs(),
            )?),
            keyword_delay: Duration::from_millis(parse_or(
                &lookup,
                "KEYWORD_DELAY_MS",
                defaults.keyword_delay.as_millis() as u64,
            )?),
            host_interval: Duration::from_millis(parse_or(
                &lookup,
                "HOST_INTERVAL_MS",
                defaults.host_interval.as_millis() as u64,
            )?),
            user_agent: lookup("USER_AGENT").unwrap_or(defaults.user_agent),
            headless: parse_or(&lookup, "HEADLESS", defaults.headless)?,
            window_size: defaults.window_size,
            result_window: defaults.result_window,
            default_search_host,
        };

        Ok(Config {
            server_addr,
            webdriver_url,
            log_level,
            request_timeout,
            tracker,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

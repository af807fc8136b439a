use std::time::Duration;

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Scraping unavailable for {domain} ({keyword_count} keywords): {source}")]
    ScrapeUnavailable {
        domain: String,
        keyword_count: usize,
        #[source]
        source: BrowserError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ScrapeUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failures reported by the browser automation layer.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {after:?}")]
    NavigationTimeout { url: String, after: Duration },

    #[error("selector {selector:?} did not appear within {after:?}")]
    SelectorTimeout { selector: String, after: Duration },

    #[error("browser session already released")]
    Released,

    #[error("webdriver error: {0}")]
    WebDriver(String),
}

impl From<thirtyfour::error::WebDriverError> for BrowserError {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        BrowserError::WebDriver(err.to_string())
    }
}

/// A single keyword lookup that failed. Recovered inside the tracking loop.
#[derive(Debug, thiserror::Error)]
#[error("lookup for keyword {keyword:?} failed: {source}")]
pub struct KeywordLookupError {
    pub keyword: String,
    #[source]
    pub source: BrowserError,
}

pub type Result<T> = std::result::Result<T, AppError>;

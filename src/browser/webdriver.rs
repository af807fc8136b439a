use std::time::Duration;

use thirtyfour::ChromeCapabilities;
use thirtyfour::prelude::*;

use super::{BrowserLauncher, BrowserSession, LaunchOptions};
use crate::error::BrowserError;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Starts Chrome sessions through a chromedriver-compatible WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    server_url: String,
}

impl WebDriverLauncher {
    pub fn new(server_url: impl Into<String>) -> Self {
        WebDriverLauncher {
            server_url: server_url.into(),
        }
    }

    fn capabilities(options: &LaunchOptions) -> WebDriverResult<ChromeCapabilities> {
        let mut caps = DesiredCapabilities::chrome();
        if options.headless {
            caps.set_headless()?;
        }
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.add_chrome_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_chrome_arg(&format!(
            "--window-size={},{}",
            options.window_size.0, options.window_size.1
        ))?;
        caps.add_chrome_arg(&format!("--user-agent={}", options.user_agent))?;
        caps.add_chrome_arg("--disable-infobars")?;
        caps.add_chrome_option("excludeSwitches", ["enable-automation"])?;
        Ok(caps)
    }
}

impl BrowserLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self, options: &LaunchOptions) -> Result<WebDriverSession, BrowserError> {
        let caps =
            Self::capabilities(options).map_err(|e| BrowserError::Launch(e.to_string()))?;
        let driver = WebDriver::new(&self.server_url, caps)
            .await
            .map_err(|e| BrowserError::Launch(format!("{}: {}", self.server_url, e)))?;
        tracing::info!(server = %self.server_url, "browser session started");
        Ok(WebDriverSession { driver })
    }
}

pub struct WebDriverSession {
    driver: WebDriver,
}

impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        match tokio::time::timeout(timeout, self.driver.goto(url)).await {
            Ok(result) => result.map_err(BrowserError::from),
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                after: timeout,
            }),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, SELECTOR_POLL_INTERVAL)
            .first()
            .await
            .map(|_| ())
            .map_err(|e| selector_wait_error(selector, timeout, e))
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.driver.source().await?)
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.driver.quit().await?;
        Ok(())
    }
}

/// Element polling that ran out of time surfaces as `NoSuchElement` (or a
/// W3C `timeout`). Anything else means the session itself is in trouble.
fn selector_wait_error(selector: &str, timeout: Duration, err: WebDriverError) -> BrowserError {
    match err {
        WebDriverError::NoSuchElement(_) | WebDriverError::Timeout(_) => {
            tracing::debug!("waiting for {selector:?} failed: {err}");
            BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                after: timeout,
            }
        }
        other => BrowserError::from(other),
    }
}

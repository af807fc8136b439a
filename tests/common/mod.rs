#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rank_probe::browser::{BrowserLauncher, BrowserSession, LaunchOptions};
use rank_probe::config::TrackerConfig;
use rank_probe::error::BrowserError;
use rank_probe::scraper::build_search_url;

/// What the fake browser does when a given URL is opened.
#[derive(Clone)]
pub enum FakePage {
    Results(String),
    NavigationTimeout,
    SelectorTimeout,
}

#[derive(Default)]
pub struct BrowserLog {
    pub launches: usize,
    pub user_agents: Vec<String>,
    pub visited: Vec<String>,
    pub closed: usize,
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    pages: Arc<HashMap<String, FakePage>>,
    fail_launch: bool,
    pub log: Arc<Mutex<BrowserLog>>,
}

impl FakeLauncher {
    pub fn new(pages: HashMap<String, FakePage>) -> Self {
        FakeLauncher {
            pages: Arc::new(pages),
            fail_launch: false,
            log: Arc::default(),
        }
    }

    pub fn unavailable() -> Self {
        FakeLauncher {
            fail_launch: true,
            ..FakeLauncher::default()
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.log.lock().unwrap().visited.clone()
    }

    pub fn launches(&self) -> usize {
        self.log.lock().unwrap().launches
    }

    pub fn closed(&self) -> usize {
        self.log.lock().unwrap().closed
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.log.lock().unwrap().user_agents.clone()
    }
}

impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, options: &LaunchOptions) -> Result<FakeSession, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no browser engine available".into()));
        }
        {
            let mut log = self.log.lock().unwrap();
            log.launches += 1;
            log.user_agents.push(options.user_agent.clone());
        }
        Ok(FakeSession {
            pages: self.pages.clone(),
            log: self.log.clone(),
            current: None,
        })
    }
}

pub struct FakeSession {
    pages: Arc<HashMap<String, FakePage>>,
    log: Arc<Mutex<BrowserLog>>,
    current: Option<FakePage>,
}

impl BrowserSession for FakeSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.log.lock().unwrap().visited.push(url.to_string());
        let page = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| FakePage::Results(results_page(&[])));
        if let FakePage::NavigationTimeout = page {
            return Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                after: timeout,
            });
        }
        self.current = Some(page);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        match &self.current {
            Some(FakePage::Results(_)) => Ok(()),
            _ => Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                after: timeout,
            }),
        }
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        match &self.current {
            Some(FakePage::Results(html)) => Ok(html.clone()),
            _ => Err(BrowserError::WebDriver("no document loaded".into())),
        }
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// A results page with the given links in document order.
pub fn results_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<div class="g"><a href="{href}"><h3>Result {i}</h3></a></div>"#))
        .collect();
    format!(r#"<html><body><div id="search">{anchors}</div></body></html>"#)
}

pub fn search_url(keyword: &str) -> String {
    build_search_url("google.com", keyword, 100)
}

pub fn fast_config() -> TrackerConfig {
    TrackerConfig {
        keyword_delay: Duration::ZERO,
        host_interval: Duration::ZERO,
        user_agent: "FakeAgent/1.0".to_string(),
        ..TrackerConfig::default()
    }
}

pub fn keywords(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::browser::{BrowserLauncher, BrowserSession, SessionGuard};
use crate::config::TrackerConfig;
use crate::error::{AppError, KeywordLookupError, Result};
use crate::normalize::{normalize_domain, normalize_host, search_engine_host};
use crate::pacer::HostPacer;
use crate::scraper::{RESULTS_CONTAINER, build_search_url, extract_entries, find_rank};

pub const MAX_KEYWORDS: usize = 10;

/// Rank reported when the domain was not found or the lookup did not complete.
pub const NOT_RANKED: i32 = -1;

/// A validated request to rank one domain for a batch of keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankQuery {
    pub domain: String,
    pub keywords: Vec<String>,
    pub search_engine_host: String,
}

impl RankQuery {
    /// Validate and trim the raw request values.
    ///
    /// A blank `location` falls back to `default_host`. The location must be
    /// a Google search domain such as `google.co.uk`.
    pub fn new(
        domain: &str,
        keywords: &[String],
        location: Option<&str>,
        default_host: &str,
    ) -> Result<Self> {
        let domain = domain.trim();
        if domain.is_empty() || normalize_domain(domain).is_empty() {
            return Err(AppError::InvalidInput("domain is required".to_string()));
        }
        if keywords.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one keyword is required".to_string(),
            ));
        }
        if keywords.len() > MAX_KEYWORDS {
            return Err(AppError::InvalidInput(format!(
                "at most {} keywords are allowed, got {}",
                MAX_KEYWORDS,
                keywords.len()
            )));
        }

        let keywords: Vec<String> = keywords.iter().map(|k| k.trim().to_string()).collect();
        if let Some(index) = keywords.iter().position(|k| k.is_empty()) {
            return Err(AppError::InvalidInput(format!(
                "keyword at index {} is empty",
                index
            )));
        }

        let location = location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(default_host);
        let search_engine_host = search_engine_host(location).ok_or_else(|| {
            AppError::InvalidInput(format!("unsupported search engine location {:?}", location))
        })?;

        Ok(RankQuery {
            domain: domain.to_string(),
            keywords,
            search_engine_host,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStatus {
    Found,
    NotFound,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankResult {
    pub keyword: String,
    /// 1-based position, or [`NOT_RANKED`].
    pub rank: i32,
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
    pub status: RankStatus,
}

impl RankResult {
    fn new(keyword: &str, rank: i32, status: RankStatus) -> Self {
        RankResult {
            keyword: keyword.to_string(),
            rank,
            observed_at: Utc::now(),
            status,
        }
    }

    fn from_lookup(keyword: &str, rank: Option<u32>) -> Self {
        match rank {
            Some(position) => RankResult::new(keyword, position as i32, RankStatus::Found),
            None => RankResult::new(keyword, NOT_RANKED, RankStatus::NotFound),
        }
    }

    fn failed(keyword: &str) -> Self {
        RankResult::new(keyword, NOT_RANKED, RankStatus::Failed)
    }

    fn cancelled(keyword: &str) -> Self {
        RankResult::new(keyword, NOT_RANKED, RankStatus::Cancelled)
    }
}

/// Looks up where a domain ranks on a search engine for a set of keywords.
///
/// Each call to [`RankTracker::track_keywords`] gets its own browser session,
/// processes the keywords sequentially and closes the session on every exit
/// path. Navigations to the same host are additionally spaced through a
/// [`HostPacer`] that can be shared between trackers.
pub struct RankTracker<L: BrowserLauncher> {
    launcher: L,
    config: TrackerConfig,
    pacer: Arc<HostPacer>,
}

impl<L: BrowserLauncher> RankTracker<L> {
    pub fn new(launcher: L, config: TrackerConfig) -> Self {
        let pacer = Arc::new(HostPacer::new(config.host_interval));
        RankTracker {
            launcher,
            config,
            pacer,
        }
    }

    pub fn with_pacer(mut self, pacer: Arc<HostPacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub async fn track_keywords(&self, query: &RankQuery) -> Result<Vec<RankResult>> {
        self.track_keywords_until(query, &CancellationToken::new())
            .await
    }

    /// Like [`RankTracker::track_keywords`], but stops issuing navigations
    /// once `cancel` fires. Keywords that were not looked up are reported as
    /// [`RankStatus::Cancelled`].
    pub async fn track_keywords_until(
        &self,
        query: &RankQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<RankResult>> {
        let target = normalize_domain(&query.domain);
        let host = normalize_host(&query.search_engine_host);
        tracing::info!(
            domain = %target,
            host = %host,
            keywords = query.keywords.len(),
            "tracking keyword ranks"
        );

        let session = self
            .launcher
            .launch(&self.config.launch_options())
            .await
            .map_err(|source| {
                tracing::error!(domain = %query.domain, "browser launch failed: {source}");
                AppError::ScrapeUnavailable {
                    domain: query.domain.clone(),
                    keyword_count: query.keywords.len(),
                    source,
                }
            })?;
        let mut guard = SessionGuard::new(session);

        let mut results = Vec::with_capacity(query.keywords.len());
        for (index, keyword) in query.keywords.iter().enumerate() {
            if cancel.is_cancelled() {
                results.push(RankResult::cancelled(keyword));
                continue;
            }

            tokio::select! {
                _ = self.pacer.wait_turn(&host) => {}
                _ = cancel.cancelled() => {}
            }
            if cancel.is_cancelled() {
                results.push(RankResult::cancelled(keyword));
                continue;
            }

            let result = match self.lookup(&mut guard, &host, &target, keyword).await {
                Ok(rank) => {
                    tracing::info!(keyword = %keyword, rank = ?rank, "keyword ranked");
                    RankResult::from_lookup(keyword, rank)
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    RankResult::failed(keyword)
                }
            };
            results.push(result);

            let is_last = index + 1 == query.keywords.len();
            if !is_last && !self.config.keyword_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.keyword_delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        guard.release().await;
        Ok(results)
    }

    async fn lookup(
        &self,
        guard: &mut SessionGuard<L::Session>,
        host: &str,
        target: &str,
        keyword: &str,
    ) -> std::result::Result<Option<u32>, KeywordLookupError> {
        let lookup_error = |source| KeywordLookupError {
            keyword: keyword.to_string(),
            source,
        };

        let url = build_search_url(host, keyword, self.config.result_window);
        let session = guard.session_mut().map_err(lookup_error)?;
        session
            .goto(&url, self.config.navigation_timeout)
            .await
            .map_err(lookup_error)?;
        session
            .wait_for_selector(RESULTS_CONTAINER, self.config.selector_timeout)
            .await
            .map_err(lookup_error)?;
        let html = session.page_source().await.map_err(lookup_error)?;

        let entries = extract_entries(&html, self.config.result_window);
        tracing::debug!(keyword, entries = entries.len(), "extracted organic results");
        Ok(find_rank(&entries, target))
    }
}

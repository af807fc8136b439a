pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pacer;
pub mod scraper;
pub mod tracker;

use std::sync::Arc;

use browser::BrowserLauncher;
use config::Config;
use tracker::RankTracker;

/// Application state that will be shared across handlers
pub struct AppState<L: BrowserLauncher> {
    pub config: Arc<Config>,
    pub tracker: Arc<RankTracker<L>>,
}

impl<L: BrowserLauncher> Clone for AppState<L> {
    fn clone(&self) -> Self {
        AppState {
            config: self.config.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

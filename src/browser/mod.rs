//! Browser automation seam.
//!
//! The tracker only needs a handful of capabilities from a browser: start a
//! session, navigate, wait for the results to render, and hand back the page
//! source. [`BrowserLauncher`] and [`BrowserSession`] describe exactly that,
//! so the ranking logic can run against an in-memory fake in tests and
//! against a real WebDriver server in production.

pub mod webdriver;

use std::future::Future;
use std::time::Duration;

use crate::error::BrowserError;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// Options applied when a session is started.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub user_agent: String,
    pub headless: bool,
    pub window_size: (u32, u32),
}

pub trait BrowserLauncher: Send + Sync + 'static {
    type Session: BrowserSession;

    fn launch(
        &self,
        options: &LaunchOptions,
    ) -> impl Future<Output = Result<Self::Session, BrowserError>> + Send;
}

/// A single browser session owning one page.
pub trait BrowserSession: Send + 'static {
    fn goto(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), BrowserError>> + Send;

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), BrowserError>> + Send;

    /// Snapshot of the rendered DOM as HTML.
    fn page_source(&mut self) -> impl Future<Output = Result<String, BrowserError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), BrowserError>> + Send;
}

/// Owns a session for the length of a batch and makes sure it gets closed.
///
/// Call [`SessionGuard::release`] on the normal path. If the guard is dropped
/// while still holding the session (a panic, or the owning future being
/// dropped), the close is spawned onto the current tokio runtime.
pub struct SessionGuard<S: BrowserSession> {
    session: Option<S>,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        SessionGuard {
            session: Some(session),
        }
    }

    pub fn session_mut(&mut self) -> Result<&mut S, BrowserError> {
        self.session.as_mut().ok_or(BrowserError::Released)
    }

    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            match session.close().await {
                Ok(()) => tracing::debug!("browser session closed"),
                Err(e) => tracing::warn!("error closing browser session: {e}"),
            }
        }
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        tracing::warn!("browser session dropped before release, closing in background");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        tracing::warn!("error closing abandoned browser session: {e}");
                    }
                });
            }
            Err(_) => tracing::error!("no tokio runtime available, browser session leaked"),
        }
    }
}

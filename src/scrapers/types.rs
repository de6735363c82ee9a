use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Selector matching one property card on the Booking.com results page
pub const DEFAULT_RESULT_SELECTOR: &str = "div[data-testid='property-card']";

/// Browser and timing settings for a fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// CSS selector identifying one result card
    pub result_selector: String,
    /// Ceiling for page navigation, from sending the request to the load event
    pub navigation_timeout_secs: u64,
    /// Ceiling for the first result card to appear
    pub marker_timeout_secs: u64,
    pub headless: bool,
    /// Chrome's sandbox does not start inside most containers
    pub sandbox: bool,
    /// Chrome binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,
}

impl FetchSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn marker_timeout(&self) -> Duration {
        Duration::from_secs(self.marker_timeout_secs)
    }

    /// Longest wait for any single DevTools reply. `Page.navigate` only
    /// returns once the server answers, so this caps a stalled request.
    /// The marker wait polls continuously and never idles this long.
    pub fn transport_timeout(&self) -> Duration {
        self.navigation_timeout()
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            result_selector: DEFAULT_RESULT_SELECTOR.to_string(),
            navigation_timeout_secs: 60,
            marker_timeout_secs: 60,
            headless: true,
            sandbox: false,
            chrome_path: None,
        }
    }
}

/// Why an area's listings could not be counted
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("results did not appear within {timeout:?}: {detail}")]
    MarkerTimeout { timeout: Duration, detail: String },

    #[error("failed to read page content: {0}")]
    Content(String),

    #[error("invalid result selector '{0}'")]
    InvalidSelector(String),

    #[error("fetch worker stopped unexpectedly: {0}")]
    Worker(String),
}

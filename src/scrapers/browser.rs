use crate::scrapers::traits::CountFetcher;
use crate::scrapers::types::{FetchError, FetchSettings};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Counts Booking.com result cards using a throwaway headless Chrome per call
pub struct BookingBrowserFetcher {
    settings: FetchSettings,
}

impl BookingBrowserFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CountFetcher for BookingBrowserFetcher {
    async fn fetch_count(&self, area_label: &str, search_url: &str) -> Result<usize, FetchError> {
        let settings = self.settings.clone();
        let url = search_url.to_string();

        // headless_chrome blocks, keep it off the runtime threads
        let result = tokio::task::spawn_blocking(move || fetch_blocking(&settings, &url))
            .await
            .map_err(|e| FetchError::Worker(e.to_string()))
            .and_then(|inner| inner);

        if let Ok(count) = &result {
            info!("{}: found {} property cards", area_label, count);
        }

        result
    }

    fn backend_name(&self) -> &'static str {
        "headless_chrome"
    }
}

/// Launch, navigate, wait for the first card, count. The browser process is
/// killed when `browser` drops, on every return path.
fn fetch_blocking(settings: &FetchSettings, url: &str) -> Result<usize, FetchError> {
    let selector = parse_selector(&settings.result_selector)?;

    debug!("Launching headless Chrome...");
    let options = LaunchOptions::default_builder()
        .headless(settings.headless)
        .sandbox(settings.sandbox)
        .path(settings.chrome_path.clone())
        .idle_browser_timeout(settings.transport_timeout())
        .build()
        .map_err(|e| FetchError::Launch(e.to_string()))?;

    let browser = Browser::new(options).map_err(|e| FetchError::Launch(format!("{:#}", e)))?;

    let tab = browser
        .new_tab()
        .map_err(|e| FetchError::Launch(format!("{:#}", e)))?;

    // One deadline covers both the request and the wait for the load event
    let deadline = Instant::now() + settings.navigation_timeout();

    debug!("Opening {}", url);
    tab.navigate_to(url)
        .map_err(|e| FetchError::Navigation(format!("{:#}", e)))?;

    let remaining = time_left(deadline, Instant::now()).ok_or_else(|| {
        FetchError::Navigation(format!(
            "no response within {:?}",
            settings.navigation_timeout()
        ))
    })?;
    tab.set_default_timeout(remaining);
    tab.wait_until_navigated()
        .map_err(|e| FetchError::Navigation(format!("{:#}", e)))?;

    // Cards are rendered client-side after load
    debug!("Waiting for '{}'", settings.result_selector);
    tab.wait_for_element_with_custom_timeout(&settings.result_selector, settings.marker_timeout())
        .map_err(|e| FetchError::MarkerTimeout {
            timeout: settings.marker_timeout(),
            detail: format!("{:#}", e),
        })?;

    let html = tab
        .get_content()
        .map_err(|e| FetchError::Content(format!("{:#}", e)))?;

    Ok(count_matches(&html, &selector))
}

/// Time left before `deadline`, or `None` once it has passed
fn time_left(deadline: Instant, now: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(now)
        .filter(|left| !left.is_zero())
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|_| FetchError::InvalidSelector(selector.to_string()))
}

fn count_matches(html: &str, selector: &Selector) -> usize {
    Html::parse_document(html).select(selector).count()
}

/// Count the elements in `html` matching the CSS `selector`
pub fn count_result_cards(html: &str, selector: &str) -> Result<usize, FetchError> {
    let selector = parse_selector(selector)?;
    Ok(count_matches(html, &selector))
}

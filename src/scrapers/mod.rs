pub mod browser;
pub mod traits;
pub mod types;

pub use browser::{count_result_cards, BookingBrowserFetcher};
pub use traits::CountFetcher;
pub use types::{FetchError, FetchSettings, DEFAULT_RESULT_SELECTOR};

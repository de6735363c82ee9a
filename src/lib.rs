pub mod cli;
pub mod config;
pub mod dates;
pub mod models;
pub mod orchestrator;
pub mod scrapers;
pub mod sinks;

pub use config::AppConfig;
pub use models::{AreaDefinition, OutputRow, ResultCount, FAILURE_SENTINEL};
pub use orchestrator::Orchestrator;
pub use scrapers::{BookingBrowserFetcher, CountFetcher, FetchError, FetchSettings};
pub use sinks::{CsvSink, GoogleSheetsSink, RowSink, SheetsAuth};

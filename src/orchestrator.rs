use crate::config::AppConfig;
use crate::dates::StayDates;
use crate::models::{OutputRow, ResultCount};
use crate::scrapers::CountFetcher;
use crate::sinks::RowSink;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{error, info};

/// Fetches every configured area in order and appends one row to the sink
pub struct Orchestrator {
    config: AppConfig,
    fetcher: Box<dyn CountFetcher>,
    sink: Box<dyn RowSink>,
}

impl Orchestrator {
    pub fn new(config: AppConfig, fetcher: Box<dyn CountFetcher>, sink: Box<dyn RowSink>) -> Self {
        Self {
            config,
            fetcher,
            sink,
        }
    }

    /// Fetch each area sequentially. A failed area becomes the failure
    /// sentinel in its column; it never aborts the row.
    pub async fn collect_row(&self, today: NaiveDate) -> Result<OutputRow> {
        let stay = StayDates::starting(today)?;
        let mut counts = Vec::with_capacity(self.config.areas.len());

        for area in &self.config.areas {
            let url = area.search_url(stay.check_in, stay.check_out);
            info!("➡️ Fetching {} ...", area.label);

            let count = match self.fetcher.fetch_count(&area.label, &url).await {
                Ok(n) => ResultCount::Listings(n),
                Err(e) => {
                    error!("❌ {} fetch failed: {}", area.label, e);
                    ResultCount::Error
                }
            };
            counts.push(count);
        }

        Ok(OutputRow::new(today, counts))
    }

    /// One full run: collect the row, then append it. Sink failures are returned.
    pub async fn run(&self, today: NaiveDate) -> Result<OutputRow> {
        info!(
            "🚀 Counting listings for {} areas via {}",
            self.config.areas.len(),
            self.fetcher.backend_name()
        );

        let row = self.collect_row(today).await?;

        self.sink
            .append_row(&row)
            .await
            .with_context(|| format!("Failed to append row to {}", self.sink.sink_name()))?;

        info!("✅ Row written to {}: {}", self.sink.sink_name(), row);
        Ok(row)
    }
}

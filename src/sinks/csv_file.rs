use crate::models::OutputRow;
use crate::sinks::traits::RowSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::debug;

/// Appends rows to a local headerless CSV file
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RowSink for CsvSink {
    async fn append_row(&self, row: &OutputRow) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer
            .write_record(row.to_strings())
            .context("Failed to write CSV record")?;
        writer.flush().context("Failed to flush CSV file")?;

        debug!("Appended row to {}", self.path.display());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "csv"
    }
}

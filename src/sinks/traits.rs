use crate::models::OutputRow;
use anyhow::Result;
use async_trait::async_trait;

/// Append-only destination for one row per run
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn append_row(&self, row: &OutputRow) -> Result<()>;

    fn sink_name(&self) -> &'static str;
}

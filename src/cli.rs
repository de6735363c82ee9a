//! Command-line arguments. Every option can also come from the environment,
//! which is how scheduled runs are usually configured.

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    /// Append to a Google Sheets spreadsheet
    Sheets,
    /// Append to a local CSV file
    Csv,
}

/// Count Booking.com listings per area and append the counts as one dated row.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file with areas and fetch settings; built-in areas are used when absent
    #[arg(short, long, env = "BOOKING_COUNTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where the row is appended
    #[arg(long, value_enum, env = "BOOKING_COUNTER_SINK", default_value = "sheets")]
    pub sink: SinkKind,

    /// Google service account key file
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT", default_value = "service_account.json")]
    pub credentials: PathBuf,

    /// Pre-issued OAuth access token; skips the service account exchange
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// File containing the target spreadsheet id
    #[arg(long, default_value = "spreadsheet_id")]
    pub spreadsheet_id_file: PathBuf,

    /// Spreadsheet id; takes precedence over --spreadsheet-id-file
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Sheet (tab) to append to; defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output file for the csv sink
    #[arg(long, default_value = "booking_counts.csv")]
    pub csv_path: PathBuf,

    /// Run as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset. Other crates still report warnings.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "booking_counter=debug,info"
        } else {
            "booking_counter=info,warn"
        }
    }
}

use anyhow::Result;
use booking_counter::cli::{Cli, SinkKind};
use booking_counter::sinks::sheets::read_spreadsheet_id;
use booking_counter::sinks::ServiceAccountKey;
use booking_counter::{
    dates, AppConfig, BookingBrowserFetcher, CsvSink, GoogleSheetsSink, Orchestrator, RowSink,
    SheetsAuth,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .init();

    info!("🏨 Booking Counter");

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => {
            let config = AppConfig::default();
            config.validate()?;
            config
        }
    };

    // Sink setup failures end the run before any page is fetched
    let sink = build_sink(&cli).await?;
    let fetcher = BookingBrowserFetcher::new(config.fetch.clone());
    let orchestrator = Orchestrator::new(config, Box::new(fetcher), sink);

    let today = cli.date.unwrap_or_else(dates::today);
    let row = orchestrator.run(today).await?;

    println!("{}", row);
    Ok(())
}

async fn build_sink(cli: &Cli) -> Result<Box<dyn RowSink>> {
    match cli.sink {
        SinkKind::Csv => {
            info!("Appending rows to {}", cli.csv_path.display());
            Ok(Box::new(CsvSink::new(&cli.csv_path)))
        }
        SinkKind::Sheets => {
            let auth = match &cli.access_token {
                Some(token) => SheetsAuth::AccessToken(token.clone()),
                None => SheetsAuth::ServiceAccount(ServiceAccountKey::from_file(&cli.credentials)?),
            };
            let spreadsheet_id = match &cli.spreadsheet_id {
                Some(id) => id.clone(),
                None => read_spreadsheet_id(&cli.spreadsheet_id_file)?,
            };

            let sink = GoogleSheetsSink::connect(auth, spreadsheet_id, cli.sheet.clone()).await?;
            Ok(Box::new(sink))
        }
    }
}

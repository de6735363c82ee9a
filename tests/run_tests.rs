use anyhow::{bail, Result};
use async_trait::async_trait;
use booking_counter::{
    AppConfig, AreaDefinition, CountFetcher, CsvSink, FetchError, Orchestrator, OutputRow,
    ResultCount, RowSink,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Outcome a fake page produces for one area
#[derive(Clone)]
enum Page {
    Cards(usize),
    MarkerTimeout,
    NavigationTimeout,
}

/// Fetcher serving canned outcomes by area label and recording the URLs it saw
struct FakeFetcher {
    pages: HashMap<String, Page>,
    urls: Arc<Mutex<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeFetcher {
    fn new(pages: &[(&str, Page)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(label, page)| (label.to_string(), page.clone()))
                .collect(),
            urls: Arc::new(Mutex::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl CountFetcher for FakeFetcher {
    async fn fetch_count(&self, area_label: &str, search_url: &str) -> Result<usize, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.urls.lock().unwrap().push(search_url.to_string());

        tokio::task::yield_now().await;

        let result = match self.pages.get(area_label) {
            Some(Page::Cards(n)) => Ok(*n),
            Some(Page::MarkerTimeout) => Err(FetchError::MarkerTimeout {
                timeout: Duration::from_secs(60),
                detail: "Timeout waiting for div[data-testid='property-card']".into(),
            }),
            Some(Page::NavigationTimeout) | None => {
                Err(FetchError::Navigation("navigation timed out".into()))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    rows: Arc<Mutex<Vec<OutputRow>>>,
}

#[async_trait]
impl RowSink for RecordingSink {
    async fn append_row(&self, row: &OutputRow) -> Result<()> {
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "recording"
    }
}

struct UnreachableSink;

#[async_trait]
impl RowSink for UnreachableSink {
    async fn append_row(&self, _row: &OutputRow) -> Result<()> {
        bail!("connection refused")
    }

    fn sink_name(&self) -> &'static str {
        "unreachable"
    }
}

fn two_areas() -> AppConfig {
    AppConfig {
        areas: vec![
            AreaDefinition::new(
                "Tainan",
                "https://booking.test/searchresults.html?ss=Tainan&checkin={}&checkout={}",
            ),
            AreaDefinition::new(
                "West Central",
                "https://booking.test/searchresults.html?ss=West+Central&checkin={}&checkout={}",
            ),
        ],
        ..AppConfig::default()
    }
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn both_areas_render_cards() {
    let sink = RecordingSink::default();
    let fetcher = FakeFetcher::new(&[("Tainan", Page::Cards(15)), ("West Central", Page::Cards(0))]);
    let orchestrator = Orchestrator::new(two_areas(), Box::new(fetcher), Box::new(sink.clone()));

    let row = orchestrator.run(june_first()).await.unwrap();

    assert_eq!(row.to_string(), r#"["2024-06-01",15,0]"#);
    assert_eq!(sink.rows.lock().unwrap().as_slice(), &[row]);
}

#[tokio::test]
async fn marker_timeout_becomes_sentinel_without_affecting_other_area() {
    let sink = RecordingSink::default();
    let fetcher = FakeFetcher::new(&[
        ("Tainan", Page::MarkerTimeout),
        ("West Central", Page::Cards(8)),
    ]);
    let orchestrator = Orchestrator::new(two_areas(), Box::new(fetcher), Box::new(sink.clone()));

    let row = orchestrator.run(june_first()).await.unwrap();

    assert_eq!(row.counts, vec![ResultCount::Error, ResultCount::Listings(8)]);
    assert_eq!(row.to_string(), r#"["2024-06-01","error",8]"#);
    assert_eq!(sink.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sink_failure_fails_the_run() {
    let fetcher = FakeFetcher::new(&[("Tainan", Page::Cards(3)), ("West Central", Page::Cards(4))]);
    let orchestrator = Orchestrator::new(two_areas(), Box::new(fetcher), Box::new(UnreachableSink));

    let err = orchestrator.run(june_first()).await.unwrap_err();

    assert!(format!("{:#}", err).contains("connection refused"));
}

#[tokio::test]
async fn row_keeps_area_order_when_fetches_fail() {
    let mut config = two_areas();
    config.areas.push(AreaDefinition::new(
        "Anping",
        "https://booking.test/searchresults.html?ss=Anping&checkin={}&checkout={}",
    ));
    let fetcher = FakeFetcher::new(&[
        ("Tainan", Page::NavigationTimeout),
        ("West Central", Page::MarkerTimeout),
        ("Anping", Page::Cards(2)),
    ]);
    let orchestrator = Orchestrator::new(config, Box::new(fetcher), Box::new(RecordingSink::default()));

    let row = orchestrator.collect_row(june_first()).await.unwrap();

    assert_eq!(row.cell_count(), 4);
    assert_eq!(
        row.counts,
        vec![ResultCount::Error, ResultCount::Error, ResultCount::Listings(2)]
    );
}

#[tokio::test]
async fn fetches_run_one_at_a_time_with_formatted_urls() {
    let fetcher = FakeFetcher::new(&[("Tainan", Page::Cards(1)), ("West Central", Page::Cards(2))]);
    let urls = fetcher.urls.clone();
    let max_in_flight = fetcher.max_in_flight.clone();
    let orchestrator = Orchestrator::new(two_areas(), Box::new(fetcher), Box::new(RecordingSink::default()));

    orchestrator
        .collect_row(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
        .await
        .unwrap();

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        urls.lock().unwrap().as_slice(),
        &[
            "https://booking.test/searchresults.html?ss=Tainan&checkin=2024-12-31&checkout=2025-01-01",
            "https://booking.test/searchresults.html?ss=West+Central&checkin=2024-12-31&checkout=2025-01-01",
        ]
    );
}

#[tokio::test]
async fn csv_sink_receives_the_composed_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counts.csv");
    let fetcher = FakeFetcher::new(&[
        ("Tainan", Page::MarkerTimeout),
        ("West Central", Page::Cards(8)),
    ]);
    let orchestrator = Orchestrator::new(two_areas(), Box::new(fetcher), Box::new(CsvSink::new(&path)));

    orchestrator.run(june_first()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2024-06-01,error,8\n");
}

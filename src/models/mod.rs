use chrono::NaiveDate;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for the row label and the check-in/check-out query parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value written in place of a count when an area could not be fetched
pub const FAILURE_SENTINEL: &str = "error";

/// A named search area and its search URL template.
///
/// The template carries two `{}` slots, filled with the check-in and
/// check-out dates in that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AreaDefinition {
    pub label: String,
    pub url_template: String,
}

impl AreaDefinition {
    pub fn new(label: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url_template: url_template.into(),
        }
    }

    /// Number of `{}` slots in the template
    pub fn slot_count(&self) -> usize {
        self.url_template.matches("{}").count()
    }

    /// Fill the template with the check-in and check-out dates
    pub fn search_url(&self, check_in: NaiveDate, check_out: NaiveDate) -> String {
        let check_in = check_in.format(DATE_FORMAT).to_string();
        let check_out = check_out.format(DATE_FORMAT).to_string();

        self.url_template
            .replacen("{}", &check_in, 1)
            .replacen("{}", &check_out, 1)
    }
}

/// Number of listings found for one area, or the failure sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCount {
    Listings(usize),
    Error,
}

impl ResultCount {
    pub fn is_error(&self) -> bool {
        matches!(self, ResultCount::Error)
    }
}

impl fmt::Display for ResultCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCount::Listings(n) => write!(f, "{}", n),
            ResultCount::Error => f.write_str(FAILURE_SENTINEL),
        }
    }
}

impl Serialize for ResultCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultCount::Listings(n) => serializer.serialize_u64(*n as u64),
            ResultCount::Error => serializer.serialize_str(FAILURE_SENTINEL),
        }
    }
}

/// One appended row: the run date followed by one count per area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub date: NaiveDate,
    pub counts: Vec<ResultCount>,
}

impl OutputRow {
    pub fn new(date: NaiveDate, counts: Vec<ResultCount>) -> Self {
        Self { date, counts }
    }

    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Date cell plus one cell per area
    pub fn cell_count(&self) -> usize {
        1 + self.counts.len()
    }

    /// Cells as JSON values: the date and sentinel as strings, counts as numbers
    pub fn to_values(&self) -> Vec<serde_json::Value> {
        std::iter::once(serde_json::Value::String(self.date_label()))
            .chain(self.counts.iter().map(|count| match count {
                ResultCount::Listings(n) => serde_json::Value::from(*n),
                ResultCount::Error => serde_json::Value::String(FAILURE_SENTINEL.to_string()),
            }))
            .collect()
    }

    /// Cells as plain text, for flat file sinks
    pub fn to_strings(&self) -> Vec<String> {
        std::iter::once(self.date_label())
            .chain(self.counts.iter().map(ToString::to_string))
            .collect()
    }
}

impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.cell_count()))?;
        seq.serialize_element(&self.date_label())?;
        for count in &self.counts {
            seq.serialize_element(count)?;
        }
        seq.end()
    }
}

impl fmt::Display for OutputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn search_url_fills_slots_in_order() {
        let area = AreaDefinition::new(
            "Tainan",
            "https://www.booking.com/searchresults.html?ss=Tainan&checkin={}&checkout={}",
        );

        let url = area.search_url(date(2024, 6, 1), date(2024, 6, 2));

        assert_eq!(
            url,
            "https://www.booking.com/searchresults.html?ss=Tainan&checkin=2024-06-01&checkout=2024-06-02"
        );
        assert_eq!(url, area.search_url(date(2024, 6, 1), date(2024, 6, 2)));
    }

    #[test]
    fn slot_count_counts_placeholders() {
        assert_eq!(AreaDefinition::new("a", "x={}&y={}").slot_count(), 2);
        assert_eq!(AreaDefinition::new("a", "x={}").slot_count(), 1);
    }

    #[test]
    fn row_serializes_counts_as_numbers_and_sentinel_as_string() {
        let row = OutputRow::new(
            date(2024, 6, 1),
            vec![ResultCount::Error, ResultCount::Listings(8)],
        );

        assert_eq!(row.to_string(), r#"["2024-06-01","error",8]"#);
        assert_eq!(
            row.to_values(),
            vec![
                serde_json::json!("2024-06-01"),
                serde_json::json!("error"),
                serde_json::json!(8)
            ]
        );
        assert_eq!(row.to_strings(), vec!["2024-06-01", "error", "8"]);
        assert_eq!(row.cell_count(), 3);
    }

    #[test]
    fn sentinel_displays_as_error() {
        assert!(ResultCount::Error.is_error());
        assert_eq!(ResultCount::Error.to_string(), FAILURE_SENTINEL);
        assert_eq!(ResultCount::Listings(0).to_string(), "0");
    }
}

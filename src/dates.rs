use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// Check-in and check-out dates for a one-night stay starting on `today`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    pub fn starting(today: NaiveDate) -> Result<Self> {
        let check_out = today
            .succ_opt()
            .with_context(|| format!("No calendar day after {}", today))?;

        Ok(Self {
            check_in: today,
            check_out,
        })
    }
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

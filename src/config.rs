use crate::models::AreaDefinition;
use crate::scrapers::{count_result_cards, FetchSettings};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Areas to track and how to fetch them. Loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output column order follows this list
    pub areas: Vec<AreaDefinition>,
    pub fetch: FetchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            areas: vec![
                AreaDefinition::new(
                    "台南市",
                    "https://www.booking.com/searchresults.zh-tw.html?ss=台南市&checkin={}&checkout={}",
                ),
                AreaDefinition::new(
                    "台南中西區",
                    "https://www.booking.com/searchresults.zh-tw.html?ss=台南+中西區&checkin={}&checkout={}",
                ),
            ],
            fetch: FetchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file; missing keys fall back to the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.areas.is_empty() {
            bail!("At least one area must be configured");
        }

        let mut seen = HashSet::new();
        for area in &self.areas {
            if area.label.trim().is_empty() {
                bail!("Area label must not be empty (template: {})", area.url_template);
            }
            if !seen.insert(area.label.as_str()) {
                bail!("Duplicate area label '{}'", area.label);
            }
            if area.slot_count() != 2 {
                bail!(
                    "URL template for '{}' must have exactly two {{}} slots, found {}",
                    area.label,
                    area.slot_count()
                );
            }
        }

        count_result_cards("", &self.fetch.result_selector)
            .context("Invalid result selector")?;

        if self.fetch.navigation_timeout_secs == 0 || self.fetch.marker_timeout_secs == 0 {
            bail!("Timeouts must be greater than zero");
        }

        Ok(())
    }
}

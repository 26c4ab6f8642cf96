//! Persistent settings for the report browser.
//!
//! Only configuration lives here. Tree expansion and the current selection
//! belong to the running session and are never written to disk.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chart::ChartKind;
use crate::navigation::ClickClassifier;

/// All persistable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Databases
    /// Holds the report hierarchy and per-report query text
    pub catalog_url: String,
    /// Runs report and custom queries
    pub report_url: String,
    pub catalog_table: String,
    pub max_connections: u32,

    // Tree
    /// Repeat clicks on the same node faster than this toggle it
    pub double_click_ms: u64,

    // Report view
    pub chart_kind: ChartKind,
    pub custom_query: String,

    // Branding
    pub title: String,
    pub logo_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: "postgres://localhost:5432/salesdb".to_string(),
            report_url: "postgres://localhost:5432/reports".to_string(),
            catalog_table: "report_master".to_string(),
            max_connections: 5,
            double_click_ms: 500,
            chart_kind: ChartKind::Bar,
            custom_query: "SELECT * FROM report_data;".to_string(),
            title: "Report Browser".to_string(),
            logo_path: None,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("report-browser");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if file doesn't exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                Self::default()
            }),
            Err(_) => {
                // File doesn't exist yet, that's fine
                Self::default()
            }
        }
    }

    fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("Could not determine config directory, settings not saved");
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!("Failed to write settings file: {}", e);
                } else {
                    tracing::info!("Saved settings to {:?}", path);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Click classifier using the configured double-click window
    pub fn click_classifier(&self) -> ClickClassifier {
        ClickClassifier::new(Duration::from_millis(self.double_click_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = Settings::from_json(r#"{"catalog_table": "dbo_reports"}"#).unwrap();
        assert_eq!(settings.catalog_table, "dbo_reports");
        assert_eq!(settings.double_click_ms, 500);
        assert_eq!(settings.custom_query, "SELECT * FROM report_data;");
    }

    #[test]
    fn test_round_trip_keeps_chart_kind() {
        let settings = Settings {
            chart_kind: ChartKind::Histogram,
            logo_path: Some("Logo.jpg".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_click_classifier_threshold() {
        let settings = Settings {
            double_click_ms: 250,
            ..Default::default()
        };
        assert_eq!(
            settings.click_classifier().threshold(),
            Duration::from_millis(250)
        );
    }
}

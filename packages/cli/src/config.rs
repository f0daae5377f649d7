//! `dashboard.toml` configuration.
//!
//! Every table and key is optional. Command-line flags override whatever is
//! read here.

use std::path::{Path, PathBuf};

use helpline_analytics::SMOOTHING_WINDOW;
use helpline_analytics_models::RangeToken;
use helpline_category_models::CategoryFilter;
use helpline_dataset::DataPaths;
use helpline_dataset_models::ALL_AREAS;
use serde::Deserialize;
use thiserror::Error;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Errors from reading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`DashboardConfig`].
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Top-level `dashboard.toml` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Input file locations.
    pub data: DataConfig,
    /// Chart settings.
    pub chart: ChartConfig,
    /// Filter applied before command-line overrides.
    pub filter: FilterConfig,
}

/// `[data]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Wide call table (CSV).
    pub table: PathBuf,
    /// City polygons (`GeoJSON`).
    pub shapes: PathBuf,
    /// City populations (JSON object).
    pub populations: PathBuf,
    /// Category taxonomy (TOML). The built-in taxonomy is used when unset.
    pub taxonomy: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            table: PathBuf::from("data/calls.csv"),
            shapes: PathBuf::from("data/cities.geojson"),
            populations: PathBuf::from("data/populations.json"),
            taxonomy: None,
        }
    }
}

impl DataConfig {
    /// The three inputs `load_all` reads.
    #[must_use]
    pub fn paths(&self) -> DataPaths {
        DataPaths {
            table: self.table.clone(),
            shapes: self.shapes.clone(),
            populations: self.populations.clone(),
        }
    }
}

/// `[chart]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Moving-average window in days. `0` shows raw counts.
    pub smoothing_window: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            smoothing_window: SMOOTHING_WINDOW,
        }
    }
}

/// `[filter]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Range dropdown selection.
    pub range: RangeToken,
    /// City to chart.
    pub city: String,
    /// Category to show.
    pub category: CategoryFilter,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            range: RangeToken::Week,
            city: ALL_AREAS.to_string(),
            category: CategoryFilter::All,
        }
    }
}

/// Parses a config document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the text is not a valid config.
pub fn parse(path: &Path, toml_str: &str) -> Result<DashboardConfig, ConfigError> {
    toml::de::from_str(toml_str).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the config from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
/// exists, or falls back to defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if an explicitly given file is missing, or if
/// the file that was found cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                log::debug!("No {DEFAULT_CONFIG_FILE}; using defaults");
                return Ok(DashboardConfig::default());
            }
            fallback
        }
    };

    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse(&path, &text)?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse(Path::new("dashboard.toml"), "").unwrap();

        assert_eq!(config.chart.smoothing_window, 7);
        assert_eq!(config.filter.range, RangeToken::Week);
        assert_eq!(config.filter.city, ALL_AREAS);
        assert!(config.filter.category.is_all());
        assert!(config.data.taxonomy.is_none());
    }

    #[test]
    fn reads_all_tables() {
        let config = parse(
            Path::new("dashboard.toml"),
            r#"
                [data]
                table = "in/calls.csv"
                taxonomy = "in/taxonomy.toml"

                [chart]
                smoothing_window = 14

                [filter]
                range = "3 Months"
                city = "Providence"
                category = "Food"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.table, PathBuf::from("in/calls.csv"));
        assert_eq!(
            config.data.shapes,
            PathBuf::from("data/cities.geojson"),
            "unset keys keep their defaults"
        );
        assert_eq!(config.data.taxonomy, Some(PathBuf::from("in/taxonomy.toml")));
        assert_eq!(config.chart.smoothing_window, 14);
        assert_eq!(config.filter.range, RangeToken::ThreeMonths);
        assert_eq!(config.filter.category, CategoryFilter::from("Food"));
    }

    #[test]
    fn rejects_unknown_range() {
        let err = parse(Path::new("bad.toml"), "[filter]\nrange = \"Fortnight\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("bad.toml"), "{err}");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("helpline_missing_dashboard.toml");
        let err = load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }
}

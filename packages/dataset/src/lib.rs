#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading of the dashboard's static inputs.
//!
//! Three independent files feed the dashboard: the wide call table (CSV),
//! the map shapes (`GeoJSON`) and the population lookup (JSON). They are
//! read concurrently by [`load_all`], which only returns once all three
//! have parsed, so aggregation never sees a partially loaded dataset.
//! Join and consistency problems are logged loudly and returned alongside
//! the data rather than failing the load.

pub mod join;
pub mod population;
pub mod shapes;
pub mod table;

use std::path::{Path, PathBuf};

use helpline_dataset_models::{
    ConsistencyIssue, Dataset, DatasetError,
    region::{JoinReport, RegionPopulation, ShapeSet},
};
use thiserror::Error;

/// Errors that can occur while loading dashboard inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The table parsed but is structurally invalid.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// The input does not have the expected layout.
    #[error("Format error: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },
}

/// Locations of the three dashboard inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Wide call table (`city,type,<date>...`).
    pub table: PathBuf,
    /// `GeoJSON` feature collection of city polygons.
    pub shapes: PathBuf,
    /// JSON object of city name -> population.
    pub populations: PathBuf,
}

/// Everything the dashboard needs, fully loaded.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// The call table.
    pub dataset: Dataset,
    /// Map polygons.
    pub shapes: ShapeSet,
    /// Population lookup.
    pub populations: RegionPopulation,
    /// Cities that failed to join across the three inputs.
    pub join_report: JoinReport,
    /// Dates where `All Areas` rows disagree with their city rows.
    pub consistency_issues: Vec<ConsistencyIssue>,
}

async fn read(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads and parses all three inputs concurrently.
///
/// # Errors
///
/// Returns [`LoadError`] if any file cannot be read or parsed. Join and
/// consistency findings are not errors; they are reported in the result.
pub async fn load_all(paths: &DataPaths) -> Result<LoadedData, LoadError> {
    let (table_text, shapes_text, populations_text) = tokio::try_join!(
        read(&paths.table),
        read(&paths.shapes),
        read(&paths.populations),
    )?;

    let dataset = table::parse_table(table_text.as_bytes())?;
    let shapes = shapes::parse_shapes(&shapes_text)?;
    let populations = population::parse_populations(&populations_text)?;

    log::info!(
        "Loaded {} rows over {} days, {} shapes, {} population entries",
        dataset.rows().len(),
        dataset.axis().len(),
        shapes.len(),
        populations.len()
    );

    let join_report = join::check_joins(&dataset, &shapes, &populations);
    let consistency_issues = join::check_consistency(&dataset);

    Ok(LoadedData {
        dataset,
        shapes,
        populations,
        join_report,
        consistency_issues,
    })
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Default category taxonomy and the category color scale.
//!
//! The taxonomy ships as an embedded TOML document so the dashboard has a
//! working category list without any configuration. Deployments with a
//! different call table can point at their own TOML file instead.

pub mod color;
pub mod registry;

use thiserror::Error;

/// Errors that can occur while loading a category taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// Reading the taxonomy file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML document could not be parsed or failed validation.
    #[error("Taxonomy parse error in {name}: {source}")]
    Parse {
        /// Name of the document (file path or embedded id).
        name: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

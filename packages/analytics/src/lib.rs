#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data-filtering and temporal-aggregation engine for the dashboard.
//!
//! Every entry point is a pure function of the loaded dataset, the
//! taxonomy and a [`Filter`](helpline_analytics_models::Filter). A filter
//! that is not ready (missing or reversed dates) yields `None`, which
//! callers treat as "render nothing yet". Unknown date bounds widen to the
//! available axis and empty selections produce empty output; neither is an
//! error.

pub mod aggregate;
pub mod filter;
pub mod present;
pub mod slot;
pub mod smooth;
pub mod window;

use thiserror::Error;

/// Window size of the chart's moving average, in days.
pub const SMOOTHING_WINDOW: usize = 7;

/// Errors from turning raw UI input into filter values.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A date input did not parse.
    #[error("Invalid date '{input}'. Expected format: YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// A range token did not match any dropdown option.
    #[error("Unknown date range '{input}': {source}")]
    UnknownRange {
        /// The rejected input.
        input: String,
        /// Underlying parse error.
        source: strum::ParseError,
    },
}

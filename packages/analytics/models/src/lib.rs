#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter and result types for the dashboard's aggregation engine.
//!
//! The rendering layer owns a [`Filter`] and hands it to the engine on
//! every change. The engine answers with plain values: [`MapAggregate`] and
//! [`ChartAggregate`] straight from the aggregator, and [`ChartState`] /
//! [`ChoroplethState`] once the presentation adapters have shaped them.

use chrono::NaiveDate;
use helpline_category_models::CategoryFilter;
use helpline_dataset_models::{ALL_AREAS, DateRange};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Logical date-range selector from the range dropdown.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RangeToken {
    /// Last 7 days.
    #[default]
    #[serde(rename = "Week")]
    #[strum(serialize = "Week")]
    Week,
    /// Last 30 days.
    #[serde(rename = "Month")]
    #[strum(serialize = "Month")]
    Month,
    /// Last 60 days.
    #[serde(rename = "2 Months")]
    #[strum(serialize = "2 Months")]
    TwoMonths,
    /// Last 90 days.
    #[serde(rename = "3 Months")]
    #[strum(serialize = "3 Months")]
    ThreeMonths,
    /// Last 180 days.
    #[serde(rename = "6 Months")]
    #[strum(serialize = "6 Months")]
    SixMonths,
    /// The whole date range.
    #[serde(rename = "All Dates")]
    #[strum(serialize = "All Dates")]
    AllDates,
    /// Caller-supplied start and end dates.
    #[serde(rename = "Select Dates")]
    #[strum(serialize = "Select Dates")]
    SelectDates,
}

impl RangeToken {
    /// Calendar days between the window start and the last available date,
    /// for the preset tokens.
    #[must_use]
    pub const fn lookback_days(self) -> Option<u64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::TwoMonths => Some(60),
            Self::ThreeMonths => Some(90),
            Self::SixMonths => Some(180),
            Self::AllDates | Self::SelectDates => None,
        }
    }

    /// Returns all variants in dropdown order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Week,
            Self::Month,
            Self::TwoMonths,
            Self::ThreeMonths,
            Self::SixMonths,
            Self::AllDates,
            Self::SelectDates,
        ]
    }
}

/// A possibly incomplete `[start, end]` selection.
///
/// Either bound may be missing while the user is still picking dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
}

impl Window {
    /// A window with both bounds set.
    #[must_use]
    pub const fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// Both bounds, if present and ordered. `None` means there is nothing
    /// to aggregate yet.
    #[must_use]
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

/// The dashboard's full UI state, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// City whose series are charted; [`ALL_AREAS`] for the whole state.
    pub city: String,
    /// Category selection.
    pub call_type: CategoryFilter,
    /// Range dropdown selection.
    pub range: RangeToken,
    /// First day of the window, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day of the window, inclusive.
    pub end_date: Option<NaiveDate>,
    /// First and last day available in the dataset, once loaded.
    pub date_range: Option<DateRange>,
}

impl Filter {
    /// The window this filter selects.
    #[must_use]
    pub const fn window(&self) -> Window {
        Window {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Returns `true` if the chart shows the whole state.
    #[must_use]
    pub fn is_all_areas(&self) -> bool {
        self.city == ALL_AREAS
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            city: ALL_AREAS.to_string(),
            call_type: CategoryFilter::All,
            range: RangeToken::Week,
            start_date: None,
            end_date: None,
            date_range: None,
        }
    }
}

/// Windowed total for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityValue {
    /// City name.
    pub city: String,
    /// Sum of the city's counts over the window.
    pub value: u64,
}

/// Map-side aggregation: per-city totals and the summary figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAggregate {
    /// Totals for every city with a tile (synthetic `All Areas` excluded).
    pub per_city_value: Vec<CityValue>,
    /// All calls in the window.
    pub total: u64,
    /// Calls from in-state cities.
    pub in_state: u64,
    /// Calls from out of state or unknown location.
    pub out_of_state: u64,
}

/// Lower and upper edge of one stacked layer at one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackBound {
    /// Cumulative total of the layers below.
    pub lower: u64,
    /// `lower` plus this layer's value.
    pub upper: u64,
}

/// One category's layer in the stacked chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Category label.
    pub key: String,
    /// Plotted values (smoothed when averaging), aligned to the window.
    pub values: Vec<u64>,
    /// Cumulative stack bounds, aligned to the window.
    pub bounds: Vec<StackBound>,
}

/// Chart-side aggregation: stacked series over the sliced date axis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAggregate {
    /// Layers, bottom first, in taxonomy order.
    pub series: Vec<Series>,
    /// Dates covered by every series.
    pub raw_date_axis: Vec<NaiveDate>,
}

/// Both aggregation shapes for one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Map-side totals.
    pub map: MapAggregate,
    /// Chart-side stacked series.
    pub chart: ChartAggregate,
}

/// Everything the chart needs to draw one frame.
///
/// A fresh value is produced for every filter change; the renderer diffs
/// consecutive states instead of keeping its own mutable scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartState {
    /// Stacked layers with their colors.
    pub layers: Vec<ChartLayer>,
    /// Dates covered by the layers.
    pub dates: Vec<NaiveDate>,
    /// Horizontal domain, clipped to the dataset's date range.
    pub x_domain: DateRange,
    /// Vertical domain `[0, max]`.
    pub y_domain: (f64, f64),
    /// Whether the values are moving averages.
    pub smoothed: bool,
    /// Caption line describing what is shown.
    pub description: String,
    /// Footnote for the current view, if any.
    pub note: Option<String>,
}

/// A [`Series`] with its color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayer {
    /// The layer's data.
    #[serde(flatten)]
    pub series: Series,
    /// Fill color.
    pub color: Option<String>,
}

/// Hover text for one layer at one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    /// Hovered date.
    pub date: NaiveDate,
    /// Category label.
    pub key: String,
    /// Plotted value.
    pub value: u64,
}

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Full category label.
    pub label: String,
    /// Label shortened for display.
    pub short_label: String,
    /// Swatch color.
    pub color: Option<String>,
}

/// One region's input to the choropleth color scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionValue {
    /// City name.
    pub city: String,
    /// Map tile element id.
    pub tile_id: String,
    /// Windowed call total.
    pub value: u64,
    /// Calls per 1000 residents, when the population is known and non-zero.
    pub per_1k: Option<f64>,
    /// Fill color, when `per_1k` is known.
    pub color: Option<String>,
}

/// One row of the map's summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// Row heading.
    pub label: String,
    /// Call count.
    pub value: u64,
}

/// Everything the map needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethState {
    /// Per-region values and colors.
    pub regions: Vec<RegionValue>,
    /// Extent of the finite per-1000 values, if any.
    pub domain: Option<(f64, f64)>,
    /// Total, in-state and out-of-state rows.
    pub summary: Vec<SummaryRow>,
    /// Evenly spaced swatches of the color ramp for the legend.
    pub gradient: Vec<String>,
    /// Caption line describing what is shown.
    pub description: String,
    /// Footnote for the current view, if any.
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn range_tokens_use_dropdown_labels() {
        for token in RangeToken::all() {
            let label = token.to_string();
            assert_eq!(RangeToken::from_str(&label).unwrap(), *token);
            let json = serde_json::to_string(token).unwrap();
            assert_eq!(json, format!("\"{label}\""));
        }
        assert_eq!(RangeToken::TwoMonths.to_string(), "2 Months");
    }

    #[test]
    fn lookback_days_for_presets_only() {
        assert_eq!(RangeToken::Week.lookback_days(), Some(7));
        assert_eq!(RangeToken::SixMonths.lookback_days(), Some(180));
        assert_eq!(RangeToken::AllDates.lookback_days(), None);
        assert_eq!(RangeToken::SelectDates.lookback_days(), None);
    }

    #[test]
    fn window_bounds_require_both_dates_in_order() {
        let d1 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 3, 7).unwrap();

        assert_eq!(Window::new(d1, d2).bounds(), Some((d1, d2)));
        assert_eq!(Window::new(d1, d1).bounds(), Some((d1, d1)));
        assert_eq!(Window::new(d2, d1).bounds(), None);
        assert_eq!(
            Window {
                start_date: Some(d1),
                end_date: None
            }
            .bounds(),
            None
        );
    }

    #[test]
    fn default_filter_is_statewide_all_categories() {
        let filter = Filter::default();
        assert!(filter.is_all_areas());
        assert!(filter.call_type.is_all());
        assert_eq!(filter.range, RangeToken::Week);
        assert!(filter.window().bounds().is_none());
    }
}

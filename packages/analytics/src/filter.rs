//! Filter state transitions.
//!
//! Each UI interaction maps to one function that takes the current
//! [`Filter`] and returns the next one. Nothing is mutated in place, so the
//! caller can keep the previous filter around for diffing.

use chrono::NaiveDate;
use helpline_analytics_models::{Filter, RangeToken, Window};
use helpline_category_models::CategoryFilter;
use helpline_dataset_models::{ALL_AREAS, DateRange, region::title_case};

use crate::AnalyticsError;
use crate::window::resolve_window;

/// The filter shown on first load: the last week of data, all categories,
/// all areas.
#[must_use]
pub fn initial_filter(date_range: DateRange) -> Filter {
    let window = resolve_window(RangeToken::Week, date_range, Window::default());
    Filter {
        start_date: window.start_date,
        end_date: window.end_date,
        date_range: Some(date_range),
        ..Filter::default()
    }
}

/// Applies a range dropdown selection.
///
/// Preset tokens and `All Dates` recompute both dates from the filter's
/// `date_range`. `Select Dates` keeps the current dates for the caller to
/// edit. Without a loaded `date_range` only the token changes.
#[must_use]
pub fn with_range(filter: &Filter, range: RangeToken) -> Filter {
    let mut next = Filter {
        range,
        ..filter.clone()
    };
    if let Some(date_range) = filter.date_range {
        let window = resolve_window(range, date_range, filter.window());
        next.start_date = window.start_date;
        next.end_date = window.end_date;
    } else {
        log::debug!("No date range loaded; keeping dates for '{range}'");
    }
    next
}

/// Sets an explicit start date, switching the dropdown to `Select Dates`.
#[must_use]
pub fn with_start_date(filter: &Filter, start_date: Option<NaiveDate>) -> Filter {
    Filter {
        range: RangeToken::SelectDates,
        start_date,
        ..filter.clone()
    }
}

/// Sets an explicit end date, switching the dropdown to `Select Dates`.
#[must_use]
pub fn with_end_date(filter: &Filter, end_date: Option<NaiveDate>) -> Filter {
    Filter {
        range: RangeToken::SelectDates,
        end_date,
        ..filter.clone()
    }
}

/// Narrows the view to one category (legend click).
#[must_use]
pub fn with_category(filter: &Filter, category: impl Into<CategoryFilter>) -> Filter {
    Filter {
        call_type: category.into(),
        ..filter.clone()
    }
}

/// Narrows the chart to one city.
#[must_use]
pub fn with_city(filter: &Filter, city: impl Into<String>) -> Filter {
    Filter {
        city: city.into(),
        ..filter.clone()
    }
}

/// Narrows the chart to the city behind a map tile. Shape ids are upper
/// case (`"NORTH PROVIDENCE"`); the table uses title case.
#[must_use]
pub fn with_city_from_tile(filter: &Filter, shape_id: &str) -> Filter {
    with_city(filter, title_case(shape_id.trim()))
}

/// "Back to all categories".
#[must_use]
pub fn reset_category(filter: &Filter) -> Filter {
    with_category(filter, CategoryFilter::All)
}

/// "Back to all areas".
#[must_use]
pub fn reset_city(filter: &Filter) -> Filter {
    with_city(filter, ALL_AREAS)
}

/// Parses a date picker value. An empty input clears the date.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidDate`] if the input is not
/// `YYYY-MM-DD`.
pub fn parse_date_input(input: &str) -> Result<Option<NaiveDate>, AnalyticsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AnalyticsError::InvalidDate {
            input: input.to_string(),
        })
}

/// Parses a range dropdown value such as `"2 Months"`.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownRange`] if the input names no option.
pub fn parse_range(input: &str) -> Result<RangeToken, AnalyticsError> {
    input
        .trim()
        .parse()
        .map_err(|source| AnalyticsError::UnknownRange {
            input: input.to_string(),
            source,
        })
}

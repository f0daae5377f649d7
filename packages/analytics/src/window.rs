//! Window Resolver: turns a range token into concrete dates.

use chrono::{Days, NaiveDate};
use helpline_analytics_models::{RangeToken, Window};
use helpline_dataset_models::DateRange;

/// The date `days` calendar days before `date`.
#[must_use]
pub fn previous_date(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Resolves `token` against the dataset's `date_range`.
///
/// Preset tokens end on the last available date and start `N` calendar
/// days earlier; the start is not clamped to the first available date.
/// `All Dates` yields the full range. `Select Dates` returns `current`
/// untouched: those dates belong to the caller.
#[must_use]
pub fn resolve_window(token: RangeToken, date_range: DateRange, current: Window) -> Window {
    if let Some(days) = token.lookback_days() {
        return Window::new(previous_date(date_range.max, days), date_range.max);
    }

    match token {
        RangeToken::AllDates => Window::new(date_range.min, date_range.max),
        _ => current,
    }
}

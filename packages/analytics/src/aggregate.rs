//! Aggregator: map totals and stacked chart series for one filter.
//!
//! The map and the chart follow different double-counting rules. The map
//! reads rows whose `type` equals the filter label, so "All Categories"
//! uses the pre-deduplicated `All Categories` rows and never adds majors
//! together. The chart stacks one series per major category and never
//! includes minor categories, which overlap the majors.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use helpline_analytics_models::{
    AggregateResult, ChartAggregate, CityValue, Filter, MapAggregate, Series, StackBound,
};
use helpline_category_models::{CategoryFilter, CategoryTaxonomy};
use helpline_dataset_models::{ALL_AREAS, Dataset, DateAxis, OUT_OF_STATE, Row};

use crate::SMOOTHING_WINDOW;
use crate::smooth::smooth;

/// Maps window bounds to inclusive axis positions.
///
/// A bound that is not on the axis verbatim widens: an unknown start maps
/// to the first index and an unknown end to the last. Returns `None` only
/// for an empty axis.
///
/// `start` must not be after `end`; [`Window::bounds`] only yields ordered
/// pairs.
///
/// [`Window::bounds`]: helpline_analytics_models::Window::bounds
#[must_use]
pub fn resolve_indices(
    axis: &DateAxis,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<RangeInclusive<usize>> {
    debug_assert!(start <= end, "reversed window {start}..={end}");
    let last = axis.len().checked_sub(1)?;
    Some(axis.index_of(start).unwrap_or(0)..=axis.index_of(end).unwrap_or(last))
}

/// Returns the filter's window as axis positions, or `None` when the
/// filter is not ready to aggregate.
///
/// The outer `Option` is the not-ready signal; the inner one is `None` for
/// an empty axis, which aggregates to empty output.
fn window_indices(dataset: &Dataset, filter: &Filter) -> Option<Option<RangeInclusive<usize>>> {
    let Some((start, end)) = filter.window().bounds() else {
        log::debug!(
            "Filter not ready: start={:?} end={:?}",
            filter.start_date,
            filter.end_date
        );
        return None;
    };
    Some(resolve_indices(dataset.axis(), start, end))
}

fn window_sum(values: &[u64], range: Option<&RangeInclusive<usize>>) -> u64 {
    range.map_or(0, |r| values[r.clone()].iter().sum())
}

/// Per-city windowed totals and the summary figures for the map.
///
/// Returns `None` when the filter has no start or end date, or when the end
/// is before the start.
#[must_use]
pub fn aggregate_for_map(dataset: &Dataset, filter: &Filter) -> Option<MapAggregate> {
    let range = window_indices(dataset, filter)?;
    let label = filter.call_type.label();

    let totals: Vec<CityValue> = dataset
        .rows_for_category(label)
        .map(|row| CityValue {
            city: row.city.clone(),
            value: window_sum(&row.values, range.as_ref()),
        })
        .collect();

    let value_of = |city: &str| totals.iter().find(|c| c.city == city).map(|c| c.value);
    let summed: u64 = totals
        .iter()
        .filter(|c| c.city != ALL_AREAS)
        .map(|c| c.value)
        .sum();

    let total = match &filter.call_type {
        CategoryFilter::All => summed,
        CategoryFilter::Single(category) => value_of(ALL_AREAS).unwrap_or_else(|| {
            log::debug!("No '{ALL_AREAS}' row for '{category}'; summing city rows");
            summed
        }),
    };
    let out_of_state = value_of(OUT_OF_STATE).unwrap_or(0);
    let in_state = total.checked_sub(out_of_state).unwrap_or_else(|| {
        log::warn!(
            "Out-of-state count {out_of_state} exceeds total {total} for '{label}'; \
             reporting 0 in-state calls"
        );
        0
    });

    let per_city_value = totals
        .into_iter()
        .filter(|c| c.city != ALL_AREAS)
        .collect();

    Some(MapAggregate {
        per_city_value,
        total,
        in_state,
        out_of_state,
    })
}

/// Rows the chart stacks, bottom layer first.
fn chart_rows<'a>(
    dataset: &'a Dataset,
    taxonomy: &CategoryTaxonomy,
    filter: &Filter,
) -> Vec<&'a Row> {
    match &filter.call_type {
        CategoryFilter::All => taxonomy
            .major()
            .iter()
            .filter_map(|category| dataset.row(&filter.city, category))
            .collect(),
        CategoryFilter::Single(category) => {
            dataset.row(&filter.city, category).into_iter().collect()
        }
    }
}

/// Stacked series for the chart, using the default 7-day average when
/// `smooth` is set.
///
/// Returns `None` when the filter is not ready (see [`aggregate_for_map`]).
#[must_use]
pub fn aggregate_for_chart(
    dataset: &Dataset,
    taxonomy: &CategoryTaxonomy,
    filter: &Filter,
    smooth: bool,
) -> Option<ChartAggregate> {
    let smoothing = smooth.then_some(SMOOTHING_WINDOW);
    aggregate_for_chart_with_window(dataset, taxonomy, filter, smoothing)
}

/// Stacked series for the chart with an explicit moving-average window.
///
/// Smoothing runs over each full row before slicing, so values at the
/// window's left edge still average in the days just before it.
#[must_use]
pub fn aggregate_for_chart_with_window(
    dataset: &Dataset,
    taxonomy: &CategoryTaxonomy,
    filter: &Filter,
    smoothing: Option<usize>,
) -> Option<ChartAggregate> {
    let Some(range) = window_indices(dataset, filter)? else {
        return Some(ChartAggregate::default());
    };

    let rows = chart_rows(dataset, taxonomy, filter);
    if rows.is_empty() {
        log::debug!(
            "No rows for city '{}' and '{}'",
            filter.city,
            filter.call_type
        );
    }

    let width = range.end() - range.start() + 1;
    let mut base = vec![0u64; width];
    let mut series = Vec::with_capacity(rows.len());

    for row in rows {
        let values: Vec<u64> = match smoothing {
            Some(window_size) => smooth(&row.values, window_size)[range.clone()].to_vec(),
            None => row.values[range.clone()].to_vec(),
        };

        let bounds = values
            .iter()
            .zip(base.iter_mut())
            .map(|(value, lower)| {
                let bound = StackBound {
                    lower: *lower,
                    upper: *lower + value,
                };
                *lower = bound.upper;
                bound
            })
            .collect();

        series.push(Series {
            key: row.category.clone(),
            values,
            bounds,
        });
    }

    Some(ChartAggregate {
        series,
        raw_date_axis: dataset.axis().dates()[range].to_vec(),
    })
}

/// Both aggregation shapes at once.
///
/// Returns `None` when the filter is not ready.
#[must_use]
pub fn aggregate(
    dataset: &Dataset,
    taxonomy: &CategoryTaxonomy,
    filter: &Filter,
    smooth: bool,
) -> Option<AggregateResult> {
    Some(AggregateResult {
        map: aggregate_for_map(dataset, filter)?,
        chart: aggregate_for_chart(dataset, taxonomy, filter, smooth)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpline_category_models::ALL_CATEGORIES;
    use helpline_dataset_models::is_synthetic_city;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn row(city: &str, category: &str, values: &[u64]) -> Row {
        Row {
            city: city.to_string(),
            category: category.to_string(),
            values: values.to_vec(),
        }
    }

    fn taxonomy() -> CategoryTaxonomy {
        CategoryTaxonomy::new(
            vec!["Housing".to_string(), "Food".to_string()],
            vec!["Eviction".to_string()],
        )
        .unwrap()
    }

    /// Seven days, two real cities plus the synthetic ones. "All
    /// Categories" rows count each call once, so they are smaller than the
    /// sum of the category rows.
    fn dataset() -> Dataset {
        let axis = DateAxis::new((1..=7).map(date).collect()).unwrap();
        Dataset::new(
            axis,
            vec![
                row("Providence", "Housing", &[5, 5, 5, 5, 5, 5, 5]),
                row("Providence", "Food", &[1, 2, 3, 4, 5, 6, 7]),
                row("Providence", "Eviction", &[2, 2, 2, 2, 2, 2, 2]),
                row("Providence", ALL_CATEGORIES, &[6, 7, 8, 9, 10, 11, 12]),
                row("Warwick", "Housing", &[1, 1, 1, 1, 1, 1, 1]),
                row("Warwick", "Food", &[0, 0, 1, 0, 0, 1, 0]),
                row("Warwick", ALL_CATEGORIES, &[1, 1, 2, 1, 1, 2, 1]),
                row(OUT_OF_STATE, "Housing", &[1, 0, 0, 0, 0, 0, 1]),
                row(OUT_OF_STATE, "Food", &[0, 0, 0, 0, 0, 0, 0]),
                row(OUT_OF_STATE, ALL_CATEGORIES, &[1, 0, 0, 0, 0, 0, 1]),
                row(ALL_AREAS, "Housing", &[7, 6, 6, 6, 6, 6, 7]),
                row(ALL_AREAS, "Food", &[1, 2, 4, 4, 5, 7, 7]),
                row(ALL_AREAS, "Eviction", &[2, 2, 2, 2, 2, 2, 2]),
            ],
        )
        .unwrap()
    }

    fn filter(city: &str, call_type: &str, start: u32, end: u32) -> Filter {
        Filter {
            city: city.to_string(),
            call_type: CategoryFilter::from(call_type),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
            ..Filter::default()
        }
    }

    #[test]
    fn single_category_scenario() {
        let aggregate = aggregate_for_chart(
            &dataset(),
            &taxonomy(),
            &filter("Providence", "Housing", 1, 7),
            false,
        )
        .unwrap();

        assert_eq!(aggregate.series.len(), 1);
        assert_eq!(aggregate.series[0].key, "Housing");
        assert_eq!(aggregate.series[0].values, vec![5; 7]);
        assert_eq!(aggregate.raw_date_axis.len(), 7);
    }

    #[test]
    fn all_categories_stacks_majors_in_taxonomy_order() {
        let aggregate = aggregate_for_chart(
            &dataset(),
            &taxonomy(),
            &filter("Providence", ALL_CATEGORIES, 1, 3),
            false,
        )
        .unwrap();

        let keys: Vec<&str> = aggregate.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Housing", "Food"], "minor categories never stack");

        let food = &aggregate.series[1];
        assert_eq!(food.values, vec![1, 2, 3]);
        assert_eq!(
            food.bounds,
            vec![
                StackBound { lower: 5, upper: 6 },
                StackBound { lower: 5, upper: 7 },
                StackBound { lower: 5, upper: 8 },
            ]
        );
    }

    #[test]
    fn smoothing_uses_history_before_the_window() {
        let aggregate = aggregate_for_chart(
            &dataset(),
            &taxonomy(),
            &filter("Providence", "Food", 7, 7),
            true,
        )
        .unwrap();

        // (1 + 2 + ... + 7) / 7 = 4, not round(7 / 7) = 1.
        assert_eq!(aggregate.series[0].values, vec![4]);
    }

    #[test]
    fn unknown_bounds_widen_to_axis() {
        let mut f = filter("Providence", "Housing", 1, 7);
        f.start_date = NaiveDate::from_ymd_opt(2020, 2, 15);
        f.end_date = NaiveDate::from_ymd_opt(2020, 4, 30);

        let aggregate = aggregate_for_chart(&dataset(), &taxonomy(), &f, false).unwrap();
        assert_eq!(aggregate.raw_date_axis.first(), Some(&date(1)));
        assert_eq!(aggregate.raw_date_axis.last(), Some(&date(7)));

        let axis = dataset().axis().clone();
        assert_eq!(
            resolve_indices(&axis, NaiveDate::from_ymd_opt(2020, 2, 15).unwrap(), date(3)),
            Some(0..=2)
        );
        assert_eq!(
            resolve_indices(
                &axis,
                NaiveDate::from_ymd_opt(2020, 2, 15).unwrap(),
                NaiveDate::from_ymd_opt(2020, 4, 30).unwrap(),
            ),
            Some(0..=6)
        );
        assert_eq!(resolve_indices(&DateAxis::default(), date(1), date(3)), None);
    }

    #[test]
    fn not_ready_and_reversed_filters_yield_none() {
        let data = dataset();
        let reversed = filter("Providence", "Housing", 5, 2);
        assert!(aggregate_for_map(&data, &reversed).is_none());
        assert!(aggregate_for_chart(&data, &taxonomy(), &reversed, false).is_none());

        let mut missing = filter("Providence", "Housing", 1, 7);
        missing.start_date = None;
        assert!(aggregate_for_map(&data, &missing).is_none());
        assert!(aggregate(&data, &taxonomy(), &missing, true).is_none());
    }

    #[test]
    fn empty_selection_yields_no_series() {
        let aggregate = aggregate_for_chart(
            &dataset(),
            &taxonomy(),
            &filter("Warwick", "Eviction", 1, 7),
            false,
        )
        .unwrap();
        assert!(aggregate.series.is_empty());

        let map = aggregate_for_map(&dataset(), &filter("Warwick", "Legal", 1, 7)).unwrap();
        assert!(map.per_city_value.is_empty());
        assert_eq!((map.total, map.in_state, map.out_of_state), (0, 0, 0));
    }

    #[test]
    fn map_totals_split_in_and_out_of_state() {
        let data = dataset();
        for call_type in [ALL_CATEGORIES, "Housing", "Food"] {
            let map = aggregate_for_map(&data, &filter(ALL_AREAS, call_type, 2, 6)).unwrap();
            assert_eq!(
                map.total,
                map.in_state + map.out_of_state,
                "total must split for {call_type}"
            );
        }
    }

    #[test]
    fn all_categories_in_state_is_sum_of_real_cities() {
        let map = aggregate_for_map(&dataset(), &filter(ALL_AREAS, ALL_CATEGORIES, 1, 7)).unwrap();

        let real: u64 = map
            .per_city_value
            .iter()
            .filter(|c| !is_synthetic_city(&c.city))
            .map(|c| c.value)
            .sum();
        assert_eq!(real, map.in_state);
        assert_eq!(map.out_of_state, 2);
        assert_eq!(map.total, 63 + 9 + 2);
    }

    #[test]
    fn single_category_total_reads_all_areas_row() {
        let map = aggregate_for_map(&dataset(), &filter(ALL_AREAS, "Housing", 1, 7)).unwrap();

        assert_eq!(map.total, 44);
        assert_eq!(map.out_of_state, 2);
        assert_eq!(map.in_state, 42);
        assert!(
            map.per_city_value.iter().all(|c| c.city != ALL_AREAS),
            "tiles are real cities only"
        );

        let summed: u64 = map.per_city_value.iter().map(|c| c.value).sum();
        assert_eq!(summed, map.total, "All Areas row agrees with city rows");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let data = dataset();
        let taxonomy = taxonomy();
        let f = filter("Providence", ALL_CATEGORIES, 2, 6);

        let first = aggregate(&data, &taxonomy, &f, true);
        let second = aggregate(&data, &taxonomy, &f, true);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(data, dataset(), "dataset is untouched");
    }

    #[test]
    fn empty_axis_aggregates_to_empty_output() {
        let data = Dataset::new(DateAxis::default(), vec![]).unwrap();
        let f = filter(ALL_AREAS, "Housing", 1, 7);

        let chart = aggregate_for_chart(&data, &taxonomy(), &f, false).unwrap();
        assert!(chart.series.is_empty());
        assert!(chart.raw_date_axis.is_empty());
        assert_eq!(aggregate_for_map(&data, &f).unwrap().total, 0);
    }
}

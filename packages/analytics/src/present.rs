//! Presentation adapters.
//!
//! Turn aggregator output into the values the chart and the map draw from.
//! Every function here is pure: the same inputs always produce the same
//! state, with no scale or axis remembered between calls.

use chrono::NaiveDate;
use helpline_analytics_models::{
    ChartAggregate, ChartLayer, ChartState, ChoroplethState, Filter, LegendEntry, MapAggregate,
    RegionValue, SummaryRow, Tooltip,
};
use helpline_category::color::CategoryColors;
use helpline_category_models::{CategoryGroup, CategoryTaxonomy};
use helpline_dataset_models::{
    DateRange, is_synthetic_city,
    region::{RegionPopulation, tile_id},
};

/// Smallest upper bound of the chart's vertical domain.
pub const MIN_Y_DOMAIN: f64 = 20.0;

/// Legend labels longer than this are cut and suffixed with `...`.
pub const LEGEND_LABEL_LEN: usize = 15;

/// Number of swatches in the map's gradient legend.
pub const GRADIENT_STEPS: usize = 6;

/// Low end of the map's color ramp.
pub const RAMP_LOW: [u8; 3] = [0xff, 0xff, 0xff];

/// High end of the map's color ramp (`#114d93`).
pub const RAMP_HIGH: [u8; 3] = [0x11, 0x4d, 0x93];

const MAJOR_ONLY_NOTE: &str = "* Showing calls in major categories only.";
const COUNTED_ONCE_NOTE: &str = "* Calls that fall under multiple categories counted once.";

fn area_label(filter: &Filter) -> &str {
    if filter.is_all_areas() {
        "all areas"
    } else {
        &filter.city
    }
}

/// Clips `[start, end]` to `date_range`.
fn clamp_domain(start: NaiveDate, end: NaiveDate, date_range: Option<DateRange>) -> DateRange {
    let Some(range) = date_range else {
        return DateRange {
            min: start,
            max: end,
        };
    };
    let min = start.max(range.min).min(range.max);
    let max = end.min(range.max).max(min);
    DateRange { min, max }
}

/// Builds the chart's frame for one aggregation.
///
/// `smoothing` is the moving-average window the aggregate was computed
/// with, if any. Returns `None` when the filter is not ready.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chart_state(
    aggregate: &ChartAggregate,
    filter: &Filter,
    smoothing: Option<usize>,
    colors: &CategoryColors,
) -> Option<ChartState> {
    let (start, end) = filter.window().bounds()?;

    let max_upper = aggregate
        .series
        .iter()
        .flat_map(|s| s.bounds.iter().map(|b| b.upper))
        .max()
        .unwrap_or(0);
    let y_max = MIN_Y_DOMAIN.max(1.1 * max_upper as f64);

    let layers = aggregate
        .series
        .iter()
        .map(|series| ChartLayer {
            series: series.clone(),
            color: colors.color_for(&series.key).map(str::to_string),
        })
        .collect();

    let shown = smoothing.map_or_else(
        || "call volumes".to_string(),
        |days| format!("{days}-day moving averages"),
    );

    Some(ChartState {
        layers,
        dates: aggregate.raw_date_axis.clone(),
        x_domain: clamp_domain(start, end, filter.date_range),
        y_domain: (0.0, y_max),
        smoothed: smoothing.is_some(),
        description: format!(
            "Showing {shown} {start} - {end} in {}",
            area_label(filter)
        ),
        note: filter.call_type.is_all().then(|| MAJOR_ONLY_NOTE.to_string()),
    })
}

/// Hover text for layer `key` at position `index`.
#[must_use]
pub fn tooltip(state: &ChartState, index: usize, key: &str) -> Option<Tooltip> {
    let date = *state.dates.get(index)?;
    let layer = state.layers.iter().find(|l| l.series.key == key)?;
    let value = *layer.series.values.get(index)?;

    Some(Tooltip {
        date,
        key: key.to_string(),
        value,
    })
}

/// Position of the date closest to `date`. Ties go to the later date.
#[must_use]
pub fn nearest_index(dates: &[NaiveDate], date: NaiveDate) -> Option<usize> {
    if dates.is_empty() {
        return None;
    }
    let right = dates.partition_point(|d| *d < date);
    if right == 0 {
        return Some(0);
    }
    if right == dates.len() {
        return Some(dates.len() - 1);
    }

    let left = right - 1;
    let to_left = (date - dates[left]).num_days();
    let to_right = (dates[right] - date).num_days();
    Some(if to_left < to_right { left } else { right })
}

/// Cuts `label` to [`LEGEND_LABEL_LEN`] characters.
#[must_use]
pub fn shorten_label(label: &str) -> String {
    if label.chars().count() > LEGEND_LABEL_LEN {
        let head: String = label.chars().take(LEGEND_LABEL_LEN).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

/// Legend entries: majors always, minors when `show_minor` is set.
#[must_use]
pub fn legend(
    taxonomy: &CategoryTaxonomy,
    colors: &CategoryColors,
    show_minor: bool,
) -> Vec<LegendEntry> {
    CategoryGroup::all()
        .iter()
        .filter(|group| show_minor || **group == CategoryGroup::Major)
        .flat_map(|group| taxonomy.labels(*group))
        .map(|label| LegendEntry {
            label: label.clone(),
            short_label: shorten_label(label),
            color: colors.color_for(label).map(str::to_string),
        })
        .collect()
}

/// Color at position `t` (clamped to `[0, 1]`) along the map's ramp.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ramp_color(t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let channel = |i: usize| {
        let low = f64::from(RAMP_LOW[i]);
        let high = f64::from(RAMP_HIGH[i]);
        (high - low).mul_add(t, low).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

/// `steps` evenly spaced swatches from the low to the high end of the
/// ramp, both ends included.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gradient(steps: usize) -> Vec<String> {
    match steps {
        0 => vec![],
        1 => vec![ramp_color(0.5)],
        _ => (0..steps)
            .map(|i| ramp_color(i as f64 / (steps - 1) as f64))
            .collect(),
    }
}

/// Calls per 1000 residents.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn per_thousand(value: u64, population: u64) -> Option<f64> {
    if population == 0 {
        return None;
    }
    Some(value as f64 / (population as f64 / 1000.0))
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Position of `value` within `domain`, or the middle of the ramp when the
/// domain is a single point.
fn scale(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        0.5
    } else {
        (value - lo) / (hi - lo)
    }
}

/// Builds the map's frame for one aggregation.
///
/// Tiles are real cities only. Cities without a known, non-zero population
/// keep their value but get no color.
#[must_use]
pub fn choropleth(
    map: &MapAggregate,
    filter: &Filter,
    populations: &RegionPopulation,
) -> ChoroplethState {
    let mut regions: Vec<RegionValue> = map
        .per_city_value
        .iter()
        .filter(|c| !is_synthetic_city(&c.city))
        .map(|c| {
            let per_1k = populations
                .get(&c.city)
                .and_then(|pop| per_thousand(c.value, pop));
            if per_1k.is_none() {
                log::debug!("No population for '{}'; leaving tile uncolored", c.city);
            }
            RegionValue {
                city: c.city.clone(),
                tile_id: tile_id(&c.city),
                value: c.value,
                per_1k,
                color: None,
            }
        })
        .collect();

    let domain = extent(regions.iter().filter_map(|r| r.per_1k));
    if let Some(domain) = domain {
        for region in &mut regions {
            region.color = region.per_1k.map(|v| ramp_color(scale(v, domain)));
        }
    }

    let (start, end) = filter
        .window()
        .bounds()
        .map_or((String::new(), String::new()), |(s, e)| {
            (s.to_string(), e.to_string())
        });

    ChoroplethState {
        regions,
        domain,
        summary: vec![
            SummaryRow {
                label: "Total calls".to_string(),
                value: map.total,
            },
            SummaryRow {
                label: "From in state".to_string(),
                value: map.in_state,
            },
            SummaryRow {
                label: "Out-of-state/Location Unknown".to_string(),
                value: map.out_of_state,
            },
        ],
        gradient: gradient(GRADIENT_STEPS),
        description: format!("Accumulating calls {start} - {end}"),
        note: filter
            .call_type
            .is_all()
            .then(|| COUNTED_ONCE_NOTE.to_string()),
    }
}

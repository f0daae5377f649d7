//! Load-time integrity checks.
//!
//! A table city with no shape or population silently leaves its map tile
//! uncolored, so every failed join is logged at `warn` level and returned
//! in a [`JoinReport`] for the caller to surface.

use std::collections::BTreeSet;

use helpline_dataset_models::{
    ConsistencyIssue, Dataset, is_synthetic_city,
    region::{JoinReport, RegionPopulation, ShapeSet, join_key},
};

/// Joins table cities against shapes and populations.
#[must_use]
pub fn check_joins(
    dataset: &Dataset,
    shapes: &ShapeSet,
    populations: &RegionPopulation,
) -> JoinReport {
    let cities: Vec<&str> = dataset
        .cities()
        .into_iter()
        .filter(|c| !is_synthetic_city(c))
        .collect();
    let city_keys: BTreeSet<String> = cities.iter().map(|c| join_key(c)).collect();

    let missing_shape: Vec<String> = cities
        .iter()
        .filter(|c| shapes.find(c).is_none())
        .map(ToString::to_string)
        .collect();

    let missing_population: Vec<String> = cities
        .iter()
        .filter(|c| populations.get(c).is_none())
        .map(ToString::to_string)
        .collect();

    let unmatched_shapes: Vec<String> = shapes
        .shapes()
        .iter()
        .filter(|s| !city_keys.contains(&join_key(&s.id)))
        .map(|s| s.id.clone())
        .collect();

    for city in &missing_shape {
        log::warn!("City '{city}' has no map shape; it will not appear on the map");
    }
    for city in &missing_population {
        log::warn!("City '{city}' has no population entry; its map color cannot be computed");
    }
    for id in &unmatched_shapes {
        log::warn!("Map shape '{id}' matches no city in the call table");
    }

    JoinReport {
        missing_shape,
        missing_population,
        unmatched_shapes,
    }
}

/// Runs [`Dataset::check_consistency`] and logs a summary per category.
#[must_use]
pub fn check_consistency(dataset: &Dataset) -> Vec<ConsistencyIssue> {
    let issues = dataset.check_consistency();

    let categories: BTreeSet<&str> = issues.iter().map(|i| i.category.as_str()).collect();
    for category in categories {
        let count = issues.iter().filter(|i| i.category == category).count();
        log::warn!(
            "'All Areas' row for '{category}' disagrees with the city rows on {count} date(s)"
        );
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use helpline_dataset_models::{ALL_AREAS, DateAxis, OUT_OF_STATE, Row, region::CityShape};

    fn dataset(cities: &[&str]) -> Dataset {
        let axis = DateAxis::new(vec![NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()]).unwrap();
        let rows = cities
            .iter()
            .map(|c| Row {
                city: (*c).to_string(),
                category: "Food".to_string(),
                values: vec![1],
            })
            .collect();
        Dataset::new(axis, rows).unwrap()
    }

    fn shapes(ids: &[&str]) -> ShapeSet {
        ShapeSet::new(
            ids.iter()
                .map(|id| CityShape {
                    id: (*id).to_string(),
                    geometry_json: "{}".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn reports_each_kind_of_missing_join() {
        let data = dataset(&["Providence", "Warwick", ALL_AREAS, OUT_OF_STATE]);
        let pops: RegionPopulation = [("PROVIDENCE".to_string(), 179_883)]
            .into_iter()
            .collect::<std::collections::BTreeMap<_, _>>()
            .into();

        let report = check_joins(&data, &shapes(&["PROVIDENCE", "BRISTOL"]), &pops);

        assert_eq!(report.missing_shape, vec!["Warwick"]);
        assert_eq!(report.missing_population, vec!["Warwick"]);
        assert_eq!(report.unmatched_shapes, vec!["BRISTOL"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn synthetic_cities_need_no_join() {
        let data = dataset(&[ALL_AREAS, OUT_OF_STATE]);
        let report = check_joins(&data, &ShapeSet::default(), &RegionPopulation::default());
        assert!(report.is_clean(), "{report:?}");
    }
}

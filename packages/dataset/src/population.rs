//! Parsing of the population lookup (`{"City": 12345, ...}`).

use std::collections::BTreeMap;

use helpline_dataset_models::region::{RegionPopulation, join_key};

use crate::LoadError;

/// Parses the population JSON object.
///
/// Names that normalize to the same [`join_key`] collapse into one entry;
/// the last in sorted name order is kept and the others are logged.
///
/// # Errors
///
/// Returns [`LoadError::Json`] if the text is not an object of
/// non-negative integers.
pub fn parse_populations(text: &str) -> Result<RegionPopulation, LoadError> {
    let raw: BTreeMap<String, u64> = serde_json::from_str(text)?;

    for (dropped, kept) in shadowed_names(&raw) {
        log::warn!("Population entry '{dropped}' is shadowed by '{kept}'; only '{kept}' is used");
    }

    let populations = RegionPopulation::from(raw);
    for (city, pop) in populations.iter().filter(|(_, pop)| *pop == 0) {
        log::warn!("Population for {city} is {pop}; its map value cannot be normalized");
    }

    Ok(populations)
}

/// Pairs of `(dropped, kept)` names that share a join key.
fn shadowed_names(raw: &BTreeMap<String, u64>) -> Vec<(&str, &str)> {
    let mut last_by_key: BTreeMap<String, &str> = BTreeMap::new();
    let mut shadowed = Vec::new();
    for name in raw.keys() {
        if let Some(previous) = last_by_key.insert(join_key(name), name.as_str()) {
            shadowed.push(previous);
        }
    }
    shadowed
        .into_iter()
        .map(|dropped| (dropped, last_by_key[&join_key(dropped)]))
        .collect()
}

//! Region reference data: populations, map shapes and join keys.
//!
//! City names in the call table, the population lookup and the shape
//! features come from different sources and disagree on case and spacing.
//! All joins go through [`join_key`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalizes a city name for joining: whitespace runs collapse to one
/// space, the ends are trimmed, and letters are lowercased.
#[must_use]
pub fn join_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Converts a shape id such as `"NORTH PROVIDENCE"` into the city name used
/// by the table (`"North Providence"`).
#[must_use]
pub fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element id of a city's map tile: `"city"` followed by the name with its
/// first space removed, lowercased, cut to six characters.
#[must_use]
pub fn tile_id(city: &str) -> String {
    let compact: String = city.replacen(' ', "", 1).to_lowercase();
    format!("city{}", compact.chars().take(6).collect::<String>())
}

/// City name -> resident count, used to normalize map values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct RegionPopulation {
    by_key: BTreeMap<String, (String, u64)>,
}

impl RegionPopulation {
    /// Population of `city`, matched by [`join_key`].
    #[must_use]
    pub fn get(&self, city: &str) -> Option<u64> {
        self.by_key.get(&join_key(city)).map(|(_, pop)| *pop)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Iterates `(name, population)` using the names as loaded.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.by_key.values().map(|(name, pop)| (name.as_str(), *pop))
    }
}

impl From<BTreeMap<String, u64>> for RegionPopulation {
    fn from(value: BTreeMap<String, u64>) -> Self {
        let by_key = value
            .into_iter()
            .map(|(name, pop)| (join_key(&name), (name, pop)))
            .collect();
        Self { by_key }
    }
}

impl From<RegionPopulation> for BTreeMap<String, u64> {
    fn from(value: RegionPopulation) -> Self {
        value.by_key.into_values().collect()
    }
}

/// One polygon feature of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityShape {
    /// City id as stored on the feature.
    pub id: String,
    /// Serialized `GeoJSON` geometry.
    pub geometry_json: String,
}

/// Read-only set of map shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShapeSet {
    shapes: Vec<CityShape>,
}

impl ShapeSet {
    /// Wraps loaded shapes.
    #[must_use]
    pub const fn new(shapes: Vec<CityShape>) -> Self {
        Self { shapes }
    }

    /// All shapes in load order.
    #[must_use]
    pub fn shapes(&self) -> &[CityShape] {
        &self.shapes
    }

    /// Finds the shape for `city`, matched by [`join_key`].
    #[must_use]
    pub fn find(&self, city: &str) -> Option<&CityShape> {
        let key = join_key(city);
        self.shapes.iter().find(|s| join_key(&s.id) == key)
    }

    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns `true` if there are no shapes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Cities that failed to join across the table, shapes and populations.
///
/// Synthetic cities never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    /// Table cities with no map shape.
    pub missing_shape: Vec<String>,
    /// Table cities with no population entry.
    pub missing_population: Vec<String>,
    /// Shape ids with no rows in the table.
    pub unmatched_shapes: Vec<String>,
}

impl JoinReport {
    /// Returns `true` if every join succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing_shape.is_empty()
            && self.missing_population.is_empty()
            && self.unmatched_shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_key_ignores_case_and_spacing() {
        assert_eq!(join_key("  North   Providence "), "north providence");
        assert_eq!(join_key("NORTH PROVIDENCE"), join_key("North Providence"));
    }

    #[test]
    fn title_case_shape_ids() {
        assert_eq!(title_case("NORTH PROVIDENCE"), "North Providence");
        assert_eq!(title_case("warwick"), "Warwick");
    }

    #[test]
    fn tile_ids_match_map_elements() {
        assert_eq!(tile_id("Providence"), "cityprovid");
        assert_eq!(tile_id("North Providence"), "citynorthp");
        assert_eq!(tile_id("Bristol"), "citybristo");
        assert_eq!(tile_id("West Warwick Town"), "citywestwa");
    }

    #[test]
    fn population_lookup_uses_join_key() {
        let pops: RegionPopulation = serde_json::from_str(r#"{"North Providence": 32000}"#).unwrap();
        assert_eq!(pops.get("NORTH  PROVIDENCE"), Some(32_000));
        assert_eq!(pops.get("Providence"), None);
        assert_eq!(pops.iter().next(), Some(("North Providence", 32_000)));
    }

    #[test]
    fn shape_lookup_uses_join_key() {
        let shapes = ShapeSet::new(vec![CityShape {
            id: "EAST GREENWICH".to_string(),
            geometry_json: "{}".to_string(),
        }]);
        assert!(shapes.find("East Greenwich").is_some());
        assert!(shapes.find("Greenwich").is_none());
    }
}

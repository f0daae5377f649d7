//! Parsing of the map's city polygons.
//!
//! Input is a `GeoJSON` `FeatureCollection` (or a single `Feature`). The
//! city id comes from the feature `id`, falling back to an `id`, `name` or
//! `NAME` property. Features without an id or geometry are skipped.

use geojson::{Feature, GeoJson, feature::Id};
use helpline_dataset_models::region::{CityShape, ShapeSet};

use crate::LoadError;

/// Property names tried, in order, when a feature has no top-level id.
const ID_PROPERTIES: &[&str] = &["id", "name", "NAME"];

fn feature_id(feature: &Feature) -> Option<String> {
    let id = match &feature.id {
        Some(Id::String(s)) => Some(s.clone()),
        Some(Id::Number(n)) => Some(n.to_string()),
        None => ID_PROPERTIES
            .iter()
            .find_map(|key| feature.property(key).and_then(serde_json::Value::as_str))
            .map(str::to_string),
    }?;

    let id = id.trim().to_string();
    if id.is_empty() { None } else { Some(id) }
}

/// Parses `GeoJSON` text into a [`ShapeSet`].
///
/// # Errors
///
/// Returns [`LoadError::GeoJson`] if the text is not valid `GeoJSON`, or
/// [`LoadError::Format`] if it is a bare geometry rather than features.
pub fn parse_shapes(text: &str) -> Result<ShapeSet, LoadError> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(LoadError::Format {
                message: "Expected a GeoJSON FeatureCollection, found a bare geometry".to_string(),
            });
        }
    };

    let mut shapes = Vec::with_capacity(features.len());
    for feature in &features {
        let Some(id) = feature_id(feature) else {
            log::debug!("Skipping shape feature without an id");
            continue;
        };
        let Some(geometry) = &feature.geometry else {
            log::warn!("Skipping shape '{id}': feature has no geometry");
            continue;
        };

        shapes.push(CityShape {
            id,
            geometry_json: serde_json::to_string(geometry)?,
        });
    }

    log::debug!(
        "Parsed {} of {} shape features",
        shapes.len(),
        features.len()
    );

    Ok(ShapeSet::new(shapes))
}

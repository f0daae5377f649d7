//! Ordinal category color scale.
//!
//! Colors are handed out in taxonomy order (majors first, then minors) from
//! a fixed palette, wrapping around when there are more labels than colors.
//! Building the scale from a [`CategoryTaxonomy`] value keeps the chart
//! stack and the legend on the same mapping across re-renders.

use helpline_category_models::CategoryTaxonomy;

/// Category palette, in assignment order.
pub const PALETTE: &[&str] = &[
    "#114d93", "#2eb09f", "#1272e0", "#7ea4cf", "#e6001f", "#fc951e", "#5ae8d5", "#b0c94d",
    "#ad3b4a", "#eb6073",
];

/// Deterministic label -> color mapping for one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColors {
    entries: Vec<(String, &'static str)>,
}

impl CategoryColors {
    /// Builds the scale for every label in `taxonomy`.
    #[must_use]
    pub fn new(taxonomy: &CategoryTaxonomy) -> Self {
        let entries = taxonomy
            .all()
            .enumerate()
            .map(|(i, label)| (label.to_string(), PALETTE[i % PALETTE.len()]))
            .collect();
        Self { entries }
    }

    /// Returns the color assigned to `label`, or `None` for labels outside
    /// the taxonomy.
    #[must_use]
    pub fn color_for(&self, label: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, color)| *color)
    }
}

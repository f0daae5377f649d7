#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Call category taxonomy types.
//!
//! Every call in the dataset is tagged with category labels drawn from a
//! two-level taxonomy. Major categories are mutually exclusive; minor
//! categories are finer-grained and may overlap a major category for the
//! same call. Views that show "all categories" at once only ever use the
//! major list so that no call is counted twice.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label of the category filter that selects every major category.
///
/// The input table also uses this label as the `type` of the pre-aggregated
/// rows where each call is counted once regardless of how many categories
/// it falls under.
pub const ALL_CATEGORIES: &str = "All Categories";

/// Which half of the taxonomy a category label belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoryGroup {
    /// Top-level, mutually exclusive call reasons.
    Major,
    /// Finer-grained labels that may overlap a major category.
    Minor,
}

impl CategoryGroup {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Major, Self::Minor]
    }
}

/// Serialized form of a [`CategoryTaxonomy`], as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDefinition {
    /// Ordered major category labels.
    pub major: Vec<String>,
    /// Ordered minor category labels.
    #[serde(default)]
    pub minor: Vec<String>,
}

/// Validated category taxonomy.
///
/// Both lists keep their declared order, which drives stacking order and
/// color assignment. No label appears twice across the two lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDefinition", into = "TaxonomyDefinition")]
pub struct CategoryTaxonomy {
    major: Vec<String>,
    minor: Vec<String>,
}

impl CategoryTaxonomy {
    /// Builds a taxonomy from ordered major and minor label lists.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTaxonomyError`] if the major list is empty, a label
    /// is blank, a label is the reserved [`ALL_CATEGORIES`] value, or any
    /// label appears more than once across both lists.
    pub fn new(major: Vec<String>, minor: Vec<String>) -> Result<Self, InvalidTaxonomyError> {
        if major.is_empty() {
            return Err(InvalidTaxonomyError::NoMajorCategories);
        }

        let mut seen = std::collections::BTreeSet::new();
        for label in major.iter().chain(&minor) {
            if label.trim().is_empty() {
                return Err(InvalidTaxonomyError::BlankLabel);
            }
            if label == ALL_CATEGORIES {
                return Err(InvalidTaxonomyError::ReservedLabel(label.clone()));
            }
            if !seen.insert(label.as_str()) {
                return Err(InvalidTaxonomyError::DuplicateLabel(label.clone()));
            }
        }

        Ok(Self { major, minor })
    }

    /// Major category labels in display order.
    #[must_use]
    pub fn major(&self) -> &[String] {
        &self.major
    }

    /// Minor category labels in display order.
    #[must_use]
    pub fn minor(&self) -> &[String] {
        &self.minor
    }

    /// All labels, majors first, each in declared order.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.major.iter().chain(&self.minor).map(String::as_str)
    }

    /// Number of labels across both groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.major.len() + self.minor.len()
    }

    /// Always `false`: a valid taxonomy has at least one major category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty()
    }

    /// Returns which group `label` belongs to, if any.
    #[must_use]
    pub fn group_of(&self, label: &str) -> Option<CategoryGroup> {
        if self.major.iter().any(|l| l == label) {
            Some(CategoryGroup::Major)
        } else if self.minor.iter().any(|l| l == label) {
            Some(CategoryGroup::Minor)
        } else {
            None
        }
    }

    /// Labels belonging to `group`.
    #[must_use]
    pub fn labels(&self, group: CategoryGroup) -> &[String] {
        match group {
            CategoryGroup::Major => &self.major,
            CategoryGroup::Minor => &self.minor,
        }
    }
}

impl TryFrom<TaxonomyDefinition> for CategoryTaxonomy {
    type Error = InvalidTaxonomyError;

    fn try_from(value: TaxonomyDefinition) -> Result<Self, Self::Error> {
        Self::new(value.major, value.minor)
    }
}

impl From<CategoryTaxonomy> for TaxonomyDefinition {
    fn from(value: CategoryTaxonomy) -> Self {
        Self {
            major: value.major,
            minor: value.minor,
        }
    }
}

/// Error returned when a taxonomy definition is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTaxonomyError {
    /// The major list is empty.
    NoMajorCategories,
    /// A label is empty or whitespace.
    BlankLabel,
    /// A label collides with [`ALL_CATEGORIES`].
    ReservedLabel(String),
    /// A label appears more than once across major and minor.
    DuplicateLabel(String),
}

impl std::fmt::Display for InvalidTaxonomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMajorCategories => write!(f, "taxonomy has no major categories"),
            Self::BlankLabel => write!(f, "taxonomy contains a blank category label"),
            Self::ReservedLabel(label) => {
                write!(f, "category label '{label}' is reserved")
            }
            Self::DuplicateLabel(label) => {
                write!(f, "category label '{label}' appears more than once")
            }
        }
    }
}

impl std::error::Error for InvalidTaxonomyError {}

/// The category half of a dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    /// Every major category, stacked.
    #[default]
    All,
    /// One category label, major or minor.
    Single(String),
}

impl CategoryFilter {
    /// Returns the label used to select rows from the table.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Single(label) => label,
        }
    }

    /// Returns `true` for [`CategoryFilter::All`].
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Single(value.to_string())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Single(value)
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Single(label) => label,
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

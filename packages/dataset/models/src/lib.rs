#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory call-count table and region reference data.
//!
//! The table is "wide": one row per `(city, category)` pair and one column
//! per day. Every row shares a single [`DateAxis`], so index `i` of any
//! row's values is the count for `axis[i]`. The whole dataset is built once
//! at load time and never mutated afterwards.

pub mod region;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Synthetic city whose rows hold the per-category sum over every other
/// city, `Other` included.
pub const ALL_AREAS: &str = "All Areas";

/// Synthetic city for out-of-state calls and calls with unknown location.
pub const OUT_OF_STATE: &str = "Other";

/// Returns `true` for the synthetic cities that have no map tile.
#[must_use]
pub fn is_synthetic_city(city: &str) -> bool {
    city == ALL_AREAS || city == OUT_OF_STATE
}

/// Inclusive first/last date available in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First date on the axis.
    pub min: NaiveDate,
    /// Last date on the axis.
    pub max: NaiveDate,
}

/// Strictly increasing sequence of calendar dates shared by every row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    /// Builds an axis, checking that dates are strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnorderedAxis`] at the first date that is
    /// not after its predecessor.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, DatasetError> {
        if let Some(index) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DatasetError::UnorderedAxis {
                index: index + 1,
                date: dates[index + 1],
            });
        }
        Ok(Self { dates })
    }

    /// Number of days on the axis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns `true` if the axis has no dates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// All dates in order.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Position of `date` if it is on the axis verbatim.
    #[must_use]
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// First and last date, or `None` for an empty axis.
    #[must_use]
    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange {
            min: *self.dates.first()?,
            max: *self.dates.last()?,
        })
    }
}

impl TryFrom<Vec<NaiveDate>> for DateAxis {
    type Error = DatasetError;

    fn try_from(value: Vec<NaiveDate>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DateAxis> for Vec<NaiveDate> {
    fn from(value: DateAxis) -> Self {
        value.dates
    }
}

/// Daily counts for one `(city, category)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// City name, or one of the synthetic cities.
    pub city: String,
    /// Category label (the `type` column of the table).
    pub category: String,
    /// One count per axis date.
    pub values: Vec<u64>,
}

/// Immutable wide table keyed by `(city, category)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    axis: DateAxis,
    rows: Vec<Row>,
    index: BTreeMap<(String, String), usize>,
}

impl Dataset {
    /// Builds a dataset, checking row lengths and key uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::LengthMismatch`] if any row's values differ in
    /// length from the axis, or [`DatasetError::DuplicateRow`] if a
    /// `(city, category)` pair occurs twice.
    pub fn new(axis: DateAxis, rows: Vec<Row>) -> Result<Self, DatasetError> {
        let mut index = BTreeMap::new();

        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != axis.len() {
                return Err(DatasetError::LengthMismatch {
                    city: row.city.clone(),
                    category: row.category.clone(),
                    expected: axis.len(),
                    actual: row.values.len(),
                });
            }
            if index
                .insert((row.city.clone(), row.category.clone()), i)
                .is_some()
            {
                return Err(DatasetError::DuplicateRow {
                    city: row.city.clone(),
                    category: row.category.clone(),
                });
            }
        }

        Ok(Self { axis, rows, index })
    }

    /// The shared date axis.
    #[must_use]
    pub const fn axis(&self) -> &DateAxis {
        &self.axis
    }

    /// First and last available date.
    #[must_use]
    pub fn date_range(&self) -> Option<DateRange> {
        self.axis.range()
    }

    /// All rows in load order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Looks up the row for an exact `(city, category)` pair.
    #[must_use]
    pub fn row(&self, city: &str, category: &str) -> Option<&Row> {
        self.index
            .get(&(city.to_string(), category.to_string()))
            .map(|&i| &self.rows[i])
    }

    /// Rows whose category equals `category`, in load order.
    pub fn rows_for_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Row> {
        self.rows.iter().filter(move |r| r.category == category)
    }

    /// Distinct city names, sorted.
    #[must_use]
    pub fn cities(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.city.as_str()).collect()
    }

    /// Checks that each category's [`ALL_AREAS`] row equals the sum of that
    /// category's other rows at every date.
    ///
    /// Categories without an `All Areas` row are skipped. Returns one issue
    /// per mismatching `(category, date)`.
    #[must_use]
    pub fn check_consistency(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for total_row in self.rows.iter().filter(|r| r.city == ALL_AREAS) {
            let mut summed = vec![0u64; self.axis.len()];
            for row in self
                .rows_for_category(&total_row.category)
                .filter(|r| r.city != ALL_AREAS)
            {
                for (acc, v) in summed.iter_mut().zip(&row.values) {
                    *acc += v;
                }
            }

            for (i, (&expected, &actual)) in summed.iter().zip(&total_row.values).enumerate() {
                if expected != actual {
                    issues.push(ConsistencyIssue {
                        category: total_row.category.clone(),
                        date: self.axis.dates()[i],
                        all_areas: actual,
                        summed: expected,
                    });
                }
            }
        }

        issues
    }
}

/// A date where an [`ALL_AREAS`] row disagrees with its city rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    /// Category of the mismatching rows.
    pub category: String,
    /// Date of the mismatch.
    pub date: NaiveDate,
    /// Value stored in the `All Areas` row.
    pub all_areas: u64,
    /// Sum over the other cities.
    pub summed: u64,
}

/// Structural problems that prevent building a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// The date at `index` is not after the previous date.
    UnorderedAxis {
        /// Axis position of the offending date.
        index: usize,
        /// The offending date.
        date: NaiveDate,
    },
    /// A row has a different number of values than the axis has dates.
    LengthMismatch {
        /// City of the row.
        city: String,
        /// Category of the row.
        category: String,
        /// Axis length.
        expected: usize,
        /// Row length.
        actual: usize,
    },
    /// The same `(city, category)` pair appears twice.
    DuplicateRow {
        /// City of the row.
        city: String,
        /// Category of the row.
        category: String,
    },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnorderedAxis { index, date } => write!(
                f,
                "date axis is not strictly increasing at column {index} ({date})"
            ),
            Self::LengthMismatch {
                city,
                category,
                expected,
                actual,
            } => write!(
                f,
                "row ({city}, {category}) has {actual} values, expected {expected}"
            ),
            Self::DuplicateRow { city, category } => {
                write!(f, "duplicate row for ({city}, {category})")
            }
        }
    }
}

impl std::error::Error for DatasetError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, day).unwrap()
    }

    fn axis(days: u32) -> DateAxis {
        DateAxis::new((1..=days).map(date).collect()).unwrap()
    }

    fn row(city: &str, category: &str, values: &[u64]) -> Row {
        Row {
            city: city.to_string(),
            category: category.to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn axis_rejects_out_of_order_dates() {
        let err = DateAxis::new(vec![date(1), date(3), date(2)]).unwrap_err();
        assert_eq!(
            err,
            DatasetError::UnorderedAxis {
                index: 2,
                date: date(2)
            }
        );
        assert!(DateAxis::new(vec![date(1), date(1)]).is_err());
    }

    #[test]
    fn axis_lookup_and_range() {
        let axis = axis(31);
        assert_eq!(axis.index_of(date(1)), Some(0));
        assert_eq!(axis.index_of(date(31)), Some(30));
        assert_eq!(
            axis.index_of(NaiveDate::from_ymd_opt(2020, 2, 15).unwrap()),
            None
        );
        let range = axis.range().unwrap();
        assert_eq!((range.min, range.max), (date(1), date(31)));
        assert!(DateAxis::default().range().is_none());
    }

    #[test]
    fn dataset_rejects_short_row() {
        let err = Dataset::new(axis(3), vec![row("Providence", "Food", &[1, 2])]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn dataset_rejects_duplicate_key() {
        let err = Dataset::new(
            axis(1),
            vec![row("Providence", "Food", &[1]), row("Providence", "Food", &[2])],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateRow { .. }));
    }

    #[test]
    fn consistency_check_flags_mismatched_dates() {
        let dataset = Dataset::new(
            axis(2),
            vec![
                row("Providence", "Food", &[1, 2]),
                row("Warwick", "Food", &[3, 4]),
                row(OUT_OF_STATE, "Food", &[1, 1]),
                row(ALL_AREAS, "Food", &[5, 8]),
            ],
        )
        .unwrap();

        let issues = dataset.check_consistency();
        assert_eq!(issues.len(), 1, "only the second date disagrees: {issues:?}");
        assert_eq!(issues[0].date, date(2));
        assert_eq!(issues[0].all_areas, 8);
        assert_eq!(issues[0].summed, 7);
    }

    #[test]
    fn lookups_by_key_and_category() {
        let dataset = Dataset::new(
            axis(1),
            vec![
                row("Providence", "Food", &[1]),
                row("Providence", "Housing", &[2]),
                row("Warwick", "Food", &[3]),
            ],
        )
        .unwrap();

        assert_eq!(dataset.row("Warwick", "Food").unwrap().values, vec![3]);
        assert!(dataset.row("Warwick", "Housing").is_none());
        assert_eq!(dataset.rows_for_category("Food").count(), 2);
        assert_eq!(
            dataset.cities().into_iter().collect::<Vec<_>>(),
            vec!["Providence", "Warwick"]
        );
    }

    #[test]
    fn synthetic_cities() {
        assert!(is_synthetic_city(ALL_AREAS));
        assert!(is_synthetic_city(OUT_OF_STATE));
        assert!(!is_synthetic_city("Providence"));
    }
}

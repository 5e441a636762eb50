//! Deterministic label-to-code mappings for categorical columns.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// The two categorical columns of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColumn {
    /// Activity type (`Tipo`).
    ActivityType,
    /// Time of day the activity happens (`Momento`).
    TimeOfDay,
}

impl CategoryColumn {
    /// Header name of the column in the input file.
    pub const fn header(self) -> &'static str {
        match self {
            Self::ActivityType => "Tipo",
            Self::TimeOfDay => "Momento",
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Bijection from the distinct labels of one column to codes `1..=N`.
///
/// Labels are kept in natural string order and a label's code is its
/// position in that order plus one. The order depends only on the set of
/// labels, never on the row order they were observed in, so building a
/// mapping twice from the same data yields identical codes.
///
/// Serializes as the sorted label list. Deserialization re-sorts and
/// de-duplicates, so a hand-edited list cannot break the code invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", from = "Vec<String>")]
pub struct CategoryMapping {
    labels: IndexSet<String>,
}

impl CategoryMapping {
    /// Builds a mapping from every observed value of a column.
    ///
    /// Duplicates are collapsed; the input order is irrelevant.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_owned())
            .collect();
        Self {
            labels: distinct.into_iter().collect(),
        }
    }

    /// Returns the code assigned to `label`, or `None` if it was never
    /// observed.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.labels
            .get_index_of(label)
            .and_then(|idx| u32::try_from(idx + 1).ok())
    }

    /// Number of distinct labels (also the largest code).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in code order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// `(label, code)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.labels().zip(1..)
    }
}

impl From<Vec<String>> for CategoryMapping {
    fn from(labels: Vec<String>) -> Self {
        Self::from_values(labels)
    }
}

impl From<CategoryMapping> for Vec<String> {
    fn from(mapping: CategoryMapping) -> Self {
        mapping.labels.into_iter().collect()
    }
}

/// The mappings for both categorical columns, derived from one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMappings {
    /// Codes for the `Tipo` column.
    pub activity_type: CategoryMapping,
    /// Codes for the `Momento` column.
    pub time_of_day: CategoryMapping,
}

impl CategoryMappings {
    /// Returns the mapping for `column`.
    pub fn for_column(&self, column: CategoryColumn) -> &CategoryMapping {
        match column {
            CategoryColumn::ActivityType => &self.activity_type,
            CategoryColumn::TimeOfDay => &self.time_of_day,
        }
    }
}

//! Categorical encoding.
//!
//! Each categorical column's distinct values are sorted in natural string
//! order and numbered from 1. The mappings derived from the dataset are the
//! only encoding used, both for training rows and for inference requests.

use costpred_schemas::{
    CategoryColumn, CategoryMapping, CategoryMappings, FeatureRequest,
    FeatureVector,
};
use tracing::debug;

use crate::error::PipelineError;
use crate::loader::{Record, Table};

/// A dataset row with its two category codes appended.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    pub record: Record,
    pub activity_code: u32,
    pub moment_code: u32,
}

impl EncodedRow {
    /// The five model predictors for this row.
    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            budget: self.record.budget,
            time_invested: self.record.time_invested,
            activity_code: f64::from(self.activity_code),
            moment_code: f64::from(self.moment_code),
            people_count: self.record.people_count,
        }
    }

    /// The regression target.
    pub fn target(&self) -> f64 {
        self.record.cost
    }
}

/// The dataset after encoding, together with the mappings used.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub mappings: CategoryMappings,
    pub rows: Vec<EncodedRow>,
}

/// Derives the category mappings of a dataset.
pub fn derive_mappings(table: &Table) -> CategoryMappings {
    CategoryMappings {
        activity_type: CategoryMapping::from_values(
            table.records.iter().map(|r| &r.activity_type),
        ),
        time_of_day: CategoryMapping::from_values(
            table.records.iter().map(|r| &r.time_of_day),
        ),
    }
}

/// Derives the mappings and appends both code columns to every row.
pub fn encode(table: &Table) -> Result<EncodedTable, PipelineError> {
    let mappings = derive_mappings(table);
    debug!(
        activity_type = ?mappings.activity_type.iter().collect::<Vec<_>>(),
        time_of_day = ?mappings.time_of_day.iter().collect::<Vec<_>>(),
        "derived category mappings"
    );

    let rows = table
        .records
        .iter()
        .map(|record| {
            Ok(EncodedRow {
                activity_code: code_for(
                    &mappings,
                    CategoryColumn::ActivityType,
                    &record.activity_type,
                )?,
                moment_code: code_for(
                    &mappings,
                    CategoryColumn::TimeOfDay,
                    &record.time_of_day,
                )?,
                record: record.clone(),
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(EncodedTable { mappings, rows })
}

/// Converts a user request into a feature vector.
///
/// Fails with an unknown-category error if either label is absent from the
/// mappings; there is no fallback code.
pub fn encode_request(
    mappings: &CategoryMappings,
    request: &FeatureRequest,
) -> Result<FeatureVector, PipelineError> {
    let activity_code = code_for(
        mappings,
        CategoryColumn::ActivityType,
        &request.activity_type,
    )?;
    let moment_code =
        code_for(mappings, CategoryColumn::TimeOfDay, &request.time_of_day)?;

    Ok(FeatureVector {
        budget: request.budget,
        time_invested: request.time_invested,
        activity_code: f64::from(activity_code),
        moment_code: f64::from(moment_code),
        people_count: request.people_count,
    })
}

fn code_for(
    mappings: &CategoryMappings,
    column: CategoryColumn,
    label: &str,
) -> Result<u32, PipelineError> {
    mappings
        .for_column(column)
        .code(label)
        .ok_or_else(|| PipelineError::unknown_category(column, label))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn record(activity_type: &str, time_of_day: &str, cost: f64) -> Record {
        Record {
            budget: 100.0,
            time_invested: 2.0,
            activity_type: activity_type.into(),
            time_of_day: time_of_day.into(),
            people_count: 2.0,
            cost,
        }
    }

    fn sample_table() -> Table {
        Table::from_iter([
            record("Trabajo", "Noche", 10.0),
            record("Ocio", "Mañana", 20.0),
            record("Trabajo", "Mañana", 30.0),
            record("Ocio", "Noche", 40.0),
        ])
    }

    fn request(activity_type: &str, time_of_day: &str) -> FeatureRequest {
        FeatureRequest {
            budget: 50.0,
            time_invested: 1.5,
            activity_type: activity_type.into(),
            time_of_day: time_of_day.into(),
            people_count: 3.0,
        }
    }

    #[test]
    fn scenario_codes_are_alphabetical() {
        let mappings = derive_mappings(&sample_table());

        assert_eq!(mappings.activity_type.code("Ocio"), Some(1));
        assert_eq!(mappings.activity_type.code("Trabajo"), Some(2));
        assert_eq!(mappings.time_of_day.code("Mañana"), Some(1));
        assert_eq!(mappings.time_of_day.code("Noche"), Some(2));
    }

    #[test]
    fn encode_appends_codes_to_every_row() {
        let encoded = encode(&sample_table()).unwrap();
        let codes: Vec<(u32, u32)> = encoded
            .rows
            .iter()
            .map(|r| (r.activity_code, r.moment_code))
            .collect();
        assert_eq!(codes, vec![(2, 2), (1, 1), (2, 1), (1, 2)]);

        let fv = encoded.rows[0].features();
        assert_eq!(fv.to_array(), [100.0, 2.0, 2.0, 2.0, 2.0]);
        assert!((encoded.rows[3].target() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn encode_twice_is_identical() {
        let table = sample_table();
        assert_eq!(encode(&table).unwrap(), encode(&table).unwrap());
    }

    #[test]
    fn request_is_encoded_with_dataset_codes() {
        let mappings = derive_mappings(&sample_table());
        let fv = encode_request(&mappings, &request("Trabajo", "Mañana"))
            .unwrap();
        assert_eq!(fv.to_array(), [50.0, 1.5, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn unknown_activity_type_is_rejected() {
        let mappings = derive_mappings(&sample_table());
        let err = encode_request(&mappings, &request("Inexistente", "Noche"))
            .unwrap_err();
        assert!(err.is_unknown_category());
        assert!(err.to_string().contains("Tipo"));
    }

    #[test]
    fn unknown_time_of_day_is_rejected() {
        let mappings = derive_mappings(&sample_table());
        let err =
            encode_request(&mappings, &request("Ocio", "Tarde")).unwrap_err();
        assert!(err.is_unknown_category());
        assert!(err.to_string().contains("Momento"));
    }

    #[test]
    fn labels_are_case_sensitive() {
        let mappings = derive_mappings(&sample_table());
        let err =
            encode_request(&mappings, &request("ocio", "Noche")).unwrap_err();
        assert!(err.is_unknown_category());
    }

    proptest! {
        /// Reversing the row order never changes the derived mappings.
        #[test]
        fn mappings_independent_of_row_order(
            labels in prop::collection::vec(
                ("[A-Z][a-z]{0,6}", "[A-Z][a-z]{0,6}"),
                1..30,
            ),
        ) {
            let table: Table = labels
                .iter()
                .map(|(t, m)| record(t, m, 1.0))
                .collect();
            let reversed: Table = labels
                .iter()
                .rev()
                .map(|(t, m)| record(t, m, 1.0))
                .collect();
            prop_assert_eq!(
                derive_mappings(&table),
                derive_mappings(&reversed)
            );
        }
    }
}

//! Model inputs: raw user requests and their encoded feature vectors.

use serde::{Deserialize, Serialize};

/// Number of predictors consumed by the model.
pub const FEATURE_COUNT: usize = 5;

/// Predictor names in model order. The two code columns are derived from
/// `Tipo` and `Momento` by the encoder.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Presupuesto",
    "Tiempo invertido",
    "Tipo_cod",
    "Momento_cod",
    "No. de personas",
];

/// One prediction request as supplied by a user.
///
/// The categorical fields carry labels; they become integer codes only
/// after validation against the dataset's category mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Budget of the activity.
    pub budget: f64,
    /// Time invested in the activity.
    pub time_invested: f64,
    /// Activity type label (a `Tipo` value).
    pub activity_type: String,
    /// Time of day label (a `Momento` value).
    pub time_of_day: String,
    /// Number of people sharing the expense.
    pub people_count: f64,
}

/// Fixed-order numeric inputs for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub budget: f64,
    pub time_invested: f64,
    /// Code of the activity type.
    pub activity_code: f64,
    /// Code of the time of day.
    pub moment_code: f64,
    pub people_count: f64,
}

impl FeatureVector {
    /// Returns the features in `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.budget,
            self.time_invested,
            self.activity_code,
            self.moment_code,
            self.people_count,
        ]
    }

    /// Builds a vector from values in `FEATURE_NAMES` order.
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [budget, time_invested, activity_code, moment_code, people_count] =
            values;
        Self {
            budget,
            time_invested,
            activity_code,
            moment_code,
            people_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_order_matches_feature_names() {
        let fv = FeatureVector {
            budget: 1.0,
            time_invested: 2.0,
            activity_code: 3.0,
            moment_code: 4.0,
            people_count: 5.0,
        };
        assert_eq!(fv.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(FeatureVector::from_array(fv.to_array()), fv);
        assert_eq!(FEATURE_NAMES[2], "Tipo_cod");
    }

    #[test]
    fn request_uses_snake_case_fields() {
        let json = r#"{
            "budget": 120.0,
            "time_invested": 2.5,
            "activity_type": "Ocio",
            "time_of_day": "Noche",
            "people_count": 3
        }"#;
        let req: FeatureRequest =
            serde_json::from_str(json).expect("valid request JSON");
        assert_eq!(req.activity_type, "Ocio");
        assert!((req.people_count - 3.0).abs() < f64::EPSILON);
    }
}

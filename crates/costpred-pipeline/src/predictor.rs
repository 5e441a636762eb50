//! Prediction from a fitted model.

use costpred_schemas::{
    ClampPolicy, CostModel, FeatureRequest, FeatureVector, Prediction,
};

use crate::config::{InputBounds, NumericRange};
use crate::error::{PipelineError, PipelineErrorKind};

/// Applies the model to one feature vector.
///
/// `raw` is always the exact dot product plus intercept; `value` is `raw`
/// after `policy`.
pub fn predict(
    model: &CostModel,
    features: &FeatureVector,
    policy: ClampPolicy,
) -> Prediction {
    Prediction::from_raw(model.predict(features), policy)
}

/// Rejects requests whose numeric fields fall outside `bounds`.
///
/// Runs before category encoding, so an out-of-range request never reaches
/// the model.
pub fn validate_bounds(
    request: &FeatureRequest,
    bounds: &InputBounds,
) -> Result<(), PipelineError> {
    check("budget", request.budget, bounds.budget)?;
    check("time_invested", request.time_invested, bounds.time_invested)?;
    check("people_count", request.people_count, bounds.people_count)
}

fn check(
    field: &'static str,
    value: f64,
    range: NumericRange,
) -> Result<(), PipelineError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(PipelineError::new(PipelineErrorKind::InvalidInputRange {
            field,
            value,
            min: range.min,
            max: range.max,
        }))
    }
}

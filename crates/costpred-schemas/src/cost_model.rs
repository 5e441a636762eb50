//! Fitted linear cost model and prediction results.
//!
//! The `CostModel` stores the least-squares coefficients in
//! `FEATURE_NAMES` order plus an intercept:
//!
//! ```text
//! cost = intercept
//!      + c0 * budget + c1 * time_invested
//!      + c2 * activity_code + c3 * moment_code
//!      + c4 * people_count
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CategoryMappings, FEATURE_COUNT, FEATURE_NAMES, FeatureVector};

/// Linear model mapping a `FeatureVector` to a cost.
///
/// Immutable once fit. Named fields ensure schema mismatches fail at
/// deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Coefficients in `FEATURE_NAMES` order.
    pub coefficients: [f64; FEATURE_COUNT],
    /// Constant term.
    pub intercept: f64,
}

impl CostModel {
    /// Raw prediction: dot product of coefficients and features plus the
    /// intercept. No clamping.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features.to_array())
            .map(|(coeff, x)| coeff * x)
            .sum();
        dot + self.intercept
    }

    /// `(feature name, coefficient)` pairs in model order.
    pub fn named_coefficients(
        &self,
    ) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.into_iter().zip(self.coefficients)
    }
}

/// What to do with negative raw predictions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ClampPolicy {
    /// Report negative predictions as zero. Costs are non-negative.
    #[default]
    ClampNegative,
    /// Report the raw dot product unchanged.
    Raw,
}

impl ClampPolicy {
    /// Applies the policy to a raw prediction.
    ///
    /// `ClampNegative` also maps `-0.0` to `0.0`.
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            Self::ClampNegative if raw <= 0.0 => 0.0,
            Self::ClampNegative | Self::Raw => raw,
        }
    }
}

/// Result of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted cost after the clamp policy.
    pub value: f64,
    /// Unclamped model output, for diagnostics.
    pub raw: f64,
}

impl Prediction {
    pub fn from_raw(raw: f64, policy: ClampPolicy) -> Self {
        Self {
            value: policy.apply(raw),
            raw,
        }
    }

    /// Whether the clamp policy changed the raw value.
    pub fn was_clamped(&self) -> bool {
        self.value.to_bits() != self.raw.to_bits()
    }
}

impl fmt::Display for Prediction {
    /// Formats the predicted cost with two decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.value)
    }
}

/// Goodness-of-fit statistics from training.
///
/// The held-out fields are `None` when training used the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Rows used to fit the model.
    pub train_rows: usize,
    /// Rows held out for evaluation.
    pub test_rows: usize,
    /// Seed of the train/test shuffle.
    pub seed: u64,
    /// R² on the training rows.
    pub train_r_squared: f64,
    /// R² on the held-out rows.
    pub test_r_squared: Option<f64>,
    /// Root mean squared error on the held-out rows.
    pub test_rmse: Option<f64>,
    /// Mean absolute error on the held-out rows.
    pub test_mae: Option<f64>,
}

/// Everything a client needs to describe a trained predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: CostModel,
    pub mappings: CategoryMappings,
    pub report: FitReport,
}

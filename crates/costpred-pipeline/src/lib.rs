//! Activity cost prediction pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! load_table -> Table -> encode -> EncodedTable -> train -> TrainedModel
//! FeatureRequest -> validate_bounds -> encode_request -> predict -> Prediction
//! ```
//!
//! Each stage is a pure function of its inputs (given a fixed seed) and
//! returns an explicit value object. [`CostPredictor`] runs the first three
//! stages once and then answers any number of prediction requests without
//! retraining. It holds no mutable state, so one instance can be shared
//! behind an `Arc` by concurrent request handlers.
//!
//! ## Prediction policy
//!
//! Requests are validated in a fixed order: numeric bounds first, then the
//! category labels against the dataset's mappings, then the model is applied
//! and the configured [`ClampPolicy`] decides whether negative raw values are
//! reported as zero. Both the clamped and raw value are returned.

mod config;
mod encoder;
mod error;
mod loader;
mod predictor;
mod report;
mod trainer;

use costpred_schemas::{
    CategoryMappings, ClampPolicy, CostModel, FeatureRequest, FitReport,
    ModelSummary, Prediction,
};
use tracing::{debug, instrument};

pub use config::{
    DEFAULT_DATA_PATH, DEFAULT_SEED, DEFAULT_TEST_FRACTION, InputBounds,
    LoadOptions, NumericRange, PipelineConfig, TextEncoding, TrainOptions,
};
pub use encoder::{
    EncodedRow, EncodedTable, derive_mappings, encode, encode_request,
};
pub use error::PipelineError;
pub use loader::{
    ACTIVITY_TYPE_COLUMN, BUDGET_COLUMN, COST_COLUMN, PEOPLE_COUNT_COLUMN,
    Record, TIME_INVESTED_COLUMN, TIME_OF_DAY_COLUMN, Table, load_table,
    read_table,
};
pub use predictor::{predict, validate_bounds};
pub use trainer::{Split, TrainedModel, split_indices, train};

/// A trained, read-only predictor built once from a dataset.
#[derive(Debug, Clone)]
pub struct CostPredictor {
    mappings: CategoryMappings,
    model: CostModel,
    report: FitReport,
    bounds: InputBounds,
    clamp: ClampPolicy,
}

impl CostPredictor {
    /// Loads the configured dataset, encodes it and fits the model.
    #[instrument(skip_all, fields(data_path = %config.data_path))]
    pub fn build(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let table = load_table(&config.data_path, &config.load)?;
        Self::from_table(&table, config)
    }

    /// Encodes an already loaded dataset and fits the model.
    ///
    /// `config.data_path` and `config.load` are ignored.
    pub fn from_table(
        table: &Table,
        config: &PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let encoded = encode(table)?;
        let TrainedModel { model, report } = train(&encoded, &config.train)?;
        debug!(?model, "predictor ready");
        Ok(Self {
            mappings: encoded.mappings,
            model,
            report,
            bounds: config.bounds,
            clamp: config.clamp,
        })
    }

    /// Predicts the cost of one request.
    ///
    /// Fails with an invalid-input-range error for out-of-bounds numbers and
    /// an unknown-category error for labels absent from the dataset. A
    /// failed request produces no prediction.
    pub fn predict(
        &self,
        request: &FeatureRequest,
    ) -> Result<Prediction, PipelineError> {
        validate_bounds(request, &self.bounds)?;
        let features = encode_request(&self.mappings, request)?;
        Ok(predict(&self.model, &features, self.clamp))
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    pub fn mappings(&self) -> &CategoryMappings {
        &self.mappings
    }

    pub fn report(&self) -> &FitReport {
        &self.report
    }

    pub fn bounds(&self) -> &InputBounds {
        &self.bounds
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        self.clamp
    }

    /// Snapshot of the model, mappings and fit statistics.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            model: self.model,
            mappings: self.mappings.clone(),
            report: self.report,
        }
    }
}

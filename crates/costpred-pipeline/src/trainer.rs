//! Model training: seeded train/test split and least-squares fit.

use costpred_regression::{
    LinearFit, fit_ols, mae, r_squared, rmse, shuffled_indices,
};
use costpred_schemas::{CostModel, FEATURE_COUNT, FitReport};
use tracing::{info, instrument};

use crate::config::TrainOptions;
use crate::encoder::EncodedTable;
use crate::error::{PipelineError, PipelineErrorKind};

/// A fitted model and its goodness-of-fit statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainedModel {
    pub model: CostModel,
    pub report: FitReport,
}

/// Row indices of the training and held-out partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partitions `0..len` into training and held-out rows.
///
/// Rows are shuffled with `options.seed`; the first
/// `ceil(len * test_fraction)` shuffled rows are held out, capped so at
/// least one training row remains.
pub fn split_indices(
    len: usize,
    options: &TrainOptions,
) -> Result<Split, PipelineError> {
    let fraction = options.test_fraction;
    if !(0.0..1.0).contains(&fraction) {
        return Err(PipelineError::invalid_option(format!(
            "test_fraction must be in [0, 1), got {fraction}"
        )));
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "fraction is in [0, 1), so the product is a small count"
    )]
    let wanted = (len as f64 * fraction).ceil() as usize;
    let test_len = wanted.min(len.saturating_sub(1));

    let mut train = shuffled_indices(len, options.seed);
    let test = train.drain(..test_len).collect();
    Ok(Split { train, test })
}

/// Splits the encoded dataset and fits OLS on the training rows.
///
/// Held-out rows only feed the `FitReport`; they never influence the model.
#[instrument(skip_all, fields(rows = table.rows.len(), seed = options.seed))]
pub fn train(
    table: &EncodedTable,
    options: &TrainOptions,
) -> Result<TrainedModel, PipelineError> {
    let split = split_indices(table.rows.len(), options)?;
    let samples = |indices: &[usize]| -> Vec<([f64; FEATURE_COUNT], f64)> {
        indices
            .iter()
            .map(|&i| {
                let row = &table.rows[i];
                (row.features().to_array(), row.target())
            })
            .collect()
    };
    let train_data = samples(&split.train);
    let test_data = samples(&split.test);

    let fit: LinearFit<FEATURE_COUNT> = fit_ols(&train_data).ok_or_else(|| {
        PipelineError::new(PipelineErrorKind::Fit(format!(
            "no least-squares solution for {} training rows",
            train_data.len()
        )))
    })?;

    let held_out = !test_data.is_empty();
    let report = FitReport {
        train_rows: train_data.len(),
        test_rows: test_data.len(),
        seed: options.seed,
        train_r_squared: r_squared(&train_data, &fit),
        test_r_squared: held_out.then(|| r_squared(&test_data, &fit)),
        test_rmse: held_out.then(|| rmse(&test_data, &fit)),
        test_mae: held_out.then(|| mae(&test_data, &fit)),
    };
    info!(
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        train_r_squared = report.train_r_squared,
        test_r_squared = ?report.test_r_squared,
        "fitted cost model"
    );

    Ok(TrainedModel {
        model: CostModel {
            coefficients: fit.coefficients,
            intercept: fit.intercept,
        },
        report,
    })
}

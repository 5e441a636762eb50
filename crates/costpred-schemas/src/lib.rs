//! Shared data types for the activity cost predictor.
//!
//! This crate holds the value objects that flow through the pipeline and
//! across the HTTP API: category mappings, feature vectors, the fitted
//! linear model, and prediction results. Everything here is plain data with
//! serde derives; loading, training and validation live in
//! `costpred-pipeline`.

mod category;
mod cost_model;
mod features;
#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use category::*;
#[doc(inline)]
pub use cost_model::*;
#[doc(inline)]
pub use features::*;

//! Pipeline configuration.
//!
//! Dataset location, decoding, split parameters, request bounds and the
//! clamp policy are fields here rather than constants. A config file is
//! JSON; missing fields take defaults.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use costpred_schemas::ClampPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineErrorKind};

/// Dataset path used when none is configured.
pub const DEFAULT_DATA_PATH: &str = "costos_pred.csv";

/// Shuffle seed used when none is configured.
pub const DEFAULT_SEED: u64 = 1_613_797;

/// Fraction of rows held out when none is configured.
pub const DEFAULT_TEST_FRACTION: f64 = 0.30;

/// Full configuration for building a `CostPredictor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path of the delimited dataset.
    pub data_path: Utf8PathBuf,
    pub load: LoadOptions,
    pub train: TrainOptions,
    /// Policy for negative predictions.
    pub clamp: ClampPolicy,
    pub bounds: InputBounds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: Utf8PathBuf::from(DEFAULT_DATA_PATH),
            load: LoadOptions::default(),
            train: TrainOptions::default(),
            clamp: ClampPolicy::default(),
            bounds: InputBounds::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path).map_err(|source| {
            PipelineError::new(PipelineErrorKind::ConfigRead {
                path: path.to_owned(),
                source,
            })
        })?;
        Self::from_json_str(&json)
    }

    /// Parses a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|err| {
            PipelineError::new(PipelineErrorKind::ConfigParse(err))
        })
    }
}

/// How the dataset file is decoded and split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    pub encoding: TextEncoding,
    /// Field delimiter; must be a single ASCII character.
    pub delimiter: char,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::default(),
            delimiter: ',',
        }
    }
}

/// Text encoding of the dataset file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum TextEncoding {
    /// UTF-8, with an optional leading byte order mark.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("utf-8"),
            Self::Latin1 => f.write_str("latin-1"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(format!(
                "unsupported encoding `{other}` (expected utf-8 or latin-1)"
            )),
        }
    }
}

/// Train/test split parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainOptions {
    /// Seed of the row shuffle.
    pub seed: u64,
    /// Fraction of rows held out, in `[0, 1)`. Zero fits on every row.
    pub test_fraction: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
        }
    }
}

/// Closed interval a numeric input must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN and infinities are never contained.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Declared bounds of the numeric request fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputBounds {
    pub budget: NumericRange,
    pub time_invested: NumericRange,
    pub people_count: NumericRange,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            budget: NumericRange::new(0.0, 10_000.0),
            time_invested: NumericRange::new(0.0, 10_000.0),
            people_count: NumericRange::new(1.0, 50.0),
        }
    }
}

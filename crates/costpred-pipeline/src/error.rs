//! Error types for the cost prediction pipeline.

use std::backtrace::Backtrace;
use std::fmt;

use camino::Utf8PathBuf;
use costpred_schemas::CategoryColumn;

/// Error type for loading, training and prediction.
///
/// Uses the canonical struct pattern: a private kind, a captured backtrace
/// and `is_xxx()` predicates for classification. Request-level errors
/// (`UnknownCategory`, `InvalidInputRange`) are terminal for that request
/// only; everything else aborts startup.
#[derive(Debug)]
pub struct PipelineError {
    kind: PipelineErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum PipelineErrorKind {
    /// The dataset file could not be read.
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    /// The dataset is not valid text in the configured encoding.
    Decode(std::str::Utf8Error),
    /// The dataset is not well-formed delimited text.
    Csv(csv::Error),
    /// A required header is absent.
    MissingColumn(&'static str),
    /// A numeric cell is not a finite number, or a category cell is blank.
    InvalidValue {
        /// 1-based data row (the header is row 0).
        row: usize,
        column: &'static str,
        value: String,
    },
    /// The dataset has a header but no data rows.
    EmptyDataset,
    /// A request named a category label absent from the dataset.
    UnknownCategory {
        column: CategoryColumn,
        value: String,
    },
    /// A numeric request field is outside its declared bounds.
    InvalidInputRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// Least squares could not produce a model.
    Fit(String),
    /// The configuration file could not be read.
    ConfigRead {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for `PipelineConfig`.
    ConfigParse(serde_json::Error),
    /// A configuration value is out of its allowed domain.
    InvalidOption(String),
}

impl PipelineError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: PipelineErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn read(
        path: impl Into<Utf8PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::new(PipelineErrorKind::Read {
            path: path.into(),
            source,
        })
    }

    pub(crate) fn invalid_value(
        row: usize,
        column: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::new(PipelineErrorKind::InvalidValue {
            row,
            column,
            value: value.into(),
        })
    }

    pub(crate) fn unknown_category(
        column: CategoryColumn,
        value: impl Into<String>,
    ) -> Self {
        Self::new(PipelineErrorKind::UnknownCategory {
            column,
            value: value.into(),
        })
    }

    pub(crate) fn invalid_option(message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::InvalidOption(message.into()))
    }

    /// Returns true if the dataset could not be loaded: missing or
    /// unreadable file, wrong encoding, malformed rows, missing columns.
    pub fn is_data_load(&self) -> bool {
        matches!(
            self.kind,
            PipelineErrorKind::Read { .. }
                | PipelineErrorKind::Decode(_)
                | PipelineErrorKind::Csv(_)
                | PipelineErrorKind::MissingColumn(_)
                | PipelineErrorKind::InvalidValue { .. }
                | PipelineErrorKind::EmptyDataset
        )
    }

    /// Returns true if a request referenced an unknown category label.
    pub fn is_unknown_category(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::UnknownCategory { .. })
    }

    /// Returns true if a numeric request field was out of bounds.
    pub fn is_invalid_input_range(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::InvalidInputRange { .. })
    }

    /// Returns true if model fitting failed.
    pub fn is_fit(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::Fit(_))
    }

    /// Returns true if the configuration was unreadable or invalid.
    pub fn is_config(&self) -> bool {
        matches!(
            self.kind,
            PipelineErrorKind::ConfigRead { .. }
                | PipelineErrorKind::ConfigParse(_)
                | PipelineErrorKind::InvalidOption(_)
        )
    }

    /// Returns true if the error rejects a single request rather than the
    /// whole pipeline.
    pub fn is_rejected_input(&self) -> bool {
        self.is_unknown_category() || self.is_invalid_input_range()
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read dataset {path}: {source}")
            }
            Self::Decode(err) => {
                write!(f, "dataset is not valid UTF-8: {err}")
            }
            Self::Csv(err) => write!(f, "malformed dataset: {err}"),
            Self::MissingColumn(column) => {
                write!(f, "dataset is missing required column `{column}`")
            }
            Self::InvalidValue { row, column, value } => write!(
                f,
                "row {row}: column `{column}` has invalid value {value:?}"
            ),
            Self::EmptyDataset => f.write_str("dataset has no rows"),
            Self::UnknownCategory { column, value } => {
                write!(f, "unknown {column} value {value:?}")
            }
            Self::InvalidInputRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} = {value} is outside [{min}, {max}]"),
            Self::Fit(reason) => write!(f, "failed to fit model: {reason}"),
            Self::ConfigRead { path, source } => {
                write!(f, "failed to read config {path}: {source}")
            }
            Self::ConfigParse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidOption(message) => {
                write!(f, "invalid option: {message}")
            }
        }
    }
}

impl fmt::Display for PipelineError {
    /// Formats only the summary; the backtrace is available through
    /// [`PipelineError::backtrace`] since request errors are shown to users.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            PipelineErrorKind::Read { source, .. }
            | PipelineErrorKind::ConfigRead { source, .. } => Some(source),
            PipelineErrorKind::Decode(err) => Some(err),
            PipelineErrorKind::Csv(err) => Some(err),
            PipelineErrorKind::ConfigParse(err) => Some(err),
            PipelineErrorKind::MissingColumn(_)
            | PipelineErrorKind::InvalidValue { .. }
            | PipelineErrorKind::EmptyDataset
            | PipelineErrorKind::UnknownCategory { .. }
            | PipelineErrorKind::InvalidInputRange { .. }
            | PipelineErrorKind::Fit(_)
            | PipelineErrorKind::InvalidOption(_) => None,
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        Self::new(PipelineErrorKind::Csv(err))
    }
}

impl From<std::str::Utf8Error> for PipelineError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::new(PipelineErrorKind::Decode(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_read_is_data_load() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = PipelineError::read("costos_pred.csv", io_err);

        assert!(err.is_data_load());
        assert!(!err.is_rejected_input());
        assert!(!err.is_config());
        assert!(err.to_string().contains("costos_pred.csv"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_missing_column_is_data_load() {
        let err =
            PipelineError::new(PipelineErrorKind::MissingColumn("Costo"));
        assert!(err.is_data_load());
        assert!(err.to_string().contains("`Costo`"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_unknown_category() {
        let err = PipelineError::unknown_category(
            CategoryColumn::ActivityType,
            "Inexistente",
        );

        assert!(err.is_unknown_category());
        assert!(err.is_rejected_input());
        assert!(!err.is_data_load());
        assert_eq!(err.to_string(), r#"unknown Tipo value "Inexistente""#);
    }

    #[test]
    fn test_invalid_input_range() {
        let err = PipelineError::new(PipelineErrorKind::InvalidInputRange {
            field: "budget",
            value: 20_000.0,
            min: 0.0,
            max: 10_000.0,
        });

        assert!(err.is_invalid_input_range());
        assert!(err.is_rejected_input());
        assert_eq!(err.to_string(), "budget = 20000 is outside [0, 10000]");
    }

    #[test]
    fn test_config_parse_from_json() {
        let json_err =
            serde_json::from_str::<u64>("not valid json").unwrap_err();
        let err = PipelineError::new(PipelineErrorKind::ConfigParse(json_err));
        assert!(err.is_config());
        assert!(!err.is_data_load());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_backtrace_captured() {
        let err = PipelineError::new(PipelineErrorKind::EmptyDataset);
        // Content depends on RUST_BACKTRACE; only the accessor is checked.
        let _ = err.backtrace();
    }

    #[test]
    fn test_debug_impl() {
        let err = PipelineError::new(PipelineErrorKind::Fit("singular".into()));
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("PipelineError"));
    }
}

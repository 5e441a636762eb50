//! Dataset loading.
//!
//! Reads a delimited text table, decodes it with the configured encoding and
//! extracts the six required columns by header name. Extra columns are
//! ignored; column order does not matter.

use std::borrow::Cow;
use std::io::Read;

use camino::Utf8Path;
use costpred_schemas::CategoryColumn;
use tracing::{debug, info, instrument};

use crate::config::{LoadOptions, TextEncoding};
use crate::error::{PipelineError, PipelineErrorKind};

pub const BUDGET_COLUMN: &str = "Presupuesto";
pub const TIME_INVESTED_COLUMN: &str = "Tiempo invertido";
pub const ACTIVITY_TYPE_COLUMN: &str = CategoryColumn::ActivityType.header();
pub const TIME_OF_DAY_COLUMN: &str = CategoryColumn::TimeOfDay.header();
pub const PEOPLE_COUNT_COLUMN: &str = "No. de personas";
pub const COST_COLUMN: &str = "Costo";

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub budget: f64,
    pub time_invested: f64,
    pub activity_type: String,
    pub time_of_day: String,
    pub people_count: f64,
    /// Target value.
    pub cost: f64,
}

/// The loaded dataset, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub records: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Loads the dataset at `path`.
#[instrument(skip(options), fields(encoding = %options.encoding))]
pub fn load_table(
    path: &Utf8Path,
    options: &LoadOptions,
) -> Result<Table, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::read(path, e))?;
    let table = parse_table(&bytes, options)?;
    info!(rows = table.len(), "loaded dataset");
    Ok(table)
}

/// Loads a dataset from an arbitrary reader.
pub fn read_table(
    mut input: impl Read,
    options: &LoadOptions,
) -> Result<Table, PipelineError> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|e| PipelineError::read("<input>", e))?;
    parse_table(&bytes, options)
}

fn parse_table(
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<Table, PipelineError> {
    let delimiter = ascii_delimiter(options.delimiter)?;
    let text = decode(bytes, options.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns = ColumnIndices::locate(reader.headers()?)?;
    debug!(?columns, "located required columns");

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        records.push(columns.record(&row?, idx + 1)?);
    }

    if records.is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::EmptyDataset));
    }
    Ok(Table { records })
}

fn ascii_delimiter(delimiter: char) -> Result<u8, PipelineError> {
    if delimiter.is_ascii() {
        u8::try_from(delimiter).map_err(|_| {
            PipelineError::invalid_option("delimiter must be ASCII")
        })
    } else {
        Err(PipelineError::invalid_option(format!(
            "delimiter {delimiter:?} must be a single ASCII character"
        )))
    }
}

fn decode(
    bytes: &[u8],
    encoding: TextEncoding,
) -> Result<Cow<'_, str>, PipelineError> {
    match encoding {
        TextEncoding::Utf8 => {
            let text = std::str::from_utf8(bytes)?;
            Ok(Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)))
        }
        TextEncoding::Latin1 => {
            Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
        }
    }
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    budget: usize,
    time_invested: usize,
    activity_type: usize,
    time_of_day: usize,
    people_count: usize,
    cost: usize,
}

impl ColumnIndices {
    fn locate(headers: &csv::StringRecord) -> Result<Self, PipelineError> {
        let find = |name: &'static str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::new(PipelineErrorKind::MissingColumn(name))
            })
        };
        Ok(Self {
            budget: find(BUDGET_COLUMN)?,
            time_invested: find(TIME_INVESTED_COLUMN)?,
            activity_type: find(ACTIVITY_TYPE_COLUMN)?,
            time_of_day: find(TIME_OF_DAY_COLUMN)?,
            people_count: find(PEOPLE_COUNT_COLUMN)?,
            cost: find(COST_COLUMN)?,
        })
    }

    fn record(
        &self,
        row: &csv::StringRecord,
        row_number: usize,
    ) -> Result<Record, PipelineError> {
        let number = |idx: usize, column: &'static str| {
            let cell = row.get(idx).unwrap_or_default();
            cell.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    PipelineError::invalid_value(row_number, column, cell)
                })
        };
        let label = |idx: usize, column: &'static str| {
            let cell = row.get(idx).unwrap_or_default();
            if cell.is_empty() {
                Err(PipelineError::invalid_value(row_number, column, cell))
            } else {
                Ok(cell.to_owned())
            }
        };

        Ok(Record {
            budget: number(self.budget, BUDGET_COLUMN)?,
            time_invested: number(self.time_invested, TIME_INVESTED_COLUMN)?,
            activity_type: label(self.activity_type, ACTIVITY_TYPE_COLUMN)?,
            time_of_day: label(self.time_of_day, TIME_OF_DAY_COLUMN)?,
            people_count: number(self.people_count, PEOPLE_COUNT_COLUMN)?,
            cost: number(self.cost, COST_COLUMN)?,
        })
    }
}

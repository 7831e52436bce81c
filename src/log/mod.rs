//! EventLog - ordered columnar store of one (name, kind) event series
//!
//! Rows live in parallel arrays (step, timestamp, value cell) in append
//! order and are never re-sorted. The value column stores the same cell
//! text the row format carries; decoding to typed events happens per row
//! on access, against the log's declared kind.
//!
//! ## Usage
//!
//! ```rust
//! use runlog::kind::ArtifactKind;
//! use runlog::log::EventLog;
//!
//! let text = "step|timestamp|metric\n\
//!             0|2023-01-05T12:30:00+00:00|1.0\n\
//!             1|2023-01-05T12:31:00+00:00|3.0";
//! let log = EventLog::read_csv(ArtifactKind::Metric, "loss", text, true)?;
//! assert_eq!(log.len(), 2);
//! assert_eq!(log.get_summary().step.unwrap().max, Some(1));
//! # Ok::<(), runlog::Error>(())
//! ```

mod summary;

pub use summary::{LogSummary, MetricSummary, StepSummary, TimestampSummary};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::event::{csv_header, Event, EventPayload, SEPARATOR};
use crate::kind::ArtifactKind;
use crate::time;

/// Timestamp column, parsed or raw depending on the read's `parse_dates`.
#[derive(Debug, Clone, PartialEq)]
enum TimestampColumn {
    /// Parsed into instants at read time
    Instants(Vec<Option<DateTime<Utc>>>),
    /// Raw cell text, parsed on demand at row access
    Raw(Vec<Option<String>>),
}

impl TimestampColumn {
    fn non_null_count(&self) -> usize {
        match self {
            Self::Instants(col) => col.iter().flatten().count(),
            Self::Raw(col) => col.iter().flatten().count(),
        }
    }

    /// ISO text of the cell, as stored or re-formatted from the instant.
    fn text_at(&self, index: usize) -> Option<String> {
        match self {
            Self::Instants(col) => col[index].map(time::format_timestamp),
            Self::Raw(col) => col[index].clone(),
        }
    }

    fn instant_at(&self, index: usize) -> Result<Option<DateTime<Utc>>> {
        match self {
            Self::Instants(col) => Ok(col[index]),
            Self::Raw(col) => col[index].as_deref().map(time::parse_timestamp).transpose(),
        }
    }
}

/// Ordered, immutable collection of same-kind events in columnar form.
///
/// Built by bulk-decoding CSV text or a column mapping; queried by ordinal
/// index and summarized positionally (see [`LogSummary`]).
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    kind: ArtifactKind,
    name: String,
    steps: Vec<Option<i64>>,
    timestamps: TimestampColumn,
    values: Vec<Option<String>>,
}

impl EventLog {
    /// Bulk-decode events from CSV text or a column mapping.
    ///
    /// A JSON string is decoded as CSV text ([`Self::read_csv`]), a JSON
    /// object as a column mapping ([`Self::from_columns`]).
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedDataType` for any other JSON shape, plus
    /// the errors of the chosen decode path.
    pub fn read(
        kind: ArtifactKind,
        name: impl Into<String>,
        data: &Value,
        parse_dates: bool,
    ) -> Result<Self> {
        match data {
            Value::String(text) => Self::read_csv(kind, name, text, parse_dates),
            Value::Object(mapping) => Self::from_columns(kind, name, mapping, parse_dates),
            other => Err(Error::UnsupportedDataType(json_type_name(other).to_string())),
        }
    }

    /// Decode events from CSV text in the row format.
    ///
    /// The first line must be the header `step|timestamp|<kind-tag>`. Each
    /// data row splits into at most three cells, so a `|` inside a JSON
    /// string value stays in the value cell. Empty step/timestamp cells are
    /// null; an empty value cell is the empty string for the raw-text kinds
    /// (html, text) and null otherwise. Blank lines are skipped. Rows keep
    /// file order.
    ///
    /// With `parse_dates` the timestamp column is parsed into instants and
    /// bad text fails the read; otherwise raw text is stored and parsing is
    /// deferred to row access.
    ///
    /// # Errors
    ///
    /// Returns `Error::Csv` for a missing/mismatched header or malformed
    /// row, and `Error::InvalidTimestamp` when `parse_dates` hits
    /// unparsable text.
    pub fn read_csv(
        kind: ArtifactKind,
        name: impl Into<String>,
        text: &str,
        parse_dates: bool,
    ) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::Csv("missing header line".to_string()))?;
        let expected = csv_header(kind);
        if header.trim() != expected {
            return Err(Error::Csv(format!(
                "expected header {expected:?}, got {header:?}"
            )));
        }

        let mut steps = Vec::new();
        let mut instants = Vec::new();
        let mut raw = Vec::new();
        let mut values = Vec::new();

        for (number, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let row = number + 1;
            let cells: Vec<&str> = line.splitn(3, SEPARATOR).collect();
            if cells.len() != 3 {
                return Err(Error::Csv(format!(
                    "row {row} has {} cells, expected 3",
                    cells.len()
                )));
            }
            steps.push(parse_step_cell(cells[0], row)?);
            let ts_cell = cells[1].trim();
            if parse_dates {
                instants.push(match ts_cell {
                    "" => None,
                    text => Some(time::parse_timestamp(text)?),
                });
            } else {
                raw.push(match ts_cell {
                    "" => None,
                    text => Some(text.to_string()),
                });
            }
            values.push(value_cell(kind, cells[2]));
        }

        let timestamps = if parse_dates {
            TimestampColumn::Instants(instants)
        } else {
            TimestampColumn::Raw(raw)
        };
        let log = Self {
            kind,
            name: name.into(),
            steps,
            timestamps,
            values,
        };
        debug!(kind = %log.kind, name = %log.name, rows = log.len(), "decoded event csv");
        Ok(log)
    }

    /// Decode events from a `{step, timestamp, <kind-tag>}` column mapping.
    ///
    /// All three canonical columns must be present and arrays of one
    /// length; extra columns are ignored. Cells are normalized to the same
    /// canonical encodings the CSV path stores: steps to integers,
    /// timestamps to their text, values to cell strings (`null` stays
    /// null).
    ///
    /// # Errors
    ///
    /// Returns `Error::Columns` for a missing/non-array column, ragged
    /// lengths, or a cell of an unusable type, and `Error::InvalidTimestamp`
    /// when `parse_dates` hits unparsable text.
    pub fn from_columns(
        kind: ArtifactKind,
        name: impl Into<String>,
        mapping: &Map<String, Value>,
        parse_dates: bool,
    ) -> Result<Self> {
        let step_col = column(mapping, "step")?;
        let ts_col = column(mapping, "timestamp")?;
        let value_col = column(mapping, kind.as_str())?;

        if step_col.len() != ts_col.len() || step_col.len() != value_col.len() {
            return Err(Error::Columns(format!(
                "mismatched column lengths: step={}, timestamp={}, {}={}",
                step_col.len(),
                ts_col.len(),
                kind,
                value_col.len()
            )));
        }

        let steps = step_col
            .iter()
            .enumerate()
            .map(|(index, cell)| step_from_json(cell, index + 1))
            .collect::<Result<Vec<_>>>()?;

        let mut texts = Vec::with_capacity(ts_col.len());
        for (index, cell) in ts_col.iter().enumerate() {
            texts.push(match cell {
                Value::Null => None,
                Value::String(text) if text.trim().is_empty() => None,
                Value::String(text) => Some(text.trim().to_string()),
                _ => {
                    return Err(Error::Columns(format!(
                        "row {}: timestamp cell must be text or null",
                        index + 1
                    )))
                }
            });
        }
        let timestamps = if parse_dates {
            let instants = texts
                .into_iter()
                .map(|text| text.as_deref().map(time::parse_timestamp).transpose())
                .collect::<Result<Vec<_>>>()?;
            TimestampColumn::Instants(instants)
        } else {
            TimestampColumn::Raw(texts)
        };

        let mut values = Vec::with_capacity(value_col.len());
        for cell in value_col {
            values.push(match cell {
                Value::Null => None,
                Value::String(text) => value_cell(kind, text),
                // metric numbers store the f64 Display text the row codec stores
                Value::Number(number) if kind == ArtifactKind::Metric => {
                    number.as_f64().map(|float| float.to_string())
                }
                other => Some(serde_json::to_string(other)?),
            });
        }

        let log = Self {
            kind,
            name: name.into(),
            steps,
            timestamps,
            values,
        };
        debug!(kind = %log.kind, name = %log.name, rows = log.len(), "decoded event columns");
        Ok(log)
    }

    /// Get the log's kind.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Get the log's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check whether the log has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Decode one logical row into a typed [`Event`].
    ///
    /// The stored timestamp is converted to its canonical instant and the
    /// value cell decoded against the log's kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfRange` outside `[0, len)`,
    /// `Error::MissingPayload` for a null value cell,
    /// `Error::InvalidTimestamp` for a raw timestamp that fails to parse,
    /// and `Error::PayloadDecode` for a cell violating the kind's contract.
    pub fn get_event_at(&self, index: usize) -> Result<Event> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let step = self.steps[index];
        let timestamp = self.timestamps.instant_at(index)?;
        let cell = self.values[index].as_deref().ok_or(Error::MissingPayload)?;
        let payload = EventPayload::from_column_value(self.kind, cell)?;
        Ok(Event::from_parts(step, timestamp, payload))
    }

    /// Decode every row, in order.
    ///
    /// # Errors
    ///
    /// Returns the first row decode failure (see [`Self::get_event_at`]).
    pub fn events(&self) -> Result<Vec<Event>> {
        (0..self.len()).map(|index| self.get_event_at(index)).collect()
    }

    /// Summarize the log's columns.
    ///
    /// Step and timestamp blocks use positional min/max (first and last
    /// stored rows). The metric block appears only for metric logs and
    /// holds true descriptive statistics over the cells that parse as
    /// numbers, NaN treated as null; its `last` field is the value of the
    /// last such row. A block is omitted when its column has zero non-null
    /// entries.
    #[must_use]
    pub fn get_summary(&self) -> LogSummary {
        let step_count = self.steps.iter().flatten().count();
        let step = (step_count > 0).then(|| StepSummary {
            count: step_count,
            min: self.steps.first().copied().flatten(),
            max: self.steps.last().copied().flatten(),
        });

        let timestamp_count = self.timestamps.non_null_count();
        let timestamp = (timestamp_count > 0).then(|| TimestampSummary {
            min: self.timestamps.text_at(0),
            max: self.timestamps.text_at(self.len() - 1),
        });

        let metric = if self.kind == ArtifactKind::Metric {
            let metric_values: Vec<f64> = self
                .values
                .iter()
                .flatten()
                .filter_map(|cell| cell.trim().parse::<f64>().ok())
                .filter(|value| !value.is_nan())
                .collect();
            metric_values
                .last()
                .copied()
                .and_then(|last| MetricSummary::describe(&metric_values, last))
        } else {
            None
        };

        LogSummary {
            is_event: true,
            step,
            timestamp,
            metric,
        }
    }

    /// Re-serialize the log as CSV text, header first.
    ///
    /// Inverse of [`Self::read_csv`]: null cells become empty strings and
    /// each row is newline-prefixed after the header.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = csv_header(self.kind);
        for index in 0..self.len() {
            let step = self.steps[index].map(|s| s.to_string()).unwrap_or_default();
            let timestamp = self.timestamps.text_at(index).unwrap_or_default();
            out.push('\n');
            out.push_str(&step);
            out.push(SEPARATOR);
            out.push_str(&timestamp);
            out.push(SEPARATOR);
            out.push_str(self.values[index].as_deref().unwrap_or_default());
        }
        out
    }

    /// Export the `{step, timestamp, <kind-tag>}` column mapping.
    ///
    /// Inverse of [`Self::from_columns`]: missing cells become `null`,
    /// metric cells numbers, everything else its cell text.
    #[must_use]
    pub fn to_columns(&self) -> Value {
        let steps: Vec<Value> = self
            .steps
            .iter()
            .map(|step| step.map_or(Value::Null, Value::from))
            .collect();
        let timestamps: Vec<Value> = (0..self.len())
            .map(|index| self.timestamps.text_at(index).map_or(Value::Null, Value::String))
            .collect();
        let values: Vec<Value> = self
            .values
            .iter()
            .map(|cell| match cell {
                None => Value::Null,
                Some(text) if self.kind == ArtifactKind::Metric => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map_or_else(|| Value::String(text.clone()), Value::Number),
                Some(text) => Value::String(text.clone()),
            })
            .collect();

        let mut mapping = Map::new();
        mapping.insert("step".to_string(), Value::Array(steps));
        mapping.insert("timestamp".to_string(), Value::Array(timestamps));
        mapping.insert(self.kind.as_str().to_string(), Value::Array(values));
        Value::Object(mapping)
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a value cell: empty means the empty string for the raw-text
/// kinds and null for everything else.
fn value_cell(kind: ArtifactKind, cell: &str) -> Option<String> {
    if cell.is_empty() {
        matches!(kind, ArtifactKind::Html | ArtifactKind::Text).then(String::new)
    } else {
        Some(cell.to_string())
    }
}

fn parse_step_cell(cell: &str, row: usize) -> Result<Option<i64>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(step) = trimmed.parse::<i64>() {
        return Ok(Some(step));
    }
    // writers that went through a float column emit "3.0"
    if let Some(step) = trimmed.parse::<f64>().ok().and_then(step_from_float) {
        return Ok(Some(step));
    }
    Err(Error::Csv(format!("row {row}: invalid step cell {cell:?}")))
}

fn step_from_json(cell: &Value, row: usize) -> Result<Option<i64>> {
    match cell {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(step) = number.as_i64() {
                return Ok(Some(step));
            }
            if let Some(step) = number.as_f64().and_then(step_from_float) {
                return Ok(Some(step));
            }
            Err(Error::Columns(format!(
                "row {row}: invalid step number {number}"
            )))
        }
        Value::String(text) => parse_step_cell(text, row)
            .map_err(|_| Error::Columns(format!("row {row}: invalid step cell {text:?}"))),
        _ => Err(Error::Columns(format!(
            "row {row}: step cell of unsupported type"
        ))),
    }
}

/// Convert an integral float to the step it encodes.
///
/// `i64::MAX as f64` rounds up to 2^63, so the exclusive bound rejects
/// every float the cast would saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn step_from_float(float: f64) -> Option<i64> {
    (float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64)
        .then_some(float as i64)
}

fn column<'a>(mapping: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>> {
    match mapping.get(key) {
        Some(Value::Array(col)) => Ok(col),
        Some(_) => Err(Error::Columns(format!("column {key:?} is not an array"))),
        None => Err(Error::Columns(format!("missing column {key:?}"))),
    }
}

//! Tabular input model for the export operations.
//!
//! The types in this module form the snapshot handed to the renderer: an
//! ordered list of column names plus an ordered sequence of records sharing
//! that schema.  They carry no rendering state and are never mutated by the
//! export routines, so frontends can keep accumulating rows in their own
//! session storage and pass a borrowed view per export call.

use std::fmt;

use chrono::NaiveDate;

use crate::error::RenderError;

/// Scalar cell value of a consumption record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Free-form text.
    Text(String),
    /// Whole quantity, written to spreadsheets as a number.
    Integer(i64),
    /// Calendar date, formatted as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Absent value; renders as an empty string, never "null" or "NaN".
    Missing,
}

impl Value {
    /// Creates a text value.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

/// One row of consumption data, ordered to match its table's columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from the provided values.
    pub fn new(values: impl Into<Vec<Value>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values carried by the record.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the record carries no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a value and returns the updated record.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }
}

impl<V: Into<Value>> FromIterator<V> for Record {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

/// Column names of the fixed consumption schema, in declaration order.
pub fn consumption_columns() -> Vec<String> {
    [
        "ID Entrega",
        "ID Recibe",
        "Orden",
        "Tipo",
        "Item",
        "Cantidad",
        "Unidad",
        "Observación",
        "Fecha",
    ]
    .iter()
    .map(|name| (*name).to_owned())
    .collect()
}

/// Ordered sequence of [`Record`]s sharing one schema.
///
/// Duplicate records are permitted; the table enforces no identity beyond
/// insertion order.  The renderer borrows the table read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Creates an empty table over the provided column names.
    pub fn new(columns: impl Into<Vec<String>>) -> Self {
        Self {
            columns: columns.into(),
            rows: Vec::new(),
        }
    }

    /// Creates an empty table over the fixed consumption schema.
    pub fn consumption() -> Self {
        Self::new(consumption_columns())
    }

    /// Returns the column names in declared order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the records in insertion order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a record after checking it matches the declared column count.
    pub fn push_row(&mut self, record: Record) -> Result<(), RenderError> {
        if record.len() != self.columns.len() {
            return Err(RenderError::RowArity {
                expected: self.columns.len(),
                actual: record.len(),
            });
        }
        self.rows.push(record);
        Ok(())
    }

    /// Appends a record and returns the updated table.
    pub fn with_row(mut self, record: Record) -> Result<Self, RenderError> {
        self.push_row(record)?;
        Ok(self)
    }
}

//! Row-oriented labeled dataset.
//!
//! A [`Dataset`] is an ordered sequence of [`Record`]s sharing one column
//! list. The last declared column is the label. Row order is the order the
//! records were supplied in and is preserved by every split.

use serde::{Deserialize, Serialize};

use super::Value;

/// Dataset construction and lookup errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset has no columns; the last column must be the label")]
    NoColumns,

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("inconsistent record width: row {row} expected {expected} values, got {got}")]
    InconsistentRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// One row: values positionally aligned with [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record(Vec<Value>);

impl Record {
    /// Wrap a row of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Value at a column index.
    #[inline]
    pub fn get(&self, col: usize) -> &Value {
        &self.0[col]
    }

    /// Number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All values in column order.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// An immutable labeled dataset.
///
/// Deserialization goes through [`Dataset::new`], so a decoded dataset is
/// validated like a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRepr")]
pub struct Dataset {
    /// Source name (usually the file the collaborator loaded).
    #[serde(default)]
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

#[derive(Deserialize)]
struct DatasetRepr {
    #[serde(default)]
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl TryFrom<DatasetRepr> for Dataset {
    type Error = DatasetError;

    fn try_from(repr: DatasetRepr) -> Result<Self, Self::Error> {
        Ok(Self::new(repr.columns, repr.rows)?.with_name(repr.name))
    }
}

impl Dataset {
    /// Create a dataset from a column list and records.
    ///
    /// # Errors
    ///
    /// Fails if there are no columns, a column name repeats, or a record's
    /// width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Result<Self, DatasetError> {
        if columns.is_empty() {
            return Err(DatasetError::NoColumns);
        }

        for (i, col) in columns.iter().enumerate() {
            if columns[..i].contains(col) {
                return Err(DatasetError::DuplicateColumn(col.clone()));
            }
        }

        let expected = columns.len();
        for (row, record) in rows.iter().enumerate() {
            if record.len() != expected {
                return Err(DatasetError::InconsistentRow {
                    row,
                    expected,
                    got: record.len(),
                });
            }
        }

        Ok(Self {
            name: String::new(),
            columns,
            rows,
        })
    }

    /// Convenience constructor from plain value rows.
    pub fn from_rows<C, R>(columns: C, rows: R) -> Result<Self, DatasetError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        let rows = rows.into_iter().map(Record::new).collect();
        Self::new(columns, rows)
    }

    /// Attach a source name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Source name, empty if none was given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The label column: always the last declared column.
    pub fn label_column(&self) -> &str {
        // Non-empty by construction.
        &self.columns[self.columns.len() - 1]
    }

    /// Records in source order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of records.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize, DatasetError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Value of one cell.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> &Value {
        self.rows[row].get(col)
    }

    /// Iterate over one column's values in row order.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |r| r.get(col))
    }

    /// Indices of every row, in order.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }

    /// A view keeping only the records matching `keep`, in order.
    ///
    /// Columns are unchanged, so metadata described from the full dataset
    /// stays valid for the filtered one.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

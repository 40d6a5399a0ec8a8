//! Typed tabular data: ordered named columns over ordered rows.

use std::fmt;

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Float(f64),
    Date(NaiveDate),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// Renders missing cells as the empty string and dates as `YYYY-MM-DD`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Float(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Missing => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

/// A table with named columns. Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with missing cells or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Rewrites every cell of `column` in place. Returns false if the column is absent.
    pub fn map_column<F>(&mut self, column: &str, f: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        self.map_column_at(idx, f);
        true
    }

    /// Rewrites every cell of the column at position `idx`. Out of range is a no-op.
    pub fn map_column_at<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        if idx >= self.columns.len() {
            return;
        }
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Replaces `column` with `values`, adding it at the end if absent.
    ///
    /// `values` shorter than the table leave missing cells behind.
    pub fn set_column(&mut self, column: &str, values: Vec<Value>) {
        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(Value::Missing);
                }
                self.columns.len() - 1
            }
        };
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row[idx] = values.next().unwrap_or(Value::Missing);
        }
    }

    /// Reorders columns so `names` come first, in that order; the rest keep their order.
    /// Names not in the table are ignored.
    pub fn move_to_front(&mut self, names: &[&str]) {
        let mut order: Vec<usize> = Vec::with_capacity(self.columns.len());
        for idx in names.iter().filter_map(|n| self.column_index(n)) {
            if !order.contains(&idx) {
                order.push(idx);
            }
        }
        for idx in 0..self.columns.len() {
            if !order.contains(&idx) {
                order.push(idx);
            }
        }
        self.columns = order.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            let old = std::mem::take(row);
            *row = order.iter().map(|&i| old[i].clone()).collect();
        }
    }

    /// Replaces every missing cell with the text `marker`.
    pub fn fill_missing(&mut self, marker: &str) {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_missing() {
                *cell = Value::Text(marker.to_string());
            }
        }
    }

    /// Removes the last row, if any.
    pub fn drop_last_row(&mut self) -> Option<Vec<Value>> {
        self.rows.pop()
    }

    /// Date cells of `column`; any other cell reads as `None`.
    pub fn dates(&self, column: &str) -> Option<Vec<Option<NaiveDate>>> {
        Some(self.column(column)?.map(Value::as_date).collect())
    }

    /// Float cells of `column`; any other cell reads as `None`.
    pub fn floats(&self, column: &str) -> Option<Vec<Option<f64>>> {
        Some(self.column(column)?.map(Value::as_float).collect())
    }
}

struct RowRef<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(self.row) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Serializes as a list of `{column: value}` records.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowRef {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

//! In-memory typed table produced by the parsers.
//!
//! A [`TypedTable`] keeps the source column order in `headers` and one
//! [`Row`] per retained source record. Every row carries a value for every
//! header; cells missing in the source are stored as [`Value::Empty`].
//!
//! Rows are keyed by header name. Duplicate header names alias the same key,
//! so the last column with a given name wins inside a row while `headers`
//! still lists every occurrence.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::data::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: Value) {
        self.cells.insert(header.into(), value);
    }

    pub fn get(&self, header: &str) -> Option<&Value> {
        self.cells.get(header)
    }

    /// The value under `header`, treating an absent key as empty.
    pub fn value(&self, header: &str) -> &Value {
        static EMPTY: Value = Value::Empty;
        self.cells.get(header).unwrap_or(&EMPTY)
    }

    pub fn number(&self, header: &str) -> Option<f64> {
        self.get(header).and_then(Value::as_number)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn has_content(&self) -> bool {
        self.cells.values().any(|value| !value.is_empty())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl TypedTable {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Numeric cells of `header` in row order; other cells are skipped.
    pub fn numeric_values(&self, header: &str) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row.number(header)).collect()
    }

    /// Headers holding at least one numeric cell, in header order.
    pub fn numeric_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|header| self.rows.iter().any(|row| row.number(header).is_some()))
            .map(String::as_str)
            .collect()
    }

    /// Selected columns that contain non-empty, non-numeric cells.
    pub fn columns_with_text<'a>(&self, columns: &'a [String]) -> Vec<&'a str> {
        columns
            .iter()
            .filter(|column| {
                self.rows
                    .iter()
                    .any(|row| matches!(row.get(column), Some(Value::Text(_))))
            })
            .map(String::as_str)
            .collect()
    }

    pub fn page(&self, offset: usize, limit: usize) -> &[Row] {
        let start = offset.min(self.rows.len());
        let end = start.saturating_add(limit).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Restricts and reorders the table to `columns`.
    ///
    /// Columns the table does not know are dropped with a warning, so every
    /// projected row still carries a value for every projected header. An empty
    /// selection keeps the table as is.
    pub fn project(&self, columns: &[String]) -> TypedTable {
        if columns.is_empty() {
            return self.clone();
        }
        let mut headers = Vec::with_capacity(columns.len());
        for column in columns {
            if self.has_header(column) {
                headers.push(column.clone());
            } else {
                warn!("Ignoring unknown column '{column}' in selection");
            }
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|header| (header.clone(), row.value(header).clone()))
                    .collect::<Row>()
            })
            .collect();
        TypedTable { headers, rows }
    }

    /// Raw display rows in header order, for rendering.
    pub fn display_rows(&self, rows: &[Row]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(|header| row.value(header).as_display())
                    .collect()
            })
            .collect()
    }
}

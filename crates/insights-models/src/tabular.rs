use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabularError {
    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A single cell of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Rows of named columns returned by a query.
///
/// Column order is fixed by the statement's projection. Every row has
/// exactly one value per column. A result with zero rows is a valid value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularResult {
    columns: Vec<String>,
    rows: Vec<Vec<ScalarValue>>,
}

impl TabularResult {
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Vec<ScalarValue>>,
    ) -> Result<Self, TabularError> {
        let expected = columns.len();
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(TabularError::RowWidth {
                row,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<ScalarValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&ScalarValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Non-null cells of a column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a ScalarValue> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
            .filter(|v| !v.is_null())
    }

    /// Numeric value at `(row, column)`, or `0.0` if missing or null.
    pub fn f64_at(&self, row: usize, column: &str) -> f64 {
        self.value(row, column)
            .and_then(ScalarValue::as_f64)
            .unwrap_or(0.0)
    }

    /// Numeric value of the first row, or `0.0` for an empty result.
    pub fn first_f64(&self, column: &str) -> f64 {
        self.f64_at(0, column)
    }

    /// Integer value of the first row, or `0` for an empty result.
    pub fn first_i64(&self, column: &str) -> i64 {
        self.value(0, column)
            .and_then(ScalarValue::as_i64)
            .unwrap_or(0)
    }

    /// Numeric value of the last row, or `0.0` for an empty result.
    pub fn last_f64(&self, column: &str) -> f64 {
        match self.rows.len() {
            0 => 0.0,
            n => self.f64_at(n - 1, column),
        }
    }

    pub fn sum_f64(&self, column: &str) -> f64 {
        self.column_values(column).filter_map(ScalarValue::as_f64).sum()
    }

    /// Mean over the non-null numeric cells of a column, `0.0` if there are none.
    pub fn mean_f64(&self, column: &str) -> f64 {
        let (sum, count) = self
            .column_values(column)
            .filter_map(ScalarValue::as_f64)
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Number of rows whose text value in `column` equals `value`.
    pub fn count_text(&self, column: &str, value: &str) -> usize {
        self.column_values(column)
            .filter(|v| v.as_str() == Some(value))
            .count()
    }

    /// Distinct text values of a column in first-seen order.
    pub fn distinct_text(&self, column: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for value in self.column_values(column).filter_map(ScalarValue::as_str) {
            if !seen.iter().any(|s: &String| s == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }

    /// Row counts per text value of `column`, largest group first.
    pub fn group_counts(&self, column: &str) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for value in self.column_values(column).filter_map(ScalarValue::as_str) {
            *counts.entry(value.to_string()).or_default() += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Rows whose `column` value satisfies `keep`. Unknown columns yield an
    /// empty result with the same projection.
    pub fn filter_rows<F>(&self, column: &str, mut keep: F) -> Self
    where
        F: FnMut(&ScalarValue) -> bool,
    {
        let rows = match self.column_index(column) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|row| keep(&row[idx]))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Rows sorted by a numeric column, largest first. Non-numeric cells sort last.
    pub fn sorted_desc_by(&self, column: &str) -> Self {
        let mut rows = self.rows.clone();
        if let Some(idx) = self.column_index(column) {
            rows.sort_by(|a, b| match (a[idx].as_f64(), b[idx].as_f64()) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

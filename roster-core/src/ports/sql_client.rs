//! SQL client port - database abstraction
//!
//! Statements are plain SQL text with `$n` placeholders. Values travel in
//! both directions as closed enums so the services never touch driver types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::result::Result;

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
    Numeric(Decimal),
    Date(NaiveDate),
}

/// A result cell, in whatever shape the driver produced it
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
    /// A one-dimensional array column
    Array(Vec<SqlValue>),
    /// A column type the client cannot decode; carries the type name
    Unsupported(String),
}

/// Rows returned by a statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column names, present even when no rows matched
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrowed name-addressable views of each row
    pub fn records(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|values| RawRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn first(&self) -> Option<RawRow<'_>> {
        self.records().next()
    }
}

/// One result row addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    columns: &'a [String],
    values: &'a [SqlValue],
}

impl<'a> RawRow<'a> {
    pub fn new(columns: &'a [String], values: &'a [SqlValue]) -> Self {
        Self { columns, values }
    }

    /// Value of the first column called `name`
    pub fn get(&self, name: &str) -> Option<&'a SqlValue> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// (column, value) pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// Database client abstraction
///
/// Implementations do not retry and do not wrap calls in transactions. A
/// `query` without parameters may carry several statements; every one runs
/// and the rows of the last statement that returned rows are reported.
pub trait SqlClient: Send + Sync {
    /// Run a statement that returns no rows; returns the affected row count
    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64>;

    /// Run a statement and collect its rows
    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<RowSet>;
}

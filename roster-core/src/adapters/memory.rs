//! In-memory SQL client for unit tests
//!
//! Understands exactly the statements the roster services issue against the
//! `students` table and records every statement it sees. Anything else is
//! answered from a canned result set, or fails like a syntax error.

use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::result::{Error, Result};
use crate::domain::NewStudent;
use crate::ports::{RowSet, SqlClient, SqlParam, SqlValue};

const COLUMNS: [&str; 8] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "major",
    "gpa",
    "status",
    "enrollment_date",
];

/// How numeric and date cells are handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Decimal and date values, like a typed driver
    Native,
    /// Everything as text, like a driver that does no type parsing
    Text,
}

#[derive(Default)]
struct State {
    table_exists: bool,
    rows: Vec<Vec<SqlValue>>,
    next_id: i32,
    statements: Vec<String>,
    failures: Vec<(String, usize)>,
    canned: Option<RowSet>,
}

pub struct MemoryClient {
    shape: ValueShape,
    state: Mutex<State>,
}

impl MemoryClient {
    /// A database without the students table
    pub fn new() -> Self {
        Self::with_shape(ValueShape::Native)
    }

    pub fn with_shape(shape: ValueShape) -> Self {
        Self {
            shape,
            state: Mutex::new(State {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// A database whose students table already holds `students`
    pub fn with_existing(students: &[NewStudent]) -> Self {
        let client = Self::new();
        {
            let mut state = client.state.lock().unwrap();
            state.table_exists = true;
            for s in students {
                let id = state.next_id;
                state.next_id += 1;
                let row = stored_row(id, &new_student_values(s));
                state.rows.push(row);
            }
        }
        client
    }

    /// Fail the next `times` statements that start with `prefix`
    pub fn fail_on(&self, prefix: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((prefix.to_string(), times));
    }

    /// Answer unrecognised statements with `rows`
    pub fn set_canned(&self, rows: RowSet) {
        self.state.lock().unwrap().canned = Some(rows);
    }

    /// Every statement seen so far, whitespace-normalised
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn count_statements(&self, prefix: &str) -> usize {
        self.statements()
            .iter()
            .filter(|s| s.starts_with(prefix))
            .count()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    fn run(&self, sql: &str, params: &[SqlParam]) -> Result<RowSet> {
        let sql = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.clone());

        if let Some(entry) = state
            .failures
            .iter_mut()
            .find(|(prefix, times)| *times > 0 && sql.starts_with(prefix.as_str()))
        {
            entry.1 -= 1;
            return Err(Error::database("connection reset by peer"));
        }

        if sql.starts_with("CREATE TABLE IF NOT EXISTS students") {
            state.table_exists = true;
            return Ok(RowSet::default());
        }

        if sql.contains(" students") && !state.table_exists {
            return Err(Error::database("relation \"students\" does not exist"));
        }

        if sql.starts_with("SELECT COUNT(*) FROM students") {
            let count = state.rows.len() as i64;
            let value = match self.shape {
                ValueShape::Native => SqlValue::Int(count),
                ValueShape::Text => SqlValue::Text(count.to_string()),
            };
            return Ok(RowSet::new(vec!["count".to_string()], vec![vec![value]]));
        }

        if sql.starts_with("INSERT INTO students") {
            if params.len() != 7 {
                return Err(Error::database("bind message supplies wrong number of parameters"));
            }
            let id = state.next_id;
            state.next_id += 1;
            let row = stored_row(id, params);
            state.rows.push(row.clone());
            return Ok(self.result(vec![row]));
        }

        if sql.starts_with("SELECT * FROM students ORDER BY id ASC") {
            let mut rows = state.rows.clone();
            rows.sort_by_key(row_id);
            return Ok(self.result(rows));
        }

        if sql.starts_with("SELECT * FROM students WHERE id = $1") {
            let id = int_param(params, 0)?;
            let rows = state.rows.iter().filter(|r| row_id(r) == id).cloned().collect();
            return Ok(self.result(rows));
        }

        if let Some(rest) = sql.strip_prefix("UPDATE students SET ") {
            let set_clause = rest
                .split(" WHERE ")
                .next()
                .ok_or_else(|| Error::database("syntax error at or near \"WHERE\""))?;
            if set_clause.trim().is_empty() {
                return Err(Error::database("syntax error at or near \"WHERE\""));
            }
            let id = int_param(params, 0)?;
            let mut assignments = Vec::new();
            for assignment in set_clause.split(", ") {
                let (column, placeholder) = assignment
                    .split_once(" = $")
                    .ok_or_else(|| Error::database("syntax error in SET clause"))?;
                let idx: usize = placeholder
                    .trim()
                    .parse()
                    .map_err(|_| Error::database("syntax error in SET clause"))?;
                let col = COLUMNS
                    .iter()
                    .position(|c| *c == column)
                    .ok_or_else(|| {
                        Error::database(format!("column \"{}\" does not exist", column))
                    })?;
                let param = params
                    .get(idx - 1)
                    .ok_or_else(|| Error::database("missing parameter"))?;
                assignments.push((col, stored_value(param)));
            }

            let mut updated = Vec::new();
            for row in state.rows.iter_mut().filter(|r| row_id(r) == id) {
                for (col, value) in &assignments {
                    row[*col] = value.clone();
                }
                updated.push(row.clone());
            }
            return Ok(self.result(updated));
        }

        if sql.starts_with("DELETE FROM students WHERE id = $1") {
            let id = int_param(params, 0)?;
            let before = state.rows.len();
            state.rows.retain(|r| row_id(r) != id);
            let rows = if state.rows.len() < before {
                vec![vec![SqlValue::Int(i64::from(id))]]
            } else {
                Vec::new()
            };
            return Ok(RowSet::new(vec!["id".to_string()], rows));
        }

        match &state.canned {
            Some(rows) => Ok(rows.clone()),
            None => Err(Error::database(format!(
                "syntax error at or near \"{}\"",
                sql.split_whitespace().next().unwrap_or("")
            ))),
        }
    }

    /// Shape stored rows the way this client's driver would return them
    fn result(&self, rows: Vec<Vec<SqlValue>>) -> RowSet {
        let columns = COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|row| match self.shape {
                ValueShape::Native => row,
                ValueShape::Text => row.into_iter().map(as_text).collect(),
            })
            .collect();
        RowSet::new(columns, rows)
    }
}

impl SqlClient for MemoryClient {
    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        self.run(sql, params).map(|rows| rows.len() as u64)
    }

    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<RowSet> {
        self.run(sql, params)
    }
}

fn row_id(row: &Vec<SqlValue>) -> i32 {
    match row.first() {
        Some(SqlValue::Int(id)) => *id as i32,
        _ => 0,
    }
}

fn int_param(params: &[SqlParam], idx: usize) -> Result<i32> {
    match params.get(idx) {
        Some(SqlParam::Int(v)) => Ok(*v),
        _ => Err(Error::database("expected integer parameter")),
    }
}

fn stored_value(param: &SqlParam) -> SqlValue {
    match param {
        SqlParam::Int(v) => SqlValue::Int(i64::from(*v)),
        SqlParam::Text(v) => SqlValue::Text(v.clone()),
        // DECIMAL(3,2) keeps two places
        SqlParam::Numeric(v) => {
            SqlValue::Numeric(v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        }
        SqlParam::Date(v) => SqlValue::Date(*v),
    }
}

fn stored_row(id: i32, params: &[SqlParam]) -> Vec<SqlValue> {
    let mut row = vec![SqlValue::Int(i64::from(id))];
    row.extend(params.iter().map(stored_value));
    row
}

fn new_student_values(s: &NewStudent) -> Vec<SqlParam> {
    vec![
        SqlParam::Text(s.first_name.clone()),
        SqlParam::Text(s.last_name.clone()),
        SqlParam::Text(s.email.clone()),
        SqlParam::Text(s.major.clone()),
        SqlParam::Numeric(Decimal::from_f64(s.gpa).unwrap_or_default()),
        SqlParam::Text(s.status.to_string()),
        SqlParam::Date(s.enrollment_date),
    ]
}

fn as_text(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::Numeric(d) => SqlValue::Text(d.to_string()),
        SqlValue::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        other => other,
    }
}

/// A date for fixtures
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

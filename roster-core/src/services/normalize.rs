//! Type normalization between driver values and roster types
//!
//! Drivers disagree on how NUMERIC and DATE columns arrive: some decode them
//! natively, some hand back text. Everything here accepts both shapes so the
//! services behave the same whichever client sits behind the port.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Map, Value as JsonValue};

use crate::domain::result::{Error, Result};
use crate::domain::{NewStudent, Student, StudentPatch, StudentStatus};
use crate::ports::{RawRow, SqlParam, SqlValue};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert a `students` row into a [`Student`].
///
/// Only a missing or non-integer `id` is an error. Null text becomes empty,
/// a null gpa becomes 0.0, and unknown status labels are kept verbatim.
pub fn normalize_student(row: &RawRow<'_>) -> Result<Student> {
    let id = row
        .get("id")
        .and_then(integer_of)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| Error::database("Malformed student row: missing integer id"))?;

    Ok(Student {
        id,
        first_name: text_column(row, "first_name"),
        last_name: text_column(row, "last_name"),
        email: text_column(row, "email"),
        major: text_column(row, "major"),
        gpa: row.get("gpa").and_then(float_of).unwrap_or(0.0),
        status: StudentStatus::from(text_column(row, "status")),
        enrollment_date: row.get("enrollment_date").map(date_text_of).unwrap_or_default(),
    })
}

/// Parameters for the seven non-id columns, in table order
pub fn new_student_params(student: &NewStudent) -> Result<Vec<SqlParam>> {
    Ok(vec![
        SqlParam::Text(student.first_name.clone()),
        SqlParam::Text(student.last_name.clone()),
        SqlParam::Text(student.email.clone()),
        SqlParam::Text(student.major.clone()),
        gpa_param(student.gpa)?,
        SqlParam::Text(student.status.to_string()),
        SqlParam::Date(student.enrollment_date),
    ])
}

/// `(column, parameter)` pairs for the fields set in `patch`, in table order
pub fn patch_assignments(patch: &StudentPatch) -> Result<Vec<(&'static str, SqlParam)>> {
    let mut assignments = Vec::new();

    if let Some(v) = &patch.first_name {
        assignments.push(("first_name", SqlParam::Text(v.clone())));
    }
    if let Some(v) = &patch.last_name {
        assignments.push(("last_name", SqlParam::Text(v.clone())));
    }
    if let Some(v) = &patch.email {
        assignments.push(("email", SqlParam::Text(v.clone())));
    }
    if let Some(v) = &patch.major {
        assignments.push(("major", SqlParam::Text(v.clone())));
    }
    if let Some(v) = patch.gpa {
        assignments.push(("gpa", gpa_param(v)?));
    }
    if let Some(v) = &patch.status {
        assignments.push(("status", SqlParam::Text(v.to_string())));
    }
    if let Some(v) = patch.enrollment_date {
        assignments.push(("enrollment_date", SqlParam::Date(v)));
    }

    Ok(assignments)
}

/// gpa as the two-place decimal the column stores
fn gpa_param(gpa: f64) -> Result<SqlParam> {
    let decimal = Decimal::from_f64(gpa)
        .ok_or_else(|| Error::validation(format!("gpa must be a finite number, got {}", gpa)))?;
    Ok(SqlParam::Numeric(
        decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    ))
}

/// Render one ad hoc result row for display, keeping column order
pub fn display_row(row: &RawRow<'_>) -> Map<String, JsonValue> {
    row.iter()
        .map(|(column, value)| (column.to_string(), display_value(value)))
        .collect()
}

/// Render one cell for display.
///
/// Dates become `YYYY-MM-DD`, array elements included; everything else keeps
/// its natural JSON shape, nested JSON included.
pub fn display_value(value: &SqlValue) -> JsonValue {
    match value {
        SqlValue::Null => JsonValue::Null,
        SqlValue::Bool(b) => JsonValue::Bool(*b),
        SqlValue::Int(i) => json!(i),
        SqlValue::Float(f) => json!(f),
        SqlValue::Numeric(d) => match decimal_to_f64(d) {
            Some(f) => json!(f),
            None => JsonValue::String(d.to_string()),
        },
        SqlValue::Text(s) => JsonValue::String(s.clone()),
        SqlValue::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
        SqlValue::Timestamp(ts) => JsonValue::String(ts.and_utc().to_rfc3339()),
        SqlValue::TimestampTz(ts) => JsonValue::String(ts.to_rfc3339()),
        SqlValue::Json(v) => v.clone(),
        SqlValue::Array(items) => JsonValue::Array(items.iter().map(display_value).collect()),
        SqlValue::Unsupported(type_name) => JsonValue::String(format!("<{}>", type_name)),
    }
}

fn text_column(row: &RawRow<'_>, column: &str) -> String {
    match row.get(column) {
        Some(SqlValue::Text(s)) => s.clone(),
        Some(SqlValue::Null) | None => String::new(),
        Some(other) => match display_value(other) {
            JsonValue::String(s) => s,
            v => v.to_string(),
        },
    }
}

fn integer_of(value: &SqlValue) -> Option<i64> {
    match value {
        SqlValue::Int(i) => Some(*i),
        SqlValue::Numeric(d) if d.fract().is_zero() => d.to_i64(),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_of(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Float(f) => Some(*f),
        SqlValue::Numeric(d) => decimal_to_f64(d),
        SqlValue::Int(i) => Some(*i as f64),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Go through the decimal text so native and text-shaped cells agree
fn decimal_to_f64(d: &Decimal) -> Option<f64> {
    d.to_string().parse().ok()
}

fn date_text_of(value: &SqlValue) -> String {
    match value {
        SqlValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        SqlValue::Timestamp(ts) => ts.date().format(DATE_FORMAT).to_string(),
        SqlValue::TimestampTz(ts) => ts.date_naive().format(DATE_FORMAT).to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Null => String::new(),
        other => match display_value(other) {
            JsonValue::String(s) => s,
            v => v.to_string(),
        },
    }
}

//! PostgreSQL client implementation
//!
//! Wraps a synchronous `postgres::Client` behind a mutex. The connection is
//! opened on first use and reopened on the next call after it drops; failed
//! statements are reported once and never retried.
//!
//! Parameterless statements that cannot be prepared (several statements in
//! one text) or whose columns have no binary decoder here run over the simple
//! query protocol instead, so they still execute exactly once.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDate;
use native_tls::TlsConnector;
use postgres::types::{FromSql, ToSql, Type};
use postgres::{Client, Row, SimpleQueryMessage};
use postgres_native_tls::MakeTlsConnector;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::ports::{RowSet, SqlClient, SqlParam, SqlValue};

/// PostgreSQL implementation of [`SqlClient`]
pub struct PostgresClient {
    connection_string: String,
    host: String,
    client: Mutex<Option<Client>>,
}

impl PostgresClient {
    /// Create a client for `connection_string` without connecting yet.
    ///
    /// The string is validated here so that configuration mistakes surface
    /// before the first statement. TLS is negotiated according to its
    /// `sslmode` (hosted endpoints use `sslmode=require`).
    pub fn new(connection_string: &str) -> Result<Self> {
        if connection_string.trim().is_empty() {
            return Err(Error::Config(
                "Database connection string is empty".to_string(),
            ));
        }

        let config: postgres::Config = connection_string
            .parse()
            .map_err(|e| Error::Config(format!("Invalid connection string: {}", e)))?;

        Ok(Self {
            connection_string: connection_string.to_string(),
            host: describe_host(&config),
            client: Mutex::new(None),
        })
    }

    /// Host description with credentials stripped, safe to log or display
    pub fn host(&self) -> &str {
        &self.host
    }

    fn connect(&self) -> Result<Client> {
        debug!(host = %self.host, "connecting to PostgreSQL");

        let connector = TlsConnector::builder()
            .build()
            .map_err(|e| Error::database(format!("Failed to initialize TLS: {}", e)))?;

        Client::connect(&self.connection_string, MakeTlsConnector::new(connector)).map_err(|e| {
            Error::database(format!(
                "Failed to connect to PostgreSQL at {}: {}",
                self.host,
                driver_message(&e)
            ))
        })
    }

    /// Run `f` against a live connection, opening one if needed
    fn with_client<T>(
        &self,
        f: impl FnOnce(&mut Client) -> std::result::Result<T, postgres::Error>,
    ) -> Result<T> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| Error::database("PostgreSQL connection lock poisoned"))?;

        if guard.as_ref().map_or(true, |c| c.is_closed()) {
            *guard = Some(self.connect()?);
        }

        let client = guard
            .as_mut()
            .ok_or_else(|| Error::database("PostgreSQL connection unavailable"))?;

        match f(client) {
            Ok(value) => Ok(value),
            Err(e) => {
                if client.is_closed() {
                    *guard = None;
                }
                Err(Error::database(driver_message(&e)))
            }
        }
    }
}

impl SqlClient for PostgresClient {
    fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        debug!(sql, params = params.len(), "execute");
        let bound = bind_params(params);
        self.with_client(|client| client.execute(sql, &bound))
    }

    fn query(&self, sql: &str, params: &[SqlParam]) -> Result<RowSet> {
        debug!(sql, params = params.len(), "query");
        let bound = bind_params(params);
        self.with_client(|client| {
            // Prepare first so column names are known even for empty results
            let statement = match client.prepare(sql) {
                Ok(statement) => statement,
                // Several statements in one text cannot be prepared
                Err(e) if params.is_empty() && e.as_db_error().is_some() => {
                    debug!("statement rejected by prepare, using simple query protocol");
                    return simple_rows(client, sql, &[]);
                }
                Err(e) => return Err(e),
            };

            let types: Vec<Type> = statement
                .columns()
                .iter()
                .map(|c| c.type_().clone())
                .collect();
            if params.is_empty() && !types.iter().all(decodable) {
                debug!("result has columns without a binary decoder, using text results");
                return simple_rows(client, sql, &types);
            }

            let columns = statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            let rows = client.query(&statement, &bound)?;
            Ok(RowSet::new(columns, rows.iter().map(row_values).collect()))
        })
    }
}

fn bind_params(params: &[SqlParam]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|p| match p {
            SqlParam::Int(v) => v as &(dyn ToSql + Sync),
            SqlParam::Text(v) => v as &(dyn ToSql + Sync),
            SqlParam::Numeric(v) => v as &(dyn ToSql + Sync),
            SqlParam::Date(v) => v as &(dyn ToSql + Sync),
        })
        .collect()
}

/// Run `sql` over the simple query protocol.
///
/// Every statement in the text runs; the rows of the last statement that
/// produced a result set are returned. Cells arrive as text and are parsed
/// back using `types` where the column type is known.
fn simple_rows(
    client: &mut Client,
    sql: &str,
    types: &[Type],
) -> std::result::Result<RowSet, postgres::Error> {
    let mut last = RowSet::default();
    let mut current: Option<RowSet> = None;

    for message in client.simple_query(sql)? {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                current = Some(RowSet::new(
                    columns.iter().map(|c| c.name().to_string()).collect(),
                    Vec::new(),
                ));
            }
            SimpleQueryMessage::Row(row) => {
                let set = current.get_or_insert_with(|| {
                    RowSet::new(
                        row.columns().iter().map(|c| c.name().to_string()).collect(),
                        Vec::new(),
                    )
                });
                let values = (0..row.len())
                    .map(|idx| text_value(types.get(idx), row.get(idx)))
                    .collect();
                set.rows.push(values);
            }
            SimpleQueryMessage::CommandComplete(_) => {
                if let Some(set) = current.take() {
                    last = set;
                }
            }
            _ => {}
        }
    }

    Ok(last)
}

/// Parse a text-format cell back into a value for the types the roster uses
fn text_value(ty: Option<&Type>, text: Option<&str>) -> SqlValue {
    let Some(text) = text else {
        return SqlValue::Null;
    };
    let as_text = || SqlValue::Text(text.to_string());
    let Some(ty) = ty else {
        return as_text();
    };

    match *ty {
        Type::BOOL => match text {
            "t" => SqlValue::Bool(true),
            "f" => SqlValue::Bool(false),
            _ => as_text(),
        },
        Type::INT2 | Type::INT4 | Type::INT8 => {
            text.parse().map(SqlValue::Int).unwrap_or_else(|_| as_text())
        }
        Type::FLOAT4 | Type::FLOAT8 => {
            text.parse().map(SqlValue::Float).unwrap_or_else(|_| as_text())
        }
        Type::NUMERIC => Decimal::from_str(text)
            .map(SqlValue::Numeric)
            .unwrap_or_else(|_| as_text()),
        Type::DATE => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(SqlValue::Date)
            .unwrap_or_else(|_| as_text()),
        Type::JSON | Type::JSONB => serde_json::from_str(text)
            .map(SqlValue::Json)
            .unwrap_or_else(|_| as_text()),
        _ => as_text(),
    }
}

/// Whether [`column_value`] can decode a column of this type
fn decodable(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::NUMERIC
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::UNKNOWN
            | Type::DATE
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
            | Type::JSON
            | Type::JSONB
            | Type::INTERVAL
            | Type::BOOL_ARRAY
            | Type::INT2_ARRAY
            | Type::INT4_ARRAY
            | Type::INT8_ARRAY
            | Type::FLOAT4_ARRAY
            | Type::FLOAT8_ARRAY
            | Type::NUMERIC_ARRAY
            | Type::TEXT_ARRAY
            | Type::VARCHAR_ARRAY
            | Type::BPCHAR_ARRAY
            | Type::NAME_ARRAY
            | Type::DATE_ARRAY
            | Type::TIMESTAMP_ARRAY
            | Type::TIMESTAMPTZ_ARRAY
            | Type::JSON_ARRAY
            | Type::JSONB_ARRAY
            | Type::INTERVAL_ARRAY
    )
}

fn row_values(row: &Row) -> Vec<SqlValue> {
    (0..row.len()).map(|idx| column_value(row, idx)).collect()
}

/// Decode one cell according to its column type
fn column_value(row: &Row, idx: usize) -> SqlValue {
    let ty = row.columns()[idx].type_();

    let decoded = match *ty {
        Type::BOOL => get(row, idx, SqlValue::Bool),
        Type::INT2 => get(row, idx, |i: i16| SqlValue::Int(i64::from(i))),
        Type::INT4 => get(row, idx, |i: i32| SqlValue::Int(i64::from(i))),
        Type::INT8 => get(row, idx, SqlValue::Int),
        Type::FLOAT4 => get(row, idx, |f: f32| SqlValue::Float(f64::from(f))),
        Type::FLOAT8 => get(row, idx, SqlValue::Float),
        Type::NUMERIC => get(row, idx, SqlValue::Numeric),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get(row, idx, SqlValue::Text)
        }
        Type::DATE => get(row, idx, SqlValue::Date),
        Type::TIMESTAMP => get(row, idx, SqlValue::Timestamp),
        Type::TIMESTAMPTZ => get(row, idx, SqlValue::TimestampTz),
        Type::JSON | Type::JSONB => get(row, idx, SqlValue::Json),
        Type::INTERVAL => get(row, idx, |i: Interval| SqlValue::Text(i.to_string())),
        Type::BOOL_ARRAY => array(row, idx, SqlValue::Bool),
        Type::INT2_ARRAY => array(row, idx, |i: i16| SqlValue::Int(i64::from(i))),
        Type::INT4_ARRAY => array(row, idx, |i: i32| SqlValue::Int(i64::from(i))),
        Type::INT8_ARRAY => array(row, idx, SqlValue::Int),
        Type::FLOAT4_ARRAY => array(row, idx, |f: f32| SqlValue::Float(f64::from(f))),
        Type::FLOAT8_ARRAY => array(row, idx, SqlValue::Float),
        Type::NUMERIC_ARRAY => array(row, idx, SqlValue::Numeric),
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY | Type::BPCHAR_ARRAY | Type::NAME_ARRAY => {
            array(row, idx, SqlValue::Text)
        }
        Type::DATE_ARRAY => array(row, idx, SqlValue::Date),
        Type::TIMESTAMP_ARRAY => array(row, idx, SqlValue::Timestamp),
        Type::TIMESTAMPTZ_ARRAY => array(row, idx, SqlValue::TimestampTz),
        Type::JSON_ARRAY | Type::JSONB_ARRAY => array(row, idx, SqlValue::Json),
        Type::INTERVAL_ARRAY => array(row, idx, |i: Interval| SqlValue::Text(i.to_string())),
        _ => return SqlValue::Unsupported(ty.name().to_string()),
    };

    match decoded {
        Ok(Some(value)) => value,
        Ok(None) => SqlValue::Null,
        // e.g. a NUMERIC wider than Decimal can hold, or a multi-dimensional array
        Err(_) => SqlValue::Unsupported(ty.name().to_string()),
    }
}

fn get<'a, T: FromSql<'a>>(
    row: &'a Row,
    idx: usize,
    wrap: impl Fn(T) -> SqlValue,
) -> std::result::Result<Option<SqlValue>, postgres::Error> {
    row.try_get::<_, Option<T>>(idx).map(|v| v.map(wrap))
}

/// One-dimensional arrays; null elements stay null
fn array<'a, T: FromSql<'a>>(
    row: &'a Row,
    idx: usize,
    wrap: impl Fn(T) -> SqlValue,
) -> std::result::Result<Option<SqlValue>, postgres::Error> {
    row.try_get::<_, Option<Vec<Option<T>>>>(idx).map(|v| {
        v.map(|items| {
            SqlValue::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(SqlValue::Null, &wrap))
                    .collect(),
            )
        })
    })
}

/// A Postgres `interval`, printed the way the server prints it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    months: i32,
    days: i32,
    micros: i64,
}

impl<'a> FromSql<'a> for Interval {
    fn from_sql(
        _: &Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        if raw.len() != 16 {
            return Err(format!("invalid interval length {}", raw.len()).into());
        }
        Ok(Self {
            micros: i64::from_be_bytes(<[u8; 8]>::try_from(&raw[0..8])?),
            days: i32::from_be_bytes(<[u8; 4]>::try_from(&raw[8..12])?),
            months: i32::from_be_bytes(<[u8; 4]>::try_from(&raw[12..16])?),
        })
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        push_unit(&mut parts, self.months / 12, "year");
        push_unit(&mut parts, self.months % 12, "mon");
        push_unit(&mut parts, self.days, "day");

        if self.micros != 0 || parts.is_empty() {
            let sign = if self.micros < 0 { "-" } else { "" };
            let total = self.micros.unsigned_abs();
            let secs = total / 1_000_000;
            let mut time = format!(
                "{}{:02}:{:02}:{:02}",
                sign,
                secs / 3600,
                (secs / 60) % 60,
                secs % 60
            );
            let fraction = total % 1_000_000;
            if fraction > 0 {
                time.push('.');
                time.push_str(format!("{:06}", fraction).trim_end_matches('0'));
            }
            parts.push(time);
        }

        f.write_str(&parts.join(" "))
    }
}

fn push_unit(parts: &mut Vec<String>, n: i32, unit: &str) {
    if n != 0 {
        let plural = if n == 1 { "" } else { "s" };
        parts.push(format!("{} {}{}", n, unit, plural));
    }
}

/// The server's own message when there is one, else the client error text
fn driver_message(error: &postgres::Error) -> String {
    error
        .as_db_error()
        .map(|db| db.message().to_string())
        .unwrap_or_else(|| error.to_string())
}

fn describe_host(config: &postgres::Config) -> String {
    let host = config
        .get_hosts()
        .first()
        .map(|h| match h {
            postgres::config::Host::Tcp(name) => name.clone(),
            #[cfg(unix)]
            postgres::config::Host::Unix(path) => path.display().to_string(),
        })
        .unwrap_or_else(|| "localhost".to_string());

    match config.get_dbname() {
        Some(db) => format!("{}/{}", host, db),
        None => host,
    }
}

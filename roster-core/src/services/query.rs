//! Query service - ad hoc SQL execution

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::warn;

use crate::domain::result::{Error, Result};
use crate::ports::SqlClient;
use crate::services::bootstrap::SchemaBootstrapper;
use crate::services::normalize::display_row;
use crate::services::safety;

/// Result of an ad hoc query, ready for display
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, JsonValue>>,
    pub row_count: usize,
}

/// Query service for ad hoc SQL
pub struct QueryService {
    client: Arc<dyn SqlClient>,
    bootstrap: Arc<SchemaBootstrapper>,
}

impl QueryService {
    pub fn new(client: Arc<dyn SqlClient>, bootstrap: Arc<SchemaBootstrapper>) -> Self {
        Self { client, bootstrap }
    }

    /// Execute a SQL statement as written.
    ///
    /// The schema is bootstrapped first, then the statement goes through the
    /// safety gate. Rejected statements are never sent to the database.
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        self.bootstrap.ensure_ready()?;

        if let Some(word) = safety::denied_token(sql) {
            warn!(word, "Rejected ad hoc query");
            return Err(Error::policy_rejected());
        }

        let rows = self.client.query(sql, &[]).map_err(|e| {
            let detail = match e {
                Error::Database(msg) => msg,
                other => other.to_string(),
            };
            Error::Query(detail)
        })?;

        let records: Vec<Map<String, JsonValue>> =
            rows.records().map(|row| display_row(&row)).collect();

        Ok(QueryResult {
            columns: rows.columns.clone(),
            row_count: records.len(),
            rows: records,
        })
    }
}

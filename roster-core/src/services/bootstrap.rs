//! Schema bootstrap - table creation and first-run seeding

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::adapters::seed::seed_students;
use crate::domain::result::{Error, Result};
use crate::ports::{SqlClient, SqlValue};
use crate::services::normalize::new_student_params;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS students (
    id SERIAL PRIMARY KEY,
    first_name VARCHAR(100),
    last_name VARCHAR(100),
    email VARCHAR(150),
    major VARCHAR(100),
    gpa DECIMAL(3,2),
    status VARCHAR(50),
    enrollment_date DATE
)";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM students";

const SEED_INSERT_SQL: &str = "INSERT INTO students (first_name, last_name, email, major, gpa, status, enrollment_date) VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// Makes sure the `students` table exists and is seeded before first use.
///
/// The ready flag is set only after a fully successful pass, so a failed
/// attempt is retried on the next call. Once set, calls do no I/O.
pub struct SchemaBootstrapper {
    client: Arc<dyn SqlClient>,
    ready: AtomicBool,
}

impl SchemaBootstrapper {
    pub fn new(client: Arc<dyn SqlClient>) -> Self {
        Self {
            client,
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Create the table if needed and seed it when empty
    pub fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        match self.bootstrap() {
            Ok(()) => {
                self.ready.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                error!("Database initialization failed: {}", e);
                Err(e)
            }
        }
    }

    fn bootstrap(&self) -> Result<()> {
        self.client.execute(CREATE_TABLE_SQL, &[])?;

        let count = self.row_count()?;
        debug!(count, "students table checked");
        if count > 0 {
            return Ok(());
        }

        info!("Seeding database with initial data...");
        for student in seed_students() {
            let params = new_student_params(&student)?;
            self.client.execute(SEED_INSERT_SQL, &params)?;
        }
        Ok(())
    }

    fn row_count(&self) -> Result<i64> {
        let rows = self.client.query(COUNT_SQL, &[])?;
        let value = rows
            .first()
            .and_then(|row| row.iter().next().map(|(_, v)| v.clone()));

        match value {
            Some(SqlValue::Int(n)) => Ok(n),
            Some(SqlValue::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| Error::database(format!("Unexpected row count: {}", s))),
            other => Err(Error::database(format!("Unexpected row count: {:?}", other))),
        }
    }
}

//! Student service - CRUD over the students table

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{NewStudent, Student, StudentPatch};
use crate::ports::{RowSet, SqlClient, SqlParam, SqlValue};
use crate::services::bootstrap::SchemaBootstrapper;
use crate::services::normalize::{new_student_params, normalize_student, patch_assignments};

const SELECT_ALL_SQL: &str = "SELECT * FROM students ORDER BY id ASC";
const SELECT_ONE_SQL: &str = "SELECT * FROM students WHERE id = $1";
const INSERT_SQL: &str = "INSERT INTO students (first_name, last_name, email, major, gpa, status, enrollment_date) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *";
const DELETE_SQL: &str = "DELETE FROM students WHERE id = $1 RETURNING id";

/// What a delete request did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The row with this id was removed
    Deleted(i32),
    /// No row had the id
    Missing,
    /// The id could not name a row; nothing was sent to the database
    InvalidId,
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }
}

/// Student service for roster records
///
/// Every operation bootstraps the schema first.
pub struct StudentService {
    client: Arc<dyn SqlClient>,
    bootstrap: Arc<SchemaBootstrapper>,
}

impl StudentService {
    pub fn new(client: Arc<dyn SqlClient>, bootstrap: Arc<SchemaBootstrapper>) -> Self {
        Self { client, bootstrap }
    }

    /// All students ordered by ascending id
    pub fn fetch_all(&self) -> Result<Vec<Student>> {
        self.bootstrap.ensure_ready()?;
        let rows = self
            .client
            .query(SELECT_ALL_SQL, &[])
            .map_err(|e| {
                Error::database(format!("Failed to fetch students: {}", driver_detail(&e)))
            })?;
        students_from(&rows)
    }

    /// One student by id
    pub fn get_by_id(&self, id: i32) -> Result<Student> {
        self.bootstrap.ensure_ready()?;
        let rows = self.client.query(SELECT_ONE_SQL, &[SqlParam::Int(id)])?;
        first_student(&rows, id)
    }

    /// Insert a student and return the stored row with its new id
    pub fn insert(&self, student: &NewStudent) -> Result<Student> {
        self.bootstrap.ensure_ready()?;
        let params = new_student_params(student)?;
        let rows = self.client.query(INSERT_SQL, &params)?;
        let created = rows
            .first()
            .ok_or_else(|| Error::database("Insert returned no row"))
            .and_then(|row| normalize_student(&row))?;
        debug!(id = created.id, "student inserted");
        Ok(created)
    }

    /// Apply the set fields of `patch` to student `id`.
    ///
    /// An empty patch changes nothing and returns the current row.
    pub fn update_by_id(&self, id: i32, patch: &StudentPatch) -> Result<Student> {
        if patch.is_empty() {
            return self.get_by_id(id);
        }

        self.bootstrap.ensure_ready()?;
        let assignments = patch_assignments(patch)?;

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(idx, (column, _))| format!("{} = ${}", column, idx + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE students SET {} WHERE id = $1 RETURNING *", set_clause);

        let mut params = Vec::with_capacity(assignments.len() + 1);
        params.push(SqlParam::Int(id));
        params.extend(assignments.into_iter().map(|(_, param)| param));

        let rows = self.client.query(&sql, &params)?;
        first_student(&rows, id)
    }

    /// Delete student `id`.
    ///
    /// Ids that are not positive or do not fit the id column are logged and
    /// reported as [`DeleteOutcome::InvalidId`] without touching the table.
    pub fn delete_by_id(&self, id: i64) -> Result<DeleteOutcome> {
        self.bootstrap.ensure_ready()?;

        let id = match i32::try_from(id) {
            Ok(id) if id > 0 => id,
            _ => {
                warn!("Invalid ID provided for deletion: {}", id);
                return Ok(DeleteOutcome::InvalidId);
            }
        };

        let rows = self.client.query(DELETE_SQL, &[SqlParam::Int(id)])?;
        let deleted = rows.first().and_then(|row| match row.get("id") {
            Some(SqlValue::Int(v)) => i32::try_from(*v).ok(),
            Some(SqlValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        });

        Ok(match deleted {
            Some(id) => DeleteOutcome::Deleted(id),
            None => DeleteOutcome::Missing,
        })
    }

    /// Delete by an id as typed by a caller, e.g. a path segment
    pub fn delete_by_raw_id(&self, raw: &str) -> Result<DeleteOutcome> {
        match raw.trim().parse::<i64>() {
            Ok(id) => self.delete_by_id(id),
            Err(_) => {
                self.bootstrap.ensure_ready()?;
                warn!("Invalid ID provided for deletion: {:?}", raw);
                Ok(DeleteOutcome::InvalidId)
            }
        }
    }
}

fn students_from(rows: &RowSet) -> Result<Vec<Student>> {
    rows.records().map(|row| normalize_student(&row)).collect()
}

fn first_student(rows: &RowSet, id: i32) -> Result<Student> {
    match rows.first() {
        Some(row) => normalize_student(&row),
        None => Err(Error::not_found(format!("Student {} not found", id))),
    }
}

/// The driver's message without our own "Database error" prefix
fn driver_detail(error: &Error) -> String {
    match error {
        Error::Database(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{date, MemoryClient, ValueShape};
    use crate::adapters::seed::seed_students;
    use crate::domain::StudentStatus;

    fn service_for(client: &Arc<MemoryClient>) -> StudentService {
        let sql: Arc<dyn SqlClient> = Arc::clone(client) as Arc<dyn SqlClient>;
        let bootstrap = Arc::new(SchemaBootstrapper::new(Arc::clone(&sql)));
        StudentService::new(sql, bootstrap)
    }

    fn sample() -> NewStudent {
        NewStudent {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "t@u.edu".to_string(),
            major: "Physics".to_string(),
            gpa: 3.5,
            status: StudentStatus::Active,
            enrollment_date: date(2024, 1, 1),
        }
    }

    #[test]
    fn test_fetch_all_seeds_and_orders_by_id() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        let students = service.fetch_all().unwrap();
        assert_eq!(students.len(), 12);
        assert!(students.windows(2).all(|w| w[0].id < w[1].id));

        let seeds = seed_students();
        for (seed, stored) in seeds.iter().zip(&students) {
            assert!(seed.matches(stored), "{} did not round-trip", seed.first_name);
        }
        assert_eq!(students[0].enrollment_date, "2023-09-01");
    }

    #[test]
    fn test_fetch_all_text_shape_matches_native_shape() {
        let native = service_for(&Arc::new(MemoryClient::new())).fetch_all().unwrap();
        let text = service_for(&Arc::new(MemoryClient::with_shape(ValueShape::Text)))
            .fetch_all()
            .unwrap();
        assert_eq!(native, text);
    }

    #[test]
    fn test_fetch_all_wraps_driver_errors() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);
        service.fetch_all().unwrap();

        client.fail_on("SELECT * FROM students ORDER BY", 1);
        let err = service.fetch_all().unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().contains("Failed to fetch students"));
    }

    #[test]
    fn test_insert_returns_new_row_and_shows_up_last() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        let created = service.insert(&sample()).unwrap();
        assert!(created.id > 0);
        assert!(sample().matches(&created));
        assert_eq!(created.gpa, 3.5);
        assert_eq!(created.enrollment_date, "2024-01-01");

        let all = service.fetch_all().unwrap();
        assert_eq!(all.len(), 13);
        assert_eq!(all.last().unwrap().id, created.id);
    }

    #[test]
    fn test_insert_on_text_shape_client() {
        let client = Arc::new(MemoryClient::with_shape(ValueShape::Text));
        let service = service_for(&client);

        let created = service.insert(&sample()).unwrap();
        assert_eq!(created.gpa, 3.5);
        assert_eq!(created.enrollment_date, "2024-01-01");
    }

    #[test]
    fn test_update_changes_only_named_fields() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);
        let created = service.insert(&sample()).unwrap();

        let patch = StudentPatch::default().with_status(StudentStatus::Graduated);
        let updated = service.update_by_id(created.id, &patch).unwrap();

        assert_eq!(updated.status, StudentStatus::Graduated);
        assert_eq!(updated.first_name, created.first_name);
        assert_eq!(updated.gpa, created.gpa);
        assert_eq!(updated.enrollment_date, created.enrollment_date);
        assert!(client
            .statements()
            .iter()
            .any(|s| s == "UPDATE students SET status = $2 WHERE id = $1 RETURNING *"));
    }

    #[test]
    fn test_update_multiple_fields_numbers_placeholders_in_order() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        let patch = StudentPatch::default().with_gpa(3.33).with_major("History");
        let updated = service.update_by_id(1, &patch).unwrap();
        assert_eq!(updated.major, "History");
        assert_eq!(updated.gpa, 3.33);
        assert!(client
            .statements()
            .iter()
            .any(|s| s == "UPDATE students SET major = $2, gpa = $3 WHERE id = $1 RETURNING *"));
    }

    #[test]
    fn test_empty_patch_returns_current_row_without_update() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        let current = service.update_by_id(2, &StudentPatch::default()).unwrap();
        assert_eq!(current.first_name, "Bob");
        assert_eq!(client.count_statements("UPDATE"), 0);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        let patch = StudentPatch::default().with_email("x@y.edu");
        let err = service.update_by_id(999, &patch).unwrap_err();
        assert!(err.is_not_found());

        let err = service.update_by_id(999, &StudentPatch::default()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_existing_then_missing() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);
        let created = service.insert(&sample()).unwrap();

        assert_eq!(
            service.delete_by_id(i64::from(created.id)).unwrap(),
            DeleteOutcome::Deleted(created.id)
        );
        assert_eq!(
            service.delete_by_id(i64::from(created.id)).unwrap(),
            DeleteOutcome::Missing
        );
        assert!(service.get_by_id(created.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_invalid_ids_do_not_reach_the_table() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        assert_eq!(service.delete_by_id(0).unwrap(), DeleteOutcome::InvalidId);
        assert_eq!(service.delete_by_id(-5).unwrap(), DeleteOutcome::InvalidId);
        assert_eq!(
            service.delete_by_id(i64::from(i32::MAX) + 1).unwrap(),
            DeleteOutcome::InvalidId
        );
        assert_eq!(service.delete_by_raw_id("abc").unwrap(), DeleteOutcome::InvalidId);
        assert_eq!(client.count_statements("DELETE"), 0);
        assert_eq!(client.row_count(), 12);
    }

    #[test]
    fn test_delete_by_raw_id_parses_numbers() {
        let client = Arc::new(MemoryClient::new());
        let service = service_for(&client);

        assert_eq!(service.delete_by_raw_id(" 3 ").unwrap(), DeleteOutcome::Deleted(3));
        assert_eq!(client.row_count(), 11);
    }

    #[test]
    fn test_bootstrap_failure_propagates() {
        let client = Arc::new(MemoryClient::new());
        client.fail_on("CREATE TABLE", 1);
        let service = service_for(&client);

        assert!(matches!(service.fetch_all(), Err(Error::Database(_))));
        assert_eq!(service.fetch_all().unwrap().len(), 12);
    }
}

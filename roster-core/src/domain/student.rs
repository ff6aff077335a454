//! Student domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Majors offered by the admin console's forms.
///
/// The database column is free-form text; this list only constrains input.
pub const MAJORS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Biology",
    "Chemistry",
    "History",
    "Psychology",
    "Economics",
    "Drama",
    "Astronomy",
];

/// Enrollment status of a student
///
/// Stored as text. Labels outside the four known values are kept verbatim
/// in `Other` so rows written by ad hoc statements still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum StudentStatus {
    Active,
    Probation,
    Graduated,
    Dropped,
    Other(String),
}

impl StudentStatus {
    /// The four statuses the console offers
    pub const KNOWN: [StudentStatus; 4] = [
        StudentStatus::Active,
        StudentStatus::Probation,
        StudentStatus::Graduated,
        StudentStatus::Dropped,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Probation => "Probation",
            StudentStatus::Graduated => "Graduated",
            StudentStatus::Dropped => "Dropped",
            StudentStatus::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StudentStatus::Other(_))
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Active" => StudentStatus::Active,
            "Probation" => StudentStatus::Probation,
            "Graduated" => StudentStatus::Graduated,
            "Dropped" => StudentStatus::Dropped,
            other => StudentStatus::Other(other.to_string()),
        })
    }
}

impl From<String> for StudentStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<StudentStatus> for String {
    fn from(status: StudentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A student as stored in the roster.
///
/// `enrollment_date` is always surfaced as `YYYY-MM-DD` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub major: String,
    pub gpa: f64,
    pub status: StudentStatus,
    pub enrollment_date: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for a new student; the database assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub major: String,
    pub gpa: f64,
    pub status: StudentStatus,
    pub enrollment_date: NaiveDate,
}

impl NewStudent {
    /// True if `student` carries exactly these fields
    ///
    /// gpa is compared at the two-decimal precision of the storage column.
    pub fn matches(&self, student: &Student) -> bool {
        self.first_name == student.first_name
            && self.last_name == student.last_name
            && self.email == student.email
            && self.major == student.major
            && (self.gpa - student.gpa).abs() < 0.005
            && self.status == student.status
            && self.enrollment_date.format("%Y-%m-%d").to_string() == student.enrollment_date
    }
}

/// Partial update of a student. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StudentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<NaiveDate>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.major.is_none()
            && self.gpa.is_none()
            && self.status.is_none()
            && self.enrollment_date.is_none()
    }

    pub fn with_status(mut self, status: StudentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_gpa(mut self, gpa: f64) -> Self {
        self.gpa = Some(gpa);
        self
    }

    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

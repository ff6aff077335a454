//! Roster statistics and search
//!
//! Pure functions over an already-fetched roster; no database access.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Student, StudentStatus};

/// How many majors the dashboard lists
const TOP_MAJORS: usize = 5;

/// Dashboard summary of a roster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub active: usize,
    pub probation: usize,
    /// Mean gpa, `None` for an empty roster
    pub average_gpa: Option<f64>,
    /// (major, count), most common first, ties by name
    pub top_majors: Vec<(String, usize)>,
    /// Count per status label, in label order
    pub status_breakdown: BTreeMap<String, usize>,
}

pub fn summarize(students: &[Student]) -> DashboardStats {
    let count_status =
        |status: &StudentStatus| students.iter().filter(|s| &s.status == status).count();

    let average_gpa = if students.is_empty() {
        None
    } else {
        Some(students.iter().map(|s| s.gpa).sum::<f64>() / students.len() as f64)
    };

    let mut majors: BTreeMap<&str, usize> = BTreeMap::new();
    let mut status_breakdown = BTreeMap::new();
    for s in students {
        *majors.entry(s.major.as_str()).or_default() += 1;
        *status_breakdown.entry(s.status.to_string()).or_default() += 1;
    }

    let mut top_majors: Vec<(String, usize)> = majors
        .into_iter()
        .map(|(major, count)| (major.to_string(), count))
        .collect();
    top_majors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_majors.truncate(TOP_MAJORS);

    DashboardStats {
        total: students.len(),
        active: count_status(&StudentStatus::Active),
        probation: count_status(&StudentStatus::Probation),
        average_gpa,
        top_majors,
        status_breakdown,
    }
}

/// Students whose first name, last name or email contains `term`, ignoring case.
/// A blank term matches everyone.
pub fn search<'a>(students: &'a [Student], term: &str) -> Vec<&'a Student> {
    let term = term.trim().to_lowercase();
    students
        .iter()
        .filter(|s| {
            term.is_empty()
                || [&s.first_name, &s.last_name, &s.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

//! Seed roster
//!
//! Twelve example students inserted when the table is first found empty.
//! Order matters: ids are assigned in insertion order.

use chrono::NaiveDate;

use crate::domain::{NewStudent, StudentStatus};

/// The fixed seed dataset, in insertion order
#[rustfmt::skip]
pub fn seed_students() -> Vec<NewStudent> {
    use StudentStatus::*;

    vec![
        student("Alice", "Johnson", "alice.j@university.edu", "Computer Science", 3.8, Active, (2023, 9, 1)),
        student("Bob", "Smith", "bob.smith@university.edu", "Mathematics", 2.9, Probation, (2022, 9, 1)),
        student("Charlie", "Brown", "c.brown@university.edu", "Physics", 3.5, Active, (2023, 1, 15)),
        student("Diana", "Prince", "diana.p@university.edu", "Computer Science", 4.0, Active, (2021, 9, 1)),
        student("Evan", "Wright", "evan.w@university.edu", "History", 3.2, Active, (2023, 9, 1)),
        student("Fiona", "Gallagher", "fiona.g@university.edu", "Biology", 3.9, Graduated, (2020, 9, 1)),
        student("George", "Miller", "george.m@university.edu", "Chemistry", 2.4, Probation, (2022, 9, 1)),
        student("Hannah", "Abbott", "h.abbott@university.edu", "Psychology", 3.6, Active, (2023, 9, 1)),
        student("Ian", "Somerhalder", "ian.s@university.edu", "Drama", 3.1, Active, (2021, 9, 1)),
        student("Julia", "Roberts", "j.roberts@university.edu", "Economics", 3.75, Active, (2022, 1, 20)),
        student("Kevin", "Hart", "k.hart@university.edu", "Computer Science", 2.8, Active, (2023, 9, 1)),
        student("Luna", "Lovegood", "luna.l@university.edu", "Astronomy", 3.95, Active, (2022, 9, 1)),
    ]
}

fn student(
    first_name: &str,
    last_name: &str,
    email: &str,
    major: &str,
    gpa: f64,
    status: StudentStatus,
    (year, month, day): (i32, u32, u32),
) -> NewStudent {
    NewStudent {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        major: major.to_string(),
        gpa,
        status,
        enrollment_date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
    }
}

//! Add command - insert a student

use anyhow::Result;
use roster_core::{NewStudent, MAJORS};

use super::get_context;
use crate::output;

pub fn run(student: NewStudent, json: bool) -> Result<()> {
    if !json {
        warn_unlisted_major(&student.major);
    }

    let ctx = get_context()?;
    let created = ctx.student_service.insert(&student)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    output::success(&format!("Added {} with id {}", created.full_name(), created.id));
    output::print_student(&created);
    Ok(())
}

/// The column accepts any major; only flag ones outside the offered list
pub fn warn_unlisted_major(major: &str) {
    if !MAJORS.contains(&major) {
        output::warning(&format!(
            "'{}' is not one of the listed majors ({})",
            major,
            MAJORS.join(", ")
        ));
    }
}

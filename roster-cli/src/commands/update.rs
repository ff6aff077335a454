//! Update command - change fields of a student

use anyhow::Result;
use colored::Colorize;
use roster_core::StudentPatch;

use super::add::warn_unlisted_major;
use super::get_context;
use crate::output;

pub fn run(id: i32, patch: StudentPatch, json: bool) -> Result<()> {
    if !json {
        if let Some(major) = &patch.major {
            warn_unlisted_major(major);
        }
        if patch.is_empty() {
            println!("{}", "No fields given; showing the current record.".dimmed());
        }
    }

    let ctx = get_context()?;
    let updated = ctx.student_service.update_by_id(id, &patch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
        return Ok(());
    }

    if !patch.is_empty() {
        output::success(&format!("Updated student {}", updated.id));
    }
    output::print_student(&updated);
    Ok(())
}

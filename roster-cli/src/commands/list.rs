//! List and show commands - read students

use anyhow::Result;
use colored::Colorize;
use roster_core::services::stats::search;

use super::get_context;
use crate::output;

pub fn run(term: Option<&str>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let students = ctx.student_service.fetch_all()?;
    let shown = search(&students, term.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("{}", "No students found matching your criteria.".dimmed());
        return Ok(());
    }

    println!("{}", output::student_table(shown.iter().copied()));
    println!();
    println!("{} of {} student(s)", shown.len(), students.len());
    Ok(())
}

pub fn run_show(id: i32, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let student = ctx.student_service.get_by_id(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&student)?);
    } else {
        output::print_student(&student);
    }
    Ok(())
}

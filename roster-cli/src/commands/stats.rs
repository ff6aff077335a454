//! Stats command - roster dashboard summary

use anyhow::Result;
use colored::Colorize;
use roster_core::services::summarize;

use super::get_context;
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let students = ctx.student_service.fetch_all()?;
    let stats = summarize(&students);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Roster Overview".bold());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Total Students".to_string(), stats.total.to_string()]);
    table.add_row(vec!["Active".to_string(), stats.active.to_string()]);
    table.add_row(vec!["On Probation".to_string(), stats.probation.to_string()]);
    table.add_row(vec![
        "Average GPA".to_string(),
        stats
            .average_gpa
            .map(|gpa| format!("{:.2}", gpa))
            .unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{}", table);
    println!();

    if !stats.top_majors.is_empty() {
        println!("{}", "Top Majors".bold());
        for (major, count) in &stats.top_majors {
            println!("  • {} ({})", major, count);
        }
        println!();
    }

    println!("{}", "Status Breakdown".bold());
    for (status, count) in &stats.status_breakdown {
        println!("  • {}: {}", status, count);
    }

    Ok(())
}

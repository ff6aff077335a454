//! Output formatting utilities

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use roster_core::{Student, StudentStatus};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Table of students, one per row
pub fn student_table<'a>(students: impl IntoIterator<Item = &'a Student>) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Email", "Major", "GPA", "Status", "Enrolled"]);
    for s in students {
        table.add_row(vec![
            s.id.to_string(),
            s.full_name(),
            s.email.clone(),
            s.major.clone(),
            format!("{:.2}", s.gpa),
            status_label(&s.status),
            s.enrollment_date.clone(),
        ]);
    }
    table
}

/// Print one student as key-value pairs
pub fn print_student(student: &Student) {
    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), student.id.to_string()]);
    table.add_row(vec!["Name".to_string(), student.full_name()]);
    table.add_row(vec!["Email".to_string(), student.email.clone()]);
    table.add_row(vec!["Major".to_string(), student.major.clone()]);
    table.add_row(vec!["GPA".to_string(), format!("{:.2}", student.gpa)]);
    table.add_row(vec!["Status".to_string(), status_label(&student.status)]);
    table.add_row(vec!["Enrolled".to_string(), student.enrollment_date.clone()]);
    println!("{}", table);
}

fn status_label(status: &StudentStatus) -> String {
    match status {
        StudentStatus::Active => status.to_string().green().to_string(),
        StudentStatus::Probation => status.to_string().yellow().to_string(),
        StudentStatus::Graduated => status.to_string().blue().to_string(),
        StudentStatus::Dropped => status.to_string().red().to_string(),
        StudentStatus::Other(_) => status.to_string().dimmed().to_string(),
    }
}

/// Spinner on stderr while waiting on the model
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(msg.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Cell text for table output
pub fn value_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => v.to_string(),
    }
}

/// Cell text for CSV output, quoted when needed
pub fn value_to_csv(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "".to_string(),
        serde_json::Value::String(s) => csv_field(s),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        // Nested JSON is one field
        _ => csv_field(&v.to_string()),
    }
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

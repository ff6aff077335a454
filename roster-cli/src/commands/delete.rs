//! Delete command - remove a student

use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use roster_core::{DeleteOutcome, OperationResult};
use serde_json::json;

use super::get_context;

pub fn run(id: &str, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    // Confirm removal unless --force
    if !force {
        if let Ok(parsed) = id.trim().parse::<i32>() {
            if let Ok(student) = ctx.student_service.get_by_id(parsed) {
                let warning =
                    format!("This will delete {} (id {}).", student.full_name(), student.id);
                println!("\n{}", warning.yellow());
            }
        }

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let outcome = ctx.student_service.delete_by_raw_id(id);

    if json {
        let result = match outcome {
            Ok(outcome) => OperationResult::ok_with_context(
                outcome,
                HashMap::from([("requestedId".to_string(), json!(id.trim()))]),
            ),
            Err(e) => OperationResult::fail(e.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match outcome? {
        DeleteOutcome::Deleted(deleted) => {
            println!("{} Student {} deleted", "✓".green(), deleted);
        }
        DeleteOutcome::Missing => {
            println!("{}", format!("No student with id {}; nothing deleted.", id.trim()).dimmed());
        }
        DeleteOutcome::InvalidId => {
            println!("{}", format!("'{}' is not a valid student id.", id).yellow());
        }
    }

    Ok(())
}

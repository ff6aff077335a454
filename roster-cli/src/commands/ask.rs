//! Ask command - translate a question into SQL and optionally run it

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::query::print_result;
use super::{get_config, get_context};
use crate::output;

pub fn run(question: &str, execute: bool, json: bool) -> Result<()> {
    // Only running the SQL needs the database
    let ctx = if execute { Some(get_context()?) } else { None };
    let standalone;
    let translator = match &ctx {
        Some(ctx) => &ctx.translate_service,
        None => {
            standalone = roster_core::translator(&get_config()?)?;
            &standalone
        }
    };

    let spinner = (!json).then(|| output::spinner("Generating SQL..."));
    let translated = translator.translate(question);
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let sql = translated?;

    let Some(ctx) = ctx else {
        if json {
            println!("{}", serde_json::to_string_pretty(&json!({ "sql": sql }))?);
        } else {
            output::info("Generated SQL:");
            println!("{}", sql.bold());
            println!();
            println!("{}", "Run it with --run, or pass it to `roster query`.".dimmed());
        }
        return Ok(());
    };

    // Generated SQL goes through the same safety gate as typed SQL
    let result = ctx.query_service.execute(&sql)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "sql": sql, "result": result }))?
        );
    } else {
        output::info("Generated SQL:");
        println!("{}", sql.bold());
        println!();
        print_result(&result, "table")?;
    }
    Ok(())
}

//! Query command - execute SQL queries against the roster database

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use roster_core::QueryResult;

use super::get_context;
use crate::output::{create_table, value_to_csv, value_to_string};

pub fn run(sql: Option<&str>, file: Option<&Path>, format: &str) -> Result<()> {
    // Get SQL from: argument, file, or stdin
    let sql_content = if let Some(sql) = sql {
        sql.to_string()
    } else if let Some(file_path) = file {
        std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read SQL file: {:?}", file_path))?
    } else if atty::isnt(atty::Stream::Stdin) {
        // Read from stdin if not a TTY
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read SQL from stdin")?;
        buffer
    } else {
        anyhow::bail!("No SQL query provided. Use positional argument, --file, or pipe from stdin.");
    };

    let ctx = get_context()?;
    let result = ctx.query_service.execute(&sql_content)?;
    print_result(&result, format)
}

/// Print a query result as table, json or csv
pub fn print_result(result: &QueryResult, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        "csv" => {
            for line in csv_lines(result) {
                println!("{}", line);
            }
        }
        _ => {
            let mut table = create_table();
            table.set_header(&result.columns);

            for row in &result.rows {
                let values: Vec<String> = result
                    .columns
                    .iter()
                    .map(|c| row.get(c).map(value_to_string).unwrap_or_default())
                    .collect();
                table.add_row(values);
            }

            println!("{}", table);
            println!();
            println!("{} row(s) returned", result.row_count);
        }
    }

    Ok(())
}

fn csv_lines(result: &QueryResult) -> Vec<String> {
    let mut lines = vec![result.columns.join(",")];
    for row in &result.rows {
        let values: Vec<String> = result
            .columns
            .iter()
            .map(|c| row.get(c).map(value_to_csv).unwrap_or_default())
            .collect();
        lines.push(values.join(","));
    }
    lines
}

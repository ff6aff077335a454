//! Roster CLI - student roster administration in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use roster_core::StudentStatus;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{add, ask, config, delete, insights, list, query, stats, update};

/// Roster - student roster administration in your terminal
#[derive(Parser)]
#[command(name = "roster", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List students ordered by id
    List {
        /// Only students whose name or email contains this text
        #[arg(long, short)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one student
    Show {
        /// Student id
        id: i32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a student
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        major: String,
        #[arg(long)]
        gpa: f64,
        /// Active, Probation, Graduated or Dropped
        #[arg(long, default_value = "Active", value_parser = parse_status)]
        status: StudentStatus,
        /// Enrollment date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        enrollment_date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields of a student
    Update {
        /// Student id
        id: i32,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        gpa: Option<f64>,
        #[arg(long, value_parser = parse_status)]
        status: Option<StudentStatus>,
        /// Enrollment date (YYYY-MM-DD)
        #[arg(long)]
        enrollment_date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a student
    Delete {
        /// Student id
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Execute SQL query against the roster database
    Query {
        /// SQL query to execute
        sql: Option<String>,
        /// Read SQL from file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: String,
        /// Output as JSON (shorthand for --format json)
        #[arg(long)]
        json: bool,
    },

    /// Translate a question into SQL
    Ask {
        /// Question in plain language
        question: String,
        /// Execute the generated SQL
        #[arg(long)]
        run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show roster statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the model for insights about the roster
    Insights,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn parse_status(value: &str) -> std::result::Result<StudentStatus, String> {
    StudentStatus::KNOWN
        .iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
        .cloned()
        .ok_or_else(|| {
            let known: Vec<&str> = StudentStatus::KNOWN.iter().map(|s| s.as_str()).collect();
            format!("expected one of: {}", known.join(", "))
        })
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            if let Some(hint) = commands::failure_hint(&e) {
                eprintln!("{}", hint.dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List { search, json } => list::run(search.as_deref(), json),
        Commands::Show { id, json } => list::run_show(id, json),
        Commands::Add {
            first_name,
            last_name,
            email,
            major,
            gpa,
            status,
            enrollment_date,
            json,
        } => {
            let student = roster_core::NewStudent {
                first_name,
                last_name,
                email,
                major,
                gpa,
                status,
                enrollment_date: enrollment_date
                    .unwrap_or_else(|| chrono::Local::now().date_naive()),
            };
            add::run(student, json)
        }
        Commands::Update {
            id,
            first_name,
            last_name,
            email,
            major,
            gpa,
            status,
            enrollment_date,
            json,
        } => {
            let patch = roster_core::StudentPatch {
                first_name,
                last_name,
                email,
                major,
                gpa,
                status,
                enrollment_date,
            };
            update::run(id, patch, json)
        }
        Commands::Delete { id, force, json } => delete::run(&id, force, json),
        Commands::Query { sql, file, format, json } => {
            let fmt = if json { "json".to_string() } else { format };
            query::run(sql.as_deref(), file.as_deref(), &fmt)
        }
        Commands::Ask { question, run, json } => ask::run(&question, run, json),
        Commands::Stats { json } => stats::run(json),
        Commands::Insights => insights::run(),
        Commands::Config { command } => config::run(command),
    }
}

//! Insights command - model-written analysis of the roster

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let students = ctx.student_service.fetch_all()?;

    if !ctx.translate_service.is_configured() {
        output::warning("No API key configured; analysis needs GEMINI_API_KEY.");
    }

    let spinner = output::spinner("Analyzing roster...");
    let analysis = ctx.insight_service.analyze(&students);
    spinner.finish_and_clear();

    println!("{}", "AI Insights".bold());
    println!();
    println!("{}", analysis);
    Ok(())
}

//! CLI command implementations

pub mod add;
pub mod ask;
pub mod config;
pub mod delete;
pub mod insights;
pub mod list;
pub mod query;
pub mod stats;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use roster_core::config::Config;
use roster_core::{Error, RosterContext};
use tracing::debug;

/// Get the roster directory from environment or default
pub fn get_roster_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ROSTER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".roster"))
        .context("Could not find home directory; set ROSTER_DIR")
}

/// Create the roster context
pub fn get_context() -> Result<RosterContext> {
    let roster_dir = get_roster_dir()?;
    debug!(dir = %roster_dir.display(), "Loading roster context");
    RosterContext::new(&roster_dir).context("Failed to initialize roster context")
}

/// Load settings without opening any connection
pub fn get_config() -> Result<Config> {
    let roster_dir = get_roster_dir()?;
    Config::load(&roster_dir).context("Failed to load settings")
}

/// Follow-up advice for errors the user can act on
pub fn failure_hint(error: &anyhow::Error) -> Option<&'static str> {
    let core = error.chain().find_map(|cause| cause.downcast_ref::<Error>())?;
    match core {
        Error::Database(_) => {
            Some("Could not reach the database. Check the connection string and try again.")
        }
        Error::Config(_) => Some("Run `roster config show` to see the current settings."),
        Error::Translation(_) => Some("Set GEMINI_API_KEY or run `roster config set-api-key`."),
        _ => None,
    }
}

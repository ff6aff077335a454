//! Roster Core - data access and query tooling for the student roster
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Student, StudentPatch, errors)
//! - **ports**: Trait definitions for external dependencies (SqlClient, LanguageModel)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (PostgreSQL, Gemini)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::gemini::GeminiClient;
use adapters::postgres::PostgresClient;
use config::Config;
use ports::{LanguageModel, SqlClient};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{NewStudent, Student, StudentPatch, StudentStatus, MAJORS};
pub use services::{DeleteOutcome, QueryResult, TranslateService};

/// Main context for roster operations
///
/// This is the primary entry point for all business logic. It holds the
/// database client, configuration, and all services. Services share one
/// [`SchemaBootstrapper`], so the schema is checked once per context.
pub struct RosterContext {
    pub config: Config,
    pub client: Arc<dyn SqlClient>,
    pub bootstrap: Arc<SchemaBootstrapper>,
    pub student_service: StudentService,
    pub query_service: QueryService,
    pub translate_service: TranslateService,
    pub insight_service: InsightService,
}

impl RosterContext {
    /// Create a context from the settings in `roster_dir`.
    ///
    /// No connection is opened until the first operation.
    pub fn new(roster_dir: &Path) -> Result<Self> {
        let config = Config::load(roster_dir).context("Failed to load settings")?;
        Self::from_config(config)
    }

    /// Create a context with a PostgreSQL client and, when an API key is
    /// configured, a Gemini client
    pub fn from_config(config: Config) -> Result<Self> {
        let database_url = config.require_database_url()?;
        let client: Arc<dyn SqlClient> = Arc::new(PostgresClient::new(database_url)?);
        let model = language_model(&config)?;

        Ok(Self::with_components(config, client, model))
    }

    /// Assemble a context around existing clients
    pub fn with_components(
        config: Config,
        client: Arc<dyn SqlClient>,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        let bootstrap = Arc::new(SchemaBootstrapper::new(Arc::clone(&client)));

        let student_service = StudentService::new(Arc::clone(&client), Arc::clone(&bootstrap));
        let query_service = QueryService::new(Arc::clone(&client), Arc::clone(&bootstrap));
        let translate_service = TranslateService::new(model.clone());
        let insight_service = InsightService::new(model);

        Self {
            config,
            client,
            bootstrap,
            student_service,
            query_service,
            translate_service,
            insight_service,
        }
    }
}

/// The Gemini client for `config`, or `None` when no API key is set
pub fn language_model(config: &Config) -> Result<Option<Arc<dyn LanguageModel>>> {
    let key = match config.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => key,
        _ => return Ok(None),
    };

    let gemini = match config.gemini_base_url.as_deref() {
        Some(base_url) => GeminiClient::new_with_base_url(key, &config.model, base_url)?,
        None => GeminiClient::new(key, &config.model)?,
    };
    Ok(Some(Arc::new(gemini) as Arc<dyn LanguageModel>))
}

/// A translator on its own; generating SQL needs no database settings
pub fn translator(config: &Config) -> Result<TranslateService> {
    Ok(TranslateService::new(language_model(config)?))
}

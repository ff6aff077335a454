//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod language_model;
mod sql_client;

pub use language_model::LanguageModel;
pub use sql_client::{RawRow, RowSet, SqlClient, SqlParam, SqlValue};

//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - PostgreSQL for the SqlClient port
//! - Gemini HTTP client for the LanguageModel port
//! - The fixed seed roster used by the bootstrapper

pub mod gemini;
pub mod postgres;
pub mod seed;

#[cfg(test)]
pub mod gemini_mock;
#[cfg(test)]
pub mod memory;
#[cfg(test)]
pub mod scripted;

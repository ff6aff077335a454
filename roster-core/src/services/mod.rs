//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod bootstrap;
mod insights;
pub mod normalize;
mod query;
pub mod safety;
pub mod stats;
mod students;
mod translate;

pub use bootstrap::SchemaBootstrapper;
pub use insights::{InsightService, FALLBACK_ANALYSIS};
pub use query::{QueryResult, QueryService};
pub use stats::{summarize, DashboardStats};
pub use students::{DeleteOutcome, StudentService};
pub use translate::{build_prompt, strip_code_fences, TranslateService};

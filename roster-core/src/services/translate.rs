//! Translate service - natural-language questions to SQL

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::result::{Error, Result};
use crate::ports::LanguageModel;

/// Build the instruction prompt for `question`
pub fn build_prompt(question: &str) -> String {
    format!(
        r#"You are a PostgreSQL expert. Convert the following natural language question into a standard SQL query.
The table name is 'students'.
The schema is:
- id (integer)
- first_name (varchar)
- last_name (varchar)
- email (varchar)
- major (varchar)
- gpa (float)
- status (varchar: 'Active', 'Probation', 'Graduated', 'Dropped')
- enrollment_date (date)

Question: "{}"

Return ONLY the raw SQL string. Do not use Markdown formatting (no ```sql)."#,
        question
    )
}

/// Remove markdown code fences from a model reply and trim it
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```sql", "").replace("```", "").trim().to_string()
}

/// Translate service for natural-language questions
///
/// The returned SQL is not validated or safety-checked here; run it through
/// [`QueryService`](crate::services::QueryService) for that.
pub struct TranslateService {
    model: Option<Arc<dyn LanguageModel>>,
}

impl TranslateService {
    /// `model` is `None` when no API key is configured
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Translate `question` into SQL text
    pub fn translate(&self, question: &str) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::translation("API key not found"))?;

        debug!(model = model.name(), "Translating question to SQL");
        let reply = model.generate(&build_prompt(question)).map_err(|e| {
            error!("Error generating SQL: {}", e);
            Error::translation(format!("Failed to generate SQL from your question: {}", detail(e)))
        })?;

        Ok(strip_code_fences(&reply))
    }
}

fn detail(error: Error) -> String {
    match error {
        Error::Translation(msg) => msg,
        other => other.to_string(),
    }
}

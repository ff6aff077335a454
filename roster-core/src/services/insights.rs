//! Insight service - model-written summary of the roster

use std::sync::Arc;

use tracing::error;

use crate::domain::result::{Error, Result};
use crate::domain::Student;
use crate::ports::LanguageModel;

/// Reply used whenever analysis cannot be produced
pub const FALLBACK_ANALYSIS: &str = "Could not generate analysis at this time.";

/// Only this many records are sent to the model
pub const SAMPLE_SIZE: usize = 20;

pub struct InsightService {
    model: Option<Arc<dyn LanguageModel>>,
}

impl InsightService {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    /// Ask the model for three insights about `students`.
    ///
    /// Never fails: a missing model or a failed call yields [`FALLBACK_ANALYSIS`].
    pub fn analyze(&self, students: &[Student]) -> String {
        match self.try_analyze(students) {
            Ok(text) => text,
            Err(e) => {
                error!("Error analyzing data: {}", e);
                FALLBACK_ANALYSIS.to_string()
            }
        }
    }

    fn try_analyze(&self, students: &[Student]) -> Result<String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::translation("API key not found"))?;
        let sample = &students[..students.len().min(SAMPLE_SIZE)];
        model.generate(&build_prompt(sample)?)
    }
}

fn build_prompt(sample: &[Student]) -> Result<String> {
    let data = serde_json::to_string(sample)?;
    Ok(format!(
        "Analyze the following student data and provide 3 key insights or trends in a concise markdown list format.\n\
         Focus on GPA trends, Major distribution, or Status risks.\n\n\
         Data: {}",
        data
    ))
}

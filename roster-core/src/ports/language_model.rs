//! Language model port - single-prompt text generation

use crate::domain::result::Result;

/// Hosted generative-language model
///
/// One prompt in, one text response out. No streaming, no conversation
/// state between calls.
pub trait LanguageModel: Send + Sync {
    /// Model identifier (e.g., "gemini-2.5-flash")
    fn name(&self) -> &str;

    /// Generate a text response for `prompt`
    fn generate(&self, prompt: &str) -> Result<String>;
}

//! Gemini API client
//!
//! Sends a single text prompt to the `generateContent` endpoint and returns
//! the concatenated text of the first candidate.
//!
//! API Documentation: https://ai.google.dev/api/generate-content

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::ports::LanguageModel;

// =============================================================================
// API Request/Response Models
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined in order
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// =============================================================================
// Gemini HTTP Client
// =============================================================================

/// Default production API URL
const GEMINI_PRODUCTION_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable to override the Gemini API base URL.
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Get the Gemini base URL, checking environment variable first
pub fn get_base_url() -> String {
    std::env::var(GEMINI_BASE_URL_ENV).unwrap_or_else(|_| GEMINI_PRODUCTION_URL.to_string())
}

/// Gemini API client
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client for `model` using the `GEMINI_BASE_URL` environment
    /// variable if set, otherwise the production API.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        Self::new_with_base_url(api_key, model, &get_base_url())
    }

    /// Create a client against a custom base URL (mock servers, proxies)
    pub fn new_with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::translation("API key not found"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::translation(format!("Failed to create HTTP client: {}", e)))?;

        let model = if model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            model.trim()
        };

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Map reqwest errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::translation(format!(
                "Gemini request timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::translation("Unable to connect to Gemini servers")
        } else {
            Error::translation(format!("Gemini request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: &reqwest::blocking::Response) -> Result<()> {
        match response.status().as_u16() {
            200 => Ok(()),
            400 => Err(Error::translation(
                "Gemini rejected the request (HTTP 400). The API key may be invalid.",
            )),
            401 | 403 => Err(Error::translation(
                "Gemini authentication failed. Your API key may be invalid or revoked.",
            )),
            404 => Err(Error::translation(format!(
                "Gemini model '{}' not found",
                self.model
            ))),
            429 => Err(Error::translation(
                "Gemini rate limit exceeded. Please wait a moment and try again.",
            )),
            status => Err(Error::translation(format!(
                "Gemini API error: HTTP {}",
                status
            ))),
        }
    }
}

impl LanguageModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(&response)?;

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| Error::translation(format!("Failed to parse Gemini response: {}", e)))?;

        parsed
            .into_text()
            .ok_or_else(|| Error::translation("Gemini returned an empty response"))
    }
}

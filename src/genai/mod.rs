//! Client seam for the external generation service.

pub mod gemini;
pub mod instruction;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::GeminiClient;

/// All service failures the controller may see. The user only ever gets one
/// generic notice; the subtypes exist for diagnostics.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error - unable to reach the service")]
    Connect,
    #[error("authentication failed - credential rejected")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("service error ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("service returned no candidates")]
    Empty,
    #[error("no API credential configured")]
    MissingCredential,
}

/// Raw SEO pair as returned by the service, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoIdea {
    pub title: String,
    pub description: String,
}

/// The generation backend contract. One method per result shape; every call
/// carries the committed system prompt and a requested candidate count.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    /// Plain-text candidates (lead paragraphs, titles).
    async fn text_variants(
        &self,
        instruction: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError>;

    /// HTML-bearing candidates for the article body.
    async fn html_snippets(
        &self,
        instruction: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError>;

    /// Title/description pairs. Takes the raw topic, not a composed
    /// instruction.
    async fn seo_variants(
        &self,
        topic: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<SeoIdea>, GenAiError>;

    /// Base64 data URIs for candidate illustrations.
    async fn image_variants(
        &self,
        instruction: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError>;
}

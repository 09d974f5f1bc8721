//! Gemini-backed implementation of [`GenerationService`].
//!
//! Text-shaped calls go through `generateContent` in JSON mode and expect the
//! model to answer with a JSON array of the requested size; images go through
//! the Imagen `:predict` endpoint. All calls share one client, one timeout
//! and a bounded retry with linear backoff.

use crate::config::Config;
use crate::genai::{GenAiError, GenerationService, SeoIdea};
use base64::Engine as _;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 1000;
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GenAiError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(GenAiError::MissingCredential)?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GenAiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.text_model
        )
    }

    fn predict_url(&self) -> String {
        format!("{}/v1beta/models/{}:predict", self.base_url, self.image_model)
    }

    /// JSON-mode `generateContent` call: sends the prompt, expects a JSON
    /// array of `T` in the first candidate.
    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<T>, GenAiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response: GenerateContentResponse =
            self.post_with_retry(&self.generate_content_url(), &request).await?;
        let text = extract_candidate_text(&response)?;

        let mut items: Vec<T> = serde_json::from_str(&text)
            .map_err(|e| GenAiError::Malformed(format!("expected JSON array: {}", e)))?;
        if items.is_empty() {
            return Err(GenAiError::Empty);
        }
        items.truncate(count);
        Ok(items)
    }

    async fn post_with_retry<B, R>(&self, url: &str, body: &B) -> Result<R, GenAiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        for attempt in 1..=MAX_RETRIES {
            match self.post_once(url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES => {
                    warn!(attempt, max = MAX_RETRIES, error = %e, "generation request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }
        Err(GenAiError::Network("retry loop exhausted".to_string()))
    }

    async fn post_once<B, R>(&self, url: &str, body: &B) -> Result<R, GenAiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenAiError::Timeout
                } else if e.is_connect() {
                    GenAiError::Connect
                } else {
                    GenAiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => GenAiError::Unauthorized,
                429 => GenAiError::RateLimited,
                code => GenAiError::Upstream {
                    status: code,
                    body: body_text,
                },
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GenAiError::Malformed(e.to_string()))
    }
}

#[async_trait::async_trait]
impl GenerationService for GeminiClient {
    async fn text_variants(
        &self,
        instruction: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        let prompt = format!(
            "{}\n\nВерни результат строго как JSON-массив из {} строк, без пояснений и без Markdown.",
            instruction, count
        );
        self.generate_json(prompt, count, system_prompt).await
    }

    async fn html_snippets(
        &self,
        instruction: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        let prompt = format!(
            "{}\n\nВерни результат строго как JSON-массив из {} строк, где каждая строка — \
             самостоятельный HTML-фрагмент, без пояснений и без Markdown.",
            instruction, count
        );
        self.generate_json(prompt, count, system_prompt).await
    }

    async fn seo_variants(
        &self,
        topic: &str,
        count: usize,
        system_prompt: &str,
    ) -> Result<Vec<SeoIdea>, GenAiError> {
        let prompt = format!(
            "Тема статьи: \"{}\". Составь {} пар SEO-заголовков и SEO-описаний.\n\n\
             Верни результат строго как JSON-массив из {} объектов вида \
             {{\"title\": \"...\", \"description\": \"...\"}}, без пояснений.",
            topic, count, count
        );
        self.generate_json(prompt, count, system_prompt).await
    }

    /// The image model takes no system instruction; the committed prompt is
    /// intentionally ignored here.
    async fn image_variants(
        &self,
        instruction: &str,
        count: usize,
        _system_prompt: &str,
    ) -> Result<Vec<String>, GenAiError> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: instruction.to_string(),
            }],
            parameters: PredictParameters { sample_count: count },
        };

        let response: PredictResponse =
            self.post_with_retry(&self.predict_url(), &request).await?;
        if response.predictions.is_empty() {
            return Err(GenAiError::Empty);
        }

        response
            .predictions
            .into_iter()
            .take(count)
            .map(|p| prediction_to_data_uri(&p))
            .collect()
    }
}

/// Concatenated text of the first candidate's parts.
fn extract_candidate_text(response: &GenerateContentResponse) -> Result<String, GenAiError> {
    let candidate = response.candidates.first().ok_or(GenAiError::Empty)?;
    let parts = match &candidate.content {
        Some(content) => &content.parts,
        None => return Err(GenAiError::Empty),
    };
    let text: String = parts.iter().map(|p| p.text.as_str()).collect();
    if text.trim().is_empty() {
        return Err(GenAiError::Empty);
    }
    Ok(text)
}

fn prediction_to_data_uri(prediction: &Prediction) -> Result<String, GenAiError> {
    // Validate the payload before embedding it; a broken base64 string would
    // otherwise surface only when the frontend tries to render it.
    base64::engine::general_purpose::STANDARD
        .decode(&prediction.bytes_base64_encoded)
        .map_err(|e| GenAiError::Malformed(format!("invalid image payload: {}", e)))?;
    Ok(format!(
        "data:{};base64,{}",
        prediction.mime_type, prediction.bytes_base64_encoded
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: usize,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: String,
    #[serde(default = "default_image_mime")]
    mime_type: String,
}

fn default_image_mime() -> String {
    "image/png".to_string()
}

//! HTTP client for the Gemini generateContent and embedContent APIs.
//!
//! The [`GenerativeClient`] trait is the seam the agent pipeline talks
//! through, so tests can substitute a stub for the live API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const GENERATE_MODEL: &str = "gemini-1.5-flash";
const EMBED_MODEL: &str = "text-embedding-004";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("response contained no text")]
    Empty,
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send a prompt and return the model's text reply.
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError>;

    /// Embed each text into a fixed-length vector, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GeminiError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { http, api_key })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = format!("{API_BASE}/models/{GENERATE_MODEL}:generateContent");
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateResponse = Self::check(response).await?.json().await?;

        parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| p.text.clone())
            .filter(|t| !t.is_empty())
            .ok_or(GeminiError::Empty)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, GeminiError> {
        let url = format!("{API_BASE}/models/{EMBED_MODEL}:batchEmbedContents");
        let body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|t| EmbedRequest {
                    model: format!("models/{EMBED_MODEL}"),
                    content: Content {
                        parts: vec![Part { text: t }],
                    },
                })
                .collect(),
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let parsed: BatchEmbedResponse = Self::check(response).await?.json().await?;

        if parsed.embeddings.len() != texts.len() {
            return Err(GeminiError::Empty);
        }
        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}

use crate::adapters::http::{build_client, handle_response};
use crate::config::toml_config::GeminiConfig;
use crate::domain::ports::LanguageModel;
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "Gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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

impl GenerateResponse {
    /// 第一個 candidate 的第一段文字
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.trim().is_empty())
    }
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            config,
        })
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::MissingApiKeyError {
                provider: PROVIDER.to_string(),
            })?;

        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!("Calling {} model {}", PROVIDER, model);
        let response = self
            .client
            .post(self.url(model))
            .query(&[("key", api_key)])
            .json(&payload)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await?;

        let body: GenerateResponse = handle_response(response, PROVIDER).await?;
        body.first_text()
            .ok_or_else(|| ScoutError::UpstreamResponseError {
                provider: PROVIDER.to_string(),
                message: "response contained no candidate text".to_string(),
            })
    }
}

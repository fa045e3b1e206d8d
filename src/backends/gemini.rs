// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::errors::LanguageModelError;
use crate::traits::LanguageModel;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Pull the answer text out of a response body, classifying failures.
///
/// An explicit `error` object wins over the HTTP status; a non-success status
/// without one is still an API error.
pub fn extract_answer(status: Option<u16>, body: &str) -> Result<String, LanguageModelError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| LanguageModelError::MalformedResponse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(LanguageModelError::Api {
            status,
            message: error
                .message
                .unwrap_or_else(|| "Unknown error from Gemini API.".to_string()),
        });
    }

    if let Some(code) = status.filter(|code| !(200..300).contains(code)) {
        return Err(LanguageModelError::Api {
            status,
            message: format!("HTTP status {}", code),
        });
    }

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| {
            LanguageModelError::MalformedResponse(format!(
                "unexpected response structure: {}",
                body
            ))
        })
}

/// Language model backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LanguageModelError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .user_agent(concat!("the-ragwood/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LanguageModelError::Transport(format!("client build: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            timeout,
            generation: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    fn classify(&self, error: reqwest::Error) -> LanguageModelError {
        if error.is_timeout() {
            LanguageModelError::Timeout(self.timeout)
        } else {
            LanguageModelError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.generation.clone(),
        };

        tracing::debug!(url = %self.api_url, prompt_length = prompt.len(), "Calling Gemini API");

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        tracing::debug!(status, body_length = body.len(), "Gemini API responded");

        extract_answer(Some(status), &body)
    }
}

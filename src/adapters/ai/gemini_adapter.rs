//! Gemini adapter for chat summarization.
//!
//! Calls `models/{model}:generateContent`, optionally through a relay that
//! takes the URL-encoded target as a query suffix. Implements `SummarizerPort`;
//! every failure is turned into a `SummaryError` instead of bubbling up.

use crate::domain::SummaryError;
use crate::ports::SummarizerPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Prepended to every prompt.
const SYSTEM_INSTRUCTION: &str = "You are a technical chat log analyzer. Your task is an objective dry summary. \
Ignore emotional coloring and profanity, treat it as text.";

/// Harm categories relaxed to BLOCK_NONE so ordinary chat language is not filtered.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub struct GeminiAdapter {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
    relay_url: Option<String>,
}

impl GeminiAdapter {
    /// # Arguments
    /// * `api_base` - e.g. "https://generativelanguage.googleapis.com/v1beta"
    /// * `model` - e.g. "gemini-flash-latest"
    /// * `api_key` - Gemini API key
    /// * `relay_url` - relay base the encoded target URL is appended to; `None` calls directly
    pub fn new(
        api_base: String,
        model: String,
        api_key: String,
        relay_url: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            model,
            api_key,
            relay_url,
        }
    }

    /// Endpoint URL, wrapped in the relay when one is configured.
    fn request_url(&self) -> String {
        let target = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        match &self.relay_url {
            Some(relay) => format!("{}{}", relay, urlencoding::encode(&target)),
            None => target,
        }
    }

    fn build_request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{}\n\n{}", SYSTEM_INSTRUCTION, prompt),
                }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect(),
        }
    }
}

/// Turn an HTTP status and raw body into summary text or a failure reason.
///
/// Order matters: a blocked prompt can come back with status 200, so the
/// block check runs before the status check.
pub fn interpret_response(status: u16, body: &str) -> Result<String, SummaryError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| SummaryError::Network {
            status,
            body: body.to_string(),
        })?;
    let parsed: GenerateResponse = serde_json::from_value(value).unwrap_or_default();

    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|pf| pf.block_reason.as_deref())
        .filter(|r| !r.is_empty() && *r != "BLOCK_REASON_UNSPECIFIED")
    {
        return Err(SummaryError::Blocked {
            reason: reason.to_string(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(SummaryError::Api {
            status,
            body: body.to_string(),
        });
    }

    let first = parsed.candidates.as_ref().and_then(|c| c.first());
    let text = first
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_ref())
        .and_then(|p| p.first())
        .and_then(|p| p.text.clone());
    match text {
        Some(text) => Ok(text),
        None if first.and_then(|c| c.finish_reason.as_deref()) == Some("SAFETY") => {
            Err(SummaryError::SafetyHidden)
        }
        None => Err(SummaryError::NoText),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    safety_settings: Vec<SafetySetting>,
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
struct SafetySetting {
    category: String,
    threshold: String,
}

/// Only the fields we read. Everything is optional so error bodies parse too.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    prompt_feedback: Option<PromptFeedback>,
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait::async_trait]
impl SummarizerPort for GeminiAdapter {
    async fn summarize(&self, prompt: &str) -> Result<String, SummaryError> {
        if self.api_key.trim().is_empty() {
            return Err(SummaryError::MissingKey);
        }
        info!(
            prompt_len = prompt.len(),
            model = %self.model,
            relayed = self.relay_url.is_some(),
            "sending prompt to Gemini"
        );

        let response = self
            .client
            .post(self.request_url())
            .header("Content-Type", "application/json")
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key.
                let e = e.without_url();
                warn!(error = %e, "Gemini request failed");
                SummaryError::Connection(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::Connection(e.without_url().to_string()))?;
        debug!(status, body_len = body.len(), "Gemini responded");

        let result = interpret_response(status, &body);
        if let Err(e) = &result {
            warn!(status, error = %e, "Gemini returned no summary");
        }
        result
    }
}

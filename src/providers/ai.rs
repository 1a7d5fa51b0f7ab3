//! External vision/text model integration. Every call site in the routes
//! treats a provider error — transport failure, timeout, or a response that
//! does not match the contract — as a signal to substitute the canned
//! fallback, so a dead or misbehaving model never fails a request.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::PhotoAnalysis;

const ANALYSIS_PROMPT: &str = "You are assisting a field service technician. \
Examine the photo and respond with a single JSON object, no prose, with the \
keys: identified (string), condition (string), recommendations (string), \
parts (array of replacement part names), repair_steps (array of strings), \
estimated_repair_time (string), skill_level (one of beginner, intermediate, \
advanced).";

const ENHANCE_PROMPT: &str = "Rewrite the following field technician note as \
clear, professional service documentation. Keep every fact, measurement and \
part name; do not invent details. Respond with the rewritten note only.";

const IDENTIFY_PROMPT: &str = "Name the replacement part shown in this photo \
as a short hardware store search query (a few words, no punctuation). \
Respond with the query only.";

pub const FALLBACK_PART_QUERY: &str = "replacement part";

#[async_trait]
pub trait AiProvider: Send + Sync + 'static {
    /// Analyze a photo of equipment; the result must match the
    /// `PhotoAnalysis` contract.
    async fn analyze_photo(&self, data_url: &str, caption: Option<&str>) -> Result<PhotoAnalysis>;

    /// Rewrite a raw technician note as polished service documentation.
    async fn enhance_note(&self, content: &str) -> Result<String>;

    /// Derive a free-text part-search query from an image. The result is
    /// opaque text and is fed to the text search unchanged.
    async fn identify_query(&self, data_url: &str) -> Result<String>;
}

/// Stand-in when no AI endpoint is configured; every call reports
/// unavailability so the fallback path runs.
pub struct DisabledAi;

#[async_trait]
impl AiProvider for DisabledAi {
    async fn analyze_photo(&self, _data_url: &str, _caption: Option<&str>) -> Result<PhotoAnalysis> {
        Err(anyhow!("AI provider not configured"))
    }

    async fn enhance_note(&self, _content: &str) -> Result<String> {
        Err(anyhow!("AI provider not configured"))
    }

    async fn identify_query(&self, _data_url: &str) -> Result<String> {
        Err(anyhow!("AI provider not configured"))
    }
}

/// OpenAI-compatible chat provider (works with OpenAI and local
/// compatible servers).
pub struct HttpAiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl HttpAiProvider {
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>> {
        let Some(endpoint) = config.ai_endpoint.clone() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_seconds))
            .build()
            .context("failed to build AI HTTP client")?;
        Ok(Some(Self {
            client,
            endpoint,
            model: config.ai_model.clone(),
            api_key: config.ai_api_key.clone(),
        }))
    }

    async fn chat(&self, content: Vec<ContentPart>) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: 800,
            temperature: 0.2,
        };

        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response: ChatResponse = builder
            .send()
            .await
            .context("AI request failed")?
            .error_for_status()
            .context("AI service returned an error status")?
            .json()
            .await
            .context("failed to parse AI response envelope")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("AI response contained no choices"))
    }
}

#[async_trait]
impl AiProvider for HttpAiProvider {
    async fn analyze_photo(&self, data_url: &str, caption: Option<&str>) -> Result<PhotoAnalysis> {
        let mut prompt = ANALYSIS_PROMPT.to_string();
        if let Some(caption) = caption {
            prompt.push_str("\nTechnician caption: ");
            prompt.push_str(caption);
        }
        let content = self
            .chat(vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url.to_string(),
                    },
                },
            ])
            .await?;
        parse_analysis(&content)
    }

    async fn enhance_note(&self, content: &str) -> Result<String> {
        let text = format!("{ENHANCE_PROMPT}\n\n{content}");
        let enhanced = self.chat(vec![ContentPart::Text { text }]).await?;
        Ok(enhanced.trim().to_string())
    }

    async fn identify_query(&self, data_url: &str) -> Result<String> {
        let content = self
            .chat(vec![
                ContentPart::Text {
                    text: IDENTIFY_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url.to_string(),
                    },
                },
            ])
            .await?;
        let query = content.trim();
        if query.is_empty() {
            return Err(anyhow!("AI returned an empty part query"));
        }
        Ok(query.to_string())
    }
}

/// Validates a model reply against the analysis contract. Models sometimes
/// wrap JSON in a markdown fence; strip it before parsing.
pub fn parse_analysis(content: &str) -> Result<PhotoAnalysis> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).context("AI analysis did not match the expected schema")
}

/// Deterministic substitute analysis used whenever the vision model is
/// unavailable or returns an unusable reply.
pub fn fallback_analysis() -> PhotoAnalysis {
    PhotoAnalysis {
        identified: "General equipment".to_string(),
        condition: "Unable to assess from photo".to_string(),
        recommendations: "Manual inspection recommended".to_string(),
        parts: vec!["Replacement part".to_string()],
        repair_steps: vec!["Inspect the unit on site".to_string()],
        estimated_repair_time: "1-2 hours".to_string(),
        skill_level: "intermediate".to_string(),
    }
}

/// Deterministic substitute enhancement: light local formatting of the
/// original note.
pub fn fallback_enhancement(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        "No details were recorded for this visit.".to_string()
    } else {
        format!("Service notes: {trimmed}")
    }
}

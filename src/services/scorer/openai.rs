use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bot::error::Error;
use crate::constants::moderation::{SCORER_MAX_TOKENS, SCORER_TEMPERATURE};
use crate::services::scorer::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::services::scorer::{parse_verdict, ScoreVerdict, SpamScorer};

/// Scorer backed by an OpenAI-compatible chat completions endpoint
pub struct OpenAiScorer {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiScorer {
    pub fn new(api_key: String, model: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl SpamScorer for OpenAiScorer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn score(&self, message_text: &str) -> Result<ScoreVerdict, Error> {
        let prompt = build_prompt(message_text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: SCORER_TEMPERATURE,
            max_tokens: SCORER_MAX_TOKENS,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ScorerUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ScorerUnavailable(format!(
                "API error {}: {}",
                status,
                crate::utils::formatting::truncate(&body, 200)
            )));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::ScorerMalformedResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::ScorerMalformedResponse("response has no content".into()))?;

        debug!("Scorer response: {}", content);
        parse_verdict(&content)
    }
}

//! Spam scoring oracle.
//!
//! The pipeline only sees [`SpamScorer`]; the backend behind it is
//! interchangeable. Whatever the backend, a reply either becomes a
//! validated [`ScoreVerdict`] or a scorer failure, never a verdict built
//! from a malformed response.

pub mod openai;
pub mod prompt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::bot::error::Error;
use crate::constants::moderation::{MAX_RATIONALE_CHARS, MAX_SCORE, MIN_SCORE};
use crate::utils::formatting::truncate;

pub use openai::OpenAiScorer;

/// A validated oracle reply
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVerdict {
    /// Finite, within 0-10
    pub score: f64,
    pub rationale: String,
}

#[async_trait]
pub trait SpamScorer: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    async fn score(&self, message_text: &str) -> Result<ScoreVerdict, Error>;
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    score: Option<serde_json::Value>,
    #[serde(default, alias = "rationale")]
    reasoning: Option<String>,
}

/// Parse the oracle's JSON reply into a verdict.
///
/// Accepts the score as a JSON number or a numeric string. Anything missing,
/// non-finite or outside 0-10 is a malformed response.
pub fn parse_verdict(content: &str) -> Result<ScoreVerdict, Error> {
    let raw: RawVerdict = serde_json::from_str(extract_json(content))
        .map_err(|e| Error::ScorerMalformedResponse(format!("invalid JSON: {}", e)))?;

    let score = match raw.score {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::ScorerMalformedResponse("missing or non-numeric score".into()))?;

    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(Error::ScorerMalformedResponse(format!(
            "score {} outside {}-{}",
            score, MIN_SCORE, MAX_SCORE
        )));
    }

    let rationale = raw
        .reasoning
        .map(|r| truncate(r.trim(), MAX_RATIONALE_CHARS))
        .unwrap_or_default();

    Ok(ScoreVerdict { score, rationale })
}

/// Strip a ```json fence if the model wrapped its answer in one
fn extract_json(text: &str) -> &str {
    let text = text.trim();
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    text
}

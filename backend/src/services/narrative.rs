//! Narrative commentary for predictions.
//!
//! The narrative generator is an external, best-effort collaborator: it turns
//! a history summary into free text. Callers never let its errors escape; see
//! [`fallback_text`] for the deterministic substitute.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::estimator::Forecast;
use crate::config::NarrativeSettings;

/// Instruction appended to the history summary in the model prompt.
pub const PROMPT_SUFFIX: &str = "Predict the next menstrual cycle.";

/// Text used when there is no history to describe.
pub const INSUFFICIENT_DATA_TEXT: &str = "Insufficient data for prediction.";

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("no API credential configured for the narrative service")]
    MissingCredential,

    #[error("narrative request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("narrative service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed narrative response: {0}")]
    MalformedResponse(String),

    #[error("narrative request timed out after {0:?}")]
    Timeout(Duration),
}

/// Produces free-text commentary from a history summary.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn describe(&self, summary: &str) -> Result<String, NarrativeError>;
}

/// Deterministic text used whenever the narrative generator fails.
pub fn fallback_text(history_is_empty: bool, forecast: &Forecast) -> String {
    if history_is_empty {
        return INSUFFICIENT_DATA_TEXT.to_string();
    }
    format!(
        "Based on historical average ({} days), next cycle around {}.",
        forecast.cycle_length,
        forecast.next_start.format("%Y-%m-%d")
    )
}

/// Full prompt sent to the model for a given summary.
pub fn build_prompt(summary: &str) -> String {
    format!("{}\n{}", summary, PROMPT_SUFFIX)
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pull the first choice's content out of a chat-completions body.
fn extract_content(body: &str) -> Result<String, NarrativeError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| NarrativeError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| NarrativeError::MalformedResponse("no message content".to_string()))
}

/// Narrative generator backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiNarrator {
    settings: NarrativeSettings,
    client: Client,
}

impl OpenAiNarrator {
    pub fn new(settings: NarrativeSettings) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiNarrator {
    async fn describe(&self, summary: &str) -> Result<String, NarrativeError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(NarrativeError::MissingCredential)?;

        let prompt = build_prompt(summary);
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        log::debug!(
            "Requesting narrative from {} (model={}, prompt_len={})",
            self.endpoint(),
            self.settings.model,
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        extract_content(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn forecast() -> Forecast {
        Forecast {
            cycle_length: 28,
            next_start: NaiveDate::from_ymd_opt(2024, 1, 29).unwrap(),
            pms_start: NaiveDate::from_ymd_opt(2024, 1, 22).unwrap(),
            pms_end: NaiveDate::from_ymd_opt(2024, 1, 24).unwrap(),
            period_length: 5,
        }
    }

    #[test]
    fn test_fallback_text_with_history() {
        assert_eq!(
            fallback_text(false, &forecast()),
            "Based on historical average (28 days), next cycle around 2024-01-29."
        );
    }

    #[test]
    fn test_fallback_text_without_history() {
        assert_eq!(fallback_text(true, &forecast()), INSUFFICIENT_DATA_TEXT);
    }

    #[test]
    fn test_prompt_appends_instruction() {
        assert_eq!(
            build_prompt("Average cycle length: 28.0 days"),
            "Average cycle length: 28.0 days\nPredict the next menstrual cycle."
        );
    }

    #[test]
    fn test_extract_content_strips_whitespace() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  Expect onset near Jan 29.\n"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Expect onset near Jan 29.");
    }

    #[test]
    fn test_extract_content_rejects_empty_choices() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(NarrativeError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(NarrativeError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(NarrativeError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let settings = NarrativeSettings {
            api_key: None,
            // Unroutable address; the request must never be attempted.
            base_url: "http://127.0.0.1:9".to_string(),
            ..NarrativeSettings::default()
        };
        let narrator = OpenAiNarrator::new(settings).unwrap();
        let err = narrator.describe("summary").await.unwrap_err();
        assert!(matches!(err, NarrativeError::MissingCredential));
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let settings = NarrativeSettings {
            api_key: Some("   ".to_string()),
            ..NarrativeSettings::default()
        };
        let narrator = OpenAiNarrator::new(settings).unwrap();
        assert!(matches!(
            narrator.describe("summary").await,
            Err(NarrativeError::MissingCredential)
        ));
    }
}

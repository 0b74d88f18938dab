//! Optional grammar correction through an external LLM
//!
//! The model gets both the raw text and its layout-converted form, picks the
//! one that reads correctly and fixes spelling only. Any failure here is
//! non-fatal: callers fall back to the converted text.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;

/// Reply prefix the model is told to use
pub const CORRECTED_MARKER: &str = "CORRECTED:";

#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("LLM reply has no choices")]
    EmptyReply,

    #[error("LLM reply is missing the CORRECTED: marker")]
    MissingMarker,
}

/// Prompt sent for one correction
pub fn build_prompt(original: &str, converted: &str) -> String {
    format!(
        "You are a strict language assistant.\n\
         You receive two versions of a sentence:\n\
         \n\
         Sentence 1: {original}\n\
         Sentence 2: {converted}\n\
         \n\
         One of them was typed in the wrong keyboard layout (Hebrew/English) and was already converted.\n\
         Do not try to fix keyboard layout issues yourself.\n\
         \n\
         1. Choose the sentence that is more correct and meaningful in its own language.\n\
         2. Correct only spelling and grammar mistakes in that sentence, without changing the language.\n\
         3. Do not translate between Hebrew and English.\n\
         4. Do not change the sentence structure or improve the writing.\n\
         5. Do not add, remove, merge, or split any words.\n\
         6. If a word in the chosen sentence cannot be corrected, copy the word from the same position in the other sentence.\n\
         \n\
         Return your response in the following format:\n\
         {CORRECTED_MARKER} [the corrected sentence]"
    )
}

/// Text after the marker, trimmed; `None` if missing or empty
pub fn extract_corrected(reply: &str) -> Option<String> {
    let start = reply.find(CORRECTED_MARKER)? + CORRECTED_MARKER.len();
    let corrected = reply[start..].trim();
    if corrected.is_empty() {
        None
    } else {
        Some(corrected.to_string())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct LlmCorrector {
    http: Client,
    config: LlmConfig,
}

impl LlmCorrector {
    pub fn new(config: LlmConfig) -> Result<Self, CorrectionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String, CorrectionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let mut builder = self.http.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await?;
        if !resp.status().is_success() {
            return Err(CorrectionError::Status {
                status: resp.status().as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let body: ChatResponse = resp.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CorrectionError::EmptyReply)
    }

    /// Ask the model to pick and fix one of the two sentences
    pub async fn correct(&self, original: &str, converted: &str) -> Result<String, CorrectionError> {
        let reply = self.complete(&build_prompt(original, converted)).await?;
        log::debug!("raw LLM reply: {:?}", reply);
        extract_corrected(&reply).ok_or(CorrectionError::MissingMarker)
    }

    /// Startup check: the model answers "yes" to a trivial prompt
    pub async fn probe(&self) -> bool {
        match self
            .complete("Hello, are you available? Please respond with 'yes' only.")
            .await
        {
            Ok(reply) => {
                let available = reply.to_lowercase().contains("yes");
                log::info!("LLM availability check: {}", available);
                available
            }
            Err(e) => {
                log::error!("LLM not available: {}", e);
                false
            }
        }
    }
}

/// Correct `converted` when a corrector is configured, otherwise return it as is.
/// Correction errors are logged and never surfaced.
pub async fn correct_or_fallback(
    corrector: Option<&LlmCorrector>,
    original: &str,
    converted: String,
) -> String {
    let Some(corrector) = corrector else {
        return converted;
    };

    match corrector.correct(original, &converted).await {
        Ok(corrected) => corrected,
        Err(e) => {
            log::warn!("correction failed, returning converted text: {}", e);
            converted
        }
    }
}

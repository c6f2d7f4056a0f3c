// src/translator.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

const SYSTEM_PROMPT: &str = "You are a professional translator. Translate the text from Vietnamese to English. \
Maintain the original formatting, HTML tags, and structure. \
Keep technical terms and brand names unchanged. \
Provide only the translation without any explanations.";

/// Client for the OpenAI-compatible chat-completions API used to translate
/// Vietnamese post content into English.
///
/// Every call is a single-shot request: it resolves once or fails once, with
/// no retry and no partial-result recovery. A malformed reply is a hard
/// failure of that operation only, never of the session.
#[derive(Clone)]
pub struct Translator {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
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
    content: Option<String>,
}

impl Translator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.openai_api_base.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.translator_model.clone(),
        }
    }

    /// Translates a single text. Empty input short-circuits to an empty
    /// string without calling the API.
    pub async fn translate(&self, text: &str) -> Result<String, AppError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::BadGateway("Translation service is not configured".to_string())
        })?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.3,
            max_tokens: 4000,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Translation request failed: {:?}", e);
                AppError::BadGateway("Translation service unreachable".to_string())
            })?;

        if !response.status().is_success() {
            return Err(AppError::BadGateway(format!(
                "Translation service returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Malformed translation response: {:?}", e);
            AppError::BadGateway("Malformed translation response".to_string())
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::BadGateway("Empty translation response".to_string()))
    }

    /// Translates several fields sequentially, one request per field.
    ///
    /// Output keys map 1:1 to input keys; empty input values pass through as
    /// empty strings. The first failing field aborts the whole call.
    pub async fn translate_bulk(
        &self,
        fields: &[(&str, &str)],
    ) -> Result<HashMap<String, String>, AppError> {
        let mut results = HashMap::new();
        for (key, value) in fields {
            results.insert(key.to_string(), self.translate(value).await?);
        }
        Ok(results)
    }
}

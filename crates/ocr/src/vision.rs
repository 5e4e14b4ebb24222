//! OCR through an OpenAI-compatible vision model.
//!
//! The image is sent inline as a base64 data URL together with an extraction
//! prompt; the model's reply is taken as the recognized text.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use crate::recognizer::{OcrBackend, OcrError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_PROMPT: &str = "You are an OCR extraction engine. \
Transcribe every line of text in this image exactly as it appears, \
reading left to right and top to bottom. \
Do not reformat, interpret, correct or skip any values. \
Return only the raw text from the image, without any explanation.";

pub struct OpenAiVisionRecognizer {
    api_key: String,
    pub model: String,
    pub base_url: String,
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiVisionRecognizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) fn request_body(&self, image_png: &[u8]) -> serde_json::Value {
        let b64 = STANDARD.encode(image_png);
        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": self.prompt },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/png;base64,{b64}") } }
                ]
            }],
            "max_tokens": self.max_tokens
        })
    }

    /// List the available models to confirm the key and endpoint work.
    ///
    /// Blocking; call it from outside the async runtime or via
    /// `spawn_blocking`.
    pub fn check_connection(&self) -> Result<(), OcrError> {
        let resp = reqwest::blocking::Client::new()
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| OcrError::NotAvailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(OcrError::NotAvailable(format!(
                "model listing failed with {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

/// Pull the first choice's text out of a chat completion.
fn first_content(resp: ChatResponse) -> Result<String, OcrError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(OcrError::EmptyResponse)
}

impl OcrBackend for OpenAiVisionRecognizer {
    fn name(&self) -> &str {
        "openai"
    }

    fn recognize(&self, image_png: &[u8]) -> Result<String, OcrError> {
        tracing::debug!(model = %self.model, bytes = image_png.len(), "sending image to vision model");

        let resp = reqwest::blocking::Client::new()
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image_png))
            .send()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(OcrError::Engine(format!("vision API returned {status}: {body}")));
        }

        let parsed: ChatResponse = resp.json().map_err(|e| OcrError::Engine(e.to_string()))?;
        first_content(parsed)
    }
}

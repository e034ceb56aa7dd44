//! Speech recognition over a hosted Whisper endpoint.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::config::SttConfig;

/// Reply used when the service can't make out any speech.
pub const FALLBACK_TEXT: &str = "Не удалось распознать речь";

/// OpenAI-compatible transcription endpoint (Groq-hosted Whisper).
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Client for the recognition service, fixed to one spoken language.
pub struct Recognizer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    language: String,
}

impl Recognizer {
    pub fn new(config: &SttConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
        }
    }

    /// Transcribe the wav file at `path`.
    ///
    /// A blank transcript is the service's "could not understand" signal
    /// and maps to [`FALLBACK_TEXT`]; that is an expected outcome. Network
    /// and API failures are errors, fatal for the message being processed.
    pub async fn transcribe(&self, path: &Path) -> Result<String, String> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let file_part = reqwest::multipart::Part::bytes(data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| format!("failed to build upload: {e}"))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("transcription request failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("transcription API error {status}: {body}"));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse transcription response: {e}"))?;

        info!("transcription complete ({} chars)", parsed.text.chars().count());
        Ok(text_or_fallback(parsed.text))
    }
}

/// An empty transcript means the service recognized no speech.
fn text_or_fallback(text: String) -> String {
    if text.trim().is_empty() {
        FALLBACK_TEXT.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_transcript_becomes_fallback() {
        assert_eq!(text_or_fallback(String::new()), FALLBACK_TEXT);
        assert_eq!(text_or_fallback("   \n ".to_string()), FALLBACK_TEXT);
    }

    #[test]
    fn recognized_text_passes_through_unmodified() {
        assert_eq!(text_or_fallback("Привет, мир".to_string()), "Привет, мир");
        // Whisper endpoints pad with a leading space; the text is the
        // service's to shape, not ours.
        assert_eq!(text_or_fallback(" hello there".to_string()), " hello there");
    }

    #[test]
    fn response_parsing_ignores_extra_fields() {
        let body = r#"{"text": "Привет", "x_groq": {"id": "req_1"}, "duration": 2.1}"#;
        let parsed: TranscriptionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text, "Привет");
    }
}

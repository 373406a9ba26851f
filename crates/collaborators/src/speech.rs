//! Speech collaborator client (TTS and STT).
//!
//! TTS posts JSON and receives raw MPEG bytes; STT posts multipart audio and
//! receives a JSON transcript. Some provider versions label the transcript
//! `text`, others `transcript`; both are accepted.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::CollaboratorError;

const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_STT_MODEL: &str = "scribe_v1";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

/// Client for the speech provider
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
}

impl SpeechClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            voice_id: voice_id.into(),
        }
    }

    /// Synthesize speech for `text`, returning raw audio bytes (MPEG)
    pub async fn text_to_speech(&self, text: &str) -> Result<Bytes, CollaboratorError> {
        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.base_url.trim_end_matches('/'),
            self.voice_id
        );

        let response = self
            .http
            .post(&url)
            .header("accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&SpeechRequest {
                text,
                model_id: DEFAULT_TTS_MODEL,
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.8,
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Status(response.status()));
        }

        let audio = response.bytes().await?;
        debug!(
            component = "collaborators",
            event = "speech.tts.completed",
            audio_bytes = audio.len(),
            "speech synthesized"
        );
        Ok(audio)
    }

    /// Transcribe `audio` bytes of the given mime type
    pub async fn speech_to_text(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, CollaboratorError> {
        let url = format!("{}/v1/speech-to-text", self.base_url.trim_end_matches('/'));

        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.webm")
            .mime_str(mime_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model_id", DEFAULT_STT_MODEL);

        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Status(response.status()));
        }

        let body: Value = response.json().await?;
        let transcript = body
            .get("text")
            .or_else(|| body.get("transcript"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(CollaboratorError::MissingContent)?;

        debug!(
            component = "collaborators",
            event = "speech.stt.completed",
            transcript_chars = transcript.chars().count(),
            "audio transcribed"
        );
        Ok(transcript)
    }
}

//! Speech endpoints. Audio crosses the socket base64-encoded in both
//! directions; the speech-to-text handler additionally chains the transcript
//! into a spoken chat turn so a voice question gets a voice answer.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::info;

use venturescope_protocol::ServerMessage;

use crate::handlers::{chat, collaborator_failure, HandlerError};
use crate::state::{now_rfc3339, AppState, Session};
use crate::transcript::{self, TranscriptEntry};

pub async fn handle_text_to_speech(
    state: &Arc<AppState>,
    text: String,
) -> Result<ServerMessage, HandlerError> {
    let reply = synthesize(state, text).await?;

    if let ServerMessage::TextToSpeechResponse { audio, text } = &reply {
        transcript::record(
            &state.transcripts,
            TranscriptEntry {
                kind: "text_to_speech".to_string(),
                timestamp: now_rfc3339(),
                input: serde_json::json!({ "text": text }),
                output: serde_json::json!({ "audio_base64_chars": audio.len() }),
            },
        );
    }

    Ok(reply)
}

pub async fn handle_speech_to_text(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    request_id: &str,
    audio: String,
    mime_type: String,
) -> Result<ServerMessage, HandlerError> {
    let bytes = BASE64
        .decode(audio.as_bytes())
        .map_err(|err| HandlerError::InvalidPayload {
            message: "Failed to process speech",
            detail: err.to_string(),
        })?;
    let audio_bytes = bytes.len();

    let text = state
        .collaborators
        .speech
        .speech_to_text(bytes, &mime_type)
        .await
        .map_err(collaborator_failure("Failed to process speech"))?;

    info!(
        component = "speech",
        event = "speech.transcribed",
        connection_id = session.id(),
        request_id = %request_id,
        chars = text.len(),
        "transcribed audio, chaining chat turn"
    );

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "speech_to_text".to_string(),
            timestamp: now_rfc3339(),
            input: serde_json::json!({ "mime_type": mime_type, "audio_bytes": audio_bytes }),
            output: serde_json::json!({ "text": text }),
        },
    );

    // The transcript goes back immediately; the advisor reply and its audio
    // follow as separate frames under the same request id.
    chat::spawn_chat_followup(
        Arc::clone(state),
        Arc::clone(session),
        request_id.to_string(),
        text.clone(),
    );

    Ok(ServerMessage::SpeechToTextResponse { text })
}

/// Shared synthesis path for the direct endpoint and chat follow-ups
pub(crate) async fn synthesize(
    state: &Arc<AppState>,
    text: String,
) -> Result<ServerMessage, HandlerError> {
    let audio = state
        .collaborators
        .speech
        .text_to_speech(&text)
        .await
        .map_err(collaborator_failure("Failed to generate speech"))?;

    Ok(ServerMessage::TextToSpeechResponse {
        audio: BASE64.encode(&audio),
        text,
    })
}

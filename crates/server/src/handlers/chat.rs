//! Conversational advisor. The chat handler is the only place that decides
//! whether speech is synthesized for a reply; callers that want a spoken
//! answer set `generate_speech` and the audio follows as a separate frame
//! carrying the same correlation id.

use std::sync::Arc;

use tracing::{info, warn};

use venturescope_collaborators::prompts;
use venturescope_protocol::ServerMessage;

use crate::handlers::{collaborator_failure, HandlerError};
use crate::state::{now_rfc3339, AppState, Session};
use crate::transcript::{self, TranscriptEntry};

const CHAT_MAX_OUTPUT_TOKENS: u32 = 1000;

pub async fn handle_chat(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    request_id: &str,
    message: String,
    generate_speech: bool,
) -> Result<ServerMessage, HandlerError> {
    let context = {
        let ctx = session.context.lock().await;
        ctx.render()
    };
    let prompt = prompts::advisor_prompt(context.as_deref(), &message);

    let reply = state
        .collaborators
        .llm
        .generate(&prompt, CHAT_MAX_OUTPUT_TOKENS)
        .await
        .map_err(collaborator_failure("Failed to generate response"))?;

    let timestamp = now_rfc3339();
    {
        let mut ctx = session.context.lock().await;
        ctx.record_chat(&message, &reply, timestamp.clone());
    }

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "chat".to_string(),
            timestamp,
            input: serde_json::json!({ "message": message }),
            output: serde_json::json!({ "message": reply }),
        },
    );

    if generate_speech {
        spawn_speech_followup(
            Arc::clone(state),
            Arc::clone(session),
            request_id.to_string(),
            reply.clone(),
        );
    }

    Ok(ServerMessage::ChatResponse { message: reply })
}

/// Run a full chat turn as a follow-up to another handler, delivering the
/// reply (or an error frame) under the originating request id. Used by the
/// speech-to-text pipeline.
pub fn spawn_chat_followup(
    state: Arc<AppState>,
    session: Arc<Session>,
    request_id: String,
    message: String,
) {
    tokio::spawn(async move {
        info!(
            component = "chat",
            event = "chat.followup.started",
            connection_id = session.id(),
            request_id = %request_id,
            "running chained chat turn"
        );
        match handle_chat(&state, &session, &request_id, message, true).await {
            Ok(reply) => session.respond(Some(request_id), reply).await,
            Err(err) => {
                warn!(
                    component = "chat",
                    event = "chat.followup.failed",
                    connection_id = session.id(),
                    request_id = %request_id,
                    error = ?err,
                    "chained chat turn failed"
                );
                session
                    .respond(
                        Some(request_id),
                        ServerMessage::Error {
                            code: err.code().to_string(),
                            message: err.to_string(),
                        },
                    )
                    .await;
            }
        }
    });
}

/// Synthesize speech for a delivered reply and send it as its own frame.
/// Failures produce an error frame; the text response already went out.
fn spawn_speech_followup(
    state: Arc<AppState>,
    session: Arc<Session>,
    request_id: String,
    text: String,
) {
    tokio::spawn(async move {
        match super::speech::synthesize(&state, text).await {
            Ok(reply) => session.respond(Some(request_id), reply).await,
            Err(err) => {
                warn!(
                    component = "chat",
                    event = "chat.speech.failed",
                    connection_id = session.id(),
                    request_id = %request_id,
                    error = ?err,
                    "speech synthesis for chat reply failed"
                );
                session
                    .respond(
                        Some(request_id),
                        ServerMessage::Error {
                            code: err.code().to_string(),
                            message: err.to_string(),
                        },
                    )
                    .await;
            }
        }
    });
}

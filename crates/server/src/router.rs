//! Frame dispatch. Each inbound text frame is parsed, matched to its handler,
//! and answered with a frame echoing the request's correlation id. Handler
//! failures always turn into an error frame; nothing here panics the
//! connection.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use venturescope_protocol::{ClientFrame, ClientRequest, ServerMessage};

use crate::handlers::{analysis, chat, search, speech, HandlerError};
use crate::state::{AppState, Session};

/// Handle one inbound text frame end to end. Runs in its own task so a slow
/// collaborator never blocks other requests on the same socket.
pub async fn handle_frame(state: Arc<AppState>, session: Arc<Session>, text: String) {
    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                component = "router",
                event = "router.frame.unparseable",
                connection_id = session.id(),
                error = %err,
                "dropping unparseable frame"
            );
            session
                .respond(
                    None,
                    ServerMessage::Error {
                        code: "parse_error".to_string(),
                        message: "Failed to process message".to_string(),
                    },
                )
                .await;
            return;
        }
    };

    // Pull the correlation id out before the typed parse so even rejected
    // frames get their id echoed back.
    let request_id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string);

    let kind = value.get("type").and_then(Value::as_str);
    match kind {
        None => {
            session
                .respond(
                    request_id,
                    ServerMessage::Error {
                        code: "unknown_type".to_string(),
                        message: "Missing message type".to_string(),
                    },
                )
                .await;
            return;
        }
        Some(kind) if !ClientRequest::KINDS.contains(&kind) => {
            warn!(
                component = "router",
                event = "router.frame.unknown_type",
                connection_id = session.id(),
                kind,
                "rejecting frame with unknown type"
            );
            session
                .respond(
                    request_id,
                    ServerMessage::Error {
                        code: "unknown_type".to_string(),
                        message: format!("Unknown message type: {kind}"),
                    },
                )
                .await;
            return;
        }
        Some(_) => {}
    }

    let frame: ClientFrame = match serde_json::from_value(value) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(
                component = "router",
                event = "router.frame.malformed",
                connection_id = session.id(),
                error = %err,
                "dropping malformed frame"
            );
            session
                .respond(
                    request_id,
                    ServerMessage::Error {
                        code: "parse_error".to_string(),
                        message: "Failed to process message".to_string(),
                    },
                )
                .await;
            return;
        }
    };

    let kind = frame.request.kind();
    info!(
        component = "router",
        event = "router.frame.received",
        connection_id = session.id(),
        request_id = %frame.id,
        kind,
        "dispatching frame"
    );

    match dispatch(&state, &session, &frame.id, frame.request).await {
        Ok(message) => session.respond(Some(frame.id), message).await,
        Err(err) => {
            warn!(
                component = "router",
                event = "router.handler.failed",
                connection_id = session.id(),
                request_id = %frame.id,
                kind,
                error = ?err,
                "handler failed"
            );
            session
                .respond(
                    Some(frame.id),
                    ServerMessage::Error {
                        code: err.code().to_string(),
                        message: err.to_string(),
                    },
                )
                .await;
        }
    }
}

async fn dispatch(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    request_id: &str,
    request: ClientRequest,
) -> Result<ServerMessage, HandlerError> {
    match request {
        ClientRequest::Chat {
            message,
            generate_speech,
        } => chat::handle_chat(state, session, request_id, message, generate_speech).await,
        ClientRequest::SpeechToText { audio, mime_type } => {
            speech::handle_speech_to_text(state, session, request_id, audio, mime_type).await
        }
        ClientRequest::TextToSpeech { text } => speech::handle_text_to_speech(state, text).await,
        ClientRequest::StartupAnalysis { form } => {
            analysis::handle_startup_analysis(state, session, form).await
        }
        ClientRequest::PatentSearch { query, limit } => {
            search::handle_patent_search(state, query, limit).await
        }
        ClientRequest::ResearchGapAnalysis { description } => {
            search::handle_research_gap(state, description).await
        }
        ClientRequest::DeepAnalysis { text } => analysis::handle_deep_analysis(state, text).await,
    }
}

//! Startup analysis and deep document analysis.

use std::sync::Arc;

use tracing::info;

use venturescope_collaborators::prompts;
use venturescope_protocol::{ServerMessage, StartupForm};

use crate::handlers::{collaborator_failure, HandlerError};
use crate::scoring;
use crate::state::{now_rfc3339, AppState, Session};
use crate::transcript::{self, TranscriptEntry};

const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Validate the form, run the analysis prompt, and record the result in the
/// session context so later chat turns see it.
pub async fn handle_startup_analysis(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    form: StartupForm,
) -> Result<ServerMessage, HandlerError> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return Err(HandlerError::Validation { fields: missing });
    }

    let prompt = prompts::analysis_prompt(&form);
    let reply = state
        .collaborators
        .llm
        .generate(&prompt, ANALYSIS_MAX_OUTPUT_TOKENS)
        .await
        .map_err(collaborator_failure("Failed to analyze startup"))?;

    let analysis = scoring::parse_analysis_reply(&reply);
    let timestamp = now_rfc3339();

    if let Ok(value) = serde_json::to_value(&analysis) {
        let mut ctx = session.context.lock().await;
        ctx.record_analysis(value, timestamp.clone());
    }

    info!(
        component = "analysis",
        event = "analysis.completed",
        connection_id = session.id(),
        startup = form.name.as_deref().unwrap_or_default(),
        "startup analysis completed"
    );

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "startup_analysis".to_string(),
            timestamp,
            input: serde_json::to_value(&form).unwrap_or_default(),
            output: serde_json::to_value(&analysis).unwrap_or_default(),
        },
    );

    Ok(ServerMessage::StartupAnalysisResponse { analysis })
}

/// Free-form long-document analysis. No context recording: the result is a
/// standalone report, not part of the advisor conversation.
pub async fn handle_deep_analysis(
    state: &Arc<AppState>,
    text: String,
) -> Result<ServerMessage, HandlerError> {
    let prompt = prompts::deep_analysis_prompt(&text);
    let analysis = state
        .collaborators
        .llm
        .generate(&prompt, ANALYSIS_MAX_OUTPUT_TOKENS)
        .await
        .map_err(collaborator_failure("Failed to conduct deep analysis"))?;

    transcript::record(
        &state.transcripts,
        TranscriptEntry {
            kind: "deep_analysis".to_string(),
            timestamp: now_rfc3339(),
            input: serde_json::json!({ "chars": text.len() }),
            output: serde_json::json!({ "analysis": analysis }),
        },
    );

    Ok(ServerMessage::DeepAnalysisResponse { analysis })
}

//! Server → Client frames

use serde::{Deserialize, Serialize};

use crate::types::{AnalysisReply, GapAnalysis, PatentRecord};

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ChatResponse {
        message: String,
    },
    SpeechToTextResponse {
        text: String,
    },
    TextToSpeechResponse {
        /// Base64-encoded audio bytes
        audio: String,
        text: String,
    },
    StartupAnalysisResponse {
        analysis: AnalysisReply,
    },
    PatentSearchResponse {
        results: Vec<PatentRecord>,
    },
    ResearchGapAnalysisResponse {
        analysis: GapAnalysis,
    },
    DeepAnalysisResponse {
        analysis: String,
    },
    Error {
        code: String,
        message: String,
    },
}

/// The wire envelope for a server response.
///
/// `id` echoes the correlation id of the request that produced this frame;
/// it is absent only when the incoming frame could not be parsed at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub timestamp: String,
    #[serde(flatten)]
    pub message: ServerMessage,
}

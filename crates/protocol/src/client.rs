//! Client → Server frames

use serde::{Deserialize, Serialize};

use crate::new_id;
use crate::types::StartupForm;

fn default_patent_limit() -> u32 {
    10
}

fn default_mime_type() -> String {
    "audio/webm".to_string()
}

/// Requests sent from client to server, one variant per handler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    Chat {
        message: String,
        #[serde(default)]
        generate_speech: bool,
    },
    SpeechToText {
        /// Base64-encoded audio bytes
        audio: String,
        #[serde(default = "default_mime_type")]
        mime_type: String,
    },
    TextToSpeech {
        text: String,
    },
    StartupAnalysis {
        #[serde(flatten)]
        form: StartupForm,
    },
    PatentSearch {
        query: String,
        #[serde(default = "default_patent_limit")]
        limit: u32,
    },
    ResearchGapAnalysis {
        description: String,
    },
    DeepAnalysis {
        text: String,
    },
}

impl ClientRequest {
    /// Wire names of every registered request kind
    pub const KINDS: [&'static str; 7] = [
        "chat",
        "speech_to_text",
        "text_to_speech",
        "startup_analysis",
        "patent_search",
        "research_gap_analysis",
        "deep_analysis",
    ];

    /// Wire name of the request kind, for logging and transcripts
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::SpeechToText { .. } => "speech_to_text",
            Self::TextToSpeech { .. } => "text_to_speech",
            Self::StartupAnalysis { .. } => "startup_analysis",
            Self::PatentSearch { .. } => "patent_search",
            Self::ResearchGapAnalysis { .. } => "research_gap_analysis",
            Self::DeepAnalysis { .. } => "deep_analysis",
        }
    }
}

/// The wire envelope for a client request.
///
/// Every frame carries a correlation `id` which the server echoes on every
/// response it produces for that request, chained follow-up frames included.
/// Clients that omit the id get a generated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(flatten)]
    pub request: ClientRequest,
}

impl ClientFrame {
    pub fn new(request: ClientRequest) -> Self {
        Self {
            id: new_id(),
            request,
        }
    }
}

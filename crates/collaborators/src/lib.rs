//! VentureScope Collaborators
//!
//! HTTP clients for the external services the gateway calls but does not
//! implement: the LLM provider (chat and structured analysis), the speech
//! provider (TTS/STT), and the GraphQL patent/publication search provider.
//!
//! Every client takes a shared `reqwest::Client`; the caller is expected to
//! configure an explicit request timeout on it, since collaborator calls are the
//! only unbounded waits in the system.

pub mod llm;
pub mod prompts;
pub mod search;
pub mod speech;

pub use llm::LlmClient;
pub use search::SearchClient;
pub use speech::SpeechClient;

use thiserror::Error;

/// Errors that can occur talking to a collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("provider reply carried no usable content")]
    MissingContent,

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

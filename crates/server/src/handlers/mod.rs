//! One handler per request kind. Each calls its external collaborator(s) and
//! returns a typed response; failures stay behind [`HandlerError`] so the
//! router always produces a deliverable frame.

pub mod analysis;
pub mod chat;
pub mod search;
pub mod speech;

use thiserror::Error;

use venturescope_collaborators::CollaboratorError;

/// Handler-boundary errors. `Display` is what the far end sees; collaborator
/// detail stays in the source chain for logging only.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Missing required fields: {}", .fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    #[error("{message}")]
    Collaborator {
        message: &'static str,
        #[source]
        source: CollaboratorError,
    },

    #[error("{message}")]
    InvalidPayload {
        message: &'static str,
        detail: String,
    },
}

impl HandlerError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Collaborator { .. } => "collaborator_error",
            Self::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

/// Map a collaborator failure to the generic message named for its operation
pub(crate) fn collaborator_failure(
    message: &'static str,
) -> impl FnOnce(CollaboratorError) -> HandlerError {
    move |source| HandlerError::Collaborator { message, source }
}

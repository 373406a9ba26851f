//! Application state: collaborator clients, the session registry, and the
//! per-connection session handle.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use venturescope_collaborators::{LlmClient, SearchClient, SpeechClient};
use venturescope_protocol::{ServerFrame, ServerMessage};

use crate::context::AnalysisContext;
use crate::transcript::TranscriptEntry;

/// Messages that can be sent through a session's WebSocket
pub enum Outbound {
    /// JSON-serialized ServerFrame
    Frame(ServerFrame),
    /// Raw pong response
    Pong(Bytes),
}

/// The external collaborator clients, shared by every session
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub llm: LlmClient,
    pub speech: SpeechClient,
    pub search: SearchClient,
}

/// One live connection: its outbound channel and its analysis context.
/// Owned by the registry entry that created it; dropped on disconnect.
pub struct Session {
    id: u64,
    outbound: mpsc::Sender<Outbound>,
    pub context: Mutex<AnalysisContext>,
}

impl Session {
    pub fn new(id: u64, outbound: mpsc::Sender<Outbound>) -> Self {
        Self {
            id,
            outbound,
            context: Mutex::new(AnalysisContext::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a frame for this session. A closed transport is not an error:
    /// in-flight work finishing after disconnect is dropped, never retried.
    pub async fn send(&self, frame: ServerFrame) {
        if self.outbound.send(Outbound::Frame(frame)).await.is_err() {
            debug!(
                component = "session",
                event = "session.send.dropped",
                connection_id = self.id,
                "session closed, dropping outbound frame"
            );
        }
    }

    /// Queue a response message with the current timestamp and an echoed
    /// correlation id
    pub async fn respond(&self, request_id: Option<String>, message: ServerMessage) {
        self.send(ServerFrame {
            id: request_id,
            timestamp: now_rfc3339(),
            message,
        })
        .await;
    }

    pub async fn send_pong(&self, data: Bytes) {
        let _ = self.outbound.send(Outbound::Pong(data)).await;
    }
}

/// Concurrent map of live sessions, keyed by connection id.
/// Lifecycle bookkeeping only; routing never goes through the registry.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<u64, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<Session>) {
        let _ = self.sessions.insert(session.id(), session);
    }

    pub fn remove(&self, id: u64) -> Option<Arc<Session>> {
        self.sessions.remove(&id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Shared application state
pub struct AppState {
    pub registry: SessionRegistry,
    pub collaborators: Collaborators,
    pub transcripts: mpsc::Sender<TranscriptEntry>,
}

impl AppState {
    pub fn new(collaborators: Collaborators, transcripts: mpsc::Sender<TranscriptEntry>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            collaborators,
            transcripts,
        }
    }
}

/// Current time as an RFC 3339 timestamp
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

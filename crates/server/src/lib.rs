//! VentureScope Server
//!
//! Gateway that multiplexes startup-analysis request flows (chat, speech,
//! structured analysis, patent search, research-gap analysis) over one
//! WebSocket connection per client, relaying each flow to an external AI
//! collaborator and fanning responses back per connection.

pub mod auth;
pub mod config;
pub mod context;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod scoring;
pub mod state;
pub mod transcript;
pub mod websocket;

//! VentureScope gateway server
//!
//! One WebSocket multiplexes every request flow; a small HTTP surface covers
//! health, one-shot analysis, and static frontend serving.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use venturescope_collaborators::{LlmClient, SearchClient, SpeechClient};
use venturescope_server::config::ServerConfig;
use venturescope_server::http;
use venturescope_server::logging;
use venturescope_server::state::{AppState, Collaborators};
use venturescope_server::transcript::{create_transcript_channel, TranscriptWriter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    let logging_handle = logging::init_logging()?;

    info!(
        component = "server",
        event = "server.starting",
        run_id = %logging_handle.run_id,
        "Starting VentureScope server"
    );

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let collaborators = Collaborators {
        llm: LlmClient::new(client.clone(), &config.llm_base_url, &config.llm_api_key)
            .with_model(&config.llm_model),
        speech: SpeechClient::new(
            client.clone(),
            &config.speech_base_url,
            &config.speech_api_key,
            &config.voice_id,
        ),
        search: SearchClient::new(client, &config.search_endpoint, &config.search_token),
    };

    let (transcript_tx, transcript_rx) = create_transcript_channel();
    tokio::spawn(TranscriptWriter::new(transcript_rx, config.transcripts_dir.clone()).run());

    let state = Arc::new(AppState::new(collaborators, transcript_tx));
    let app = http::build_router(state, config.static_dir.clone(), config.auth_token.clone());

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    info!(
        component = "server",
        event = "server.listening",
        addr = %addr,
        "Listening on {}",
        addr
    );

    // A bind failure is fatal; there is no fallback port.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

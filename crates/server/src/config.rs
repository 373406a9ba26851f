//! Server configuration.
//!
//! Everything is settable by flag or `VENTURESCOPE_*` environment variable.
//! Collaborator endpoints default to the real providers; tests point them at
//! local stubs. The request timeout is always explicit: collaborator
//! calls are the only unbounded waits in the gateway.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "venturescope-server", about = "VentureScope analysis gateway")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "VENTURESCOPE_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, env = "VENTURESCOPE_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Directory with the built UI bundle; omit to disable static serving
    #[arg(long, env = "VENTURESCOPE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Directory for best-effort transcript records
    #[arg(long, env = "VENTURESCOPE_TRANSCRIPTS_DIR", default_value = "transcripts")]
    pub transcripts_dir: PathBuf,

    /// Optional bearer token required on /ws and /api routes
    #[arg(long, env = "VENTURESCOPE_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Timeout applied to every collaborator HTTP request, in seconds
    #[arg(long, env = "VENTURESCOPE_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,

    /// LLM provider base URL
    #[arg(
        long,
        env = "VENTURESCOPE_LLM_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub llm_base_url: String,

    /// LLM provider API key
    #[arg(long, env = "VENTURESCOPE_LLM_API_KEY", default_value = "")]
    pub llm_api_key: String,

    /// LLM model identifier
    #[arg(long, env = "VENTURESCOPE_LLM_MODEL", default_value = "gemini-1.5-flash")]
    pub llm_model: String,

    /// Speech provider base URL
    #[arg(
        long,
        env = "VENTURESCOPE_SPEECH_BASE_URL",
        default_value = "https://api.elevenlabs.io"
    )]
    pub speech_base_url: String,

    /// Speech provider API key
    #[arg(long, env = "VENTURESCOPE_SPEECH_API_KEY", default_value = "")]
    pub speech_api_key: String,

    /// Voice identifier used for synthesis
    #[arg(long, env = "VENTURESCOPE_VOICE_ID", default_value = "kPzsL2i3teMYv0FxEYQ6")]
    pub voice_id: String,

    /// Patent/publication search GraphQL endpoint
    #[arg(
        long,
        env = "VENTURESCOPE_SEARCH_ENDPOINT",
        default_value = "https://logic-mill.net/graphql"
    )]
    pub search_endpoint: String,

    /// Search provider API token
    #[arg(long, env = "VENTURESCOPE_SEARCH_TOKEN", default_value = "")]
    pub search_token: String,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

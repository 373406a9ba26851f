//! VentureScope CLI
//!
//! Talks to the gateway over its WebSocket; `health` uses plain HTTP.

mod client;
mod reconnect;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use console::style;

use venturescope_protocol::{AnalysisReply, ClientRequest, ServerMessage, StartupForm};

use crate::client::GatewayClient;

#[derive(Parser)]
#[command(name = "venturescope", about = "VentureScope analysis gateway client")]
struct Cli {
    /// Gateway WebSocket URL
    #[arg(
        long,
        global = true,
        env = "VENTURESCOPE_SERVER",
        default_value = "ws://127.0.0.1:4000"
    )]
    server: String,

    /// Auth token, if the gateway requires one
    #[arg(long, global = true, env = "VENTURESCOPE_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the startup advisor a question; omit the message for an
    /// interactive session
    Chat {
        message: Option<String>,
        /// Also synthesize each reply as speech and save the audio
        #[arg(long)]
        speak: bool,
        /// Where synthesized replies are written
        #[arg(long, default_value = "reply.mp3")]
        audio_out: std::path::PathBuf,
    },
    /// Run a structured startup analysis
    Analyze {
        #[arg(long)]
        name: String,
        #[arg(long)]
        problem: String,
        #[arg(long)]
        solution: String,
    },
    /// Search for similar patents
    Patents {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Score the research gap for an idea
    Gap { description: String },
    /// Deep analysis of a document
    Deep {
        /// Path to a UTF-8 text file
        file: std::path::PathBuf,
    },
    /// Check gateway health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Health = cli.command {
        return health(&cli.server).await;
    }

    let mut gateway = GatewayClient::new(&cli.server, cli.token.as_deref());
    gateway.connect().await?;

    match cli.command {
        Command::Chat {
            message,
            speak,
            audio_out,
        } => match message {
            Some(message) => chat(&mut gateway, message, speak, &audio_out).await,
            None => chat_interactive(&mut gateway, speak, &audio_out).await,
        },
        Command::Analyze {
            name,
            problem,
            solution,
        } => analyze(&mut gateway, name, problem, solution).await,
        Command::Patents { query, limit } => patents(&mut gateway, query, limit).await,
        Command::Gap { description } => gap(&mut gateway, description).await,
        Command::Deep { file } => deep(&mut gateway, file).await,
        Command::Health => unreachable!("handled above"),
    }
}

async fn chat(
    gateway: &mut GatewayClient,
    message: String,
    speak: bool,
    audio_out: &std::path::Path,
) -> Result<()> {
    let frame = gateway
        .request(ClientRequest::Chat {
            message,
            generate_speech: speak,
        })
        .await?;
    let request_id = frame.id.clone().unwrap_or_default();

    match frame.message {
        ServerMessage::ChatResponse { message } => println!("{message}"),
        ServerMessage::Error { code, message } => bail!("{code}: {message}"),
        other => bail!("unexpected response: {:?}", other),
    }

    if speak {
        let follow_up = gateway.next_for(&request_id).await?;
        match follow_up.message {
            ServerMessage::TextToSpeechResponse { audio, .. } => {
                use base64::Engine;
                let bytes = base64::engine::general_purpose::STANDARD.decode(audio)?;
                tokio::fs::write(audio_out, &bytes).await?;
                eprintln!(
                    "{}",
                    style(format!(
                        "[speech: {} bytes written to {}]",
                        bytes.len(),
                        audio_out.display()
                    ))
                    .dim()
                );
            }
            ServerMessage::Error { code, message } => {
                eprintln!("{}", style(format!("speech failed ({code}): {message}")).red());
            }
            other => bail!("unexpected response: {:?}", other),
        }
    }
    Ok(())
}

/// Read questions from stdin until EOF or "exit", keeping the gateway's
/// per-session analysis context alive across turns.
async fn chat_interactive(
    gateway: &mut GatewayClient,
    speak: bool,
    audio_out: &std::path::Path,
) -> Result<()> {
    let term = console::Term::stdout();
    eprintln!("{}", style("venturescope advisor (exit to quit)").dim());
    loop {
        let line = match term.read_line() {
            Ok(line) => line,
            Err(_) => break,
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" {
            break;
        }
        if let Err(err) = chat(gateway, message.to_string(), speak, audio_out).await {
            eprintln!("{}", style(format!("error: {err:#}")).red());
        }
    }
    Ok(())
}

async fn analyze(
    gateway: &mut GatewayClient,
    name: String,
    problem: String,
    solution: String,
) -> Result<()> {
    let form = StartupForm {
        name: Some(name),
        problem: Some(problem),
        solution: Some(solution),
        ..Default::default()
    };
    let frame = gateway
        .request(ClientRequest::StartupAnalysis { form })
        .await?;
    match frame.message {
        ServerMessage::StartupAnalysisResponse { analysis } => {
            match analysis {
                AnalysisReply::Structured(value) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                AnalysisReply::Unstructured { text, score } => {
                    println!("{text}");
                    println!("{}", style(format!("score: {score}/100")).bold());
                }
            }
            Ok(())
        }
        ServerMessage::Error { code, message } => bail!("{code}: {message}"),
        other => bail!("unexpected response: {:?}", other),
    }
}

async fn patents(gateway: &mut GatewayClient, query: String, limit: u32) -> Result<()> {
    let frame = gateway
        .request(ClientRequest::PatentSearch { query, limit })
        .await?;
    match frame.message {
        ServerMessage::PatentSearchResponse { results } => {
            if results.is_empty() {
                println!("no related patents found");
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["ID", "Title", "Similarity"]);
            for patent in results {
                table.add_row(vec![
                    patent.id,
                    patent.title,
                    format!("{:.2}", patent.similarity_score),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        ServerMessage::Error { code, message } => bail!("{code}: {message}"),
        other => bail!("unexpected response: {:?}", other),
    }
}

async fn gap(gateway: &mut GatewayClient, description: String) -> Result<()> {
    let frame = gateway
        .request(ClientRequest::ResearchGapAnalysis { description })
        .await?;
    match frame.message {
        ServerMessage::ResearchGapAnalysisResponse { analysis } => {
            println!(
                "research gap: {}",
                style(format!("{}/10", analysis.research_gap)).bold()
            );
            println!(
                "related: {} patents, {} publications",
                analysis.related_patents.len(),
                analysis.related_publications.len()
            );
            for recommendation in analysis.recommendations {
                println!("  - {recommendation}");
            }
            Ok(())
        }
        ServerMessage::Error { code, message } => bail!("{code}: {message}"),
        other => bail!("unexpected response: {:?}", other),
    }
}

async fn deep(gateway: &mut GatewayClient, file: std::path::PathBuf) -> Result<()> {
    let text = tokio::fs::read_to_string(&file).await?;
    let frame = gateway.request(ClientRequest::DeepAnalysis { text }).await?;
    match frame.message {
        ServerMessage::DeepAnalysisResponse { analysis } => {
            println!("{analysis}");
            Ok(())
        }
        ServerMessage::Error { code, message } => bail!("{code}: {message}"),
        other => bail!("unexpected response: {:?}", other),
    }
}

async fn health(server: &str) -> Result<()> {
    let http_url = server
        .replacen("ws://", "http://", 1)
        .replacen("wss://", "https://", 1);
    let body: serde_json::Value = reqwest::get(format!("{}/health", http_url.trim_end_matches('/')))
        .await?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

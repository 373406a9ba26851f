//! End-to-end gateway tests: a real TCP listener, a real WebSocket client,
//! and wiremock stand-ins for every external collaborator.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use venturescope_collaborators::{LlmClient, SearchClient, SpeechClient};
use venturescope_server::http::build_router;
use venturescope_server::state::{AppState, Collaborators};
use venturescope_server::transcript::{create_transcript_channel, TranscriptWriter};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Gateway {
    addr: SocketAddr,
    llm: MockServer,
    speech: MockServer,
    search: MockServer,
    transcripts: tempfile::TempDir,
}

async fn spawn_gateway() -> Gateway {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let search = MockServer::start().await;
    let transcripts = tempfile::tempdir().expect("tempdir");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("http client");

    let collaborators = Collaborators {
        llm: LlmClient::new(client.clone(), llm.uri(), "test-key"),
        speech: SpeechClient::new(client.clone(), speech.uri(), "test-key", "voice-1"),
        search: SearchClient::new(client, search.uri(), "test-token"),
    };

    let (transcript_tx, transcript_rx) = create_transcript_channel();
    tokio::spawn(TranscriptWriter::new(transcript_rx, transcripts.path().to_path_buf()).run());

    let state = Arc::new(AppState::new(collaborators, transcript_tx));
    let app = build_router(state, None, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    Gateway {
        addr,
        llm,
        speech,
        search,
        transcripts,
    }
}

/// Wait for the transcript writer task to flush at least one record
async fn transcript_records(dir: &std::path::Path) -> Vec<serde_json::Value> {
    for _ in 0..50 {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.expect("read transcripts dir");
        while let Some(entry) = entries.next_entry().await.expect("dir entry") {
            let text = tokio::fs::read_to_string(entry.path())
                .await
                .expect("read record");
            records.push(serde_json::from_str(&text).expect("parse record"));
        }
        if !records.is_empty() {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("no transcript record written");
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

async fn send_json(ws: &mut WsClient, frame: Value) {
    ws.send(Message::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("parse server frame");
        }
    }
}

fn llm_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

async fn mount_llm_reply(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(text)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn startup_analysis_feeds_context_into_later_chat() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(
        &gateway.llm,
        r#"Here is my assessment: {"overallScore": 82, "recommendation": "Pursue"}"#,
    )
    .await;

    let mut ws = connect(gateway.addr).await;

    send_json(
        &mut ws,
        json!({
            "id": "req-analysis",
            "type": "startup_analysis",
            "name": "Helio",
            "problem": "Grid storage is expensive",
            "solution": "Thermal batteries",
        }),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "startup_analysis_response");
    assert_eq!(frame["id"], "req-analysis");
    assert!(frame["timestamp"].is_string());
    assert_eq!(frame["analysis"]["overallScore"], 82);

    send_json(
        &mut ws,
        json!({ "id": "req-chat", "type": "chat", "message": "What should we do next?" }),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "chat_response");
    assert_eq!(frame["id"], "req-chat");

    // The chat prompt must carry the recorded analysis context.
    let requests = gateway.llm.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
    let chat_body = String::from_utf8(requests[1].body.clone()).expect("utf8 body");
    assert!(chat_body.contains("current_analysis"));
    assert!(chat_body.contains("What should we do next?"));
}

#[tokio::test]
async fn unknown_type_gets_error_frame_and_connection_survives() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(&gateway.llm, "You should validate demand first.").await;

    let mut ws = connect(gateway.addr).await;

    send_json(&mut ws, json!({ "id": "bad-1", "type": "bogus" })).await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["id"], "bad-1");
    assert_eq!(frame["code"], "unknown_type");
    assert!(frame["message"].as_str().expect("message").contains("bogus"));

    send_json(
        &mut ws,
        json!({ "id": "ok-1", "type": "chat", "message": "still there?" }),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "chat_response");
    assert_eq!(frame["id"], "ok-1");
}

#[tokio::test]
async fn malformed_frame_gets_parse_error_without_id() {
    let gateway = spawn_gateway().await;
    let mut ws = connect(gateway.addr).await;

    ws.send(Message::Text("this is not json".into()))
        .await
        .expect("send");
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["code"], "parse_error");
    assert!(frame.get("id").is_none() || frame["id"].is_null());
}

#[tokio::test]
async fn chat_with_generate_speech_delivers_audio_under_same_id() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(&gateway.llm, "Focus on the pilot customer.").await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-mpeg-bytes".to_vec()))
        .expect(1)
        .mount(&gateway.speech)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({
            "id": "spoken-1",
            "type": "chat",
            "message": "Say it out loud",
            "generate_speech": true,
        }),
    )
    .await;

    let first = recv_json(&mut ws).await;
    assert_eq!(first["type"], "chat_response");
    assert_eq!(first["id"], "spoken-1");
    assert_eq!(first["message"], "Focus on the pilot customer.");

    let second = recv_json(&mut ws).await;
    assert_eq!(second["type"], "text_to_speech_response");
    assert_eq!(second["id"], "spoken-1");
    assert_eq!(second["text"], "Focus on the pilot customer.");
    assert!(!second["audio"].as_str().expect("audio").is_empty());
}

#[tokio::test]
async fn speech_to_text_chains_a_spoken_chat_turn() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(&gateway.llm, "Patents come after product-market fit.").await;
    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "text": "When should we patent?" })),
        )
        .mount(&gateway.speech)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-mpeg-bytes".to_vec()))
        .mount(&gateway.speech)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({ "id": "voice-1", "type": "speech_to_text", "audio": "ZmFrZS1hdWRpbw==" }),
    )
    .await;

    let transcript = recv_json(&mut ws).await;
    assert_eq!(transcript["type"], "speech_to_text_response");
    assert_eq!(transcript["id"], "voice-1");
    assert_eq!(transcript["text"], "When should we patent?");

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "chat_response");
    assert_eq!(reply["id"], "voice-1");
    assert_eq!(reply["message"], "Patents come after product-market fit.");

    let audio = recv_json(&mut ws).await;
    assert_eq!(audio["type"], "text_to_speech_response");
    assert_eq!(audio["id"], "voice-1");
}

#[tokio::test]
async fn text_to_speech_writes_a_transcript_record() {
    let gateway = spawn_gateway().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-mpeg-bytes".to_vec()))
        .mount(&gateway.speech)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({ "id": "tts-1", "type": "text_to_speech", "text": "Welcome aboard" }),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "text_to_speech_response");

    let records = transcript_records(gateway.transcripts.path()).await;
    let record = records
        .iter()
        .find(|r| r["kind"] == "text_to_speech")
        .expect("text_to_speech record");
    assert_eq!(record["input"]["text"], "Welcome aboard");
    assert!(record["output"]["audio_base64_chars"].as_u64().expect("chars") > 0);
}

#[tokio::test]
async fn speech_to_text_writes_a_transcript_record() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(&gateway.llm, "Good question.").await;
    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "text": "What is our moat?" })),
        )
        .mount(&gateway.speech)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/text-to-speech/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-mpeg-bytes".to_vec()))
        .mount(&gateway.speech)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({ "id": "stt-1", "type": "speech_to_text", "audio": "ZmFrZS1hdWRpbw==" }),
    )
    .await;
    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "speech_to_text_response");

    let records = transcript_records(gateway.transcripts.path()).await;
    let record = records
        .iter()
        .find(|r| r["kind"] == "speech_to_text")
        .expect("speech_to_text record");
    assert_eq!(record["output"]["text"], "What is our moat?");
    assert_eq!(record["input"]["mime_type"], "audio/webm");
}

#[tokio::test]
async fn patent_search_relays_provider_records() {
    let gateway = spawn_gateway().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "searchPatents": [{
                    "id": "EP-123",
                    "title": "Thermal battery assembly",
                    "abstract": "A battery storing heat in recycled steel.",
                    "similarityScore": 0.91,
                }]
            }
        })))
        .mount(&gateway.search)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({ "id": "pat-1", "type": "patent_search", "query": "thermal battery", "limit": 3 }),
    )
    .await;

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "patent_search_response");
    assert_eq!(frame["id"], "pat-1");
    assert_eq!(frame["results"][0]["id"], "EP-123");
    assert_eq!(frame["results"][0]["similarityScore"], 0.91);
}

#[tokio::test]
async fn research_gap_with_no_related_work_scores_ten() {
    let gateway = spawn_gateway().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "searchPatents": [], "searchPublications": [] }
        })))
        .mount(&gateway.search)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({
            "id": "gap-1",
            "type": "research_gap_analysis",
            "description": "Underwater kite energy harvesting",
        }),
    )
    .await;

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "research_gap_analysis_response");
    assert_eq!(frame["id"], "gap-1");
    assert_eq!(frame["analysis"]["research_gap"], 10);
    assert!(frame["analysis"]["recommendations"]
        .as_array()
        .expect("recommendations")
        .iter()
        .any(|r| r.as_str().expect("string").contains("innovation potential")));
}

#[tokio::test]
async fn collaborator_failure_becomes_generic_error_frame() {
    let gateway = spawn_gateway().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded upstream"))
        .mount(&gateway.llm)
        .await;

    let mut ws = connect(gateway.addr).await;
    send_json(
        &mut ws,
        json!({ "id": "fail-1", "type": "chat", "message": "hello" }),
    )
    .await;

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["id"], "fail-1");
    assert_eq!(frame["code"], "collaborator_error");
    assert_eq!(frame["message"], "Failed to generate response");
    // Provider detail never crosses the socket.
    assert!(!frame["message"]
        .as_str()
        .expect("message")
        .contains("quota"));
}

#[tokio::test]
async fn startup_analysis_missing_fields_is_validation_error() {
    let gateway = spawn_gateway().await;
    let mut ws = connect(gateway.addr).await;

    send_json(
        &mut ws,
        json!({ "id": "val-1", "type": "startup_analysis", "name": "Helio" }),
    )
    .await;

    let frame = recv_json(&mut ws).await;
    assert_eq!(frame["type"], "error");
    assert_eq!(frame["id"], "val-1");
    assert_eq!(frame["code"], "validation_error");
    assert_eq!(
        frame["message"],
        "Missing required fields: problem, solution"
    );
}

#[tokio::test]
async fn health_endpoint_reports_fixed_shape() {
    let gateway = spawn_gateway().await;

    let body: Value = reqwest::get(format!("http://{}/health", gateway.addr))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");

    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["services"]["websocket"], "available");
    assert_eq!(body["services"]["llm"], "configured");
}

#[tokio::test]
async fn http_analyze_validates_and_scores() {
    let gateway = spawn_gateway().await;
    mount_llm_reply(&gateway.llm, r#"{"overallScore": 90}"#).await;
    let client = reqwest::Client::new();

    let missing = client
        .post(format!("http://{}/api/analyze", gateway.addr))
        .json(&json!({ "name": "Helio" }))
        .send()
        .await
        .expect("analyze request");
    assert_eq!(missing.status(), 400);
    let body: Value = missing.json().await.expect("error body");
    assert_eq!(body["error"], "Missing required fields: problem, solution");

    let ok = client
        .post(format!("http://{}/api/analyze", gateway.addr))
        .json(&json!({
            "name": "Helio",
            "problem": "Grid storage",
            "solution": "Thermal batteries",
            "tech_novelty": 8,
            "competitors": 3,
        }))
        .send()
        .await
        .expect("analyze request");
    assert_eq!(ok.status(), 200);
    let body: Value = ok.json().await.expect("body");
    assert_eq!(body["success"], true);
    assert!(body["data"]["composite_score"].is_number());
    assert_eq!(body["data"]["ai_analysis"]["overallScore"], 90);
}

#[tokio::test]
async fn auth_token_guards_api_but_not_health() {
    let llm = MockServer::start().await;
    let speech = MockServer::start().await;
    let search = MockServer::start().await;
    let transcripts = tempfile::tempdir().expect("tempdir");
    let client = reqwest::Client::new();

    let collaborators = Collaborators {
        llm: LlmClient::new(client.clone(), llm.uri(), "test-key"),
        speech: SpeechClient::new(client.clone(), speech.uri(), "test-key", "voice-1"),
        search: SearchClient::new(client.clone(), search.uri(), "test-token"),
    };
    let (transcript_tx, transcript_rx) = create_transcript_channel();
    tokio::spawn(TranscriptWriter::new(transcript_rx, transcripts.path().to_path_buf()).run());
    let state = Arc::new(AppState::new(collaborators, transcript_tx));
    let app = build_router(state, None, Some("sesame".to_string()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let health = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("health");
    assert_eq!(health.status(), 200);

    let denied = client
        .get(format!("http://{addr}/api/history"))
        .send()
        .await
        .expect("history");
    assert_eq!(denied.status(), 401);

    let allowed = client
        .get(format!("http://{addr}/api/history"))
        .bearer_auth("sesame")
        .send()
        .await
        .expect("history");
    assert_eq!(allowed.status(), 200);
}

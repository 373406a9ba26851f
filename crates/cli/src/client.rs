//! Gateway connection with reconnect-on-drop.

use anyhow::{anyhow, bail, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use venturescope_protocol::{ClientFrame, ClientRequest, ServerFrame};

use crate::reconnect::{self, ReconnectPolicy};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct GatewayClient {
    url: String,
    socket: Option<WsStream>,
    policy: ReconnectPolicy,
    /// Close code from the most recent server close frame, if any. A clean
    /// close here suppresses reconnection on the next send.
    last_close_code: Option<u16>,
}

impl GatewayClient {
    pub fn new(server: &str, token: Option<&str>) -> Self {
        let base = server.trim_end_matches('/');
        let url = match token {
            Some(token) => format!("{base}/ws?token={}", urlencoding::encode(token)),
            None => format!("{base}/ws"),
        };
        Self {
            url,
            socket: None,
            policy: ReconnectPolicy::new(),
            last_close_code: None,
        }
    }

    pub async fn connect(&mut self) -> Result<()> {
        let (socket, _) = connect_async(&self.url)
            .await
            .with_context(|| format!("failed to connect to {}", self.url))?;
        self.socket = Some(socket);
        self.last_close_code = None;
        Ok(())
    }

    /// Send one request and return the first response frame carrying its id.
    /// Follow-up frames for the same id are handled by [`Self::next_for`].
    pub async fn request(&mut self, request: ClientRequest) -> Result<ServerFrame> {
        let frame = ClientFrame::new(request);
        let id = frame.id.clone();
        let json = serde_json::to_string(&frame)?;
        self.send_with_reconnect(&json).await?;
        self.next_for(&id).await
    }

    /// Wait for the next frame echoing `request_id`, skipping unrelated
    /// frames. Chained responses (speech audio, follow-up chat) arrive here.
    pub async fn next_for(&mut self, request_id: &str) -> Result<ServerFrame> {
        loop {
            let msg = {
                let socket = self
                    .socket
                    .as_mut()
                    .ok_or_else(|| anyhow!("not connected"))?;
                socket
                    .next()
                    .await
                    .ok_or_else(|| anyhow!("connection closed by server"))??
            };
            match msg {
                Message::Text(text) => {
                    let frame: ServerFrame = serde_json::from_str(&text)
                        .with_context(|| "failed to parse server frame")?;
                    if frame.id.as_deref() == Some(request_id) || frame.id.is_none() {
                        return Ok(frame);
                    }
                }
                Message::Close(close) => {
                    let code = close.map(|frame| u16::from(frame.code));
                    self.last_close_code = code;
                    bail!("server closed the connection (code {:?})", code);
                }
                _ => continue,
            }
        }
    }

    /// Send raw text, reconnecting per policy when the socket has dropped.
    /// Sending before the first [`Self::connect`] is a caller error, not a
    /// reconnect case.
    async fn send_with_reconnect(&mut self, json: &str) -> Result<()> {
        if self.socket.is_none() {
            bail!("not connected");
        }
        loop {
            if let Some(socket) = self.socket.as_mut() {
                match socket.send(Message::Text(json.to_string().into())).await {
                    Ok(()) => return Ok(()),
                    Err(err) => {
                        self.socket = None;
                        if !self.policy.should_reconnect(self.last_close_code) {
                            let reason = if reconnect::is_clean_close(self.last_close_code) {
                                "server closed the connection; not reconnecting"
                            } else {
                                "connection lost and reconnect budget exhausted; restart the client"
                            };
                            return Err(err).context(reason);
                        }
                    }
                }
            } else {
                let delay = self.policy.next_delay().ok_or_else(|| {
                    anyhow!("reconnect budget exhausted; restart the client")
                })?;
                eprintln!("connection lost, retrying in {}ms", delay.as_millis());
                tokio::time::sleep(delay).await;
                match self.connect().await {
                    Ok(()) => self.policy.attempt_finished(true),
                    Err(err) => {
                        self.policy.attempt_finished(false);
                        if !self.policy.should_reconnect(None) {
                            return Err(err)
                                .context("reconnect budget exhausted; restart the client");
                        }
                    }
                }
            }
        }
    }
}

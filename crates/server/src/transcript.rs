//! Best-effort transcript sink.
//!
//! One JSON record per handled request/response pair, written by a dedicated
//! task fed through a bounded channel so the response path never waits on
//! disk. Failures here are logged and dropped; they must never reach the
//! user-facing response.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CHANNEL_CAPACITY: usize = 256;

/// One transcript record
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub kind: String,
    pub timestamp: String,
    pub input: Value,
    pub output: Value,
}

pub fn create_transcript_channel() -> (mpsc::Sender<TranscriptEntry>, mpsc::Receiver<TranscriptEntry>)
{
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Fire-and-forget submission; a full or closed channel drops the record
pub fn record(tx: &mpsc::Sender<TranscriptEntry>, entry: TranscriptEntry) {
    if let Err(err) = tx.try_send(entry) {
        warn!(
            component = "transcript",
            event = "transcript.record.dropped",
            error = %err,
            "transcript channel unavailable, dropping record"
        );
    }
}

/// Writer task draining the transcript channel into one file per record
pub struct TranscriptWriter {
    rx: mpsc::Receiver<TranscriptEntry>,
    dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(rx: mpsc::Receiver<TranscriptEntry>, dir: PathBuf) -> Self {
        Self { rx, dir }
    }

    /// Run the writer (call from `tokio::spawn`)
    pub async fn run(mut self) {
        info!(
            component = "transcript",
            event = "transcript.writer.started",
            dir = %self.dir.display(),
            "transcript writer started"
        );

        while let Some(entry) = self.rx.recv().await {
            self.write_entry(&entry).await;
        }

        debug!(
            component = "transcript",
            event = "transcript.writer.stopped",
            "transcript channel closed"
        );
    }

    async fn write_entry(&self, entry: &TranscriptEntry) {
        if let Err(err) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(
                component = "transcript",
                event = "transcript.write.failed",
                error = %err,
                "could not create transcript directory"
            );
            return;
        }

        let path = self.dir.join(file_name(&entry.timestamp));
        let body = match serde_json::to_vec_pretty(entry) {
            Ok(body) => body,
            Err(err) => {
                warn!(
                    component = "transcript",
                    event = "transcript.serialize.failed",
                    error = %err,
                    "could not serialize transcript entry"
                );
                return;
            }
        };

        match tokio::fs::write(&path, body).await {
            Ok(()) => debug!(
                component = "transcript",
                event = "transcript.write.completed",
                path = %path.display(),
                kind = %entry.kind,
                "transcript saved"
            ),
            Err(err) => warn!(
                component = "transcript",
                event = "transcript.write.failed",
                path = %path.display(),
                error = %err,
                "could not write transcript"
            ),
        }
    }
}

/// Timestamp-keyed file name; a short random suffix keeps same-millisecond
/// records from clobbering each other
fn file_name(timestamp: &str) -> String {
    let stamp: String = timestamp
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    let suffix = &venturescope_protocol::new_id()[..8];
    format!("transcript_{stamp}_{suffix}.json")
}

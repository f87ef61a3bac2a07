//! WebSocket channel to the transcription backend.
//!
//! The channel handle is returned immediately; a background task performs
//! the connect and then pumps both directions. This mirrors browser
//! WebSocket semantics: the object exists at once, readiness arrives
//! asynchronously, and sends before readiness are silently dropped.
//!
//! There is no reconnection. A failed or closed connection leaves the
//! channel permanently not-open; a fresh recording session opens a fresh
//! channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use super::{ChannelError, ServerEvent, TranscribeEndpoint};
use crate::controller::FrameSink;

/// Bound on frames waiting for the socket writer (~3 s of audio). If the
/// writer falls this far behind, further frames are dropped rather than
/// buffered.
const FRAME_QUEUE_DEPTH: usize = 64;

/// Asynchronous notifications from the channel to its observer.
#[derive(Debug)]
pub enum ChannelNotice {
    /// The connection was established.
    Opened,
    /// The backend replaced the transcript with `text`.
    Transcript { text: String },
    /// A transport failure. Recording state is unaffected; sends become
    /// no-ops until a fresh session opens a new channel.
    Error(ChannelError),
    /// The connection closed.
    Closed,
}

/// Receiver for channel notices.
pub type NoticeReceiver = mpsc::Receiver<ChannelNotice>;

/// Cancels the connection task when the last channel clone is dropped, so
/// an abandoned session cannot leak a socket.
struct CancelGuard(CancellationToken);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Duplex channel to the transcription backend.
///
/// Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct TranscriptionChannel {
    frames: mpsc::Sender<Vec<u8>>,
    open: Arc<AtomicBool>,
    cancel: CancellationToken,
    _guard: Arc<CancelGuard>,
}

impl TranscriptionChannel {
    /// Open a channel against `endpoint`. Notices (transcripts, errors,
    /// open/close) are delivered on `notices`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(endpoint: TranscribeEndpoint, notices: mpsc::Sender<ChannelNotice>) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
        let open = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        tokio::spawn(run_connection(
            endpoint,
            frame_rx,
            notices,
            open.clone(),
            cancel.clone(),
        ));

        Self {
            frames: frame_tx,
            open,
            cancel: cancel.clone(),
            _guard: Arc::new(CancelGuard(cancel)),
        }
    }
}

impl FrameSink for TranscriptionChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Best-effort send. Drops the frame silently when the connection is not
    /// open or the writer queue is full; never blocks the caller.
    fn send(&self, frame: Vec<u8>) {
        if !self.is_open() {
            return;
        }
        if self.frames.try_send(frame).is_err() {
            log::debug!("Frame dropped: outbound queue full or connection closing");
        }
    }

    /// Idempotent; safe to call on an already-closed channel.
    fn close(&self) {
        self.cancel.cancel();
    }
}

async fn run_connection(
    endpoint: TranscribeEndpoint,
    mut frames: mpsc::Receiver<Vec<u8>>,
    notices: mpsc::Sender<ChannelNotice>,
    open: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    log::info!("Connecting to {}", endpoint);

    let ws = tokio::select! {
        _ = cancel.cancelled() => return,
        result = connect_async(endpoint.url()) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                log::warn!("Connection to {} failed: {}", endpoint, e);
                let _ = notices
                    .send(ChannelNotice::Error(ChannelError::ConnectionFailed(
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        },
    };

    open.store(true, Ordering::SeqCst);
    log::info!("Connected to transcription backend");
    let _ = notices.send(ChannelNotice::Opened).await;

    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.close().await;
                let _ = notices.send(ChannelNotice::Closed).await;
                break;
            }
            frame = frames.recv() => match frame {
                Some(bytes) => {
                    if let Err(e) = write.send(Message::Binary(bytes)).await {
                        log::warn!("Frame send failed: {}", e);
                        open.store(false, Ordering::SeqCst);
                        let _ = notices
                            .send(ChannelNotice::Error(ChannelError::Disconnected(
                                e.to_string(),
                            )))
                            .await;
                        break;
                    }
                }
                // All senders gone; nothing further to write.
                None => {
                    let _ = write.close().await;
                    let _ = notices.send(ChannelNotice::Closed).await;
                    break;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_text(&text, &notices).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    log::info!("Transcription backend closed the connection");
                    open.store(false, Ordering::SeqCst);
                    let _ = notices.send(ChannelNotice::Closed).await;
                    break;
                }
                Some(Ok(_)) => {} // Ignore ping/pong/binary
                Some(Err(e)) => {
                    log::warn!("WebSocket error: {}", e);
                    open.store(false, Ordering::SeqCst);
                    let _ = notices
                        .send(ChannelNotice::Error(ChannelError::ProtocolError(
                            e.to_string(),
                        )))
                        .await;
                    break;
                }
            },
        }
    }

    open.store(false, Ordering::SeqCst);
    log::debug!("Connection task exiting");
}

/// Parse one inbound text message. Malformed messages are logged and
/// discarded; they never take down the channel.
async fn handle_text(text: &str, notices: &mpsc::Sender<ChannelNotice>) {
    match serde_json::from_str::<ServerEvent>(text) {
        Ok(ServerEvent::Transcript { text }) => {
            let _ = notices.send(ChannelNotice::Transcript { text }).await;
        }
        Ok(ServerEvent::Unknown) => {
            log::debug!("Ignoring unknown event type from backend");
        }
        Err(e) => {
            log::warn!("Failed to parse backend message: {}", e);
        }
    }
}

//! Streaming transcription: the duplex channel to the backend.
//!
//! Outbound traffic is raw binary PCM16 frames, one captured block per
//! WebSocket message. Inbound traffic is JSON transcript events. The channel
//! is best-effort: frames sent while the connection is not open are dropped,
//! never queued — late audio is worthless to a live transcriber.
//!
//! # Architecture
//!
//! ```text
//! Audio callback (sync)             Tokio runtime (async)
//! ┌──────────────────┐              ┌───────────────────────────┐
//! │ admission gate   │──try_send──▶ │ connection task           │
//! │ encode_frame     │              │   ├─ write: binary frames │
//! └──────────────────┘              │   └─ read: ServerEvent    │
//!                                   └────────────┬──────────────┘
//!                                                ▼
//!                                        ChannelNotice stream
//! ```

mod channel;
mod protocol;

pub use channel::{ChannelNotice, NoticeReceiver, TranscriptionChannel};
pub use protocol::{ServerEvent, TranscribeEndpoint, TRANSCRIBE_PATH};

/// Errors that can occur on the transcription channel.
#[derive(Debug, Clone)]
pub enum ChannelError {
    /// The configured origin is not an http(s) URL.
    InvalidOrigin(String),
    /// Failed to establish the WebSocket connection.
    ConnectionFailed(String),
    /// WebSocket protocol error mid-session.
    ProtocolError(String),
    /// Connection was closed unexpectedly.
    Disconnected(String),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::InvalidOrigin(origin) => {
                write!(
                    f,
                    "Invalid server origin (expected http:// or https://): {}",
                    origin
                )
            }
            ChannelError::ConnectionFailed(e) => {
                write!(f, "Failed to connect to transcription backend: {}", e)
            }
            ChannelError::ProtocolError(e) => {
                write!(f, "WebSocket protocol error: {}", e)
            }
            ChannelError::Disconnected(e) => {
                write!(f, "WebSocket disconnected: {}", e)
            }
        }
    }
}

impl std::error::Error for ChannelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_display() {
        let err = ChannelError::InvalidOrigin("ftp://host".to_string());
        assert!(err.to_string().contains("ftp://host"));

        let err = ChannelError::ConnectionFailed("timeout".to_string());
        assert!(err.to_string().contains("timeout"));

        let err = ChannelError::Disconnected("reset by peer".to_string());
        assert!(err.to_string().contains("reset by peer"));
    }
}

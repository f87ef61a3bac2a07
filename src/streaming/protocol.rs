//! Wire protocol for the transcription backend.
//!
//! Client → backend: binary WebSocket messages, each exactly one block of
//! little-endian PCM16 samples. No extra framing — frame boundaries are
//! message boundaries.
//!
//! Backend → client: UTF-8 JSON text messages. The only shape the client
//! acts on is `{"type": "transcript", "text": "<full transcript>"}`, a
//! complete replacement of the accumulated transcript. Anything else is
//! ignored.

use serde::Deserialize;

use super::ChannelError;

/// Well-known transcription endpoint path on the backend host.
pub const TRANSCRIBE_PATH: &str = "/ws/transcribe";

/// Messages received from the transcription backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Full replacement of the current transcript.
    #[serde(rename = "transcript")]
    Transcript { text: String },

    /// Catch-all for message types we don't handle.
    /// This prevents deserialization failures for unknown types.
    #[serde(other)]
    Unknown,
}

/// WebSocket endpoint derived from the configured server origin.
///
/// The scheme upgrades with the origin: an `https://` origin yields `wss://`,
/// an `http://` origin yields `ws://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeEndpoint {
    url: String,
}

impl TranscribeEndpoint {
    pub fn from_origin(origin: &str) -> Result<Self, ChannelError> {
        let origin = origin.trim_end_matches('/');

        let url = if let Some(host) = origin.strip_prefix("https://") {
            format!("wss://{}{}", host, TRANSCRIBE_PATH)
        } else if let Some(host) = origin.strip_prefix("http://") {
            format!("ws://{}{}", host, TRANSCRIBE_PATH)
        } else {
            return Err(ChannelError::InvalidOrigin(origin.to_string()));
        };

        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for TranscribeEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

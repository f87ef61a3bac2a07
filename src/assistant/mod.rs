//! Summarization and feedback refinement.
//!
//! Both operations are text-in/text-out calls against an external assistant
//! backend, behind the [`NotesAssistant`] trait so the application can
//! inject any implementation. Callers get the elapsed wall-clock time of
//! each call alongside the reply text.

mod http;

pub use http::HttpAssistant;

use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Errors from the assistant backend.
#[derive(Debug)]
pub enum AssistantError {
    /// No assistant endpoint configured.
    MissingEndpoint,
    /// Network/HTTP error.
    NetworkError(String),
    /// The backend returned an error status.
    ApiError { status: u16, message: String },
    /// Failed to parse the backend response.
    ParseError(String),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantError::MissingEndpoint => {
                write!(
                    f,
                    "Assistant endpoint not configured. Set assistant_endpoint in settings."
                )
            }
            AssistantError::NetworkError(e) => write!(f, "Network error: {}", e),
            AssistantError::ApiError { status, message } => {
                write!(f, "Assistant backend error ({}): {}", status, message)
            }
            AssistantError::ParseError(e) => write!(f, "Failed to parse assistant response: {}", e),
        }
    }
}

impl std::error::Error for AssistantError {}

/// A reply from the assistant, with the measured duration of the call.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub elapsed: Duration,
}

/// Text-in/text-out assistant interface.
#[async_trait]
pub trait NotesAssistant: Send + Sync {
    /// Produce a finalized summary from the transcript and converted notes.
    async fn summarize(&self, transcript: &str, notes: &str) -> Result<String, AssistantError>;

    /// Refine a previous reply according to free-text user feedback.
    async fn refine(&self, previous: &str, feedback: &str) -> Result<String, AssistantError>;
}

/// Call `summarize` and measure its wall-clock duration.
pub async fn summarize_timed(
    assistant: &dyn NotesAssistant,
    transcript: &str,
    notes: &str,
) -> Result<AssistantReply, AssistantError> {
    let start = Instant::now();
    let text = assistant.summarize(transcript, notes).await?;
    Ok(AssistantReply {
        text,
        elapsed: start.elapsed(),
    })
}

/// Call `refine` and measure its wall-clock duration.
pub async fn refine_timed(
    assistant: &dyn NotesAssistant,
    previous: &str,
    feedback: &str,
) -> Result<AssistantReply, AssistantError> {
    let start = Instant::now();
    let text = assistant.refine(previous, feedback).await?;
    Ok(AssistantReply {
        text,
        elapsed: start.elapsed(),
    })
}

//! Text processing for notes and exports.
//!
//! Pure, synchronous helpers around the recording pipeline: converting
//! uploaded notes to Markdown and exporting text artifacts to files.

pub mod export;
pub mod notes;

pub use export::ExportArtifact;
pub use notes::convert_to_markdown;

/// An operation was invoked on missing or empty required input. Surfaced to
/// the user immediately; never changes recording state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInputError {
    /// Notes conversion requested before any notes were uploaded.
    EmptyNotes,
    /// Finalization requested with neither a transcript nor notes.
    NothingToFinalize,
    /// Feedback refinement requested with no feedback text.
    EmptyFeedback,
    /// Feedback refinement requested before any assistant reply exists.
    NoPriorReply,
    /// Export requested with no content.
    NothingToExport,
}

impl std::fmt::Display for UserInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserInputError::EmptyNotes => write!(f, "Please upload notes first"),
            UserInputError::NothingToFinalize => {
                write!(f, "Please create a transcript or upload notes first")
            }
            UserInputError::EmptyFeedback => write!(f, "Please enter feedback"),
            UserInputError::NoPriorReply => {
                write!(f, "Please finalize with the assistant first")
            }
            UserInputError::NothingToExport => write!(f, "Nothing to export"),
        }
    }
}

impl std::error::Error for UserInputError {}

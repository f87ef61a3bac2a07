//! Notes-to-Markdown conversion.
//!
//! Uploaded notes are arbitrary text; conversion wraps them in a fixed
//! Markdown frame. The transform is pure and deterministic — the same input
//! always produces the same document.

use super::UserInputError;

/// Wrap note content in the Markdown document frame.
///
/// Content is inserted verbatim, without trimming or escaping.
pub fn convert_to_markdown(notes: &str) -> Result<String, UserInputError> {
    if notes.is_empty() {
        return Err(UserInputError::EmptyNotes);
    }

    Ok(format!(
        "# Notes\n\n{}\n\n---\n*Converted to Markdown*",
        notes
    ))
}

//! File export.
//!
//! In the browser original these were downloads; headless, an artifact is a
//! named file written to the export directory. The filename and MIME type
//! travel with the content so callers (and tests) can reason about the
//! artifact without touching the filesystem.

use std::io;
use std::path::{Path, PathBuf};

/// A text artifact ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

impl ExportArtifact {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// The raw transcript, as a plain-text download.
    pub fn transcript(content: impl Into<String>) -> Self {
        Self::new("transcript.txt", "text/plain", content)
    }

    /// Converted notes as a Markdown document.
    pub fn notes_markdown(content: impl Into<String>) -> Self {
        Self::new("notes.md", "text/markdown", content)
    }

    /// The assistant's finalized reply, in the original's .docx naming.
    pub fn summary(content: impl Into<String>) -> Self {
        Self::new(
            "new_notes.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            content,
        )
    }

    /// Write the artifact into `dir`, returning the path written.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)?;
        log::info!(
            "Exported {} ({} bytes, {})",
            path.display(),
            self.content.len(),
            self.mime_type
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_constructors() {
        let t = ExportArtifact::transcript("hi");
        assert_eq!(t.filename, "transcript.txt");
        assert_eq!(t.mime_type, "text/plain");

        let n = ExportArtifact::notes_markdown("# Notes");
        assert_eq!(n.filename, "notes.md");

        let s = ExportArtifact::summary("summary");
        assert_eq!(s.filename, "new_notes.docx");
        assert!(s.mime_type.contains("officedocument"));
    }

    #[test]
    fn test_write_to_creates_file_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ExportArtifact::transcript("the whole transcript");

        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "transcript.txt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "the whole transcript"
        );
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let artifact = ExportArtifact::transcript("text");
        assert!(artifact
            .write_to(Path::new("/nonexistent/export/dir"))
            .is_err());
    }
}

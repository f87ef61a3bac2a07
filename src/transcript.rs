//! Observed transcript state.
//!
//! The backend sends full-replacement snapshots, not deltas, so the client
//! keeps exactly one string and swaps it wholesale on every transcript
//! event. No merge or ordering logic is needed.

/// The current transcript as last reported by the backend.
#[derive(Debug, Clone, Default)]
pub struct TranscriptState {
    text: String,
    updates: u64,
}

impl TranscriptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transcript with a new snapshot. Returns the new text.
    pub fn replace(&mut self, text: &str) -> &str {
        self.text.clear();
        self.text.push_str(text);
        self.updates += 1;

        if self.updates % 20 == 0 {
            log::debug!(
                "Transcript: {} updates, {} chars",
                self.updates,
                self.text.len()
            );
        }
        &self.text
    }

    pub fn current_text(&self) -> &str {
        &self.text
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Count of snapshots applied.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Discard the transcript (application reset).
    pub fn clear(&mut self) {
        self.text.clear();
        self.updates = 0;
    }
}

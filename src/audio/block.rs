//! Fixed-size block assembly for the capture callback.
//!
//! Audio hardware delivers buffers of whatever size the driver prefers; the
//! wire protocol wants exactly [`BLOCK_SAMPLES`](super::BLOCK_SAMPLES)
//! samples per frame. The assembler accumulates incoming samples and emits
//! complete blocks, carrying any remainder into the next callback.

/// Accumulates raw capture buffers and emits fixed-size blocks.
pub struct BlockAssembler {
    buffer: Vec<f32>,
    block_samples: usize,
}

impl BlockAssembler {
    pub fn new(block_samples: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(block_samples * 2),
            block_samples,
        }
    }

    /// Feed captured samples, invoking `emit` once per complete block.
    pub fn push(&mut self, samples: &[f32], mut emit: impl FnMut(&[f32])) {
        self.buffer.extend_from_slice(samples);

        while self.buffer.len() >= self.block_samples {
            emit(&self.buffer[..self.block_samples]);
            self.buffer.drain(..self.block_samples);
        }
    }

    /// Samples currently held back waiting for a full block.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

//! Audio capture module.
//!
//! Microphone input is captured at a fixed format and delivered to the
//! recording controller as fixed-size blocks of normalized f32 samples.

mod block;
pub mod capture;

pub use block::BlockAssembler;
pub use capture::{
    BlockCallback, CaptureError, CaptureHandle, CaptureSource, MicCaptureHandle, MicCaptureSource,
};

/// Capture sample rate. The transcription backend expects 16 kHz PCM.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Samples per capture block (50 ms at 16 kHz). One block becomes one wire
/// frame.
pub const BLOCK_SAMPLES: usize = 800;

//! Microphone capture via CPAL.
//!
//! [`MicCaptureSource`] opens the default input device at the fixed capture
//! format (16 kHz, mono, f32) and delivers fixed-size sample blocks to a
//! registered callback at the cadence of the audio hardware clock. The cpal
//! stream lives on a dedicated thread and is commanded over a channel, so
//! the returned handle is `Send` regardless of platform stream quirks.

use std::sync::mpsc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};

use super::block::BlockAssembler;
use super::{BLOCK_SAMPLES, SAMPLE_RATE_HZ};

/// Callback invoked once per complete capture block.
pub type BlockCallback = Box<dyn FnMut(&[f32]) + Send + 'static>;

/// Errors that can occur while acquiring the capture device.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No input device, or the device refused access.
    DeviceUnavailable,
    /// The device cannot produce the required format.
    NoSupportedConfig,
    StreamCreationFailed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::DeviceUnavailable => {
                write!(f, "No audio input device available (missing or permission denied)")
            }
            CaptureError::NoSupportedConfig => {
                write!(f, "Input device does not support 16 kHz mono capture")
            }
            CaptureError::StreamCreationFailed(e) => {
                write!(f, "Failed to create audio stream: {}", e)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

/// Source of capture handles. The seam exists so tests can drive the
/// recording pipeline with a fake instead of real hardware.
pub trait CaptureSource {
    type Handle: CaptureHandle;

    /// Acquire the device and begin delivering blocks to `on_block`.
    fn open(&self, on_block: BlockCallback) -> Result<Self::Handle, CaptureError>;
}

/// Handle to an active capture stream.
///
/// `suspend` and `resume` pause and restart physical delivery without
/// releasing the device; both are idempotent. `close` releases the device
/// and is also run on drop, so the microphone is never leaked on an
/// abandoned session.
pub trait CaptureHandle: Send {
    fn suspend(&mut self);
    fn resume(&mut self);
    fn close(&mut self);
}

enum StreamCommand {
    Suspend,
    Resume,
    Close,
}

/// Capture source backed by the default CPAL input device.
pub struct MicCaptureSource;

impl MicCaptureSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for MicCaptureSource {
    type Handle = MicCaptureHandle;

    fn open(&self, on_block: BlockCallback) -> Result<MicCaptureHandle, CaptureError> {
        let (command_tx, command_rx) = mpsc::channel::<StreamCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), CaptureError>>(1);

        let thread = thread::spawn(move || {
            // The stream must be built, used, and dropped on this thread.
            let stream = match build_input_stream(on_block) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            loop {
                match command_rx.recv() {
                    Ok(StreamCommand::Suspend) => {
                        stream.pause().ok();
                    }
                    Ok(StreamCommand::Resume) => {
                        stream.play().ok();
                    }
                    Ok(StreamCommand::Close) | Err(_) => break,
                }
            }

            drop(stream);
            log::debug!("Capture thread exiting, device released");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(MicCaptureHandle {
                commands: command_tx,
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => Err(CaptureError::StreamCreationFailed(
                "capture thread died before reporting readiness".to_string(),
            )),
        }
    }
}

fn build_input_stream(mut on_block: BlockCallback) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureError::DeviceUnavailable)?;

    log::info!("Using audio input device: {:?}", device.name());

    let config = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(SAMPLE_RATE_HZ),
        buffer_size: BufferSize::Default,
    };

    let mut assembler = BlockAssembler::new(BLOCK_SAMPLES);
    let err_fn = |err| log::error!("Audio stream error: {}", err);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                assembler.push(data, |block| on_block(block));
            },
            err_fn,
            None,
        )
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            cpal::BuildStreamError::StreamConfigNotSupported => CaptureError::NoSupportedConfig,
            other => CaptureError::StreamCreationFailed(other.to_string()),
        })?;

    stream
        .play()
        .map_err(|e| CaptureError::StreamCreationFailed(format!("Failed to start stream: {}", e)))?;

    log::info!(
        "Capture started: {} Hz mono, {} samples per block",
        SAMPLE_RATE_HZ,
        BLOCK_SAMPLES
    );

    Ok(stream)
}

/// Handle to a live microphone stream.
pub struct MicCaptureHandle {
    commands: mpsc::Sender<StreamCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl CaptureHandle for MicCaptureHandle {
    fn suspend(&mut self) {
        let _ = self.commands.send(StreamCommand::Suspend);
    }

    fn resume(&mut self) {
        let _ = self.commands.send(StreamCommand::Resume);
    }

    fn close(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.commands.send(StreamCommand::Close);
            let _ = thread.join();
        }
    }
}

impl Drop for MicCaptureHandle {
    fn drop(&mut self) {
        self.close();
    }
}

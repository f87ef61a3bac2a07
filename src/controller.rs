//! Recording controller.
//!
//! Ties capture, encoding, and the transcription channel together: decides,
//! per captured block, whether to encode and forward it, and exposes the
//! start/pause/resume/stop operations to the surrounding application.
//!
//! The controller is the single writer of the shared [`StatusCell`]; the
//! capture callback only reads it. A block is admitted if and only if the
//! status is exactly `Recording` at the moment it was captured — blocks
//! arriving while `Paused` or `Idle` are discarded, not buffered, and are
//! never replayed on resume.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::audio::{CaptureError, CaptureHandle, CaptureSource};
use crate::encoder::encode_frame;

/// Recording status. The explicit three-state enumeration makes the invalid
/// "recording and paused at once" combination unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Status {
    #[default]
    Idle = 0,
    Recording = 1,
    Paused = 2,
}

/// Shared status cell. Written only by the controller, read lock-free from
/// the capture callback.
pub struct StatusCell(AtomicU8);

impl StatusCell {
    fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(Status::Idle as u8)))
    }

    pub fn get(&self) -> Status {
        match self.0.load(Ordering::SeqCst) {
            1 => Status::Recording,
            2 => Status::Paused,
            _ => Status::Idle,
        }
    }

    fn set(&self, status: Status) {
        self.0.store(status as u8, Ordering::SeqCst);
    }
}

/// Outbound sink for encoded frames.
///
/// Implemented by the transcription channel; tests inject a recording fake.
/// `send` is best-effort and must never block: frames offered while the sink
/// is not open are silently dropped.
pub trait FrameSink: Send + Sync + 'static {
    fn is_open(&self) -> bool;
    fn send(&self, frame: Vec<u8>);
    fn close(&self);
}

/// Errors surfaced by controller operations.
#[derive(Debug)]
pub enum ControllerError {
    /// `start()` was called while a session is already live.
    AlreadyActive,
    /// Device acquisition failed; the session was not started.
    Capture(CaptureError),
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::AlreadyActive => {
                write!(f, "A recording session is already active")
            }
            ControllerError::Capture(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<CaptureError> for ControllerError {
    fn from(e: CaptureError) -> Self {
        ControllerError::Capture(e)
    }
}

/// The mutable state bundle of one live session. Exists iff status is not
/// `Idle`; created by `start`, destroyed by `stop`/`reset`.
struct RecordingSession<H, S> {
    id: Uuid,
    started_at: DateTime<Utc>,
    capture: H,
    channel: S,
}

/// State machine governing when audio is captured and forwarded.
pub struct RecordingController<C: CaptureSource, S: FrameSink + Clone> {
    capture: C,
    open_channel: Box<dyn FnMut() -> S + Send>,
    status: Arc<StatusCell>,
    session: Option<RecordingSession<C::Handle, S>>,
}

impl<C: CaptureSource, S: FrameSink + Clone> RecordingController<C, S> {
    /// Create a controller over a capture source and a channel factory.
    /// The factory is invoked once per session, from `start()`.
    pub fn new(capture: C, open_channel: impl FnMut() -> S + Send + 'static) -> Self {
        Self {
            capture,
            open_channel: Box::new(open_channel),
            status: StatusCell::new(),
            session: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|s| s.started_at)
    }

    /// Begin a recording session: acquire the capture device, open the
    /// channel, and start admitting blocks.
    ///
    /// Device acquisition happens first; if it fails the error is returned,
    /// the state stays `Idle`, and the channel is never opened.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.status.get() != Status::Idle {
            return Err(ControllerError::AlreadyActive);
        }

        let status = Arc::clone(&self.status);
        // The channel does not exist yet when the device is acquired, so the
        // callback reads it from a set-once slot filled in below.
        let slot: Arc<OnceLock<S>> = Arc::new(OnceLock::new());
        let sink_slot = Arc::clone(&slot);

        let handle = self.capture.open(Box::new(move |block| {
            // Admission: forward iff the status is exactly Recording at the
            // moment of capture. Everything here is bounded synchronous work.
            if status.get() != Status::Recording {
                return;
            }
            let Some(sink) = sink_slot.get() else {
                return;
            };
            sink.send(encode_frame(block));
        }))?;

        let channel = (self.open_channel)();
        let _ = slot.set(channel.clone());

        let session = RecordingSession {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            capture: handle,
            channel,
        };
        log::info!("Recording session {} started", session.id);

        self.session = Some(session);
        self.status.set(Status::Recording);
        Ok(())
    }

    /// Suspend capture without releasing the device or the channel.
    /// No-op unless currently `Recording`; idempotent.
    pub fn pause(&mut self) {
        if self.status.get() != Status::Recording {
            return;
        }
        // Close the admission gate before touching the device so no block
        // captured after this call can slip through.
        self.status.set(Status::Paused);
        if let Some(session) = self.session.as_mut() {
            session.capture.suspend();
            log::info!("Recording session {} paused", session.id);
        }
    }

    /// Resume physical delivery after a pause. No-op unless `Paused`;
    /// idempotent. Blocks captured while paused were dropped and are not
    /// replayed.
    pub fn resume(&mut self) {
        if self.status.get() != Status::Paused {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.capture.resume();
            log::info!("Recording session {} resumed", session.id);
        }
        self.status.set(Status::Recording);
    }

    /// End the session: release the capture device and close the channel
    /// before returning. Safe to call from any state; idempotent.
    pub fn stop(&mut self) {
        self.status.set(Status::Idle);
        if let Some(mut session) = self.session.take() {
            session.capture.close();
            session.channel.close();
            log::info!("Recording session {} stopped", session.id);
        }
    }

    /// Alias of [`stop`](Self::stop); the surrounding application clears its
    /// transcript and notes on top of this.
    pub fn reset(&mut self) {
        self.stop();
    }
}

impl<C: CaptureSource, S: FrameSink + Clone> Drop for RecordingController<C, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

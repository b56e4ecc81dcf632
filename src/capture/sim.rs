//! Simulated camera source
//!
//! Deterministic in-process camera used by tests and headless embeddings.
//! Handles are cheap clones over shared state, so a test can keep one and
//! observe or steer a camera that has been boxed into a session.

use super::traits::{AcquisitionError, CameraSource, MediaStream, StreamConstraints};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct SimCameraInner {
    /// Every stream this camera has ever issued, in order
    issued: Vec<MediaStream>,
    /// Stream currently held out
    held: Option<MediaStream>,
    /// Failure to return on the next acquire attempt
    fail_with: Option<AcquisitionError>,
}

/// In-process camera source
#[derive(Clone, Default)]
pub struct SimCamera {
    inner: Arc<Mutex<SimCameraInner>>,
}

impl SimCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `acquire` call fail with `error`. One-shot: the attempt
    /// consumes the injected failure.
    pub fn reject_next(&self, error: AcquisitionError) {
        self.inner.lock().fail_with = Some(error);
    }

    /// Number of streams issued over the camera's lifetime
    pub fn acquisitions(&self) -> usize {
        self.inner.lock().issued.len()
    }

    /// Number of issued streams whose tracks are still live
    pub fn live_streams(&self) -> usize {
        self.inner
            .lock()
            .issued
            .iter()
            .filter(|s| s.is_active())
            .count()
    }

    /// The most recently issued stream, if any
    pub fn last_stream(&self) -> Option<MediaStream> {
        self.inner.lock().issued.last().cloned()
    }
}

#[async_trait]
impl CameraSource for SimCamera {
    async fn acquire(&mut self, constraints: StreamConstraints) -> Result<MediaStream, AcquisitionError> {
        let mut inner = self.inner.lock();

        // Never two live streams from one source
        if let Some(prev) = inner.held.take() {
            prev.stop_tracks();
        }

        if let Some(error) = inner.fail_with.take() {
            tracing::debug!("sim camera rejecting acquire: {error}");
            return Err(error);
        }

        let stream = MediaStream::new(constraints);
        tracing::debug!("sim camera issued {:?} stream {}", constraints.facing, stream.id());
        inner.issued.push(stream.clone());
        inner.held = Some(stream.clone());
        Ok(stream)
    }

    fn release(&mut self) {
        if let Some(stream) = self.inner.lock().held.take() {
            stream.stop_tracks();
        }
    }
}

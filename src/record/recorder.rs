//! Recording pass lifecycle
//!
//! The recorder drives one encoder device through a pass: negotiate a
//! format, clear the buffer, start chunk production, and on stop fold the
//! chunks into a single immutable artifact.

use super::artifact::RecordedArtifact;
use super::encoder::{ChunkBuffer, MediaEncoder, RecorderError};
use super::format::{negotiate, MediaType};
use crate::capture::MediaStream;
use std::time::Duration;

/// Interval at which the encoder emits partial chunks.
///
/// Small enough that a long pass accumulates incrementally instead of
/// materializing only at stop, so a delayed stop cannot lose everything.
pub const TIMESLICE: Duration = Duration::from_millis(100);

/// Drives one [`MediaEncoder`] through recording passes
pub struct Recorder {
    encoder: Box<dyn MediaEncoder>,
    buffer: ChunkBuffer,
    negotiated: Option<MediaType>,
    recording: bool,
}

impl Recorder {
    pub fn new(encoder: Box<dyn MediaEncoder>) -> Self {
        Self {
            encoder,
            buffer: ChunkBuffer::new(),
            negotiated: None,
            recording: false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The format picked for the in-flight (or last) pass
    pub fn negotiated(&self) -> Option<MediaType> {
        self.negotiated
    }

    /// Begin a recording pass against `stream`.
    ///
    /// Fails with [`RecorderError::NoActiveStream`] when the stream has no
    /// live tracks, and [`RecorderError::NoSupportedFormat`] when the
    /// device's capability table rejects the whole preference list.
    pub async fn start(&mut self, stream: &MediaStream) -> Result<(), RecorderError> {
        if self.recording {
            return Err(RecorderError::AlreadyRecording);
        }
        if !stream.is_active() {
            return Err(RecorderError::NoActiveStream);
        }

        let media_type = negotiate(&*self.encoder).ok_or(RecorderError::NoSupportedFormat)?;
        tracing::info!("negotiated recording format: {}", media_type.mime);

        self.buffer.clear();
        self.encoder
            .start(stream, media_type, TIMESLICE, self.buffer.sink())
            .await?;

        self.negotiated = Some(media_type);
        self.recording = true;
        Ok(())
    }

    /// Stop the in-flight pass and finalize its artifact.
    ///
    /// Idempotent: stopping an already-stopped recorder returns `Ok(None)`
    /// without touching the encoder, so a timer expiry and a manual stop can
    /// race harmlessly.
    pub async fn stop(&mut self) -> Result<Option<RecordedArtifact>, RecorderError> {
        if !self.recording {
            return Ok(None);
        }
        self.recording = false;

        self.encoder.stop().await?;

        let chunks = self.buffer.drain();
        let media_type = self.negotiated.ok_or_else(|| {
            RecorderError::Backend("stopped a pass with no negotiated format".into())
        })?;

        let artifact = RecordedArtifact::from_chunks(chunks, media_type);
        tracing::info!(
            "finalized {} byte {} artifact",
            artifact.len(),
            media_type.mime
        );
        Ok(Some(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Facing, StreamConstraints};
    use crate::record::sim::SimEncoder;

    fn recorder() -> (Recorder, SimEncoder) {
        let encoder = SimEncoder::new();
        (Recorder::new(Box::new(encoder.clone())), encoder)
    }

    fn live_stream() -> MediaStream {
        MediaStream::new(StreamConstraints::video(Facing::Front))
    }

    #[tokio::test]
    async fn test_start_requires_active_stream() {
        let (mut recorder, _) = recorder();
        let stream = live_stream();
        stream.stop_tracks();

        let err = recorder.start(&stream).await.unwrap_err();
        assert_eq!(err, RecorderError::NoActiveStream);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let (mut recorder, _) = recorder();
        let stream = live_stream();

        recorder.start(&stream).await.unwrap();
        let err = recorder.start(&stream).await.unwrap_err();
        assert_eq!(err, RecorderError::AlreadyRecording);
    }

    #[tokio::test]
    async fn test_stop_finalizes_nonempty_artifact() {
        let (mut recorder, _) = recorder();
        recorder.start(&live_stream()).await.unwrap();

        let artifact = recorder.stop().await.unwrap().expect("artifact");
        assert!(!artifact.is_empty());
        assert_eq!(artifact.media_type().mime, "video/mp4");
    }

    #[tokio::test]
    async fn test_double_stop_is_noop() {
        let (mut recorder, encoder) = recorder();
        recorder.start(&live_stream()).await.unwrap();

        assert!(recorder.stop().await.unwrap().is_some());
        // Second stop: no error, no second finalize, encoder untouched
        assert!(recorder.stop().await.unwrap().is_none());
        assert_eq!(encoder.stops(), 1);
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let (mut recorder, encoder) = recorder();
        assert!(recorder.stop().await.unwrap().is_none());
        assert_eq!(encoder.stops(), 0);
    }

    #[tokio::test]
    async fn test_buffer_cleared_between_passes() {
        let (mut recorder, _) = recorder();
        let stream = live_stream();

        recorder.start(&stream).await.unwrap();
        let first = recorder.stop().await.unwrap().unwrap();

        recorder.start(&stream).await.unwrap();
        let second = recorder.stop().await.unwrap().unwrap();

        // Second pass starts from an empty buffer; both flushes are equal size
        assert_eq!(first.len(), second.len());
    }

    #[tokio::test]
    async fn test_unsupported_table_is_hard_failure() {
        let encoder = SimEncoder::supporting(&[]);
        let mut recorder = Recorder::new(Box::new(encoder));

        let err = recorder.start(&live_stream()).await.unwrap_err();
        assert_eq!(err, RecorderError::NoSupportedFormat);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn test_negotiation_respects_capability_table() {
        let encoder = SimEncoder::supporting(&["video/webm;codecs=vp9"]);
        let mut recorder = Recorder::new(Box::new(encoder));

        recorder.start(&live_stream()).await.unwrap();
        assert_eq!(recorder.negotiated().unwrap().mime, "video/webm;codecs=vp9");
    }
}

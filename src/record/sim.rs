//! Simulated media encoder
//!
//! Produces synthetic chunks on the recorder's timeslice so session flows
//! can run without a real capture device. Clonable handle over shared state,
//! same pattern as [`crate::capture::SimCamera`].

use super::encoder::{ChunkSink, MediaEncoder, RecorderError};
use super::format::{FormatSupport, MediaType, FORMAT_PREFERENCE};
use crate::capture::MediaStream;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Bytes per synthetic timeslice chunk
const CHUNK_LEN: usize = 256;
/// Bytes flushed when a pass stops
const FLUSH_LEN: usize = 64;

struct SimEncoderInner {
    supported: Vec<&'static str>,
    sink: Option<ChunkSink>,
    task: Option<JoinHandle<()>>,
    fail_next_start: bool,
    starts: usize,
    stops: usize,
}

/// In-process encoder device
#[derive(Clone)]
pub struct SimEncoder {
    inner: Arc<Mutex<SimEncoderInner>>,
}

impl SimEncoder {
    /// An encoder supporting the whole preference list
    pub fn new() -> Self {
        Self::supporting(&FORMAT_PREFERENCE.map(|m| m.mime))
    }

    /// An encoder whose capability table contains exactly `mimes`
    pub fn supporting(mimes: &[&'static str]) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimEncoderInner {
                supported: mimes.to_vec(),
                sink: None,
                task: None,
                fail_next_start: false,
                starts: 0,
                stops: 0,
            })),
        }
    }

    /// Make the next `start` call fail. One-shot.
    pub fn fail_next_start(&self) {
        self.inner.lock().fail_next_start = true;
    }

    pub fn starts(&self) -> usize {
        self.inner.lock().starts
    }

    pub fn stops(&self) -> usize {
        self.inner.lock().stops
    }

    /// Whether the timeslice task is currently producing
    pub fn is_running(&self) -> bool {
        self.inner.lock().task.is_some()
    }

    fn chunk(seq: u64) -> Vec<u8> {
        let mut chunk = vec![0xA5; CHUNK_LEN];
        chunk[..8].copy_from_slice(&seq.to_le_bytes());
        chunk
    }
}

impl Default for SimEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatSupport for SimEncoder {
    fn supports(&self, mime: &str) -> bool {
        self.inner.lock().supported.contains(&mime)
    }
}

#[async_trait]
impl MediaEncoder for SimEncoder {
    async fn start(
        &mut self,
        stream: &MediaStream,
        media_type: MediaType,
        timeslice: Duration,
        sink: ChunkSink,
    ) -> Result<(), RecorderError> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail_next_start) {
            return Err(RecorderError::Backend("injected start failure".into()));
        }
        if inner.task.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        tracing::debug!(
            "sim encoder recording stream {} as {}",
            stream.id(),
            media_type.mime
        );

        let task_sink = sink.clone();
        inner.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(timeslice);
            // interval fires immediately once; the first chunk lands a full
            // timeslice after start
            interval.tick().await;
            let mut seq = 0u64;
            loop {
                interval.tick().await;
                task_sink.push(Self::chunk(seq));
                seq += 1;
            }
        }));
        inner.sink = Some(sink);
        inner.starts += 1;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        let mut inner = self.inner.lock();
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        // Flush: a completed pass always yields data, mirroring a device
        // that delivers its tail chunk at stop
        if let Some(sink) = inner.sink.take() {
            sink.push(vec![0x5A; FLUSH_LEN]);
        }
        inner.stops += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Facing, StreamConstraints};
    use crate::record::encoder::ChunkBuffer;

    fn stream() -> MediaStream {
        MediaStream::new(StreamConstraints::video(Facing::Front))
    }

    /// Let the timeslice task initialize, then advance `steps` timeslices
    async fn run_timeslices(steps: u32) {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        for _ in 0..steps {
            tokio::time::advance(Duration::from_millis(100)).await;
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunks_accumulate_per_timeslice() {
        let mut encoder = SimEncoder::new();
        let buffer = ChunkBuffer::new();

        encoder
            .start(&stream(), FORMAT_PREFERENCE[0], Duration::from_millis(100), buffer.sink())
            .await
            .unwrap();

        // Let a second of virtual time elapse in timeslice steps
        run_timeslices(10).await;
        encoder.stop().await.unwrap();

        // Ten timeslice chunks plus the stop flush
        assert_eq!(buffer.len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_production() {
        let mut encoder = SimEncoder::new();
        let buffer = ChunkBuffer::new();

        encoder
            .start(&stream(), FORMAT_PREFERENCE[0], Duration::from_millis(100), buffer.sink())
            .await
            .unwrap();
        encoder.stop().await.unwrap();
        assert!(!encoder.is_running());

        let after_stop = buffer.len();
        run_timeslices(10).await;
        assert_eq!(buffer.len(), after_stop);
    }

    #[tokio::test]
    async fn test_injected_start_failure_is_one_shot() {
        let mut encoder = SimEncoder::new();
        let buffer = ChunkBuffer::new();
        encoder.fail_next_start();

        let err = encoder
            .start(&stream(), FORMAT_PREFERENCE[0], Duration::from_millis(100), buffer.sink())
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::Backend(_)));

        encoder
            .start(&stream(), FORMAT_PREFERENCE[0], Duration::from_millis(100), buffer.sink())
            .await
            .unwrap();
        encoder.stop().await.unwrap();
    }
}

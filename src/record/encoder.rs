//! Encoder device seam and chunk plumbing
//!
//! The encoder is the device side of the recorder: it turns a live stream
//! into encoded chunks, delivered through a [`ChunkSink`] handle. Chunks
//! arrive zero or more times before exactly one finalize (the recorder's
//! stop).

use super::format::{FormatSupport, MediaType};
use crate::capture::MediaStream;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Recorder-side errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("no active camera stream")]
    NoActiveStream,

    #[error("recorder is already running")]
    AlreadyRecording,

    #[error("no supported recording format")]
    NoSupportedFormat,

    #[error("encoder failure: {0}")]
    Backend(String),
}

/// Buffer of encoded chunks for one recording pass
///
/// Owned by the recorder; encoders write into it through [`ChunkSink`]
/// handles. Cleared at the start of every pass.
#[derive(Clone, Default)]
pub struct ChunkBuffer {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle an encoder uses to deliver chunks
    pub fn sink(&self) -> ChunkSink {
        ChunkSink {
            chunks: Arc::clone(&self.chunks),
        }
    }

    pub fn clear(&self) {
        self.chunks.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.lock().is_empty()
    }

    /// Take every buffered chunk, leaving the buffer empty
    pub fn drain(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.chunks.lock())
    }
}

/// Write handle into a [`ChunkBuffer`]
#[derive(Clone)]
pub struct ChunkSink {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ChunkSink {
    /// Append one encoded chunk. Empty chunks are discarded.
    pub fn push(&self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.lock().push(chunk);
    }
}

/// A device that encodes a live stream into timed chunks
///
/// `start` begins emitting into `sink` roughly every `timeslice`; `stop`
/// halts emission and flushes whatever the device still holds. After `stop`
/// returns, no further chunks arrive.
#[async_trait]
pub trait MediaEncoder: FormatSupport + Send + Sync {
    async fn start(
        &mut self,
        stream: &MediaStream,
        media_type: MediaType,
        timeslice: Duration,
        sink: ChunkSink,
    ) -> Result<(), RecorderError>;

    async fn stop(&mut self) -> Result<(), RecorderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_discards_empty_chunks() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();

        sink.push(vec![]);
        sink.push(vec![1, 2, 3]);
        sink.push(vec![]);

        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_drain_empties_buffer() {
        let buffer = ChunkBuffer::new();
        let sink = buffer.sink();
        sink.push(vec![1]);
        sink.push(vec![2]);

        let chunks = buffer.drain();
        assert_eq!(chunks, vec![vec![1], vec![2]]);
        assert!(buffer.is_empty());
    }
}

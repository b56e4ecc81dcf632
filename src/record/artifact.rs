//! Finished recording artifacts

use super::format::MediaType;
use chrono::{DateTime, Utc};

/// File stem for generated clip names
const FILE_STEM: &str = "swing";

/// One finished, immutable clip
///
/// Produced at most once per recording pass by concatenating the pass's
/// chunks; tagged with the negotiated media type and the capture time.
#[derive(Debug, Clone)]
pub struct RecordedArtifact {
    data: Vec<u8>,
    media_type: MediaType,
    captured_at: DateTime<Utc>,
}

impl RecordedArtifact {
    /// Concatenate a pass's chunks into an artifact
    pub fn from_chunks(chunks: Vec<Vec<u8>>, media_type: MediaType) -> Self {
        let mut data = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
        for chunk in chunks {
            data.extend_from_slice(&chunk);
        }
        Self {
            data,
            media_type,
            captured_at: Utc::now(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Generated save name: `swing-<unix-epoch-millis>.<ext>`
    pub fn file_name(&self) -> String {
        format!(
            "{FILE_STEM}-{}.{}",
            self.captured_at.timestamp_millis(),
            self.media_type.container.extension()
        )
    }
}

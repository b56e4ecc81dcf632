//! Camera source trait definitions
//!
//! Device-agnostic contract for acquiring and releasing live camera streams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Which physical camera supplies the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// User-facing (selfie) camera
    Front,
    /// Environment-facing camera
    Back,
}

impl Facing {
    /// The other camera
    pub fn toggled(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }

    /// Whether the live preview should be mirrored horizontally.
    ///
    /// Cosmetic hint for the presentation layer; nothing else depends on it.
    pub fn mirror_preview(self) -> bool {
        matches!(self, Facing::Front)
    }
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Front
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// Requested stream parameters
///
/// Dimensions are ideal values; the device may deliver the closest mode it
/// supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    pub facing: Facing,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

impl StreamConstraints {
    /// Video-only constraints at the standard 1280x720 preview size
    pub fn video(facing: Facing) -> Self {
        Self {
            facing,
            ideal_width: 1280,
            ideal_height: 720,
            audio: false,
        }
    }
}

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// A single track within a stream
///
/// Tracks share their liveness flag with every clone of the owning stream,
/// so stopping a track is visible through all handles.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    kind: TrackKind,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }

    /// Stop the track. Idempotent.
    pub fn stop(&self) {
        self.live.store(false, Ordering::Relaxed);
    }
}

struct StreamInner {
    id: Uuid,
    facing: Facing,
    width: u32,
    height: u32,
    tracks: Vec<MediaTrack>,
}

/// A live camera stream handle
///
/// Cheap to clone; all clones observe the same track liveness.
#[derive(Clone)]
pub struct MediaStream {
    inner: Arc<StreamInner>,
}

impl MediaStream {
    /// Create a stream satisfying `constraints` with a single video track
    /// (plus an audio track when requested).
    pub fn new(constraints: StreamConstraints) -> Self {
        let mut tracks = vec![MediaTrack::new(TrackKind::Video)];
        if constraints.audio {
            tracks.push(MediaTrack::new(TrackKind::Audio));
        }
        Self {
            inner: Arc::new(StreamInner {
                id: Uuid::new_v4(),
                facing: constraints.facing,
                width: constraints.ideal_width,
                height: constraints.ideal_height,
                tracks,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn facing(&self) -> Facing {
        self.inner.facing
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.inner.tracks
    }

    /// A stream is active while at least one of its tracks is live
    pub fn is_active(&self) -> bool {
        self.inner.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track. Idempotent.
    pub fn stop_tracks(&self) {
        for track in &self.inner.tracks {
            track.stop();
        }
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.inner.id)
            .field("facing", &self.inner.facing)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Why a stream could not be acquired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device available")]
    NoDevice,

    #[error("camera is busy")]
    Busy,
}

/// A device that can supply live camera streams
///
/// Implementations must tear down any previously issued stream before
/// acquiring a new one; two streams from the same source are never live at
/// once.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// Acquire a stream satisfying `constraints`, releasing any prior stream
    /// first.
    async fn acquire(&mut self, constraints: StreamConstraints) -> Result<MediaStream, AcquisitionError>;

    /// Stop and drop the currently held stream. No-op when nothing is held.
    fn release(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_toggle_roundtrip() {
        assert_eq!(Facing::Front.toggled(), Facing::Back);
        assert_eq!(Facing::Back.toggled(), Facing::Front);
        assert_eq!(Facing::Front.toggled().toggled(), Facing::Front);
    }

    #[test]
    fn test_only_front_mirrors_preview() {
        assert!(Facing::Front.mirror_preview());
        assert!(!Facing::Back.mirror_preview());
    }

    #[test]
    fn test_video_constraints_have_no_audio() {
        let constraints = StreamConstraints::video(Facing::Back);
        assert_eq!(constraints.ideal_width, 1280);
        assert_eq!(constraints.ideal_height, 720);
        assert!(!constraints.audio);
    }

    #[test]
    fn test_stream_stops_through_clones() {
        let stream = MediaStream::new(StreamConstraints::video(Facing::Front));
        let clone = stream.clone();
        assert!(clone.is_active());

        stream.stop_tracks();
        assert!(!stream.is_active());
        assert!(!clone.is_active());

        // Stopping again is harmless
        clone.stop_tracks();
        assert!(!stream.is_active());
    }
}

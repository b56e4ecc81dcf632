//! Swingcheck - record a short swing clip, review it frame by frame.
//!
//! This crate implements the capture session core: a camera -> recording ->
//! playback state machine over trait-abstracted device collaborators
//! (camera source, media encoder, player, share sheet). Deterministic
//! simulations of every device ship in-crate, so the full session lifecycle
//! runs without hardware.

pub mod capture;
pub mod playback;
pub mod prefs;
pub mod record;
pub mod session;
pub mod share;

pub use capture::{AcquisitionError, CameraSource, Facing, MediaStream, StreamConstraints};
pub use playback::{
    format_clock, PlaybackRate, PlaybackState, Player, PlayerError, PlayerEvent, FRAME_STEP_SECS,
};
pub use prefs::{FilePrefStore, MemoryPrefStore, PrefStore};
pub use record::{ContainerFormat, MediaEncoder, MediaType, RecordedArtifact, Recorder, RecorderError};
pub use session::{
    CaptureSession, RecordingConfig, SaveOutcome, SessionDevices, SessionError, SessionEvent,
    SessionMode, DURATION_CHOICES,
};
pub use share::{ShareError, ShareOutcome, ShareSink};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for embeddings that have no subscriber of
/// their own. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swingcheck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

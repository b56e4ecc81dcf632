//! Player device seam
//!
//! Wraps a finished clip for review. Loading resolves with the clip
//! duration (the metadata-loaded notification); position and play-state
//! changes arrive as broadcast events the session mirrors.

use super::state::PlaybackRate;
use crate::record::RecordedArtifact;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Player-side errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("no clip loaded")]
    NothingLoaded,

    #[error("clip cannot be played: {0}")]
    Unplayable(String),
}

/// Notifications emitted by a player device
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// Position changed (seek or periodic progress)
    TimeUpdate(f64),
    Play,
    Pause,
    /// End of media reached; the device stops on its own
    Ended,
}

/// A device that plays one loaded clip
///
/// Chunk ordering contract: events only arrive between a successful `load`
/// and the matching `unload`.
#[async_trait]
pub trait Player: Send + Sync {
    /// Load `artifact` for playback, resolving with its duration in seconds
    async fn load(&mut self, artifact: &RecordedArtifact) -> Result<f64, PlayerError>;

    /// Drop the loaded clip and halt any playback. No-op when nothing is
    /// loaded.
    fn unload(&mut self);

    fn play(&mut self);

    fn pause(&mut self);

    /// Jump to `time` seconds; devices clamp to the clip bounds
    fn seek(&mut self, time: f64);

    fn set_rate(&mut self, rate: PlaybackRate);

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Subscribe to player notifications
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
}

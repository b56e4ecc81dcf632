//! Native share handoff
//!
//! The share sheet is a device seam: the session offers a finished clip to
//! the platform's share capability first and only falls back to a plain
//! file write when sharing is out of the picture.

pub mod sim;

pub use sim::SimShare;

use crate::record::RecordedArtifact;
use async_trait::async_trait;
use thiserror::Error;

/// How a share handoff ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The platform accepted the clip
    Completed,
    /// The user dismissed the sheet. Not an error.
    Cancelled,
}

/// Share-side errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("sharing is not available on this device")]
    Unavailable,

    #[error("share failed: {0}")]
    Failed(String),
}

/// A platform share capability
#[async_trait]
pub trait ShareSink: Send + Sync {
    /// Whether this device can share `artifact` at all
    fn can_share(&self, artifact: &RecordedArtifact) -> bool;

    /// Offer `artifact` to the platform share sheet under `file_name`
    async fn share(
        &self,
        artifact: &RecordedArtifact,
        file_name: &str,
    ) -> Result<ShareOutcome, ShareError>;
}

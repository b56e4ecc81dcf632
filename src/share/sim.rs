//! Simulated share sheet

use super::{ShareError, ShareOutcome, ShareSink};
use crate::record::RecordedArtifact;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Scripted behavior for a [`SimShare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareScript {
    /// Accept every handoff
    Complete,
    /// User dismisses every sheet
    Cancel,
    /// Sharing is not available at all
    Unavailable,
}

struct SimShareInner {
    script: ShareScript,
    shared: Vec<String>,
}

/// In-process share sheet
#[derive(Clone)]
pub struct SimShare {
    inner: Arc<Mutex<SimShareInner>>,
}

impl SimShare {
    pub fn new(script: ShareScript) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimShareInner {
                script,
                shared: Vec::new(),
            })),
        }
    }

    /// File names the platform accepted, in order
    pub fn completed(&self) -> Vec<String> {
        self.inner.lock().shared.clone()
    }
}

#[async_trait]
impl ShareSink for SimShare {
    fn can_share(&self, artifact: &RecordedArtifact) -> bool {
        !artifact.is_empty() && self.inner.lock().script != ShareScript::Unavailable
    }

    async fn share(
        &self,
        _artifact: &RecordedArtifact,
        file_name: &str,
    ) -> Result<ShareOutcome, ShareError> {
        let mut inner = self.inner.lock();
        match inner.script {
            ShareScript::Complete => {
                inner.shared.push(file_name.to_string());
                Ok(ShareOutcome::Completed)
            }
            ShareScript::Cancel => Ok(ShareOutcome::Cancelled),
            ShareScript::Unavailable => Err(ShareError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::format::FORMAT_PREFERENCE;

    fn clip() -> RecordedArtifact {
        RecordedArtifact::from_chunks(vec![vec![1, 2, 3]], FORMAT_PREFERENCE[0])
    }

    #[tokio::test]
    async fn test_completed_handoffs_are_recorded() {
        let share = SimShare::new(ShareScript::Complete);
        assert!(share.can_share(&clip()));

        let outcome = share.share(&clip(), "swing-1.mp4").await.unwrap();
        assert_eq!(outcome, ShareOutcome::Completed);
        assert_eq!(share.completed(), vec!["swing-1.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_is_not_an_error() {
        let share = SimShare::new(ShareScript::Cancel);
        let outcome = share.share(&clip(), "swing-1.mp4").await.unwrap();
        assert_eq!(outcome, ShareOutcome::Cancelled);
        assert!(share.completed().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_refuses_upfront() {
        let share = SimShare::new(ShareScript::Unavailable);
        assert!(!share.can_share(&clip()));
    }

    #[test]
    fn test_empty_clip_is_never_shareable() {
        let share = SimShare::new(ShareScript::Complete);
        let empty = RecordedArtifact::from_chunks(vec![], FORMAT_PREFERENCE[0]);
        assert!(!share.can_share(&empty));
    }
}

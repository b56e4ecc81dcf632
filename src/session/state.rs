//! Session state types

use serde::{Deserialize, Serialize};

/// The session's current mode
///
/// Exactly one is active at a time; it decides which device collaborator is
/// live and which operations are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Live preview; a tap starts recording
    Camera,
    /// A pass is in flight with the countdown running
    Recording,
    /// Reviewing the finished clip
    Playback,
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::Camera
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Camera => write!(f, "camera"),
            SessionMode::Recording => write!(f, "recording"),
            SessionMode::Playback => write!(f, "playback"),
        }
    }
}

/// Durations offered on the settings surface, in seconds.
///
/// Any positive duration is structurally valid; these are just the choices
/// the UI presents.
pub const DURATION_CHOICES: [u32; 5] = [5, 10, 15, 20, 30];

/// Configuration for a recording pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    /// How long a pass runs before the countdown stops it
    pub duration_seconds: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_duration() {
        assert_eq!(RecordingConfig::default().duration_seconds, 10);
        assert!(DURATION_CHOICES.contains(&RecordingConfig::default().duration_seconds));
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionMode::Playback).unwrap(),
            "\"playback\""
        );
    }
}

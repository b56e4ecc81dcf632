//! Playback state types

use serde::{Deserialize, Serialize};

/// Frame-step increment in seconds.
///
/// Fixed 30 fps assumption regardless of the clip's real frame rate; a
/// recorded clip carries no frame index, so stepping is pause + seek by this
/// amount. Documented approximation, not a frame-accurate seek.
pub const FRAME_STEP_SECS: f64 = 1.0 / 30.0;

/// Review playback speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackRate {
    /// 0.25x
    Quarter,
    /// 0.5x
    Half,
    /// 1x
    Normal,
}

impl PlaybackRate {
    /// The speed multiplier
    pub fn factor(self) -> f64 {
        match self {
            PlaybackRate::Quarter => 0.25,
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
        }
    }

    /// All selectable rates, slowest first
    pub const CHOICES: [PlaybackRate; 3] =
        [PlaybackRate::Quarter, PlaybackRate::Half, PlaybackRate::Normal];
}

impl Default for PlaybackRate {
    fn default() -> Self {
        PlaybackRate::Normal
    }
}

/// The controller's mirror of the player's state
///
/// Valid only during playback mode; reset to defaults on retake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Position in seconds
    pub current_time: f64,
    /// Clip length in seconds
    pub duration: f64,
    pub is_playing: bool,
    pub rate: PlaybackRate,
}

impl PlaybackState {
    /// State for a freshly loaded clip
    pub fn fresh(duration: f64) -> Self {
        Self {
            current_time: 0.0,
            duration,
            is_playing: false,
            rate: PlaybackRate::Normal,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::fresh(0.0)
    }
}

/// Render a position the way the scrubber readout shows it: whole seconds
/// and one decimal digit, e.g. `3.2`.
pub fn format_clock(time: f64) -> String {
    let time = time.max(0.0);
    format!("{}.{}", time.floor() as u64, ((time % 1.0) * 10.0).floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_factors() {
        assert_eq!(PlaybackRate::Quarter.factor(), 0.25);
        assert_eq!(PlaybackRate::Half.factor(), 0.5);
        assert_eq!(PlaybackRate::Normal.factor(), 1.0);
    }

    #[test]
    fn test_default_state() {
        let state = PlaybackState::default();
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
        assert!(!state.is_playing);
        assert_eq!(state.rate, PlaybackRate::Normal);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0.0");
        assert_eq!(format_clock(3.25), "3.2");
        assert_eq!(format_clock(10.09), "10.0");
        assert_eq!(format_clock(-0.5), "0.0");
    }
}

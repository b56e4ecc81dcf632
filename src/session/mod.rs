//! Capture session module
//!
//! This module implements the session state machine:
//! - SessionMode and recording configuration
//! - CaptureSession to drive camera, recorder, and player through the
//!   camera -> recording -> playback lifecycle

pub mod controller;
pub mod state;

pub use controller::{CaptureSession, SaveOutcome, SessionDevices, SessionError, SessionEvent};
pub use state::{RecordingConfig, SessionMode, DURATION_CHOICES};

//! Camera capture layer
//!
//! The camera is a device seam: the session owns stream lifetime, a
//! [`CameraSource`] implementation owns the hardware.

pub mod sim;
pub mod traits;

pub use sim::SimCamera;
pub use traits::{
    AcquisitionError, CameraSource, Facing, MediaStream, MediaTrack, StreamConstraints, TrackKind,
};

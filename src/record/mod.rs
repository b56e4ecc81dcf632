//! Recording layer
//!
//! The [`Recorder`] owns format negotiation, chunk buffering, and
//! finalization; the [`MediaEncoder`] trait is the device seam that
//! produces the chunks.

pub mod artifact;
pub mod encoder;
pub mod format;
pub mod recorder;
pub mod sim;

pub use artifact::RecordedArtifact;
pub use encoder::{ChunkBuffer, ChunkSink, MediaEncoder, RecorderError};
pub use format::{negotiate, ContainerFormat, FormatSupport, MediaType, FORMAT_PREFERENCE};
pub use recorder::{Recorder, TIMESLICE};
pub use sim::SimEncoder;

//! Adaptive playback session controller.
//!
//! Drives one HLS-style playback session over an abstract [`StreamEngine`]:
//! episode and quality selection, play/pause/seek, single-shot recovery for
//! fatal network and media errors, and an epoch guard that discards results
//! from superseded loads. State is published through a `watch` channel of
//! [`SessionSnapshot`]s; an optional ambient-color task samples frames while
//! playing and folds a glow color into the same snapshot stream.

pub mod ambient;
pub mod engine;
pub mod session;

pub use ambient::{spawn_ambient, AmbientHandle, FrameSampler, GlowColor};
pub use engine::{EngineErrorKind, EngineEvent, EngineFactory, StreamEngine};
pub use session::{PlaybackError, PlaybackSession, PlaybackState, SessionSnapshot};

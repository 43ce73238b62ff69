//! The stream-engine seam.
//!
//! [`StreamEngine`] is the session's view of an HLS engine instance: one
//! engine per attached source, destroyed and recreated on every episode or
//! quality change. Engines report back through [`EngineEvent`]s tagged with
//! the session epoch they were issued under.

/// Classification of a fatal engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Transport-level failure; the engine may succeed on a reload
    Network,
    /// Decode/buffer failure; the engine may recover in place
    Media,
    /// Anything else; not recoverable
    Other,
}

/// Asynchronous notification from an engine instance
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The manifest loaded; the stream is ready to play
    ManifestParsed,
    /// Periodic playhead report
    Progress {
        position_secs: f64,
        duration_secs: f64,
    },
    /// Recoverable hiccup; logged, never surfaced
    NonFatalError { message: String },
    /// The engine cannot continue without intervention
    FatalError {
        kind: EngineErrorKind,
        message: String,
    },
}

/// One attached playback engine.
///
/// Methods are synchronous commands; outcomes arrive later as
/// [`EngineEvent`]s fed to the session.
pub trait StreamEngine: Send {
    /// Attach a stream URL, positioned at `position_secs`
    fn load_source(&mut self, url: &str, position_secs: f64);

    /// Restart loading after a fatal network error
    fn start_load(&mut self);

    /// Attempt in-place recovery after a fatal media error
    fn recover_media_error(&mut self);

    fn play(&mut self);
    fn pause(&mut self);
    fn set_position(&mut self, secs: f64);
    fn set_volume(&mut self, volume: f64);

    /// Current playhead in seconds
    fn position(&self) -> f64;

    /// Release the engine; it must not emit further events
    fn destroy(&mut self);
}

/// Creates a fresh engine per attached source
pub trait EngineFactory: Send {
    fn create(&self) -> Box<dyn StreamEngine>;
}

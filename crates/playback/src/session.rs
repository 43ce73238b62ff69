//! Playback session state machine.
//!
//! One session owns one episode list, at most one live engine, and an epoch
//! counter. Every episode or quality change destroys the old engine, bumps
//! the epoch and attaches a fresh engine; async engine events carry the
//! epoch they were issued under and are silently dropped once the session
//! has moved on. Observers subscribe to a `watch` channel of snapshots.

use crate::ambient::{spawn_ambient, AmbientHandle, FrameSampler, GlowColor};
use crate::engine::{EngineErrorKind, EngineEvent, EngineFactory, StreamEngine};
use shared::models::{Episode, QualityTier};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// User-visible message for unrecoverable playback failures
const PLAYBACK_ERROR_MESSAGE: &str =
    "Ошибка загрузки видео. Попробуйте другое качество или эпизод.";

/// Lifecycle of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Errored,
}

/// Everything an observer needs to render the player
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub episode: Option<u32>,
    pub quality: Option<QualityTier>,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: f64,
    /// Localized message, set only in `Errored`
    pub error: Option<String>,
    pub glow: Option<GlowColor>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            episode: None,
            quality: None,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: 1.0,
            error: None,
            glow: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("unknown episode {0}")]
    UnknownEpisode(u32),
    #[error("quality {0} is not available for this episode")]
    UnavailableQuality(QualityTier),
    #[error("episode {0} has no playable stream")]
    NoPlayableStream(u32),
    #[error("no episode selected")]
    NoActiveEpisode,
}

/// Session controller over an abstract stream engine
pub struct PlaybackSession {
    episodes: Vec<Episode>,
    factory: Box<dyn EngineFactory>,
    sampler: Arc<dyn FrameSampler>,

    engine: Option<Box<dyn StreamEngine>>,
    epoch: u64,
    current_index: Option<usize>,
    quality: Option<QualityTier>,

    // One recovery attempt each per attached source
    network_retry_used: bool,
    media_recovery_used: bool,

    volume: f64,
    tx: Arc<watch::Sender<SessionSnapshot>>,
    ambient: Option<AmbientHandle>,
}

impl PlaybackSession {
    pub fn new(
        episodes: Vec<Episode>,
        factory: Box<dyn EngineFactory>,
        sampler: Arc<dyn FrameSampler>,
    ) -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            episodes,
            factory,
            sampler,
            engine: None,
            epoch: 0,
            current_index: None,
            quality: None,
            network_retry_used: false,
            media_recovery_used: false,
            volume: 1.0,
            tx: Arc::new(tx),
            ambient: None,
        }
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Current snapshot, for synchronous reads
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// The epoch engine events must be tagged with to be applied
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Switch to the episode with the given number, starting from zero.
    ///
    /// The previous quality tier sticks when the new episode carries it;
    /// otherwise the best available tier is chosen.
    pub fn select_episode(&mut self, number: u32) -> Result<(), PlaybackError> {
        let index = self
            .episodes
            .iter()
            .position(|e| e.number == number)
            .ok_or(PlaybackError::UnknownEpisode(number))?;

        let episode = &self.episodes[index];
        let tier = self
            .quality
            .filter(|t| episode.qualities.has(*t))
            .or_else(|| episode.qualities.best_tier())
            .ok_or(PlaybackError::NoPlayableStream(number))?;

        self.attach(index, tier, 0.0)
    }

    /// Advance to the next episode; a no-op at the end of the list
    pub fn next_episode(&mut self) -> Result<(), PlaybackError> {
        let Some(index) = self.current_index else {
            return Ok(());
        };
        match self.episodes.get(index + 1) {
            Some(episode) => self.select_episode(episode.number),
            None => Ok(()),
        }
    }

    /// Go back one episode; a no-op at the start of the list
    pub fn previous_episode(&mut self) -> Result<(), PlaybackError> {
        let Some(index) = self.current_index else {
            return Ok(());
        };
        if index == 0 {
            return Ok(());
        }
        let number = self.episodes[index - 1].number;
        self.select_episode(number)
    }

    /// Reload the current episode at another quality, keeping the playhead
    pub fn select_quality(&mut self, tier: QualityTier) -> Result<(), PlaybackError> {
        let index = self.current_index.ok_or(PlaybackError::NoActiveEpisode)?;
        if !self.episodes[index].qualities.has(tier) {
            return Err(PlaybackError::UnavailableQuality(tier));
        }

        let position = self.engine.as_ref().map(|e| e.position()).unwrap_or(0.0);
        self.attach(index, tier, position)
    }

    /// Tear down any live engine and attach a fresh one under a new epoch
    fn attach(&mut self, index: usize, tier: QualityTier, position: f64) -> Result<(), PlaybackError> {
        let episode = &self.episodes[index];
        let number = episode.number;
        let url = episode
            .qualities
            .get(tier)
            .ok_or(PlaybackError::UnavailableQuality(tier))?
            .to_string();

        self.teardown_engine();
        self.stop_ambient();
        self.epoch += 1;
        self.network_retry_used = false;
        self.media_recovery_used = false;

        info!(episode = number, quality = %tier, position = position, "Attaching stream");
        let mut engine = self.factory.create();
        engine.set_volume(self.volume);
        engine.load_source(&url, position);
        self.engine = Some(engine);
        self.current_index = Some(index);
        self.quality = Some(tier);

        self.tx.send_modify(|s| {
            s.state = PlaybackState::Loading;
            s.episode = Some(number);
            s.quality = Some(tier);
            s.position_secs = position;
            s.duration_secs = 0.0;
            s.error = None;
            s.glow = None;
        });

        Ok(())
    }

    pub fn play(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.play();
        if self.tx.borrow().state == PlaybackState::Paused {
            self.tx.send_modify(|s| s.state = PlaybackState::Playing);
            self.start_ambient();
        }
    }

    pub fn pause(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.pause();
        self.stop_ambient();
        self.tx.send_modify(|s| {
            s.state = PlaybackState::Paused;
            s.glow = None;
        });
    }

    pub fn seek(&mut self, secs: f64) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_position(secs);
            self.tx.send_modify(|s| s.position_secs = secs);
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(volume);
        }
        self.tx.send_modify(|s| s.volume = volume);
    }

    /// Apply an engine event issued under `epoch`.
    ///
    /// Events from superseded epochs never mutate observable state.
    pub fn apply_event(&mut self, epoch: u64, event: EngineEvent) {
        if epoch != self.epoch {
            debug!(
                event_epoch = epoch,
                session_epoch = self.epoch,
                "Discarding stale engine event"
            );
            return;
        }

        match event {
            EngineEvent::ManifestParsed => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.play();
                }
                self.tx.send_modify(|s| s.state = PlaybackState::Playing);
                self.start_ambient();
            }
            EngineEvent::Progress {
                position_secs,
                duration_secs,
            } => {
                self.tx.send_modify(|s| {
                    s.position_secs = position_secs;
                    s.duration_secs = duration_secs;
                });
            }
            EngineEvent::NonFatalError { message } => {
                warn!(message = %message, "Non-fatal engine error");
            }
            EngineEvent::FatalError { kind, message } => self.handle_fatal(kind, &message),
        }
    }

    fn handle_fatal(&mut self, kind: EngineErrorKind, message: &str) {
        match kind {
            EngineErrorKind::Network if !self.network_retry_used => {
                self.network_retry_used = true;
                warn!(message = %message, "Fatal network error, retrying load once");
                if let Some(engine) = self.engine.as_mut() {
                    engine.start_load();
                }
            }
            EngineErrorKind::Media if !self.media_recovery_used => {
                self.media_recovery_used = true;
                warn!(message = %message, "Fatal media error, attempting recovery once");
                if let Some(engine) = self.engine.as_mut() {
                    engine.recover_media_error();
                }
            }
            _ => {
                error!(kind = ?kind, message = %message, "Unrecoverable playback error");
                self.teardown_engine();
                self.stop_ambient();
                self.epoch += 1;
                self.tx.send_modify(|s| {
                    s.state = PlaybackState::Errored;
                    s.error = Some(PLAYBACK_ERROR_MESSAGE.to_string());
                    s.glow = None;
                });
            }
        }
    }

    /// Synchronous full teardown: engine, ambient task, published state
    pub fn destroy(&mut self) {
        self.teardown_engine();
        self.stop_ambient();
        self.epoch += 1;
        self.current_index = None;
        self.quality = None;
        self.tx.send_modify(|s| {
            s.state = PlaybackState::Idle;
            s.episode = None;
            s.quality = None;
            s.position_secs = 0.0;
            s.duration_secs = 0.0;
            s.error = None;
            s.glow = None;
        });
    }

    fn teardown_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
    }

    fn start_ambient(&mut self) {
        self.stop_ambient();
        self.ambient = Some(spawn_ambient(
            Arc::clone(&self.sampler),
            Arc::clone(&self.tx),
        ));
    }

    fn stop_ambient(&mut self) {
        if let Some(handle) = self.ambient.take() {
            handle.abort();
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown_engine();
    }
}

//! Capture session controller
//!
//! Owns the camera -> recording -> playback state machine and mediates
//! between the device collaborators: the camera source supplies a live
//! stream, the recorder turns it into a clip, the player reviews it.

use super::state::{RecordingConfig, SessionMode};
use crate::capture::{AcquisitionError, CameraSource, Facing, MediaStream, StreamConstraints};
use crate::playback::{
    PlaybackRate, PlaybackState, Player, PlayerEvent, FRAME_STEP_SECS,
};
use crate::prefs::{PrefStore, PrefsError, DURATION_KEY, GUIDE_SEEN_KEY};
use crate::record::{MediaEncoder, RecordedArtifact, Recorder, RecorderError};
use crate::share::{ShareOutcome, ShareSink};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Session-level errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),

    #[error("requires {expected} mode, currently in {actual}")]
    WrongMode {
        expected: SessionMode,
        actual: SessionMode,
    },

    #[error("recording duration must be at least one second")]
    InvalidDuration,

    #[error("no recorded clip")]
    NoArtifact,

    #[error("could not save clip: {0}")]
    Save(#[from] std::io::Error),
}

/// Events emitted as the session moves through its lifecycle
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ModeChanged(SessionMode),
    FacingChanged(Facing),
    RecordingStarted,
    /// Seconds left on the countdown; pinned at zero, never negative
    CountdownTick(u32),
    RecordingFinished,
    PlaybackChanged(PlaybackState),
    /// User-visible notification (camera or recorder failure)
    Alert(String),
}

/// How a save operation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Handed off to the platform share sheet
    Shared,
    /// User dismissed the share sheet; the clip stays in review
    Cancelled,
    /// Written to the save directory
    Saved(PathBuf),
}

/// The device collaborators a session is built over
pub struct SessionDevices {
    pub camera: Box<dyn CameraSource>,
    pub encoder: Box<dyn MediaEncoder>,
    pub player: Box<dyn Player>,
    pub share: Box<dyn ShareSink>,
}

/// Devices whose access spans awaits, serialized behind one async lock so
/// no two transitions are ever in flight
struct Devices {
    camera: Box<dyn CameraSource>,
    stream: Option<MediaStream>,
    recorder: Recorder,
    player: Box<dyn Player>,
}

struct SessionInner {
    weak: Weak<SessionInner>,
    mode: RwLock<SessionMode>,
    facing: RwLock<Facing>,
    config: RwLock<RecordingConfig>,
    /// Seconds left while recording; 0 otherwise
    countdown: RwLock<u32>,
    playback: RwLock<PlaybackState>,
    artifact: RwLock<Option<Arc<RecordedArtifact>>>,
    devices: tokio::sync::Mutex<Devices>,
    share: Box<dyn ShareSink>,
    prefs: Box<dyn PrefStore>,
    save_dir: PathBuf,
    /// Liveness flag of the countdown ticker task
    ticker: Mutex<Option<Arc<AtomicBool>>>,
    /// Liveness flag of the player event pump task
    pump: Mutex<Option<Arc<AtomicBool>>>,
    events: broadcast::Sender<SessionEvent>,
}

/// The capture session state machine
///
/// Starts in camera mode. Must be driven from within a tokio runtime: the
/// countdown and the player event pump run as background tasks holding only
/// weak references, so dropping the session ends them.
pub struct CaptureSession {
    inner: Arc<SessionInner>,
}

impl CaptureSession {
    /// Build a session over `devices`, restoring the recording duration
    /// from `prefs`. Saved clips that do not go through the share sheet
    /// land in `save_dir`.
    pub fn new(
        devices: SessionDevices,
        prefs: Box<dyn PrefStore>,
        save_dir: impl Into<PathBuf>,
    ) -> Self {
        let (events, _) = broadcast::channel(100);

        let duration_seconds = prefs
            .get(DURATION_KEY)
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|&secs| secs >= 1)
            .unwrap_or(RecordingConfig::default().duration_seconds);

        let inner = Arc::new_cyclic(|weak| SessionInner {
            weak: weak.clone(),
            mode: RwLock::new(SessionMode::Camera),
            facing: RwLock::new(Facing::default()),
            config: RwLock::new(RecordingConfig { duration_seconds }),
            countdown: RwLock::new(0),
            playback: RwLock::new(PlaybackState::default()),
            artifact: RwLock::new(None),
            devices: tokio::sync::Mutex::new(Devices {
                camera: devices.camera,
                stream: None,
                recorder: Recorder::new(devices.encoder),
                player: devices.player,
            }),
            share: devices.share,
            prefs,
            save_dir: save_dir.into(),
            ticker: Mutex::new(None),
            pump: Mutex::new(None),
            events,
        });

        Self { inner }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn mode(&self) -> SessionMode {
        *self.inner.mode.read()
    }

    pub fn facing(&self) -> Facing {
        *self.inner.facing.read()
    }

    /// Seconds left on the countdown; 0 outside recording mode
    pub fn countdown_remaining(&self) -> u32 {
        *self.inner.countdown.read()
    }

    pub fn playback_state(&self) -> PlaybackState {
        *self.inner.playback.read()
    }

    pub fn duration_seconds(&self) -> u32 {
        self.inner.config.read().duration_seconds
    }

    /// The finished clip under review, if any
    pub fn artifact(&self) -> Option<Arc<RecordedArtifact>> {
        self.inner.artifact.read().clone()
    }

    /// Acquire the initial camera stream.
    ///
    /// On failure the session stays in camera mode with no stream; the user
    /// retries by toggling facing or calling this again.
    pub async fn init_camera(&self) -> Result<(), SessionError> {
        self.inner.ensure_mode(SessionMode::Camera)?;
        let facing = *self.inner.facing.read();
        self.inner.acquire_stream(facing).await
    }

    /// Toggle between the front and back camera.
    ///
    /// Camera mode only. The new facing sticks even if re-acquisition
    /// fails, leaving the session streamless until a retry succeeds.
    pub async fn switch_facing(&self) -> Result<Facing, SessionError> {
        self.inner.ensure_mode(SessionMode::Camera)?;

        let next = self.inner.facing.read().toggled();
        *self.inner.facing.write() = next;
        self.inner.emit(SessionEvent::FacingChanged(next));

        self.inner.acquire_stream(next).await?;
        Ok(next)
    }

    /// Begin a recording pass against the live stream.
    ///
    /// Fails without a mode change when no stream is live or the recorder
    /// cannot start; both surface as user-visible alerts.
    pub async fn start_recording(&self) -> Result<(), SessionError> {
        self.inner.ensure_mode(SessionMode::Camera)?;
        let duration = self.inner.config.read().duration_seconds;

        {
            let mut devices = self.inner.devices.lock().await;
            let Some(stream) = devices.stream.clone().filter(MediaStream::is_active) else {
                self.inner
                    .emit(SessionEvent::Alert("The camera is not running".to_string()));
                return Err(RecorderError::NoActiveStream.into());
            };

            if let Err(err) = devices.recorder.start(&stream).await {
                tracing::warn!("recorder failed to start: {err}");
                self.inner
                    .emit(SessionEvent::Alert("Could not start recording".to_string()));
                return Err(err.into());
            }
        }

        *self.inner.countdown.write() = duration;
        self.inner.set_mode(SessionMode::Recording);
        self.inner.emit(SessionEvent::RecordingStarted);
        self.inner.emit(SessionEvent::CountdownTick(duration));
        self.inner.spawn_ticker();

        tracing::info!("recording started, {duration}s countdown armed");
        Ok(())
    }

    /// Stop the in-flight recording and move to playback.
    ///
    /// Idempotent: both the countdown expiry and the manual stop button
    /// land here, and stopping an already-stopped pass is a no-op.
    pub async fn stop_recording(&self) -> Result<(), SessionError> {
        self.inner.finish_recording().await
    }

    /// Scrub to an absolute position, clamped to the clip bounds
    pub async fn seek(&self, time: f64) -> Result<f64, SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;

        let clamped = time.clamp(0.0, self.inner.playback.read().duration);
        self.inner.devices.lock().await.player.seek(clamped);
        self.inner.playback.write().current_time = clamped;
        self.inner.emit_playback();
        Ok(clamped)
    }

    /// Pause and move one frame forward
    pub async fn step_forward(&self) -> Result<f64, SessionError> {
        self.step(FRAME_STEP_SECS).await
    }

    /// Pause and move one frame backward
    pub async fn step_back(&self) -> Result<f64, SessionError> {
        self.step(-FRAME_STEP_SECS).await
    }

    async fn step(&self, delta: f64) -> Result<f64, SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;
        let duration = self.inner.playback.read().duration;

        let target = {
            let mut devices = self.inner.devices.lock().await;
            devices.player.pause();
            let target = (devices.player.current_time() + delta).clamp(0.0, duration);
            devices.player.seek(target);
            target
        };

        {
            let mut playback = self.inner.playback.write();
            playback.is_playing = false;
            playback.current_time = target;
        }
        self.inner.emit_playback();
        Ok(target)
    }

    /// Toggle play/pause, returning whether playback is now running
    pub async fn toggle_playback(&self) -> Result<bool, SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;

        let was_playing = self.inner.playback.read().is_playing;
        {
            let mut devices = self.inner.devices.lock().await;
            if was_playing {
                devices.player.pause();
            } else {
                devices.player.play();
            }
        }
        self.inner.playback.write().is_playing = !was_playing;
        self.inner.emit_playback();
        Ok(!was_playing)
    }

    /// Select the review playback speed
    pub async fn set_rate(&self, rate: PlaybackRate) -> Result<(), SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;

        self.inner.devices.lock().await.player.set_rate(rate);
        self.inner.playback.write().rate = rate;
        self.inner.emit_playback();
        Ok(())
    }

    /// Discard the clip and go back to the camera for another attempt
    pub async fn retake(&self) -> Result<(), SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;
        self.inner.disarm_pump();

        self.inner.devices.lock().await.player.unload();
        *self.inner.artifact.write() = None;
        *self.inner.playback.write() = PlaybackState::default();
        self.inner.emit_playback();
        self.inner.set_mode(SessionMode::Camera);

        let facing = *self.inner.facing.read();
        self.inner.acquire_stream(facing).await
    }

    /// Save the clip: share sheet first, file fallback second.
    ///
    /// A user-cancelled share ends silently; an unavailable or failing
    /// share falls back to writing the generated filename into the save
    /// directory. No state transition either way.
    pub async fn save(&self) -> Result<SaveOutcome, SessionError> {
        self.inner.ensure_mode(SessionMode::Playback)?;
        let artifact = self.inner.artifact.read().clone().ok_or(SessionError::NoArtifact)?;
        let file_name = artifact.file_name();

        if self.inner.share.can_share(&artifact) {
            match self.inner.share.share(&artifact, &file_name).await {
                Ok(ShareOutcome::Completed) => {
                    tracing::info!("clip shared as {file_name}");
                    return Ok(SaveOutcome::Shared);
                }
                Ok(ShareOutcome::Cancelled) => {
                    tracing::debug!("share sheet dismissed");
                    return Ok(SaveOutcome::Cancelled);
                }
                Err(err) => {
                    tracing::warn!("share handoff failed, falling back to file: {err}");
                }
            }
        }

        std::fs::create_dir_all(&self.inner.save_dir)?;
        let path = self.inner.save_dir.join(&file_name);
        std::fs::write(&path, artifact.data())?;
        tracing::info!("clip saved to {}", path.display());
        Ok(SaveOutcome::Saved(path))
    }

    /// Persist a new recording duration, effective on the next pass
    pub fn set_duration(&self, seconds: u32) -> Result<(), SessionError> {
        if seconds == 0 {
            return Err(SessionError::InvalidDuration);
        }
        self.inner.config.write().duration_seconds = seconds;
        self.inner.prefs.set(DURATION_KEY, &seconds.to_string())?;
        Ok(())
    }

    /// Whether the usage guide has been dismissed before
    pub fn guide_seen(&self) -> bool {
        self.inner.prefs.get(GUIDE_SEEN_KEY).is_some()
    }

    /// Record that the usage guide was dismissed
    pub fn mark_guide_seen(&self) -> Result<(), SessionError> {
        self.inner.prefs.set(GUIDE_SEEN_KEY, "true")?;
        Ok(())
    }

    /// Release every device resource and disarm the background tasks.
    ///
    /// A pass still in flight is stopped and its data discarded.
    pub async fn teardown(&self) {
        self.inner.disarm_ticker();
        self.inner.disarm_pump();

        let mut devices = self.inner.devices.lock().await;
        if devices.recorder.is_recording() {
            if let Err(err) = devices.recorder.stop().await {
                tracing::warn!("recorder stop during teardown failed: {err}");
            }
        }
        devices.camera.release();
        devices.stream = None;
        devices.player.unload();
        tracing::info!("session torn down");
    }
}

impl SessionInner {
    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn emit_playback(&self) {
        let snapshot = *self.playback.read();
        self.emit(SessionEvent::PlaybackChanged(snapshot));
    }

    fn ensure_mode(&self, expected: SessionMode) -> Result<(), SessionError> {
        let actual = *self.mode.read();
        if actual == expected {
            Ok(())
        } else {
            Err(SessionError::WrongMode { expected, actual })
        }
    }

    fn set_mode(&self, mode: SessionMode) {
        *self.mode.write() = mode;
        tracing::info!("session mode -> {mode}");
        self.emit(SessionEvent::ModeChanged(mode));
    }

    /// Release any held stream, then acquire one for `facing`.
    ///
    /// Failure leaves the session streamless in camera mode and surfaces a
    /// user-visible alert; retry is always user-initiated.
    async fn acquire_stream(&self, facing: Facing) -> Result<(), SessionError> {
        let mut devices = self.devices.lock().await;
        devices.camera.release();
        devices.stream = None;

        match devices.camera.acquire(StreamConstraints::video(facing)).await {
            Ok(stream) => {
                tracing::info!("acquired {facing} camera stream {}", stream.id());
                devices.stream = Some(stream);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("camera acquisition failed: {err}");
                self.emit(SessionEvent::Alert("Could not start the camera".to_string()));
                Err(err.into())
            }
        }
    }

    /// Arm the once-per-second countdown ticker for the current pass
    fn spawn_ticker(&self) {
        let alive = Arc::new(AtomicBool::new(true));
        if let Some(previous) = self.ticker.lock().replace(Arc::clone(&alive)) {
            previous.store(false, Ordering::Relaxed);
        }

        let weak = self.weak.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await;
            loop {
                interval.tick().await;
                // A disarmed ticker exits without touching the session, so
                // a stale tick can never stop a newer pass
                if !alive.load(Ordering::Relaxed) {
                    break;
                }
                let Some(inner) = weak.upgrade() else { break };
                if inner.countdown_tick().await {
                    break;
                }
            }
        });
    }

    /// One countdown second elapsed. Returns true when the ticker is done.
    async fn countdown_tick(&self) -> bool {
        if *self.mode.read() != SessionMode::Recording {
            return true;
        }

        let remaining = {
            let mut countdown = self.countdown.write();
            *countdown = countdown.saturating_sub(1);
            *countdown
        };
        self.emit(SessionEvent::CountdownTick(remaining));

        if remaining == 0 {
            if let Err(err) = self.finish_recording().await {
                tracing::warn!("countdown-triggered stop failed: {err}");
            }
            true
        } else {
            false
        }
    }

    /// Converging stop path for expiry, manual stop, and repeat calls
    async fn finish_recording(&self) -> Result<(), SessionError> {
        self.disarm_ticker();

        let mut devices = self.devices.lock().await;
        let Some(artifact) = devices.recorder.stop().await? else {
            // Already stopped; nothing to finalize
            return Ok(());
        };

        devices.camera.release();
        devices.stream = None;

        let artifact = Arc::new(artifact);
        let duration = match devices.player.load(&artifact).await {
            Ok(duration) => duration,
            Err(err) => {
                tracing::warn!("finished clip failed to load for review: {err}");
                self.emit(SessionEvent::Alert("Clip cannot be reviewed".to_string()));
                0.0
            }
        };
        let player_events = devices.player.subscribe();
        drop(devices);

        *self.artifact.write() = Some(artifact);
        *self.playback.write() = PlaybackState::fresh(duration);
        *self.countdown.write() = 0;
        self.set_mode(SessionMode::Playback);
        self.emit(SessionEvent::RecordingFinished);
        self.emit_playback();
        self.spawn_pump(player_events);
        Ok(())
    }

    /// Mirror player notifications into the session's playback state
    fn spawn_pump(&self, mut events: broadcast::Receiver<PlayerEvent>) {
        let alive = Arc::new(AtomicBool::new(true));
        if let Some(previous) = self.pump.lock().replace(Arc::clone(&alive)) {
            previous.store(false, Ordering::Relaxed);
        }

        let weak = self.weak.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if !alive.load(Ordering::Relaxed) {
                            break;
                        }
                        let Some(inner) = weak.upgrade() else { break };
                        inner.on_player_event(event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("player event pump lagged by {skipped}");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    async fn on_player_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::TimeUpdate(position) => {
                self.playback.write().current_time = position;
            }
            PlayerEvent::Play => {
                self.playback.write().is_playing = true;
            }
            PlayerEvent::Pause => {
                self.playback.write().is_playing = false;
            }
            PlayerEvent::Ended => {
                {
                    let mut playback = self.playback.write();
                    playback.is_playing = false;
                    playback.current_time = 0.0;
                }
                // Park the device back at the start; no auto-replay
                self.devices.lock().await.player.seek(0.0);
            }
        }
        self.emit_playback();
    }

    fn disarm_ticker(&self) {
        if let Some(flag) = self.ticker.lock().take() {
            flag.store(false, Ordering::Relaxed);
        }
    }

    fn disarm_pump(&self) {
        if let Some(flag) = self.pump.lock().take() {
            flag.store(false, Ordering::Relaxed);
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.disarm_ticker();
        self.disarm_pump();
    }
}

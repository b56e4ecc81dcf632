//! Simulated player
//!
//! Plays a clip against the tokio clock: position advances at the selected
//! rate on a 100 ms cadence, emitting the same notifications a real player
//! surface would.

use super::player::{Player, PlayerError, PlayerEvent};
use super::state::PlaybackRate;
use crate::record::RecordedArtifact;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Position update cadence while playing
const TICK: Duration = Duration::from_millis(100);

/// Synthetic bytes-per-second used to derive a duration when none is fixed
const BYTES_PER_SECOND: f64 = 1000.0;

struct SimPlayerShared {
    current: Mutex<f64>,
    duration: Mutex<f64>,
    rate: Mutex<f64>,
    playing: AtomicBool,
    loaded: AtomicBool,
    events: broadcast::Sender<PlayerEvent>,
}

impl SimPlayerShared {
    fn emit(&self, event: PlayerEvent) {
        let _ = self.events.send(event);
    }
}

/// In-process player device
#[derive(Clone)]
pub struct SimPlayer {
    shared: Arc<SimPlayerShared>,
    fixed_duration: Option<f64>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SimPlayer {
    /// A player that derives clip duration from artifact size
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(100);
        Self {
            shared: Arc::new(SimPlayerShared {
                current: Mutex::new(0.0),
                duration: Mutex::new(0.0),
                rate: Mutex::new(PlaybackRate::Normal.factor()),
                playing: AtomicBool::new(false),
                loaded: AtomicBool::new(false),
                events,
            }),
            fixed_duration: None,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// A player that reports every loaded clip as `duration` seconds long
    pub fn with_duration(duration: f64) -> Self {
        let mut player = Self::new();
        player.fixed_duration = Some(duration);
        player
    }

    pub fn duration(&self) -> f64 {
        *self.shared.duration.lock()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    fn halt_clock(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Default for SimPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Player for SimPlayer {
    async fn load(&mut self, artifact: &RecordedArtifact) -> Result<f64, PlayerError> {
        if artifact.is_empty() {
            return Err(PlayerError::Unplayable("empty clip".into()));
        }
        self.halt_clock();

        let duration = self
            .fixed_duration
            .unwrap_or(artifact.len() as f64 / BYTES_PER_SECOND);
        *self.shared.current.lock() = 0.0;
        *self.shared.duration.lock() = duration;
        self.shared.playing.store(false, Ordering::Relaxed);
        self.shared.loaded.store(true, Ordering::Relaxed);
        tracing::debug!("sim player loaded {:.1}s clip", duration);
        Ok(duration)
    }

    fn unload(&mut self) {
        self.halt_clock();
        self.shared.loaded.store(false, Ordering::Relaxed);
        self.shared.playing.store(false, Ordering::Relaxed);
        *self.shared.current.lock() = 0.0;
        *self.shared.duration.lock() = 0.0;
    }

    fn play(&mut self) {
        if !self.shared.loaded.load(Ordering::Relaxed)
            || self.shared.playing.swap(true, Ordering::Relaxed)
        {
            return;
        }
        self.shared.emit(PlayerEvent::Play);

        let shared = Arc::clone(&self.shared);
        *self.task.lock() = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.tick().await;
            loop {
                interval.tick().await;
                if !shared.playing.load(Ordering::Relaxed) {
                    break;
                }
                let duration = *shared.duration.lock();
                let step = *shared.rate.lock() * TICK.as_secs_f64();
                let mut current = shared.current.lock();
                *current = (*current + step).min(duration);
                let position = *current;
                drop(current);

                shared.emit(PlayerEvent::TimeUpdate(position));
                if position >= duration {
                    shared.playing.store(false, Ordering::Relaxed);
                    shared.emit(PlayerEvent::Ended);
                    break;
                }
            }
        }));
    }

    fn pause(&mut self) {
        if self.shared.playing.swap(false, Ordering::Relaxed) {
            self.halt_clock();
            self.shared.emit(PlayerEvent::Pause);
        }
    }

    fn seek(&mut self, time: f64) {
        if !self.shared.loaded.load(Ordering::Relaxed) {
            return;
        }
        let duration = *self.shared.duration.lock();
        let clamped = time.clamp(0.0, duration);
        *self.shared.current.lock() = clamped;
        self.shared.emit(PlayerEvent::TimeUpdate(clamped));
    }

    fn set_rate(&mut self, rate: PlaybackRate) {
        *self.shared.rate.lock() = rate.factor();
    }

    fn current_time(&self) -> f64 {
        *self.shared.current.lock()
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.shared.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::format::FORMAT_PREFERENCE;

    fn clip() -> RecordedArtifact {
        RecordedArtifact::from_chunks(vec![vec![0; 500]], FORMAT_PREFERENCE[0])
    }

    /// Let the clock task initialize, then advance `steps` ticks
    async fn run_clock(steps: u32) {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        for _ in 0..steps {
            tokio::time::advance(TICK).await;
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test]
    async fn test_load_reports_duration() {
        let mut player = SimPlayer::with_duration(10.0);
        let duration = player.load(&clip()).await.unwrap();
        assert_eq!(duration, 10.0);

        let mut sized = SimPlayer::new();
        let duration = sized.load(&clip()).await.unwrap();
        assert!((duration - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_clip_is_unplayable() {
        let mut player = SimPlayer::new();
        let empty = RecordedArtifact::from_chunks(vec![], FORMAT_PREFERENCE[0]);
        assert!(matches!(
            player.load(&empty).await,
            Err(PlayerError::Unplayable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_advances_at_rate() {
        let mut player = SimPlayer::with_duration(10.0);
        player.load(&clip()).await.unwrap();
        player.set_rate(PlaybackRate::Half);
        player.play();

        run_clock(10).await; // one second of virtual time
        assert!((player.current_time() - 0.5).abs() < 1e-9);
        assert!(player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_halts_position() {
        let mut player = SimPlayer::with_duration(10.0);
        player.load(&clip()).await.unwrap();
        player.play();
        run_clock(5).await;

        player.pause();
        let frozen = player.current_time();
        run_clock(10).await;
        assert_eq!(player.current_time(), frozen);
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_media_emits_ended() {
        let mut player = SimPlayer::with_duration(0.3);
        let mut events = player.subscribe();
        player.load(&clip()).await.unwrap();
        player.play();

        run_clock(5).await;
        assert!(!player.is_playing());

        let mut saw_ended = false;
        while let Ok(event) = events.try_recv() {
            if event == PlayerEvent::Ended {
                saw_ended = true;
            }
        }
        assert!(saw_ended);
        // Position stops at the end; the session resets it to zero
        assert_eq!(player.current_time(), 0.3);
    }

    #[tokio::test]
    async fn test_seek_clamps_to_clip_bounds() {
        let mut player = SimPlayer::with_duration(10.0);
        player.load(&clip()).await.unwrap();

        player.seek(3.2);
        assert_eq!(player.current_time(), 3.2);
        player.seek(-1.0);
        assert_eq!(player.current_time(), 0.0);
        player.seek(99.0);
        assert_eq!(player.current_time(), 10.0);
    }
}

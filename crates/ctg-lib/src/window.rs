use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::clock::PlaybackClock;

/// Current view bounds. `end - start` equals the configured window size
/// except where `start` is clamped at the session origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        (self.start..=self.end).contains(&t)
    }
}

/// Temporal regime of the session plus the user's follow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Live session, window auto-tracks the newest data.
    LiveFollowing,
    /// Live session, window pinned by the user.
    LiveManual,
    RecordedPaused,
    RecordedPlaying,
    /// Transient state while a recorded seek is applied.
    RecordedSeeking,
}

impl Mode {
    pub fn is_live(&self) -> bool {
        matches!(self, Mode::LiveFollowing | Mode::LiveManual)
    }

    pub fn is_recorded(&self) -> bool {
        !self.is_live()
    }
}

/// Owns the view window and the live/recorded mode machine.
///
/// The controller never owns the buffer; callers hand it in so that every
/// reconciliation sees the buffer state as of that update.
#[derive(Debug, Clone)]
pub struct WindowController {
    window: Window,
    mode: Mode,
    size: f64,
    clock: PlaybackClock,
    /// Total duration of the recording; unused for live sessions.
    total_duration: f64,
    /// Distance from the live edge within which following resumes.
    live_edge_epsilon: f64,
    drag_active: bool,
    completed: bool,
}

impl WindowController {
    /// Controller for a live session, starting at the origin and
    /// following the feed.
    pub fn live(size: f64, live_edge_epsilon: f64) -> Self {
        Self {
            window: Window {
                start: 0.0,
                end: size,
            },
            mode: Mode::LiveFollowing,
            size,
            clock: PlaybackClock::new(),
            total_duration: 0.0,
            live_edge_epsilon,
            drag_active: false,
            completed: false,
        }
    }

    /// Controller for a recorded session of known total duration,
    /// starting paused at the origin.
    pub fn recorded(size: f64, total_duration: f64) -> Self {
        Self {
            window: Window {
                start: 0.0,
                end: size,
            },
            mode: Mode::RecordedPaused,
            size,
            clock: PlaybackClock::new(),
            total_duration: total_duration.max(0.0),
            live_edge_epsilon: 0.0,
            drag_active: false,
            completed: false,
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Whether playback reached the end of the recording.
    pub fn playback_completed(&self) -> bool {
        self.completed
    }

    // Upper seek bound: the live edge, or the recording length.
    fn max_t(&self, buffer: &SampleBuffer) -> f64 {
        if self.mode.is_live() {
            buffer.latest_t().unwrap_or(0.0)
        } else {
            self.total_duration
        }
    }

    /// Jump the window to `t`, clamped into `[0, max_t]`.
    ///
    /// Live sessions move to manual; recorded sessions pass through the
    /// seeking state and settle paused.
    pub fn seek(&mut self, t: f64, buffer: &SampleBuffer) {
        let max_t = self.max_t(buffer);
        let target = t.clamp(0.0, max_t);
        if target != t {
            log::debug!("seek target {t} clamped to {target}");
        }
        self.window.start = target;
        self.window.end = target + self.size;
        self.completed = false;
        if self.mode.is_live() {
            self.mode = Mode::LiveManual;
        } else {
            // the seeking state never outlives this call; consumers
            // observe the session paused at the new position
            self.mode = Mode::RecordedSeeking;
            self.mode = Mode::RecordedPaused;
        }
    }

    /// Start recorded playback at the given speed. Ignored for live
    /// sessions.
    pub fn play(&mut self, speed: f64) -> bool {
        if self.mode.is_live() {
            log::debug!("play ignored for a live session");
            return false;
        }
        self.clock.set_speed(speed);
        self.completed = false;
        self.mode = Mode::RecordedPlaying;
        true
    }

    /// Stop recorded playback. Idempotent; no further ticks advance the
    /// window until `play` is called again.
    pub fn pause(&mut self) {
        if self.mode == Mode::RecordedPlaying {
            self.mode = Mode::RecordedPaused;
        }
    }

    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.clock.set_speed(speed)
    }

    pub fn change_speed(&mut self) -> f64 {
        self.clock.change_speed()
    }

    /// The user grabbed the view: suspend the follow decision and stop
    /// playback while scrubbing.
    pub fn on_drag_start(&mut self) {
        self.drag_active = true;
        match self.mode {
            Mode::LiveFollowing => self.mode = Mode::LiveManual,
            Mode::RecordedPlaying => self.mode = Mode::RecordedPaused,
            _ => {}
        }
    }

    /// The user released the view: re-evaluate the follow decision.
    pub fn on_drag_end(&mut self, buffer: &SampleBuffer) -> bool {
        self.drag_active = false;
        if self.mode == Mode::LiveManual {
            return self.resume_if_at_live_edge(buffer);
        }
        false
    }

    /// Reconcile the window after a live push. Returns whether the window
    /// moved.
    ///
    /// Following re-centers on the newest sample. Manual windows are left
    /// alone until the user has scrubbed back to within `epsilon` of the
    /// live edge, at which point following resumes.
    pub fn on_data_arrived(&mut self, buffer: &SampleBuffer) -> bool {
        if self.drag_active || !self.mode.is_live() {
            return false;
        }
        let Some(latest) = buffer.latest_t() else {
            return false;
        };
        match self.mode {
            Mode::LiveFollowing => {
                self.recenter(latest);
                true
            }
            Mode::LiveManual => self.resume_if_at_live_edge(buffer),
            _ => false,
        }
    }

    fn resume_if_at_live_edge(&mut self, buffer: &SampleBuffer) -> bool {
        let Some(latest) = buffer.latest_t() else {
            return false;
        };
        if self.window.end >= latest - self.live_edge_epsilon {
            log::debug!("window caught up with the live edge, following resumes");
            self.mode = Mode::LiveFollowing;
            self.recenter(latest);
            return true;
        }
        false
    }

    fn recenter(&mut self, latest: f64) {
        self.window.end = latest;
        self.window.start = (latest - self.size).max(0.0);
    }

    /// Advance recorded playback by a wall-clock delta. Returns whether
    /// the window moved.
    ///
    /// The start is clamped at `total - size`; reaching it pauses playback
    /// and marks the run complete.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.mode != Mode::RecordedPlaying {
            return false;
        }
        let limit = (self.total_duration - self.size).max(0.0);
        let advanced = self.window.start + self.clock.advance(dt);
        if advanced >= limit {
            self.window.start = limit;
            self.mode = Mode::RecordedPaused;
            self.completed = true;
            log::debug!("playback reached the end of the recording");
        } else {
            self.window.start = advanced;
        }
        self.window.end = self.window.start + self.size;
        true
    }
}

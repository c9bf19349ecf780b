use serde::{Deserialize, Serialize};

use crate::buffer::SampleBuffer;
use crate::chart::{ChartFrame, ChartSync};
use crate::config::SessionConfig;
use crate::detectors::episodes::{detect_episodes, EpisodeConfig};
use crate::error::StreamError;
use crate::events::{Event, EventLog, Severity};
use crate::metrics::stats::{window_stats, WindowStats};
use crate::signal::Sample;
use crate::ticker::Ticker;
use crate::window::{Mode, Window, WindowController};

/// Messages arriving from the transport layer, matched exhaustively.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    SampleArrived {
        t: f64,
        fhr: f64,
        ua: f64,
    },
    EventDetected {
        kind: String,
        severity: Severity,
        start_t: f64,
        end_t: Option<f64>,
        detected_at: f64,
    },
    SessionBoundary {
        kind: BoundaryKind,
    },
    BulkLoad {
        samples: Vec<Sample>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Start,
    End,
}

/// Consistent output republished to the rendering layer after every
/// accepted transition.
#[derive(Debug, Clone, Serialize)]
pub struct ViewUpdate {
    pub window: Window,
    pub slice: Vec<Sample>,
    pub stats: WindowStats,
    pub events: Vec<Event>,
    pub mode: Mode,
}

/// One monitoring session: sample buffer, event log, window controller,
/// chart projection, and the reconciliation ticker.
///
/// All state is session-scoped; nothing lives in globals. Mutation is
/// serialized through `handle` and the control methods, and each call
/// runs to completion before the next, so every published view is a
/// consistent window + slice + stats triple.
pub struct Session {
    config: SessionConfig,
    episode_cfg: EpisodeConfig,
    buffer: SampleBuffer,
    log: EventLog,
    controller: WindowController,
    chart: ChartSync,
    ticker: Ticker,
}

impl Session {
    /// Fresh live session, following an open-ended feed.
    pub fn live(config: SessionConfig) -> Self {
        let episode_cfg = EpisodeConfig {
            delta_bpm: config.delta_threshold,
            ..EpisodeConfig::default()
        };
        Self {
            buffer: SampleBuffer::with_capacity(config.buffer_capacity),
            log: EventLog::new(config.max_events),
            controller: WindowController::live(config.window_size, config.live_edge_epsilon),
            chart: ChartSync::new(),
            ticker: Ticker::new(config.tick_interval),
            episode_cfg,
            config,
        }
    }

    /// Recorded session over a fully available recording.
    ///
    /// Fails on an unordered recording; the session does not start.
    pub fn recorded(config: SessionConfig, samples: Vec<Sample>) -> Result<Self, StreamError> {
        let mut session = Self::live(config);
        session.load_recording(samples)?;
        Ok(session)
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.list()
    }

    pub fn playback_completed(&self) -> bool {
        self.controller.playback_completed()
    }

    /// Dispatch one transport message. Recoverable conditions are
    /// returned as errors without disturbing the session.
    pub fn handle(&mut self, msg: InboundMessage) -> Result<Option<ViewUpdate>, StreamError> {
        match msg {
            InboundMessage::SampleArrived { t, fhr, ua } => {
                if self.mode().is_recorded() {
                    log::warn!("live sample at t={t} ignored by a recorded session");
                    return Ok(None);
                }
                self.buffer.push(Sample::new(t, fhr, ua))?;
                self.controller.on_data_arrived(&self.buffer);
                Ok(Some(self.view()))
            }
            InboundMessage::EventDetected {
                kind,
                severity,
                start_t,
                end_t,
                detected_at,
            } => {
                let event = Event::new(kind, severity, start_t, end_t, detected_at);
                if self.log.add(event) {
                    Ok(Some(self.view()))
                } else {
                    Ok(None)
                }
            }
            InboundMessage::SessionBoundary { kind } => {
                log::debug!("session boundary: {kind:?}");
                self.reset();
                Ok(Some(self.view()))
            }
            InboundMessage::BulkLoad { samples } => {
                self.load_recording(samples)?;
                Ok(Some(self.view()))
            }
        }
    }

    fn load_recording(&mut self, samples: Vec<Sample>) -> Result<(), StreamError> {
        let total = samples.last().map(|s| s.t).unwrap_or(0.0);
        self.buffer.load(samples)?;
        self.controller = WindowController::recorded(self.config.window_size, total);
        self.chart.invalidate();
        Ok(())
    }

    /// Return every component to its initial empty state and cancel the
    /// ticker. Nothing survives a session boundary.
    pub fn reset(&mut self) {
        self.buffer = SampleBuffer::with_capacity(self.config.buffer_capacity);
        self.log.clear();
        self.controller =
            WindowController::live(self.config.window_size, self.config.live_edge_epsilon);
        self.chart.invalidate();
        self.ticker.cancel();
    }

    /// Arm the periodic reconciliation tick.
    pub fn start_ticker(&mut self, now: f64) {
        self.ticker.start(now);
    }

    /// Drive the session clock. Due ticks advance recorded playback and
    /// republish the live view; returns `None` when nothing was due.
    pub fn tick(&mut self, now: f64) -> Option<ViewUpdate> {
        let due = self.ticker.poll(now);
        if due == 0 {
            return None;
        }
        let dt = f64::from(due) * self.ticker.interval();
        self.controller.tick(dt);
        Some(self.view())
    }

    pub fn seek(&mut self, t: f64) -> ViewUpdate {
        self.controller.seek(t, &self.buffer);
        self.view()
    }

    pub fn play(&mut self, speed: f64) -> ViewUpdate {
        self.controller.play(speed);
        self.view()
    }

    pub fn pause(&mut self) -> ViewUpdate {
        self.controller.pause();
        self.view()
    }

    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.controller.set_speed(speed)
    }

    pub fn change_speed(&mut self) -> f64 {
        self.controller.change_speed()
    }

    pub fn on_drag_start(&mut self) {
        self.controller.on_drag_start();
    }

    pub fn on_drag_end(&mut self) -> ViewUpdate {
        self.controller.on_drag_end(&self.buffer);
        self.view()
    }

    /// Scan the current window for clinical episodes and log them.
    /// Re-detections dedupe against the log; returns how many events were
    /// newly added.
    pub fn scan_for_episodes(&mut self, detected_at: f64) -> usize {
        let window = self.controller.window();
        let slice = self.buffer.slice(window.start, window.end);
        let mut added = 0;
        for episode in detect_episodes(&slice, &self.episode_cfg) {
            if self.log.add(episode.into_event(detected_at)) {
                added += 1;
            }
        }
        added
    }

    /// The consistent view of the session as of the last transition.
    pub fn view(&self) -> ViewUpdate {
        let window = self.controller.window();
        let slice = self.buffer.slice(window.start, window.end);
        let stats = window_stats(&slice, &self.config.stats());
        ViewUpdate {
            window,
            slice,
            stats,
            events: self.log.list(),
            mode: self.controller.mode(),
        }
    }

    /// Chart series for the current view; `None` when the previous
    /// projection is still valid.
    pub fn project(&mut self) -> Option<ChartFrame> {
        let window = self.controller.window();
        let slice = self.buffer.slice(window.start, window.end);
        self.chart.project(window, &slice)
    }
}

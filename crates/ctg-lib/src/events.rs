use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Clinical significance of a detected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    High,
    Critical,
}

/// A detected clinical event or alert. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identity key derived from kind and approximate onset.
    pub id: String,
    pub kind: String,
    pub severity: Severity,
    /// Onset in session time.
    pub start_t: f64,
    /// End in session time, when the episode has closed.
    pub end_t: Option<f64>,
    /// Wall-clock detection time, seconds since the Unix epoch.
    pub detected_at: f64,
}

impl Event {
    pub fn new(
        kind: impl Into<String>,
        severity: Severity,
        start_t: f64,
        end_t: Option<f64>,
        detected_at: f64,
    ) -> Self {
        let kind = kind.into();
        let id = event_id(&kind, start_t);
        Self {
            id,
            kind,
            severity,
            start_t,
            end_t,
            detected_at,
        }
    }
}

/// Identity key: kind plus onset rounded to the nearest whole time unit.
/// Re-detections of the same episode land on the same key.
pub fn event_id(kind: &str, start_t: f64) -> String {
    format!("{kind}@{}", start_t.round() as i64)
}

/// Bounded, de-duplicated, newest-first store of clinical events.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<Event>,
    max_size: usize,
}

impl EventLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    /// Insert unless an event with the same identity is already stored.
    /// Returns whether the log changed. Oldest entries drop from the tail
    /// once the log is full.
    pub fn add(&mut self, event: Event) -> bool {
        if self.entries.iter().any(|e| e.id == event.id) {
            log::debug!("duplicate event ignored: {}", event.id);
            return false;
        }
        self.entries.push_front(event);
        while self.entries.len() > self.max_size {
            self.entries.pop_back();
        }
        true
    }

    /// Newest-first view for rendering.
    pub fn list(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reset on a session boundary.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

use serde::Serialize;

use crate::events::{Event, Severity};
use crate::signal::Sample;

/// Thresholds for episode detection over a sample window.
///
/// An episode is a contiguous excursion from the median baseline that
/// lasts at least its minimum duration.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeConfig {
    /// Excursion threshold from the baseline, bpm.
    pub delta_bpm: f64,
    /// Additional depth marking a deceleration as deep, bpm.
    pub deep_delta_bpm: f64,
    /// Minimum duration for accelerations and decelerations, seconds.
    pub min_duration_s: f64,
    /// Minimum duration for deep decelerations, seconds.
    pub deep_min_duration_s: f64,
    /// Duration beyond which a deceleration counts as prolonged, seconds.
    pub prolonged_duration_s: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            delta_bpm: 15.0,
            deep_delta_bpm: 30.0,
            min_duration_s: 15.0,
            deep_min_duration_s: 10.0,
            prolonged_duration_s: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeKind {
    Acceleration,
    Deceleration,
    DeepDeceleration,
    ProlongedDeceleration,
}

impl EpisodeKind {
    pub fn severity(&self) -> Severity {
        match self {
            EpisodeKind::Acceleration => Severity::Info,
            EpisodeKind::Deceleration => Severity::Warning,
            EpisodeKind::DeepDeceleration | EpisodeKind::ProlongedDeceleration => Severity::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EpisodeKind::Acceleration => "acceleration",
            EpisodeKind::Deceleration => "deceleration",
            EpisodeKind::DeepDeceleration => "deep_deceleration",
            EpisodeKind::ProlongedDeceleration => "prolonged_deceleration",
        }
    }
}

/// A contiguous excursion from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Episode {
    pub kind: EpisodeKind,
    pub start_t: f64,
    pub end_t: f64,
}

impl Episode {
    pub fn duration(&self) -> f64 {
        self.end_t - self.start_t
    }

    pub fn into_event(self, detected_at: f64) -> Event {
        Event::new(
            self.kind.label(),
            self.kind.severity(),
            self.start_t,
            Some(self.end_t),
            detected_at,
        )
    }
}

/// Median FHR over the slice, used as the detection baseline.
pub fn baseline_fhr(slice: &[Sample]) -> Option<f64> {
    if slice.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = slice.iter().map(|s| s.fhr).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Detect baseline excursions lasting at least their minimum duration.
///
/// Each contiguous run yields at most one episode, classified by its
/// strongest feature: prolonged, then deep, then plain deceleration.
pub fn detect_episodes(slice: &[Sample], cfg: &EpisodeConfig) -> Vec<Episode> {
    let Some(baseline) = baseline_fhr(slice) else {
        return Vec::new();
    };
    let high = baseline + cfg.delta_bpm;
    let low = baseline - cfg.delta_bpm;
    let deep = baseline - cfg.deep_delta_bpm;

    let mut episodes = Vec::new();
    let mut run: Option<Run> = None;
    for s in slice {
        let side = if s.fhr > high {
            Some(Side::Above)
        } else if s.fhr < low {
            Some(Side::Below)
        } else {
            None
        };
        match (&mut run, side) {
            (Some(r), Some(side)) if r.side == side => {
                r.end_t = s.t;
                r.min_fhr = r.min_fhr.min(s.fhr);
            }
            (current, side) => {
                if let Some(r) = current.take() {
                    if let Some(ep) = r.classify(cfg, deep) {
                        episodes.push(ep);
                    }
                }
                *current = side.map(|side| Run {
                    side,
                    start_t: s.t,
                    end_t: s.t,
                    min_fhr: s.fhr,
                });
            }
        }
    }
    if let Some(r) = run.take() {
        if let Some(ep) = r.classify(cfg, deep) {
            episodes.push(ep);
        }
    }
    episodes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    side: Side,
    start_t: f64,
    end_t: f64,
    min_fhr: f64,
}

impl Run {
    fn classify(self, cfg: &EpisodeConfig, deep_threshold: f64) -> Option<Episode> {
        let duration = self.end_t - self.start_t;
        let kind = match self.side {
            Side::Above => {
                if duration >= cfg.min_duration_s {
                    Some(EpisodeKind::Acceleration)
                } else {
                    None
                }
            }
            Side::Below => {
                if duration >= cfg.prolonged_duration_s {
                    Some(EpisodeKind::ProlongedDeceleration)
                } else if self.min_fhr < deep_threshold && duration >= cfg.deep_min_duration_s {
                    Some(EpisodeKind::DeepDeceleration)
                } else if duration >= cfg.min_duration_s {
                    Some(EpisodeKind::Deceleration)
                } else {
                    None
                }
            }
        }?;
        Some(Episode {
            kind,
            start_t: self.start_t,
            end_t: self.end_t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 Hz trace around a 140 bpm baseline with a dip of `depth` bpm
    // between `from` and `to` seconds.
    fn trace_with_dip(len: usize, from: usize, to: usize, depth: f64) -> Vec<Sample> {
        (0..len)
            .map(|i| {
                let fhr = if i >= from && i < to { 140.0 - depth } else { 140.0 };
                Sample::new(i as f64, fhr, 10.0)
            })
            .collect()
    }

    #[test]
    fn baseline_is_the_median() {
        let slice = trace_with_dip(100, 0, 0, 0.0);
        assert_eq!(baseline_fhr(&slice), Some(140.0));
        assert_eq!(baseline_fhr(&[]), None);
    }

    #[test]
    fn short_dip_is_not_an_episode() {
        // 10 s below threshold is under the 15 s minimum
        let slice = trace_with_dip(120, 50, 60, 20.0);
        assert!(detect_episodes(&slice, &EpisodeConfig::default()).is_empty());
    }

    #[test]
    fn sustained_dip_is_a_deceleration() {
        let slice = trace_with_dip(120, 40, 60, 20.0);
        let eps = detect_episodes(&slice, &EpisodeConfig::default());
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].kind, EpisodeKind::Deceleration);
        assert_eq!(eps[0].start_t, 40.0);
        assert!(eps[0].duration() >= 15.0);
    }

    #[test]
    fn deep_dip_is_classified_deep() {
        let slice = trace_with_dip(120, 50, 62, 35.0);
        let eps = detect_episodes(&slice, &EpisodeConfig::default());
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].kind, EpisodeKind::DeepDeceleration);
        assert_eq!(eps[0].kind.severity(), Severity::High);
    }

    #[test]
    fn long_dip_is_prolonged() {
        let slice = trace_with_dip(300, 50, 145, 20.0);
        let eps = detect_episodes(&slice, &EpisodeConfig::default());
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].kind, EpisodeKind::ProlongedDeceleration);
    }

    #[test]
    fn rise_above_baseline_is_an_acceleration() {
        let slice: Vec<Sample> = (0..120)
            .map(|i| {
                let fhr = if (40..60).contains(&i) { 160.0 } else { 140.0 };
                Sample::new(i as f64, fhr, 10.0)
            })
            .collect();
        let eps = detect_episodes(&slice, &EpisodeConfig::default());
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].kind, EpisodeKind::Acceleration);
        assert_eq!(eps[0].kind.severity(), Severity::Info);
    }

    #[test]
    fn episode_converts_to_event() {
        let ep = Episode {
            kind: EpisodeKind::DeepDeceleration,
            start_t: 50.0,
            end_t: 70.0,
        };
        let event = ep.into_event(1234.0);
        assert_eq!(event.kind, "deep_deceleration");
        assert_eq!(event.severity, Severity::High);
        assert_eq!(event.end_t, Some(70.0));
    }
}

use serde::{Deserialize, Serialize};

use crate::signal::Sample;

/// Configuration for the trailing-baseline excursion counters.
#[derive(Debug, Clone, Copy)]
pub struct StatsConfig {
    /// Trailing baseline length, in samples.
    pub baseline_window: usize,
    /// Excursion threshold relative to the trailing baseline, bpm.
    pub delta_threshold: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            baseline_window: 15,
            delta_threshold: 15.0,
        }
    }
}

/// Rolling aggregates over one view window. Recomputed whenever the
/// window or the buffer content changes, never cached across windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Mean FHR over the window; absent for an empty window.
    pub mean_fhr: Option<f64>,
    /// Range-based variability: max(fhr) - min(fhr) over the window.
    pub variability: f64,
    /// Samples rising more than the threshold above the trailing baseline.
    pub accelerations: usize,
    /// Samples falling more than the threshold below the trailing baseline.
    pub decelerations: usize,
}

impl WindowStats {
    pub fn empty() -> Self {
        Self {
            mean_fhr: None,
            variability: 0.0,
            accelerations: 0,
            decelerations: 0,
        }
    }
}

/// Compute window statistics for an ordered sample slice.
///
/// Excursion counts are per sample, not per episode: a sustained
/// excursion contributes one count for every sample it spans.
pub fn window_stats(slice: &[Sample], cfg: &StatsConfig) -> WindowStats {
    if slice.is_empty() {
        return WindowStats::empty();
    }

    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in slice {
        sum += s.fhr;
        min = min.min(s.fhr);
        max = max.max(s.fhr);
    }
    let mean_fhr = sum / slice.len() as f64;
    let variability = max - min;

    let b = cfg.baseline_window.max(1);
    let mut accelerations = 0;
    let mut decelerations = 0;
    if slice.len() > b {
        // running sum of the trailing b samples
        let mut acc: f64 = slice[..b].iter().map(|s| s.fhr).sum();
        for i in b..slice.len() {
            let avg_before = acc / b as f64;
            let delta = slice[i].fhr - avg_before;
            if delta > cfg.delta_threshold {
                accelerations += 1;
            } else if -delta > cfg.delta_threshold {
                decelerations += 1;
            }
            acc += slice[i].fhr - slice[i - b].fhr;
        }
    }

    WindowStats {
        mean_fhr: Some(mean_fhr),
        variability,
        accelerations,
        decelerations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(fhr: &[f64]) -> Vec<Sample> {
        fhr.iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(i as f64, v, 10.0))
            .collect()
    }

    #[test]
    fn empty_slice_has_no_mean() {
        let stats = window_stats(&[], &StatsConfig::default());
        assert_eq!(stats, WindowStats::empty());
    }

    #[test]
    fn variability_is_the_fhr_range() {
        let stats = window_stats(&trace(&[130.0, 140.0, 150.0]), &StatsConfig::default());
        assert_eq!(stats.variability, 20.0);
        assert_eq!(stats.mean_fhr, Some(140.0));
    }

    #[test]
    fn single_excursion_counts_one_acceleration() {
        let mut fhr = vec![140.0; 15];
        fhr.push(162.0);
        let stats = window_stats(&trace(&fhr), &StatsConfig::default());
        assert_eq!(stats.accelerations, 1);
        assert_eq!(stats.decelerations, 0);
    }

    #[test]
    fn deceleration_below_trailing_baseline() {
        let mut fhr = vec![140.0; 15];
        fhr.push(120.0);
        let stats = window_stats(&trace(&fhr), &StatsConfig::default());
        assert_eq!(stats.accelerations, 0);
        assert_eq!(stats.decelerations, 1);
    }

    #[test]
    fn sustained_excursion_counts_every_sample() {
        let mut fhr = vec![140.0; 15];
        fhr.extend([170.0, 170.0, 170.0]);
        let stats = window_stats(&trace(&fhr), &StatsConfig::default());
        // the baseline drags upward as excursion samples enter it, but all
        // three samples still clear the +15 threshold here
        assert_eq!(stats.accelerations, 3);
    }

    #[test]
    fn short_slice_skips_the_counters() {
        let stats = window_stats(&trace(&[140.0; 10]), &StatsConfig::default());
        assert_eq!(stats.accelerations, 0);
        assert_eq!(stats.decelerations, 0);
        assert_eq!(stats.mean_fhr, Some(140.0));
    }
}

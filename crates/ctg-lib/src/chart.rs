use serde::Serialize;

use crate::signal::Sample;
use crate::window::Window;

/// Renderable series for a pair of synchronized viewports.
///
/// Both charts share the same x bounds, so independently rendered FHR and
/// UA plots stay pixel-aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    pub x_min: f64,
    pub x_max: f64,
    pub fhr: Vec<[f64; 2]>,
    pub ua: Vec<[f64; 2]>,
}

/// Pure projection from a window plus sample slice to chart series.
///
/// The only retained state is a fingerprint of the last projection, used
/// to skip redundant redraws; it carries no correctness weight.
#[derive(Debug, Default)]
pub struct ChartSync {
    last: Option<FrameKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    x_min: f64,
    x_max: f64,
    points: usize,
    last_t: Option<f64>,
}

impl ChartSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project the window and slice into chart series, or `None` when the
    /// result would be identical to the previous projection.
    pub fn project(&mut self, window: Window, slice: &[Sample]) -> Option<ChartFrame> {
        let key = FrameKey {
            x_min: window.start,
            x_max: window.end,
            points: slice.len(),
            last_t: slice.last().map(|s| s.t),
        };
        if self.last == Some(key) {
            return None;
        }
        self.last = Some(key);
        Some(ChartFrame {
            x_min: window.start,
            x_max: window.end,
            fhr: slice.iter().map(|s| [s.t, s.fhr]).collect(),
            ua: slice.iter().map(|s| [s.t, s.ua]).collect(),
        })
    }

    /// Forget the previous projection, forcing the next frame out.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice() -> Vec<Sample> {
        (0..5)
            .map(|i| Sample::new(i as f64, 140.0 + i as f64, 10.0 + i as f64))
            .collect()
    }

    #[test]
    fn both_series_share_the_window_bounds() {
        let mut sync = ChartSync::new();
        let frame = sync
            .project(Window { start: 0.0, end: 30.0 }, &slice())
            .unwrap();
        assert_eq!(frame.x_min, 0.0);
        assert_eq!(frame.x_max, 30.0);
        assert_eq!(frame.fhr.len(), frame.ua.len());
        assert_eq!(frame.fhr[2], [2.0, 142.0]);
        assert_eq!(frame.ua[2], [2.0, 12.0]);
    }

    #[test]
    fn identical_projection_is_skipped() {
        let mut sync = ChartSync::new();
        let samples = slice();
        let window = Window { start: 0.0, end: 30.0 };
        assert!(sync.project(window, &samples).is_some());
        assert!(sync.project(window, &samples).is_none());

        sync.invalidate();
        assert!(sync.project(window, &samples).is_some());
    }

    #[test]
    fn moved_window_produces_a_new_frame() {
        let mut sync = ChartSync::new();
        let samples = slice();
        sync.project(Window { start: 0.0, end: 30.0 }, &samples);
        let frame = sync.project(Window { start: 1.0, end: 31.0 }, &samples);
        assert!(frame.is_some());
    }
}

use serde::{Deserialize, Serialize};

/// Physiological bounds for fetal heart rate, beats per minute.
pub const FHR_MIN: f64 = 50.0;
pub const FHR_MAX: f64 = 210.0;

/// Bounds for uterine activity, relative contraction units.
pub const UA_MIN: f64 = 0.0;
pub const UA_MAX: f64 = 100.0;

/// One cardiotocography sample: both channels at a single point in
/// session time. Immutable once accepted into a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Elapsed time from session start; non-decreasing within a buffer.
    pub t: f64,
    /// Fetal heart rate, bpm.
    pub fhr: f64,
    /// Uterine activity.
    pub ua: f64,
}

impl Sample {
    pub fn new(t: f64, fhr: f64, ua: f64) -> Self {
        Self { t, fhr, ua }
    }

    /// Clamp both channels into physiological range. Out-of-range values
    /// are recovered here, never rejected.
    pub fn clamped(self) -> Self {
        let fhr = self.fhr.clamp(FHR_MIN, FHR_MAX);
        let ua = self.ua.clamp(UA_MIN, UA_MAX);
        if fhr != self.fhr || ua != self.ua {
            log::warn!(
                "sample at t={} clamped: fhr {} -> {fhr}, ua {} -> {ua}",
                self.t,
                self.fhr,
                self.ua
            );
        }
        Self {
            t: self.t,
            fhr,
            ua,
        }
    }

    pub fn in_range(&self) -> bool {
        (FHR_MIN..=FHR_MAX).contains(&self.fhr) && (UA_MIN..=UA_MAX).contains(&self.ua)
    }
}

/// Deterministic replacement for an interval timer.
///
/// The session owns one handle. `poll` reports how many ticks became due
/// since the last call; `cancel` stops the schedule immediately, so a
/// destroyed session can never receive a stale tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    interval: f64,
    next_due: Option<f64>,
}

impl Ticker {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(1e-3),
            next_due: None,
        }
    }

    /// Arm the schedule relative to `now`.
    pub fn start(&mut self, now: f64) {
        self.next_due = Some(now + self.interval);
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Number of whole intervals elapsed by `now`; advances the schedule
    /// past `now`. A cancelled ticker always reports zero.
    pub fn poll(&mut self, now: f64) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due {
            return 0;
        }
        let missed = ((now - due) / self.interval).floor() as u32 + 1;
        self.next_due = Some(due + f64::from(missed) * self.interval);
        missed
    }

    /// Stop the schedule. Idempotent.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_ticker_never_fires() {
        let mut ticker = Ticker::new(0.5);
        assert_eq!(ticker.poll(100.0), 0);
        assert!(!ticker.is_active());
    }

    #[test]
    fn fires_once_per_interval() {
        let mut ticker = Ticker::new(0.5);
        ticker.start(0.0);
        assert_eq!(ticker.poll(0.4), 0);
        assert_eq!(ticker.poll(0.5), 1);
        assert_eq!(ticker.poll(0.9), 0);
        assert_eq!(ticker.poll(1.0), 1);
    }

    #[test]
    fn reports_missed_ticks_in_bulk() {
        let mut ticker = Ticker::new(0.5);
        ticker.start(0.0);
        assert_eq!(ticker.poll(2.6), 5);
        assert_eq!(ticker.poll(3.0), 1);
    }

    #[test]
    fn cancel_stops_the_schedule() {
        let mut ticker = Ticker::new(0.5);
        ticker.start(0.0);
        ticker.cancel();
        assert_eq!(ticker.poll(10.0), 0);
        ticker.cancel();
        assert!(!ticker.is_active());
    }
}

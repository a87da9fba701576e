//! Recurring timer driven by frame polling
//!
//! egui has no timer callbacks. Each overlay owns one of these and polls it
//! every frame; `poll` reports how many whole periods have passed since the
//! last fire, so a slow or sleeping frame loop catches up instead of
//! drifting.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RecurringTimer {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl RecurringTimer {
    /// Start a timer whose first fire is one `period` after `now`.
    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            next_due: now + period,
            cancelled: false,
        }
    }

    /// Number of periods that elapsed up to `now`. Zero once cancelled.
    pub fn poll(&mut self, now: Instant) -> u32 {
        if self.cancelled || now < self.next_due {
            return 0;
        }
        let overdue = now.duration_since(self.next_due);
        let extra = u32::try_from(overdue.as_nanos() / self.period.as_nanos()).unwrap_or(u32::MAX - 1);
        let fired = extra + 1;
        self.next_due += self.period * fired;
        fired
    }

    /// Time left until the next fire, or `None` once cancelled.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.cancelled {
            None
        } else {
            Some(self.next_due.saturating_duration_since(now))
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = RecurringTimer::start(SEC, t0);
        assert_eq!(timer.poll(t0), 0);
        assert_eq!(timer.poll(t0 + Duration::from_millis(999)), 0);
        assert_eq!(timer.poll(t0 + SEC), 1);
        assert_eq!(timer.poll(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(timer.poll(t0 + 2 * SEC), 1);
    }

    #[test]
    fn catches_up_missed_periods() {
        let t0 = Instant::now();
        let mut timer = RecurringTimer::start(SEC, t0);
        assert_eq!(timer.poll(t0 + Duration::from_millis(3500)), 3);
        assert_eq!(timer.time_until_due(t0 + Duration::from_millis(3500)), Some(Duration::from_millis(500)));
        assert_eq!(timer.poll(t0 + 4 * SEC), 1);
    }

    #[test]
    fn cancel_stops_firing() {
        let t0 = Instant::now();
        let mut timer = RecurringTimer::start(SEC, t0);
        timer.cancel();
        assert!(timer.is_cancelled());
        assert_eq!(timer.poll(t0 + 10 * SEC), 0);
        assert_eq!(timer.time_until_due(t0), None);
    }
}

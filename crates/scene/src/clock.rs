use std::time::{Duration, Instant};

/// Start and previous-frame timestamps.
///
/// Callers pass `now` explicitly so the clock can be driven by synthetic
/// time in tests and headless simulation.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
    prev: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            start: now,
            prev: now,
        }
    }

    /// Time since the clock started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    /// Seconds since the previous call (or since start), then record `now`
    /// as the previous timestamp. A `now` earlier than the previous
    /// timestamp yields zero.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.prev);
        self.prev = now;
        dt.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_measures_since_previous_call() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0);
        assert!((clock.tick(t0 + Duration::from_millis(250)) - 0.25).abs() < 1e-6);
        assert!((clock.tick(t0 + Duration::from_millis(300)) - 0.05).abs() < 1e-6);
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(2)), Duration::from_secs(2));
    }

    #[test]
    fn backwards_time_saturates() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0 + Duration::from_secs(1));
        assert_eq!(clock.tick(t0), 0.0);
        assert_eq!(clock.elapsed(t0), Duration::ZERO);
    }
}

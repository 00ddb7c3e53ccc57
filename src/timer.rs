use std::time::{Duration, Instant};

pub const TIMER_DEC_PER_SECOND: u32 = 60;

/// 8-bit countdown that saturates at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn new(init_count: u8) -> Self {
        Self { count: init_count }
    }

    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    /// Returns whether the timer was running before this tick.
    pub fn tick(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Converts wall-clock time into a count of fixed-rate ticks.
///
/// Time that has elapsed but not yet filled a whole interval carries over to
/// the next call, so the long-run rate stays exact.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last_updated: Instant,
}

impl FrameClock {
    pub fn new(hz: u32, now: Instant) -> Self {
        Self {
            // past 1 GHz the division rounds down to zero
            interval: (Duration::from_secs(1) / hz.max(1)).max(Duration::from_nanos(1)),
            last_updated: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of whole intervals that passed since the last call.
    pub fn sync(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last_updated);
        let due =
            u32::try_from(elapsed.as_nanos() / self.interval.as_nanos()).unwrap_or(u32::MAX);
        self.last_updated += self.interval * due;
        due
    }

    /// How long until the next interval is due.
    pub fn until_next(&self, now: Instant) -> Duration {
        (self.last_updated + self.interval).saturating_duration_since(now)
    }
}

use std::time::{Duration, Instant};

/// Format a retention time with two decimals
#[inline]
pub fn format_rt(rt: f64) -> String {
    format!("{rt:.2}")
}

/// Format an m/z with four decimals
#[inline]
pub fn format_mz(mz: f64) -> String {
    format!("{mz:.4}")
}

/// A monotonic-clock gate that lets at most one event through per interval.
///
/// Events arriving too soon are rejected, not queued.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl FrameLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// A limiter admitting `rate` events per second. A rate of 0 disables limiting.
    pub fn per_second(rate: u32) -> Self {
        if rate == 0 {
            Self::new(Duration::ZERO)
        } else {
            Self::new(Duration::from_secs(1) / rate)
        }
    }

    /// Whether an event at `now` may pass. Accepting the event starts a new interval.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }

    /// Forget the last accepted event so the next one always passes
    pub fn clear(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::per_second(60)
    }
}

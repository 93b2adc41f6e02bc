use std::time::Instant;

/// Default quiz length: 50 minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 3000;
/// Botany and Zoology papers are shorter: 40 minutes.
pub const SHORT_PAPER_TIME_LIMIT_SECS: u32 = 2400;

/// Whole-second countdown. Never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(limit_secs: u32) -> Self {
        Self {
            limit: limit_secs,
            remaining: limit_secs,
        }
    }

    /// Removes one second. Returns true on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.limit - self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Turns wall-clock time into one-second ticks.
///
/// Owned by the session only while its clock is running; dropping it is
/// the cancellation.
#[derive(Debug, Clone)]
pub struct Metronome {
    started_at: Instant,
    fired: u64,
}

impl Metronome {
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            fired: 0,
        }
    }

    /// Ticks that came due since the last call.
    pub fn due(&mut self, now: Instant) -> u64 {
        let whole_secs = now.saturating_duration_since(self.started_at).as_secs();
        let due = whole_secs.saturating_sub(self.fired);
        self.fired += due;
        due
    }
}

/// `mm:ss` rendering used by the quiz header and results.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn countdown_reaches_zero_on_last_tick() {
        let mut countdown = Countdown::new(3);
        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert!(countdown.is_exhausted());
        assert_eq!(countdown.elapsed(), 3);
    }

    #[test]
    fn countdown_saturates() {
        let mut countdown = Countdown::new(1);
        assert!(countdown.tick());
        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn zero_limit_never_fires() {
        let mut countdown = Countdown::new(0);
        assert!(countdown.is_exhausted());
        assert!(!countdown.tick());
    }

    #[test]
    fn metronome_counts_whole_seconds() {
        let t0 = Instant::now();
        let mut m = Metronome::start(t0);

        assert_eq!(m.due(t0 + Duration::from_millis(999)), 0);
        assert_eq!(m.due(t0 + Duration::from_millis(1000)), 1);
        assert_eq!(m.due(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(m.due(t0 + Duration::from_millis(4200)), 3);
        assert_eq!(m.due(t0 + Duration::from_millis(4300)), 0);
    }

    #[test]
    fn format_clock_pads_seconds() {
        assert_eq!(format_clock(3000), "50:00");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(9), "0:09");
    }
}

//! Clocks and the one-shot frame timer driving playback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source shared by a host and its players.
///
/// Times are offsets from an arbitrary origin fixed when the clock was
/// created. All players bound to one host should share one clock.
pub trait Clock: Send + Sync {
    /// Current time as an offset from the clock's origin.
    fn now(&self) -> Duration;

    /// Block the calling thread until `deadline` has been reached.
    fn sleep_until(&self, deadline: Duration);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Virtual clock that only moves when told to.
///
/// `sleep_until` jumps straight to the deadline, so a host loop driven by
/// this clock runs instantly and deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, time: Duration) {
        self.nanos
            .fetch_max(time.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep_until(&self, deadline: Duration) {
        self.set(deadline);
    }
}

/// Single-slot one-shot timer.
///
/// At most one deadline is armed at a time; arming again replaces it.
/// Once it fires it stays disarmed until re-armed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameTimer {
    deadline: Option<Duration>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Disarm and return true if the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_millis(150));
        assert_eq!(clock.now(), Duration::from_millis(150));

        clock.sleep_until(Duration::from_millis(400));
        assert_eq!(clock.now(), Duration::from_millis(400));

        // Never runs backwards
        clock.set(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(400));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        clock.sleep_until(a + Duration::from_millis(2));
        assert!(clock.now() >= a + Duration::from_millis(2));
    }

    #[test]
    fn test_timer_fires_once() {
        let mut timer = FrameTimer::new();
        assert!(!timer.fire_if_due(Duration::from_secs(10)));

        timer.arm(Duration::ZERO, Duration::from_millis(100));
        assert!(timer.is_armed());
        assert!(!timer.fire_if_due(Duration::from_millis(99)));
        assert!(timer.fire_if_due(Duration::from_millis(100)));
        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(Duration::from_millis(500)));
    }

    #[test]
    fn test_timer_cancel() {
        let mut timer = FrameTimer::new();
        timer.arm(Duration::ZERO, Duration::from_millis(10));
        timer.cancel();
        assert_eq!(timer.deadline(), None);
        assert!(!timer.fire_if_due(Duration::from_secs(1)));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timer = FrameTimer::new();
        timer.arm(Duration::ZERO, Duration::from_millis(10));
        timer.arm(Duration::from_millis(5), Duration::from_millis(100));
        assert_eq!(timer.deadline(), Some(Duration::from_millis(105)));
        assert!(!timer.fire_if_due(Duration::from_millis(10)));
    }
}

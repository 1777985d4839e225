use std::time::{Duration, Instant};

/// Debounce state: idle until a trigger, then pending until the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pending { deadline: Instant },
}

/// Explicit timer-reset state machine for coalescing event bursts.
///
/// Every trigger restarts the quiet window (debounce, not throttle), so a
/// rapid burst of events collapses into a single fire once the window
/// elapses. The machine is pure over supplied instants, so coalescing
/// behavior is testable without real timers; the watch coordinator drives it
/// from an async loop.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: State,
}

impl Debouncer {
    /// Creates an idle debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: State::Idle,
        }
    }

    /// Records an event at `now`, restarting the quiet window.
    pub fn trigger(&mut self, now: Instant) {
        self.state = State::Pending {
            deadline: now + self.delay,
        };
    }

    /// Whether an action is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// The instant the pending action becomes due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            State::Idle => None,
            State::Pending { deadline } => Some(deadline),
        }
    }

    /// Attempts to fire at `now`. Returns true (and resets to idle) only if
    /// an action is pending and its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            State::Pending { deadline } if now >= deadline => {
                self.state = State::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn starts_idle() {
        let mut debouncer = Debouncer::new(DELAY);
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(Instant::now()));
    }

    #[test]
    fn trigger_sets_deadline_one_delay_out() {
        let mut debouncer = Debouncer::new(DELAY);
        let now = Instant::now();

        debouncer.trigger(now);

        assert_eq!(debouncer.deadline(), Some(now + DELAY));
    }

    #[test]
    fn burst_of_events_coalesces_into_one_fire() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();

        for i in 0..10 {
            debouncer.trigger(start + Duration::from_millis(i * 10));
        }

        let last_trigger = start + Duration::from_millis(90);
        assert!(!debouncer.fire(last_trigger + Duration::from_millis(50)));
        assert!(debouncer.fire(last_trigger + DELAY));
        assert!(!debouncer.is_pending());

        // Nothing further to fire until the next trigger.
        assert!(!debouncer.fire(last_trigger + Duration::from_secs(10)));
    }

    #[test]
    fn each_trigger_resets_the_window() {
        let mut debouncer = Debouncer::new(DELAY);
        let start = Instant::now();

        debouncer.trigger(start);
        let first_deadline = start + DELAY;

        debouncer.trigger(start + Duration::from_millis(50));

        assert!(!debouncer.fire(first_deadline));
        assert!(debouncer.fire(start + Duration::from_millis(150)));
    }
}

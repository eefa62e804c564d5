//! Cancellation token and time-budget control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Nodes between clock checks. Polling every node would cost more than the
/// clock reads save; a stale stop of a few thousand nodes is acceptable.
pub(crate) const POLL_INTERVAL: u64 = 2048;

/// Cooperative cancellation handle for a search.
///
/// Cheap to clone; every clone observes the same flag. The protocol layer
/// keeps one clone to stop an in-flight search, and self-play harnesses may
/// share one token across several engine instances.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    flag: Arc<AtomicBool>,
}

impl StopToken {
    /// A fresh, unset token.
    pub fn new() -> StopToken {
        StopToken::default()
    }

    /// Request cancellation. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// `true` once [`StopToken::stop`] has been called on any clone.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-search time control: the external token plus an optional deadline.
pub(crate) struct SearchControl {
    token: StopToken,
    start: Instant,
    budget: Option<Duration>,
}

impl SearchControl {
    /// A control with a time budget; the clock starts now.
    pub fn timed(token: StopToken, budget: Duration) -> SearchControl {
        SearchControl {
            token,
            start: Instant::now(),
            budget: Some(budget),
        }
    }

    /// A control that only ever stops via the token.
    pub fn infinite(token: StopToken) -> SearchControl {
        SearchControl {
            token,
            start: Instant::now(),
            budget: None,
        }
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Check for cancellation. The clock is only consulted every
    /// [`POLL_INTERVAL`] nodes; the token is checked every call.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.token.is_stopped() {
            return true;
        }
        if nodes % POLL_INTERVAL != 0 {
            return false;
        }
        match self.budget {
            Some(budget) => self.elapsed() >= budget,
            None => false,
        }
    }

    /// `true` when starting another full iteration is hopeless: less than a
    /// quarter of the budget remains, so the deeper result would only be
    /// thrown away.
    pub fn hopeless_to_deepen(&self) -> bool {
        if self.token.is_stopped() {
            return true;
        }
        let Some(budget) = self.budget else {
            return false;
        };
        let remaining = budget.saturating_sub(self.elapsed());
        remaining * 4 <= budget
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{SearchControl, StopToken, POLL_INTERVAL};

    #[test]
    fn token_clones_share_the_flag() {
        let token = StopToken::new();
        let clone = token.clone();
        assert!(!clone.is_stopped());
        token.stop();
        assert!(clone.is_stopped());
    }

    #[test]
    fn infinite_control_never_times_out() {
        let control = SearchControl::infinite(StopToken::new());
        assert!(!control.should_stop(POLL_INTERVAL * 100));
        assert!(!control.hopeless_to_deepen());
    }

    #[test]
    fn token_stop_overrides_everything() {
        let token = StopToken::new();
        let control = SearchControl::infinite(token.clone());
        token.stop();
        assert!(control.should_stop(1)); // token is checked off-interval too
        assert!(control.hopeless_to_deepen());
    }

    #[test]
    fn expired_budget_stops_on_poll_boundary() {
        let control = SearchControl::timed(StopToken::new(), Duration::ZERO);
        assert!(!control.should_stop(POLL_INTERVAL + 1), "off-interval skips the clock");
        assert!(control.should_stop(POLL_INTERVAL));
    }

    #[test]
    fn fresh_budget_wants_to_deepen() {
        let control = SearchControl::timed(StopToken::new(), Duration::from_secs(60));
        assert!(!control.hopeless_to_deepen());
    }

    #[test]
    fn spent_budget_refuses_to_deepen() {
        let control = SearchControl::timed(StopToken::new(), Duration::ZERO);
        assert!(control.hopeless_to_deepen());
    }
}

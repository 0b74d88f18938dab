//! Admission control: in-flight bound plus per-client sliding-window rate limit

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::clock::{Clock, SystemClock};

/// Gate limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Calls allowed in flight at once
    pub max_concurrent: usize,
    /// Calls one client may start per `window`
    pub max_per_window: usize,
    /// Length of the sliding rate window
    pub window: Duration,
    /// Run a full idle-client sweep every this many checks (0 = never)
    pub sweep_interval: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 40,
            max_per_window: 30,
            window: Duration::from_secs(60),
            sweep_interval: 1024,
        }
    }
}

/// Outcome of [`ConcurrencyGate::try_admit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    RateLimited,
    Overloaded,
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("Server is busy. Please try again later.")]
    Overloaded,
}

#[derive(Debug, Default)]
struct GateState {
    active: usize,
    windows: HashMap<String, VecDeque<Instant>>,
    checks_since_sweep: u64,
}

/// Drop timestamps that fell out of the window
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = timestamps.front() {
        if now.saturating_duration_since(oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

/// Concurrency and rate gate shared by all request handlers.
///
/// The active-call counter and every client's rate window sit behind one
/// mutex, so check-then-increment and prune-then-append are atomic.
#[derive(Debug)]
pub struct ConcurrencyGate {
    config: GateConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<GateState>,
}

impl ConcurrencyGate {
    pub fn new(config: GateConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(GateState::default()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    // Counters and timestamps stay consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rate check first, then concurrency check.
    ///
    /// A rate-limited attempt is not recorded and never takes a slot.
    /// Every `Admitted` must be paired with exactly one [`release`](Self::release);
    /// prefer [`acquire`](Self::acquire), which does that on drop.
    pub fn try_admit(&self, client_id: &str) -> Admission {
        let now = self.clock.now();
        let window = self.config.window;
        let mut state = self.lock();

        state.checks_since_sweep += 1;
        if self.config.sweep_interval > 0 && state.checks_since_sweep >= self.config.sweep_interval {
            state.checks_since_sweep = 0;
            let evicted = Self::sweep(&mut state, now, window);
            if evicted > 0 {
                log::debug!("evicted {} idle client(s)", evicted);
            }
        }

        let timestamps = state.windows.entry(client_id.to_string()).or_default();
        prune(timestamps, now, window);

        if timestamps.len() >= self.config.max_per_window {
            log::debug!("rate limited: {}", client_id);
            return Admission::RateLimited;
        }
        timestamps.push_back(now);

        if state.active >= self.config.max_concurrent {
            log::warn!(
                "overloaded: {} calls in flight, rejecting {}",
                state.active,
                client_id
            );
            return Admission::Overloaded;
        }

        state.active += 1;
        Admission::Admitted
    }

    /// Give back a slot taken by an `Admitted` result
    pub fn release(&self) {
        let mut state = self.lock();
        if state.active == 0 {
            log::warn!("release() called with no call in flight");
            return;
        }
        state.active -= 1;
    }

    /// Admit and wrap the slot in a permit that releases on drop
    pub fn acquire(self: &Arc<Self>, client_id: &str) -> Result<GatePermit, Rejection> {
        match self.try_admit(client_id) {
            Admission::Admitted => Ok(GatePermit {
                gate: Arc::clone(self),
            }),
            Admission::RateLimited => Err(Rejection::RateLimited),
            Admission::Overloaded => Err(Rejection::Overloaded),
        }
    }

    /// Calls currently in flight
    pub fn active_calls(&self) -> usize {
        self.lock().active
    }

    /// Clients with a rate window in memory
    pub fn tracked_clients(&self) -> usize {
        self.lock().windows.len()
    }

    /// Prune every window and forget clients with nothing left in it
    pub fn evict_idle_clients(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        Self::sweep(&mut state, now, self.config.window)
    }

    fn sweep(state: &mut GateState, now: Instant, window: Duration) -> usize {
        let before = state.windows.len();
        state.windows.retain(|_, timestamps| {
            prune(timestamps, now, window);
            !timestamps.is_empty()
        });
        before - state.windows.len()
    }
}

/// One admitted call. Dropping it frees the slot.
#[must_use = "dropping the permit releases the slot immediately"]
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<ConcurrencyGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ManualClock;

    fn test_gate(max_concurrent: usize, max_per_window: usize) -> (Arc<ConcurrencyGate>, ManualClock) {
        let clock = ManualClock::new();
        let config = GateConfig {
            max_concurrent,
            max_per_window,
            ..GateConfig::default()
        };
        let gate = ConcurrencyGate::with_clock(config, Arc::new(clock.clone()));
        (Arc::new(gate), clock)
    }

    #[test]
    fn test_default_config() {
        let config = GateConfig::default();
        assert_eq!(config.max_concurrent, 40);
        assert_eq!(config.max_per_window, 30);
        assert_eq!(config.window, Duration::from_secs(60));
    }

    #[test]
    fn test_overloaded_until_release() {
        let (gate, _) = test_gate(2, 100);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        assert_eq!(gate.try_admit("b"), Admission::Admitted);
        assert_eq!(gate.try_admit("c"), Admission::Overloaded);
        assert_eq!(gate.active_calls(), 2);

        gate.release();
        assert_eq!(gate.try_admit("c"), Admission::Admitted);
    }

    #[test]
    fn test_rate_limit_window() {
        let (gate, clock) = test_gate(100, 3);
        let results: Vec<_> = (0..4).map(|_| gate.try_admit("10.0.0.1")).collect();
        assert_eq!(
            results,
            vec![
                Admission::Admitted,
                Admission::Admitted,
                Admission::Admitted,
                Admission::RateLimited
            ]
        );

        clock.advance(Duration::from_secs(61));
        assert_eq!(gate.try_admit("10.0.0.1"), Admission::Admitted);
    }

    #[test]
    fn test_window_slides() {
        let (gate, clock) = test_gate(100, 2);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        clock.advance(Duration::from_secs(30));
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        clock.advance(Duration::from_secs(29));
        assert_eq!(gate.try_admit("a"), Admission::RateLimited);
        // first call is now exactly 60s old and falls out
        clock.advance(Duration::from_secs(1));
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
    }

    #[test]
    fn test_clients_limited_independently() {
        let (gate, _) = test_gate(100, 1);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        assert_eq!(gate.try_admit("a"), Admission::RateLimited);
        assert_eq!(gate.try_admit("b"), Admission::Admitted);
    }

    #[test]
    fn test_rate_limited_takes_no_slot() {
        let (gate, _) = test_gate(1, 1);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        assert_eq!(gate.try_admit("a"), Admission::RateLimited);
        assert_eq!(gate.active_calls(), 1);
    }

    #[test]
    fn test_release_never_underflows() {
        let (gate, _) = test_gate(1, 10);
        gate.release();
        assert_eq!(gate.active_calls(), 0);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        assert_eq!(gate.try_admit("b"), Admission::Overloaded);
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let (gate, _) = test_gate(1, 10);
        let permit = gate.acquire("a").unwrap();
        assert_eq!(gate.acquire("b").unwrap_err(), Rejection::Overloaded);
        drop(permit);
        assert_eq!(gate.active_calls(), 0);
        assert!(gate.acquire("b").is_ok());
    }

    #[test]
    fn test_permit_released_on_panic() {
        let (gate, _) = test_gate(1, 10);
        let inner = Arc::clone(&gate);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _permit = inner.acquire("a").unwrap();
            panic!("guarded work failed");
        }));
        assert!(result.is_err());
        assert_eq!(gate.active_calls(), 0);
    }

    #[test]
    fn test_evict_idle_clients() {
        let (gate, clock) = test_gate(100, 10);
        gate.try_admit("a");
        gate.try_admit("b");
        gate.release();
        gate.release();
        assert_eq!(gate.tracked_clients(), 2);

        clock.advance(Duration::from_secs(30));
        gate.try_admit("b");
        gate.release();

        clock.advance(Duration::from_secs(31));
        assert_eq!(gate.evict_idle_clients(), 1);
        assert_eq!(gate.tracked_clients(), 1);
    }

    #[test]
    fn test_expired_client_kept_until_sweep() {
        let (gate, clock) = test_gate(100, 1);
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        gate.release();
        assert_eq!(gate.try_admit("a"), Admission::RateLimited);

        // an expired window is refilled by the next check, not removed
        clock.advance(Duration::from_secs(61));
        assert_eq!(gate.try_admit("a"), Admission::Admitted);
        gate.release();
        assert_eq!(gate.tracked_clients(), 1);

        clock.advance(Duration::from_secs(61));
        assert_eq!(gate.tracked_clients(), 1);
        assert_eq!(gate.evict_idle_clients(), 1);
        assert_eq!(gate.tracked_clients(), 0);
    }

    #[test]
    fn test_periodic_sweep() {
        let clock = ManualClock::new();
        let config = GateConfig {
            sweep_interval: 3,
            ..GateConfig::default()
        };
        let gate = ConcurrencyGate::with_clock(config, Arc::new(clock.clone()));

        gate.try_admit("a");
        gate.try_admit("b");
        clock.advance(Duration::from_secs(61));
        // third check triggers the sweep before "c" is recorded
        gate.try_admit("c");
        assert_eq!(gate.tracked_clients(), 1);
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            Rejection::RateLimited.to_string(),
            "Too many requests. Please try again later."
        );
        assert_eq!(
            Rejection::Overloaded.to_string(),
            "Server is busy. Please try again later."
        );
    }
}

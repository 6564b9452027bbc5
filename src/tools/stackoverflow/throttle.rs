use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Longest server-requested backoff honored; larger values are clamped.
pub const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Default)]
struct ThrottleState {
    last_call: Option<Instant>,
    backoff_until: Option<Instant>,
}

/// Minimum-delay gate between successive remote calls.
///
/// Holds the lock across the sleep, so callers sharing one client are
/// serialized rather than racing on the timestamp.
#[derive(Debug)]
pub struct Throttle {
    min_delay: Duration,
    state: Mutex<ThrottleState>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            state: Mutex::new(ThrottleState::default()),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until the next call is allowed, then stamp it as the last call.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        // An unrepresentable deadline (absurd min_delay) means no wait.
        let mut ready_at = state.last_call.and_then(|t| t.checked_add(self.min_delay));
        if let Some(until) = state.backoff_until {
            ready_at = Some(ready_at.map_or(until, |r| r.max(until)));
        }

        if let Some(ready_at) = ready_at {
            let now = Instant::now();
            if ready_at > now {
                let wait = ready_at - now;
                debug!("throttle: sleeping {}ms before remote call", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }

        state.last_call = Some(Instant::now());
        state.backoff_until = None;
    }

    /// Record a server-requested backoff (seconds) measured from now, clamped to [`MAX_BACKOFF`].
    pub async fn backoff(&self, seconds: u64) {
        let requested = Duration::from_secs(seconds);
        if requested > MAX_BACKOFF {
            warn!(
                "backoff of {}s exceeds cap, waiting {}s",
                seconds,
                MAX_BACKOFF.as_secs()
            );
        }
        let Some(until) = Instant::now().checked_add(requested.min(MAX_BACKOFF)) else {
            return;
        };
        let mut state = self.state.lock().await;
        state.backoff_until = Some(state.backoff_until.map_or(until, |u| u.max(until)));
    }
}

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;

/// Time source for the throttle
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock: `sleep` returns immediately and advances `now`.
/// Every requested sleep is recorded.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or_default();
        self.origin + elapsed
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        self.advance(duration);
    }
}

/// At most `max_sends` sends in any window of length `per`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    max_sends: u32,
    per: Duration,
}

impl ThrottlePolicy {
    pub fn new(max_sends: u32, per: Duration) -> Self {
        ThrottlePolicy {
            max_sends: max_sends.max(1),
            per,
        }
    }

    pub fn max_sends(&self) -> u32 {
        self.max_sends
    }

    pub fn per(&self) -> Duration {
        self.per
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::new(1, Duration::from_secs(1))
    }
}

/// Sliding-window limiter. One instance per batch.
pub struct Throttle {
    policy: ThrottlePolicy,
    clock: Arc<dyn Clock>,
    sent: VecDeque<Instant>,
}

impl Throttle {
    pub fn new(policy: ThrottlePolicy, clock: Arc<dyn Clock>) -> Self {
        debug!(
            "Throttle: {} send(s) per {} ms",
            policy.max_sends(),
            policy.per().as_millis()
        );
        Throttle {
            policy,
            clock,
            sent: VecDeque::new(),
        }
    }

    /// Wait until another send fits in the window, then claim the slot.
    /// Returns how long the caller was held back.
    pub async fn acquire(&mut self) -> Duration {
        let mut waited = Duration::ZERO;

        loop {
            let now = self.clock.now();
            while let Some(&oldest) = self.sent.front() {
                if now.duration_since(oldest) >= self.policy.per {
                    self.sent.pop_front();
                } else {
                    break;
                }
            }

            if self.sent.len() < self.policy.max_sends.max(1) as usize {
                self.sent.push_back(now);
                return waited;
            }

            if let Some(&oldest) = self.sent.front() {
                let wait = self.policy.per.saturating_sub(now.duration_since(oldest));
                debug!("Throttling next send for {} ms", wait.as_millis());
                self.clock.sleep(wait).await;
                waited += wait;
            }
        }
    }
}

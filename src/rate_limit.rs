use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Stale entries are swept once the map grows past this size.
const SWEEP_THRESHOLD: usize = 10_000;

/// Per-email attempt counter over a fixed window.
pub struct AttemptLimiter {
    /// email -> (count, window_start)
    entries: DashMap<String, (u32, Instant)>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_attempts,
            window,
        }
    }

    /// 5 failed logins per 15 minutes.
    pub fn for_login() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// 3 reset emails per 15 minutes.
    pub fn for_password_reset() -> Self {
        Self::new(3, Duration::from_secs(15 * 60))
    }

    /// Check if another attempt is allowed. Returns Err with retry-after
    /// seconds. Does NOT count the attempt; call `record()` for that.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };
        let (count, start) = entry.value();

        if now.duration_since(*start) > self.window {
            return Ok(());
        }

        if *count >= self.max_attempts {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(self.window.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record(&self, email: &str) {
        if self.entries.len() > SWEEP_THRESHOLD {
            self.cleanup(self.window);
        }
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > self.window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a fixed pause after each download attempt.
///
/// Call [`RateLimiter::mark_done`] when an attempt finishes, successful or
/// not; the next [`RateLimiter::wait`] sleeps until `interval` has passed
/// since then. Before the first attempt, and with a zero interval, `wait`
/// returns immediately.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_done: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_done: None,
        }
    }

    /// A limiter that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        if let Some(done) = self.last_done {
            let ready_at = done + self.interval;
            let now = Instant::now();
            if now < ready_at {
                tracing::trace!(delay_ms = (ready_at - now).as_millis() as u64, "Rate limiting");
                tokio::time::sleep_until(ready_at).await;
            }
        }
    }

    /// Record that an attempt just finished.
    pub fn mark_done(&mut self) {
        self.last_done = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_wait_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_millis(500));
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_counts_from_end_of_attempt() {
        let mut limiter = RateLimiter::new(Duration::from_millis(500));

        limiter.wait().await;
        // A slow attempt longer than the interval
        tokio::time::sleep(Duration::from_secs(2)).await;
        limiter.mark_done();

        let done = Instant::now();
        limiter.wait().await;
        assert_eq!(done.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_extra_wait_when_pause_already_passed() {
        let mut limiter = RateLimiter::new(Duration::from_millis(500));
        limiter.mark_done();

        tokio::time::sleep(Duration::from_millis(800)).await;
        let before = Instant::now();
        limiter.wait().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_waits() {
        let mut limiter = RateLimiter::disabled();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait().await;
            limiter.mark_done();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

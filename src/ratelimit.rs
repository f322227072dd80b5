use std::{
    future::Future,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use tokio::time::{Instant, sleep_until};

/// Keeps a fixed pause between the end of one request and the start of the
/// next.
///
/// The pause is measured from completion, so a slow request still gets the
/// full delay after it.
pub struct RateLimiter {
    period: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        RateLimiter {
            period,
            last_finished: Mutex::new(None),
        }
    }

    async fn wait_until_ready(&self) {
        let last_finished = *self
            .last_finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(last_finished) = last_finished {
            sleep_until(last_finished + self.period).await;
        }
    }

    fn mark_finished(&self) {
        *self
            .last_finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Waits for the pause, runs `request` and starts the next pause once it
    /// completes, whether it succeeded or not.
    pub async fn throttle<F: Future>(&self, request: F) -> F::Output {
        self.wait_until_ready().await;
        let output = request.await;
        self.mark_finished();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn spaces_consecutive_calls() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.throttle(async {}).await;
        limiter.throttle(async {}).await;
        limiter.throttle(async {}).await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn pause_is_measured_from_the_end_of_a_slow_request() {
        let limiter = RateLimiter::new(Duration::from_millis(150));
        limiter.throttle(sleep(Duration::from_millis(200))).await;
        let finished = Instant::now();

        let started = limiter.throttle(async { Instant::now() }).await;

        assert!(started - finished >= Duration::from_millis(140));
    }

    #[tokio::test]
    async fn first_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(10));
        let start = Instant::now();
        limiter.throttle(async {}).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn zero_period_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.throttle(async {}).await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

use super::core::{Middleware, Next};
use super::stages::Routed;
use crate::error::RouteError;
use crate::surface::Surface;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Records dispatch latency on the matched stage.
///
/// Counters are atomics, so one instance can be shared by every route and
/// every thread. Failed dispatches are counted too.
#[derive(Debug, Default)]
pub struct TimingMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl TimingMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dispatches timed so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean latency, zero before the first dispatch
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    fn record(&self, latency: Duration) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl<S: Surface> Middleware<Routed<S>, S::Output> for TimingMiddleware {
    fn handle(
        &self,
        input: Routed<S>,
        next: Next<'_, Routed<S>, S::Output>,
    ) -> Result<S::Output, RouteError> {
        let route = input.route.key.clone();
        let start = Instant::now();
        let result = next.run(input);
        let latency = start.elapsed();
        self.record(latency);
        info!(
            route = %route,
            latency_ms = latency.as_secs_f64() * 1000.0,
            ok = result.is_ok(),
            "Dispatch timed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_latency() {
        let timing = TimingMiddleware::new();
        assert_eq!(timing.average_latency(), Duration::ZERO);
        timing.record(Duration::from_millis(2));
        timing.record(Duration::from_millis(4));
        assert_eq!(timing.request_count(), 2);
        assert_eq!(timing.average_latency(), Duration::from_millis(3));
    }
}

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;

/// A sub-fetch that failed inside an aggregation and was absorbed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemFailure {
    /// Repository, page or namespace the failure belongs to
    pub item: String,
    /// Which sub-fetch failed ("readme", "languages", ...)
    pub stage: &'static str,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<String>, stage: &'static str, reason: impl ToString) -> Self {
        Self {
            item: item.into(),
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Result of a fan-out: the (possibly partial) value plus every absorbed failure
#[derive(Debug)]
pub struct FanOut<T> {
    pub value: T,
    pub failures: Vec<ItemFailure>,
}

impl<T> FanOut<T> {
    pub fn new(value: T, failures: Vec<ItemFailure>) -> Self {
        Self { value, failures }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FanOut<U> {
        FanOut {
            value: f(self.value),
            failures: self.failures,
        }
    }

    /// Log every absorbed failure under `context`
    pub fn log_failures(&self, context: &str) {
        for failure in &self.failures {
            log::warn!(
                "⚠️  {}: {} failed for {}: {}",
                context,
                failure.stage,
                failure.item,
                failure.reason
            );
        }
    }
}

/// Run `f` over `items` with at most `limit` futures in flight.
/// Output order follows completion order, not input order.
pub async fn bounded<I, F, Fut>(items: I, limit: usize, f: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(f)
        .buffer_unordered(limit.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bounded_respects_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = bounded(0..20u32, 3, |n| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n * 2
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        let mut sorted = results;
        sorted.sort();
        assert_eq!(sorted[19], 38);
    }

    #[test]
    fn test_map_keeps_failures() {
        let fan_out = FanOut::new(2, vec![ItemFailure::new("repo", "readme", "timeout")]);
        let mapped = fan_out.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert_eq!(mapped.failures.len(), 1);
        assert_eq!(mapped.failures[0].stage, "readme");
    }
}

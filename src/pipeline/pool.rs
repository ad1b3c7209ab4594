// src/pipeline/pool.rs

//! Bounded worker-pool driver shared by both pipelines.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run one task per item with at most `pool_size` in flight, waiting for all
/// of them before returning.
///
/// Every task outcome is collected (in completion order); a task that fails
/// must encode the failure in its output type — nothing here aborts the
/// pool.
pub async fn run_bounded<T, F, Fut, R>(items: Vec<T>, pool_size: usize, task: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    stream::iter(items)
        .map(task)
        .buffer_unordered(pool_size.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn collects_all_outcomes() {
        let results = run_bounded(vec![1, 2, 3], 2, |n| async move { n * 10 }).await;
        let mut sorted = results;
        sorted.sort_unstable();
        assert_eq!(sorted, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn bounds_concurrency() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = run_bounded(vec![(); 16], 4, |_| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        assert_eq!(results.len(), 16);
        assert!(peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn failing_items_do_not_stop_the_pool() {
        let results: Vec<Result<i32, String>> = run_bounded(vec![1, 2, 3, 4], 2, |n| async move {
            if n % 2 == 0 {
                Err(format!("item {n} failed"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 2);
    }

    #[tokio::test]
    async fn zero_pool_size_still_makes_progress() {
        let results = run_bounded(vec![1], 0, |n| async move { n }).await;
        assert_eq!(results, vec![1]);
    }
}

//! Background worker applying click increments.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlMappingRepository;

/// Retries after the first failed increment.
const RETRY_ATTEMPTS: usize = 3;

/// Consumes click events until every sender is dropped.
///
/// At most `concurrency` increments run at once. Each increment is retried
/// with exponential backoff; a click that still fails is logged and lost.
/// Pending increments are drained before the worker returns.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn UrlMappingRepository>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let repository = repository.clone();
        tasks.spawn(async move {
            let _permit = permit;
            record_click(repository.as_ref(), &event.short_key).await;
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn record_click(repository: &dyn UrlMappingRepository, short_key: &str) {
    let strategy = ExponentialBackoff::from_millis(10)
        .map(jitter)
        .take(RETRY_ATTEMPTS);

    match Retry::start(strategy, || repository.increment_click_count(short_key)).await {
        Ok(true) => debug!(short_key, "Click count incremented"),
        Ok(false) => warn!(short_key, "Click for a key that no longer exists"),
        Err(e) => error!(short_key, error = %e, "Failed to increment click count"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlMappingRepository;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_worker_increments_each_event() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_increment_click_count()
            .withf(|key| key == "abc123")
            .times(3)
            .returning(|_| Ok(true));

        let (tx, rx) = mpsc::channel(10);
        for _ in 0..3 {
            tx.send(ClickEvent::new("abc123")).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 2).await;
    }

    #[tokio::test]
    async fn test_worker_retries_failed_increment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut repo = MockUrlMappingRepository::new();
        repo.expect_increment_click_count().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Storage("connection reset".to_string()))
            } else {
                Ok(true)
            }
        });

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new("retry1")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 1).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut repo = MockUrlMappingRepository::new();
        repo.expect_increment_click_count().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Storage("down".to_string()))
        });

        let (tx, rx) = mpsc::channel(10);
        tx.send(ClickEvent::new("lost")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo), 1).await;

        assert_eq!(calls.load(Ordering::SeqCst), RETRY_ATTEMPTS + 1);
    }
}

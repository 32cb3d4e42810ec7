//! Periodic removal of expired short links.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use crate::application::services::AdminService;

/// Deletes expired mappings every `period` until `shutdown` flips to true.
///
/// Failed sweeps are logged and retried on the next tick.
pub async fn run_expiry_sweeper(
    admin: Arc<AdminService>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), "Expiry sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match admin.delete_expired().await {
                    Ok(0) => debug!("Expiry sweep found nothing to delete"),
                    Ok(count) => debug!(count, "Expiry sweep completed"),
                    Err(e) => error!(error = %e, "Expiry sweep failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlMappingRepository;
    use crate::infrastructure::cache::{BestEffortCache, NullCache};

    #[tokio::test]
    async fn test_sweeps_until_shutdown() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete_expired()
            .times(1..)
            .returning(|_| Ok(vec!["gone".to_string()]));

        let admin = Arc::new(AdminService::new(
            Arc::new(repo),
            BestEffortCache::new(Arc::new(NullCache::new())),
        ));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_expiry_sweeper(admin, Duration::from_millis(10), rx));
        tokio::time::sleep(Duration::from_millis(35)).await;
        tx.send(true).unwrap();

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_errors_are_survived() {
        let mut repo = MockUrlMappingRepository::new();
        repo.expect_delete_expired()
            .times(1..)
            .returning(|_| Err(crate::error::AppError::Storage("down".to_string())));

        let admin = Arc::new(AdminService::new(
            Arc::new(repo),
            BestEffortCache::new(Arc::new(NullCache::new())),
        ));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_expiry_sweeper(admin, Duration::from_millis(10), rx));
        tokio::time::sleep(Duration::from_millis(35)).await;
        drop(tx);

        handle.await.unwrap();
    }
}

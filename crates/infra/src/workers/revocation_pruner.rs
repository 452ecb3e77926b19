use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use identity_auth::RevocationStore;

/// Handle to stop and join a running pruner.
#[derive(Debug)]
pub struct PrunerHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl PrunerHandle {
    /// Request shutdown and wait for the task to stop.
    ///
    /// A pass already in flight runs to completion first.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.join.await {
            warn!(error = %err, "revocation pruner task ended abnormally");
        }
    }
}

/// Periodically deletes revocation records whose tokens have expired.
///
/// - Runs outside the verification path; verification never waits on it
/// - A failed pass is logged and retried on the next tick
#[derive(Debug)]
pub struct RevocationPruner;

impl RevocationPruner {
    /// Spawn on the current tokio runtime. The first pass runs immediately.
    pub fn spawn(store: Arc<dyn RevocationStore>, interval: Duration) -> PrunerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(prune_loop(store, interval, shutdown_rx));

        PrunerHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

async fn prune_loop(
    store: Arc<dyn RevocationStore>,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_ms = interval.as_millis() as u64, "revocation pruner started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                match store.prune_expired(Utc::now()).await {
                    Ok(0) => debug!("no expired revocation records"),
                    Ok(pruned) => info!(pruned, "pruned expired revocation records"),
                    Err(err) => warn!(error = %err, failure = ?err.kind(), "revocation prune failed"),
                }
            }
        }
    }

    info!("revocation pruner stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta};
    use identity_auth::{AuthError, AuthResult, InMemoryRevocationStore, RevokedTokenRecord};
    use identity_core::TokenId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FlakyStore {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl RevocationStore for FlakyStore {
        async fn add(&self, _record: RevokedTokenRecord) -> AuthResult<()> {
            Ok(())
        }

        async fn contains(&self, _jti: TokenId) -> AuthResult<bool> {
            Ok(false)
        }

        async fn prune_expired(&self, _now: DateTime<Utc>) -> AuthResult<u64> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::store_unavailable("connection refused"))
        }
    }

    #[tokio::test]
    async fn expired_records_are_pruned_and_live_ones_kept() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let now = Utc::now();
        let stale = RevokedTokenRecord::new(TokenId::new(), now - TimeDelta::minutes(1));
        let live = RevokedTokenRecord::new(TokenId::new(), now + TimeDelta::hours(1));
        store.add(stale.clone()).await.unwrap();
        store.add(live.clone()).await.unwrap();

        let handle = RevocationPruner::spawn(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        assert!(!store.contains(stale.jti).await.unwrap());
        assert!(store.contains(live.jti).await.unwrap());
    }

    #[tokio::test]
    async fn failures_are_retried_on_later_ticks() {
        let store = Arc::new(FlakyStore::default());

        let handle = RevocationPruner::spawn(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown().await;

        assert!(store.attempts.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn shutdown_stops_further_passes() {
        let store = Arc::new(FlakyStore::default());

        let handle = RevocationPruner::spawn(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(25)).await;
        handle.shutdown().await;

        let after_shutdown = store.attempts.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.attempts.load(Ordering::SeqCst), after_shutdown);
    }
}

//! Per-pool mutual exclusion.
//!
//! Each pool has exactly one writer at a time: trades, deposits, and
//! withdrawals all serialize on the same lock since they all touch
//! reserves. Locks are per pool, so trades against different pools never
//! block each other. The critical section spans the ledger call, which is
//! why these are async mutexes rather than parking_lot.

use crate::error::{EngineError, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use types::PoolId;

#[derive(Debug, Default)]
pub struct PoolLocks {
    locks: DashMap<PoolId, Arc<Mutex<()>>>,
}

impl PoolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the pool's write lock, waiting at most `wait`.
    ///
    /// A timeout surfaces as [`EngineError::ConcurrencyConflict`] — the
    /// caller-visible "pool is busy, try again" failure.
    pub async fn acquire(&self, pool_id: PoolId, wait: Duration) -> Result<OwnedMutexGuard<()>> {
        let lock = self
            .locks
            .entry(pool_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        // The dashmap shard guard is dropped before awaiting the mutex
        tokio::time::timeout(wait, lock.lock_owned())
            .await
            .map_err(|_| EngineError::ConcurrencyConflict(pool_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contended_lock_times_out_as_conflict() {
        let locks = PoolLocks::new();
        let pool_id = PoolId::new();

        let _held = locks
            .acquire(pool_id, Duration::from_millis(100))
            .await
            .unwrap();

        let result = locks.acquire(pool_id, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(EngineError::ConcurrencyConflict(_))));
    }

    #[tokio::test]
    async fn test_different_pools_do_not_block() {
        let locks = PoolLocks::new();
        let _held = locks
            .acquire(PoolId::new(), Duration::from_millis(100))
            .await
            .unwrap();

        // A different pool's lock is immediately available
        let other = locks
            .acquire(PoolId::new(), Duration::from_millis(20))
            .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let locks = PoolLocks::new();
        let pool_id = PoolId::new();

        drop(
            locks
                .acquire(pool_id, Duration::from_millis(100))
                .await
                .unwrap(),
        );
        assert!(locks
            .acquire(pool_id, Duration::from_millis(20))
            .await
            .is_ok());
    }
}

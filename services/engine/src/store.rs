//! Pool Store boundary.
//!
//! Durable persistence of [`Pool`] state keyed by id, with
//! compare-and-swap on `version` so a stale writer can never clobber a
//! newer state. The engine holds a per-pool lock while writing, so a
//! version conflict here means external interference or corruption, not
//! ordinary contention — callers treat it accordingly.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use types::{Pool, PoolId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Pool not found: {0}")]
    NotFound(PoolId),

    #[error("No pool with symbol {0}")]
    SymbolNotFound(String),

    #[error("Pool id already exists: {0}")]
    DuplicateId(PoolId),

    #[error("Symbol already exists: {0}")]
    DuplicateSymbol(String),

    #[error("Version conflict on pool {pool_id}: expected {expected}, found {actual}")]
    VersionConflict {
        pool_id: PoolId,
        expected: u64,
        actual: u64,
    },
}

#[async_trait]
pub trait PoolStore: Send + Sync {
    /// Persist a new pool; id and symbol must both be unused.
    async fn insert(&self, pool: Pool) -> Result<(), StoreError>;

    async fn get(&self, pool_id: PoolId) -> Result<Pool, StoreError>;

    async fn get_by_symbol(&self, symbol: &str) -> Result<Pool, StoreError>;

    /// Replace the stored state iff its version still equals
    /// `expected_version`.
    async fn compare_and_swap(&self, expected_version: u64, pool: Pool) -> Result<(), StoreError>;

    /// Paginated listing ordered by creation time (restartable read).
    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<Pool>, StoreError>;
}

/// In-process store used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryPoolStore {
    pools: DashMap<PoolId, Pool>,
    symbols: DashMap<String, PoolId>,
}

impl InMemoryPoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn insert(&self, pool: Pool) -> Result<(), StoreError> {
        if self.pools.contains_key(&pool.id) {
            return Err(StoreError::DuplicateId(pool.id));
        }
        // The symbol index entry doubles as the uniqueness claim
        match self.symbols.entry(pool.symbol.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(StoreError::DuplicateSymbol(pool.symbol));
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(pool.id);
            }
        }
        self.pools.insert(pool.id, pool);
        Ok(())
    }

    async fn get(&self, pool_id: PoolId) -> Result<Pool, StoreError> {
        self.pools
            .get(&pool_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(pool_id))
    }

    async fn get_by_symbol(&self, symbol: &str) -> Result<Pool, StoreError> {
        let pool_id = self
            .symbols
            .get(symbol)
            .map(|entry| *entry.value())
            .ok_or_else(|| StoreError::SymbolNotFound(symbol.to_string()))?;
        self.get(pool_id).await
    }

    async fn compare_and_swap(&self, expected_version: u64, pool: Pool) -> Result<(), StoreError> {
        let mut entry = self
            .pools
            .get_mut(&pool.id)
            .ok_or(StoreError::NotFound(pool.id))?;
        let actual = entry.value().version;
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                pool_id: pool.id,
                expected: expected_version,
                actual,
            });
        }
        *entry.value_mut() = pool;
        Ok(())
    }

    async fn list(&self, offset: usize, limit: usize) -> Result<Vec<Pool>, StoreError> {
        let mut pools: Vec<Pool> = self
            .pools
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Deterministic order so pagination is restartable
        pools.sort_by(|a, b| {
            a.created_at_ns
                .cmp(&b.created_at_ns)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        Ok(pools.into_iter().skip(offset).take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{FixedPoint, Reserves, UserId};

    fn test_pool(symbol: &str, created_at_ns: u64) -> Pool {
        Pool {
            id: PoolId::new(),
            symbol: symbol.to_string(),
            reserves: Reserves::new(FixedPoint::from_units(100), FixedPoint::from_units(200)),
            total_lp_shares: FixedPoint::from_units(1000),
            version: 1,
            creator_id: UserId::from("creator"),
            created_at_ns,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryPoolStore::new();
        let pool = test_pool("MEME", 1);
        store.insert(pool.clone()).await.unwrap();

        assert_eq!(store.get(pool.id).await.unwrap(), pool);
        assert_eq!(store.get_by_symbol("MEME").await.unwrap(), pool);
        assert!(matches!(
            store.get_by_symbol("NOPE").await,
            Err(StoreError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_symbol_rejected() {
        let store = InMemoryPoolStore::new();
        store.insert(test_pool("MEME", 1)).await.unwrap();
        assert!(matches!(
            store.insert(test_pool("MEME", 2)).await,
            Err(StoreError::DuplicateSymbol(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_compare_and_swap_enforces_version() {
        let store = InMemoryPoolStore::new();
        let mut pool = test_pool("MEME", 1);
        store.insert(pool.clone()).await.unwrap();

        // Stale expected version is rejected
        pool.version = 2;
        assert!(matches!(
            store.compare_and_swap(99, pool.clone()).await,
            Err(StoreError::VersionConflict { .. })
        ));

        // Matching expected version commits
        store.compare_and_swap(1, pool.clone()).await.unwrap();
        assert_eq!(store.get(pool.id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_list_is_paginated_and_ordered() {
        let store = InMemoryPoolStore::new();
        for (i, symbol) in ["AAA", "BBB", "CCC", "DDD"].iter().enumerate() {
            store.insert(test_pool(symbol, i as u64)).await.unwrap();
        }

        let page = store.list(1, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].symbol, "BBB");
        assert_eq!(page[1].symbol, "CCC");

        let tail = store.list(3, 10).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].symbol, "DDD");
    }
}

//! Pool registry: creation, lookup, listing.
//!
//! A thin coordination layer over the Pool Store. Creation settles the
//! creator's mana through the Ledger before the pool exists; the token
//! side is minted into the pool at birth, and the creator's contribution
//! defines the initial price. The bootstrap LP shares go to the creator's
//! position.

use crate::error::{EngineError, Result};
use crate::ledger::{credit_with_timeout, debit_with_timeout, BalanceLedger};
use crate::positions::PositionBook;
use crate::store::{PoolStore, StoreError};
use config::EngineConfig;
use std::sync::Arc;
use tracing::{info, warn};
use types::{now_ns, FixedPoint, Pool, PoolId, PoolSummary, Reserves, UserId};

pub struct PoolRegistry {
    config: EngineConfig,
    ledger: Arc<dyn BalanceLedger>,
    store: Arc<dyn PoolStore>,
    positions: Arc<PositionBook>,
}

impl PoolRegistry {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn BalanceLedger>,
        store: Arc<dyn PoolStore>,
        positions: Arc<PositionBook>,
    ) -> Self {
        Self {
            config,
            ledger,
            store,
            positions,
        }
    }

    /// Create a pool for a new token symbol.
    ///
    /// The creator funds the mana side (debited via the Ledger); the token
    /// supply is minted into the pool. Symbols are case-insensitive and
    /// stored uppercase.
    pub async fn create_pool(
        &self,
        creator_id: &UserId,
        symbol: &str,
        initial_mana: FixedPoint,
        initial_tokens: FixedPoint,
    ) -> Result<PoolId> {
        if initial_mana.is_zero() || initial_tokens.is_zero() {
            return Err(EngineError::InvalidAmount(
                "initial reserves must both be positive",
            ));
        }
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(EngineError::InvalidSymbol(
                "symbol must not be empty".to_string(),
            ));
        }

        // Fast-path uniqueness check; the store's insert is the real claim
        if self.store.get_by_symbol(&symbol).await.is_ok() {
            return Err(EngineError::DuplicateSymbol(symbol));
        }

        debit_with_timeout(
            self.ledger.as_ref(),
            creator_id,
            initial_mana,
            self.config.ledger_timeout_ms,
        )
        .await?;

        let pool = Pool {
            id: PoolId::new(),
            symbol: symbol.clone(),
            reserves: Reserves::new(initial_mana, initial_tokens),
            total_lp_shares: FixedPoint::from_raw(u128::from(self.config.bootstrap_lp_shares)),
            version: 1,
            creator_id: creator_id.clone(),
            created_at_ns: now_ns(),
        };
        let pool_id = pool.id;

        if let Err(err) = self.store.insert(pool).await {
            // Lost a creation race after the debit: refund and report
            if let Err(refund_err) = credit_with_timeout(
                self.ledger.as_ref(),
                creator_id,
                initial_mana,
                self.config.ledger_timeout_ms,
            )
            .await
            {
                warn!(
                    %creator_id,
                    "Refund after failed pool insert also failed: {refund_err}"
                );
            }
            return match err {
                StoreError::DuplicateSymbol(symbol) => Err(EngineError::DuplicateSymbol(symbol)),
                other => Err(other.into()),
            };
        }

        self.positions.mint(
            pool_id,
            creator_id,
            FixedPoint::from_raw(u128::from(self.config.bootstrap_lp_shares)),
        )?;

        info!(
            "🏊 Pool created: id={} symbol={} mana={} tokens={} creator={}",
            pool_id, symbol, initial_mana, initial_tokens, creator_id
        );
        Ok(pool_id)
    }

    pub async fn get_pool(&self, pool_id: PoolId) -> Result<Pool> {
        Ok(self.store.get(pool_id).await?)
    }

    pub async fn get_pool_by_symbol(&self, symbol: &str) -> Result<Pool> {
        let symbol = symbol.trim().to_uppercase();
        Ok(self.store.get_by_symbol(&symbol).await?)
    }

    /// Paginated, restartable listing of pool summaries.
    pub async fn list_pools(&self, offset: usize, limit: usize) -> Result<Vec<PoolSummary>> {
        let pools = self.store.list(offset, limit).await?;
        Ok(pools.iter().map(Pool::summary).collect())
    }
}

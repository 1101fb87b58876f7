//! Liquidity provisioning: deposits and withdrawals.
//!
//! Deposits and withdrawals move reserves, so they run under the same
//! per-pool lock as trades and follow the same settlement discipline:
//! internal legs are reversible until the currency leg settles, and a
//! commit that fails after settlement is escalated, not rolled back.

use crate::error::{EngineError, Result};
use crate::holdings::TokenHoldings;
use crate::ledger::{credit_with_timeout, debit_with_timeout, BalanceLedger};
use crate::locks::PoolLocks;
use crate::positions::PositionBook;
use crate::store::PoolStore;
use config::EngineConfig;
use manaswap_amm::LiquidityMath;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use types::{now_ns, FixedPoint, Pool, PoolId, Reserves, UserId};

/// Outcome of a committed deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub pool_id: PoolId,
    pub owner_id: UserId,
    pub mana_in: FixedPoint,
    pub token_in: FixedPoint,
    pub lp_shares_minted: FixedPoint,
    pub timestamp_ns: u64,
}

/// Outcome of a committed withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub pool_id: PoolId,
    pub owner_id: UserId,
    pub lp_shares_burned: FixedPoint,
    pub mana_out: FixedPoint,
    pub token_out: FixedPoint,
    pub timestamp_ns: u64,
}

pub struct LiquidityManager {
    config: EngineConfig,
    ledger: Arc<dyn BalanceLedger>,
    store: Arc<dyn PoolStore>,
    locks: Arc<PoolLocks>,
    holdings: Arc<TokenHoldings>,
    positions: Arc<PositionBook>,
}

impl LiquidityManager {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn BalanceLedger>,
        store: Arc<dyn PoolStore>,
        locks: Arc<PoolLocks>,
        holdings: Arc<TokenHoldings>,
        positions: Arc<PositionBook>,
    ) -> Self {
        Self {
            config,
            ledger,
            store,
            locks,
            holdings,
            positions,
        }
    }

    /// Deposit mana and tokens in the pool's current ratio, minting LP
    /// shares.
    ///
    /// `token_in` must equal the ratio-implied requirement exactly; a
    /// mismatch fails with [`EngineError::RatioMismatch`] before anything
    /// moves. Tokens come out of the owner's holdings, mana out of the
    /// Ledger.
    pub async fn deposit(
        &self,
        pool_id: PoolId,
        owner_id: &UserId,
        mana_in: FixedPoint,
        token_in: FixedPoint,
    ) -> Result<DepositReceipt> {
        let _guard = self
            .locks
            .acquire(pool_id, Duration::from_millis(self.config.lock_wait_ms))
            .await?;

        let pool = self.store.get(pool_id).await?;
        let quote = LiquidityMath::quote_deposit(&pool.reserves, pool.total_lp_shares, mana_in)?;

        if token_in != quote.token_in_required {
            return Err(EngineError::RatioMismatch {
                supplied: token_in,
                required: quote.token_in_required,
            });
        }

        // Token leg first: internal and reversible
        self.holdings.debit(pool_id, owner_id, token_in)?;

        if let Err(err) = debit_with_timeout(
            self.ledger.as_ref(),
            owner_id,
            mana_in,
            self.config.ledger_timeout_ms,
        )
        .await
        {
            self.holdings.credit(pool_id, owner_id, token_in)?;
            return Err(err);
        }

        let new_pool = Pool {
            reserves: Reserves::new(
                pool.reserves.mana.checked_add(mana_in)?,
                pool.reserves.token.checked_add(token_in)?,
            ),
            total_lp_shares: pool.total_lp_shares.checked_add(quote.lp_shares_minted)?,
            version: pool.version + 1,
            ..pool.clone()
        };
        self.commit_settled(&pool, new_pool).await?;
        self.positions
            .mint(pool_id, owner_id, quote.lp_shares_minted)?;

        info!(
            "➕ Deposit committed: pool={} owner={} mana={} tokens={} shares={}",
            pool_id, owner_id, mana_in, token_in, quote.lp_shares_minted
        );
        Ok(DepositReceipt {
            pool_id,
            owner_id: owner_id.clone(),
            mana_in,
            token_in,
            lp_shares_minted: quote.lp_shares_minted,
            timestamp_ns: now_ns(),
        })
    }

    /// Burn LP shares for the proportional slice of both reserves.
    ///
    /// Fails with [`EngineError::InsufficientShares`] if the owner's
    /// position is smaller than the burn.
    pub async fn withdraw(
        &self,
        pool_id: PoolId,
        owner_id: &UserId,
        lp_shares: FixedPoint,
    ) -> Result<WithdrawReceipt> {
        let _guard = self
            .locks
            .acquire(pool_id, Duration::from_millis(self.config.lock_wait_ms))
            .await?;

        let pool = self.store.get(pool_id).await?;

        let owned = self.positions.shares_of(pool_id, owner_id);
        if lp_shares > owned {
            return Err(EngineError::InsufficientShares {
                requested: lp_shares,
                owned,
            });
        }

        let quote = LiquidityMath::quote_withdraw(&pool.reserves, pool.total_lp_shares, lp_shares)?;

        // Share burn first: internal and reversible
        self.positions.burn(pool_id, owner_id, lp_shares)?;

        if let Err(err) = credit_with_timeout(
            self.ledger.as_ref(),
            owner_id,
            quote.mana_out,
            self.config.ledger_timeout_ms,
        )
        .await
        {
            self.positions.mint(pool_id, owner_id, lp_shares)?;
            return Err(err);
        }

        let new_pool = Pool {
            reserves: Reserves::new(
                pool.reserves.mana.checked_sub(quote.mana_out)?,
                pool.reserves.token.checked_sub(quote.token_out)?,
            ),
            total_lp_shares: pool.total_lp_shares.checked_sub(lp_shares)?,
            version: pool.version + 1,
            ..pool.clone()
        };
        self.commit_settled(&pool, new_pool).await?;
        self.holdings.credit(pool_id, owner_id, quote.token_out)?;

        info!(
            "➖ Withdrawal committed: pool={} owner={} shares={} mana={} tokens={}",
            pool_id, owner_id, lp_shares, quote.mana_out, quote.token_out
        );
        Ok(WithdrawReceipt {
            pool_id,
            owner_id: owner_id.clone(),
            lp_shares_burned: lp_shares,
            mana_out: quote.mana_out,
            token_out: quote.token_out,
            timestamp_ns: now_ns(),
        })
    }

    /// Same fatal-path commit discipline as trades: the currency leg has
    /// settled, so the new state must land or be escalated.
    async fn commit_settled(&self, before: &Pool, new_pool: Pool) -> Result<()> {
        let pool_id = new_pool.id;
        let mut last_err = None;
        for attempt in 1..=self.config.max_commit_retries {
            match self
                .store
                .compare_and_swap(before.version, new_pool.clone())
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(
                        %pool_id,
                        attempt,
                        retries = self.config.max_commit_retries,
                        "Liquidity commit attempt failed: {err}"
                    );
                    last_err = Some(err);
                }
            }
        }

        error!(
            %pool_id,
            ?last_err,
            "❌ Liquidity commit failed after {} retries with the ledger leg settled; \
             manual reconciliation required",
            self.config.max_commit_retries
        );
        Err(EngineError::CommitFailed { pool_id })
    }
}

//! # Trade Executor - Atomic Swap Execution Engine
//!
//! ## Purpose
//!
//! Orchestrates a single trade end-to-end against one pool: acquire the
//! pool's write lock, re-quote against the freshest state, enforce the
//! caller's slippage floor, settle the currency leg with the Balance
//! Ledger, commit the new pool state, and append the immutable trade
//! record. Every committed trade preserves the fee-inclusive constant
//! product; every aborted trade leaves the pool byte-for-byte unchanged.
//!
//! ## Trade Protocol
//!
//! ```text
//! Requested -> Locked -> Requoted -> SlippageChecked -> LedgerDebited -> Committed
//!      \________\__________\______________\__________________/
//!                         any -> Aborted (full rollback, pool untouched)
//! ```
//!
//! Up to and including the slippage check, aborting is free: nothing has
//! been debited and nothing persisted. Once the ledger leg has settled,
//! the trade can no longer be cancelled — a failing pool commit is
//! retried within its budget and, if still failing, escalated loudly as
//! [`EngineError::CommitFailed`] rather than rolled back, so a trader is
//! never silently charged for a trade that never happened.
//!
//! ## Concurrency
//!
//! Per-pool mutual exclusion only: trades on different pools proceed in
//! parallel, trades on the same pool linearize on its lock. Quotes taken
//! before the lock are advisory; the executor always re-quotes under the
//! lock. The store's compare-and-swap on `version` backs the lock as a
//! corruption tripwire.

use crate::error::{EngineError, Result};
use crate::holdings::TokenHoldings;
use crate::ledger::{credit_with_timeout, debit_with_timeout, BalanceLedger};
use crate::locks::PoolLocks;
use crate::store::PoolStore;
use crate::trade_log::TradeLog;
use config::EngineConfig;
use manaswap_amm::QuoteEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use types::{now_ns, FixedPoint, Pool, PoolId, Reserves, Trade, TradeId, TradeSide, UserId};

pub struct TradeExecutor {
    config: EngineConfig,
    ledger: Arc<dyn BalanceLedger>,
    store: Arc<dyn PoolStore>,
    locks: Arc<PoolLocks>,
    holdings: Arc<TokenHoldings>,
    trade_log: Arc<TradeLog>,
}

impl TradeExecutor {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn BalanceLedger>,
        store: Arc<dyn PoolStore>,
        locks: Arc<PoolLocks>,
        holdings: Arc<TokenHoldings>,
        trade_log: Arc<TradeLog>,
    ) -> Self {
        Self {
            config,
            ledger,
            store,
            locks,
            holdings,
            trade_log,
        }
    }

    /// Execute a buy: debit `mana_in` from the trader, swap it into the
    /// pool, credit the trader's token holdings with the output.
    ///
    /// `min_output` is the caller's slippage floor on tokens received.
    pub async fn execute_buy(
        &self,
        pool_id: PoolId,
        trader_id: &UserId,
        mana_in: FixedPoint,
        min_output: FixedPoint,
    ) -> Result<Trade> {
        // Locked: one writer per pool for the whole protocol
        let _guard = self
            .locks
            .acquire(pool_id, Duration::from_millis(self.config.lock_wait_ms))
            .await?;

        // Requoted: never trust a quote computed before the lock was held
        let pool = self.store.get(pool_id).await?;
        let quote = QuoteEngine::quote_buy(&pool.reserves, mana_in, self.config.fee_bps)?;

        // SlippageChecked: abort is free, nothing has moved yet
        if quote.tokens_out < min_output {
            debug!(
                %pool_id,
                output = %quote.tokens_out,
                floor = %min_output,
                "Buy rejected on slippage floor"
            );
            return Err(EngineError::SlippageExceeded {
                output: quote.tokens_out,
                min_output,
            });
        }

        // LedgerDebited: the only external I/O, under a bounded timeout.
        // Failure here aborts with the pool untouched.
        debit_with_timeout(
            self.ledger.as_ref(),
            trader_id,
            mana_in,
            self.config.ledger_timeout_ms,
        )
        .await?;

        // Committed: from here the trade must land
        let new_pool = next_pool_state(&pool, quote.reserves_after);
        self.commit_debited(&pool, new_pool).await?;
        self.holdings.credit(pool_id, trader_id, quote.tokens_out)?;

        let trade = Trade {
            id: TradeId::new(),
            pool_id,
            trader_id: trader_id.clone(),
            side: TradeSide::Buy,
            input_amount: mana_in,
            output_amount: quote.tokens_out,
            fee_amount: quote.fee_amount,
            reserves_before: pool.reserves,
            reserves_after: quote.reserves_after,
            timestamp_ns: now_ns(),
        };
        self.trade_log.append(trade.clone());

        info!(
            "⚡ Buy committed: pool={} trader={} in={} out={} fee={}",
            pool_id, trader_id, mana_in, trade.output_amount, trade.fee_amount
        );
        Ok(trade)
    }

    /// Execute a sell: debit `tokens_in` from the trader's holdings, swap
    /// them into the pool, credit the mana proceeds via the Ledger.
    ///
    /// `min_output` is the caller's slippage floor on mana received.
    pub async fn execute_sell(
        &self,
        pool_id: PoolId,
        trader_id: &UserId,
        tokens_in: FixedPoint,
        min_output: FixedPoint,
    ) -> Result<Trade> {
        let _guard = self
            .locks
            .acquire(pool_id, Duration::from_millis(self.config.lock_wait_ms))
            .await?;

        let pool = self.store.get(pool_id).await?;
        let quote = QuoteEngine::quote_sell(&pool.reserves, tokens_in, self.config.fee_bps)?;

        if quote.mana_out < min_output {
            debug!(
                %pool_id,
                output = %quote.mana_out,
                floor = %min_output,
                "Sell rejected on slippage floor"
            );
            return Err(EngineError::SlippageExceeded {
                output: quote.mana_out,
                min_output,
            });
        }

        // The token leg is internal and reversible until the currency leg
        // settles
        self.holdings.debit(pool_id, trader_id, tokens_in)?;

        if let Err(err) = credit_with_timeout(
            self.ledger.as_ref(),
            trader_id,
            quote.mana_out,
            self.config.ledger_timeout_ms,
        )
        .await
        {
            // Currency leg failed: hand the tokens back and abort clean
            self.holdings.credit(pool_id, trader_id, tokens_in)?;
            return Err(err);
        }

        let new_pool = next_pool_state(&pool, quote.reserves_after);
        self.commit_debited(&pool, new_pool).await?;

        let trade = Trade {
            id: TradeId::new(),
            pool_id,
            trader_id: trader_id.clone(),
            side: TradeSide::Sell,
            input_amount: tokens_in,
            output_amount: quote.mana_out,
            fee_amount: quote.fee_amount,
            reserves_before: pool.reserves,
            reserves_after: quote.reserves_after,
            timestamp_ns: now_ns(),
        };
        self.trade_log.append(trade.clone());

        info!(
            "⚡ Sell committed: pool={} trader={} in={} out={} fee={}",
            pool_id, trader_id, tokens_in, trade.output_amount, trade.fee_amount
        );
        Ok(trade)
    }

    /// Persist a post-trade state after the ledger leg has settled.
    ///
    /// The caller holds the pool lock, so a version conflict means
    /// external interference with the store. Exhausting the retry budget
    /// here is the fatal path: funds moved with no corresponding trade,
    /// which must be escalated, never swallowed.
    async fn commit_debited(&self, before: &Pool, new_pool: Pool) -> Result<()> {
        let pool_id = new_pool.id;
        debug_assert!(
            new_pool.product_preserved(before.reserves.constant_product().unwrap_or(0)),
            "quote produced a product-decreasing state"
        );

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
                        "Pool commit attempt failed: {err}"
                    );
                    last_err = Some(err);
                }
            }
        }

        error!(
            %pool_id,
            ?last_err,
            "❌ Pool commit failed after {} retries with the ledger leg settled; \
             manual reconciliation required",
            self.config.max_commit_retries
        );
        Err(EngineError::CommitFailed { pool_id })
    }
}

/// Next pool state for a set of committed reserves: version bumped, all
/// identity fields carried over.
fn next_pool_state(pool: &Pool, reserves: Reserves) -> Pool {
    Pool {
        reserves,
        version: pool.version + 1,
        ..pool.clone()
    }
}

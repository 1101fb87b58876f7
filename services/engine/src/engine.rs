//! Engine facade: one handle over registry, executor, and liquidity.
//!
//! Wires the shared state (locks, holdings, positions, trade log) into
//! the three orchestrators and exposes the engine's public operations.
//! Quoting is read-only and lock-free; execution paths re-quote under the
//! pool lock internally.

use crate::error::Result;
use crate::executor::TradeExecutor;
use crate::holdings::TokenHoldings;
use crate::ledger::BalanceLedger;
use crate::liquidity::{DepositReceipt, LiquidityManager, WithdrawReceipt};
use crate::locks::PoolLocks;
use crate::positions::PositionBook;
use crate::registry::PoolRegistry;
use crate::store::PoolStore;
use crate::trade_log::TradeLog;
use config::EngineConfig;
use manaswap_amm::{
    BuyQuote, DepositQuote, LiquidityMath, QuoteEngine, SellQuote, WithdrawQuote,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use types::{FixedPoint, LpPosition, Pool, PoolId, PoolSummary, Trade, UserId};

pub struct Engine {
    config: EngineConfig,
    registry: PoolRegistry,
    executor: TradeExecutor,
    liquidity: LiquidityManager,
    holdings: Arc<TokenHoldings>,
    positions: Arc<PositionBook>,
    trade_log: Arc<TradeLog>,
    store: Arc<dyn PoolStore>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn BalanceLedger>,
        store: Arc<dyn PoolStore>,
    ) -> Self {
        let locks = Arc::new(PoolLocks::new());
        let holdings = Arc::new(TokenHoldings::new());
        let positions = Arc::new(PositionBook::new());
        let trade_log = Arc::new(TradeLog::new());

        let registry = PoolRegistry::new(
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&store),
            Arc::clone(&positions),
        );
        let executor = TradeExecutor::new(
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&store),
            Arc::clone(&locks),
            Arc::clone(&holdings),
            Arc::clone(&trade_log),
        );
        let liquidity = LiquidityManager::new(
            config.clone(),
            Arc::clone(&ledger),
            Arc::clone(&store),
            Arc::clone(&locks),
            Arc::clone(&holdings),
            Arc::clone(&positions),
        );

        Self {
            config,
            registry,
            executor,
            liquidity,
            holdings,
            positions,
            trade_log,
            store,
        }
    }

    // Pool lifecycle

    pub async fn create_pool(
        &self,
        creator_id: &UserId,
        symbol: &str,
        initial_mana: FixedPoint,
        initial_tokens: FixedPoint,
    ) -> Result<PoolId> {
        self.registry
            .create_pool(creator_id, symbol, initial_mana, initial_tokens)
            .await
    }

    pub async fn get_pool(&self, pool_id: PoolId) -> Result<Pool> {
        self.registry.get_pool(pool_id).await
    }

    pub async fn get_pool_by_symbol(&self, symbol: &str) -> Result<Pool> {
        self.registry.get_pool_by_symbol(symbol).await
    }

    pub async fn list_pools(&self, offset: usize, limit: usize) -> Result<Vec<PoolSummary>> {
        self.registry.list_pools(offset, limit).await
    }

    // Quoting (read-only, lock-free; execution re-quotes under the lock)

    pub async fn quote_buy(&self, pool_id: PoolId, mana_in: FixedPoint) -> Result<BuyQuote> {
        let pool = self.store.get(pool_id).await?;
        Ok(QuoteEngine::quote_buy(
            &pool.reserves,
            mana_in,
            self.config.fee_bps,
        )?)
    }

    pub async fn quote_sell(&self, pool_id: PoolId, tokens_in: FixedPoint) -> Result<SellQuote> {
        let pool = self.store.get(pool_id).await?;
        Ok(QuoteEngine::quote_sell(
            &pool.reserves,
            tokens_in,
            self.config.fee_bps,
        )?)
    }

    pub async fn quote_deposit(&self, pool_id: PoolId, mana_in: FixedPoint) -> Result<DepositQuote> {
        let pool = self.store.get(pool_id).await?;
        Ok(LiquidityMath::quote_deposit(
            &pool.reserves,
            pool.total_lp_shares,
            mana_in,
        )?)
    }

    pub async fn quote_withdraw(
        &self,
        pool_id: PoolId,
        lp_shares: FixedPoint,
    ) -> Result<WithdrawQuote> {
        let pool = self.store.get(pool_id).await?;
        Ok(LiquidityMath::quote_withdraw(
            &pool.reserves,
            pool.total_lp_shares,
            lp_shares,
        )?)
    }

    // Execution

    pub async fn execute_buy(
        &self,
        pool_id: PoolId,
        trader_id: &UserId,
        mana_in: FixedPoint,
        min_output: FixedPoint,
    ) -> Result<Trade> {
        self.executor
            .execute_buy(pool_id, trader_id, mana_in, min_output)
            .await
    }

    pub async fn execute_sell(
        &self,
        pool_id: PoolId,
        trader_id: &UserId,
        tokens_in: FixedPoint,
        min_output: FixedPoint,
    ) -> Result<Trade> {
        self.executor
            .execute_sell(pool_id, trader_id, tokens_in, min_output)
            .await
    }

    pub async fn deposit(
        &self,
        pool_id: PoolId,
        owner_id: &UserId,
        mana_in: FixedPoint,
        token_in: FixedPoint,
    ) -> Result<DepositReceipt> {
        self.liquidity
            .deposit(pool_id, owner_id, mana_in, token_in)
            .await
    }

    pub async fn withdraw(
        &self,
        pool_id: PoolId,
        owner_id: &UserId,
        lp_shares: FixedPoint,
    ) -> Result<WithdrawReceipt> {
        self.liquidity.withdraw(pool_id, owner_id, lp_shares).await
    }

    // Read models

    pub fn trades_for_pool(&self, pool_id: PoolId, offset: usize, limit: usize) -> Vec<Trade> {
        self.trade_log.trades_for_pool(pool_id, offset, limit)
    }

    pub fn last_price(&self, pool_id: PoolId) -> Option<Decimal> {
        self.trade_log.last_price(pool_id)
    }

    pub fn token_balance_of(&self, pool_id: PoolId, owner_id: &UserId) -> FixedPoint {
        self.holdings.balance_of(pool_id, owner_id)
    }

    pub fn lp_shares_of(&self, pool_id: PoolId, owner_id: &UserId) -> FixedPoint {
        self.positions.shares_of(pool_id, owner_id)
    }

    pub fn lp_positions_for_pool(&self, pool_id: PoolId) -> Vec<LpPosition> {
        self.positions.positions_for_pool(pool_id)
    }
}

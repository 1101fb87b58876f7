//! Append-only trade log.
//!
//! Every committed trade lands here exactly once, in commit order; the
//! per-pool sequence is the linearization the executor's lock produces,
//! and replaying it from the pool's initial state reproduces the current
//! reserves. Price history is derived from this log, never synthesized.

use dashmap::DashMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use types::{PoolId, Trade};

#[derive(Debug, Default)]
pub struct TradeLog {
    trades: DashMap<PoolId, RwLock<Vec<Trade>>>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed trade. Records are immutable once written.
    pub fn append(&self, trade: Trade) {
        self.trades
            .entry(trade.pool_id)
            .or_default()
            .write()
            .push(trade);
    }

    pub fn len_for_pool(&self, pool_id: PoolId) -> usize {
        self.trades
            .get(&pool_id)
            .map(|entry| entry.value().read().len())
            .unwrap_or(0)
    }

    /// Paginated read of a pool's trade history in commit order.
    pub fn trades_for_pool(&self, pool_id: PoolId, offset: usize, limit: usize) -> Vec<Trade> {
        self.trades
            .get(&pool_id)
            .map(|entry| {
                entry
                    .value()
                    .read()
                    .iter()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Most recent post-trade spot price, if the pool has traded.
    pub fn last_price(&self, pool_id: PoolId) -> Option<Decimal> {
        self.trades
            .get(&pool_id)
            .and_then(|entry| {
                entry
                    .value()
                    .read()
                    .last()
                    .map(|trade| trade.reserves_after)
            })
            .and_then(|reserves| reserves.spot_price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{FixedPoint, Reserves, TradeId, TradeSide, UserId};

    fn test_trade(pool_id: PoolId, mana_after: u128) -> Trade {
        Trade {
            id: TradeId::new(),
            pool_id,
            trader_id: UserId::from("trader"),
            side: TradeSide::Buy,
            input_amount: FixedPoint::from_raw(100),
            output_amount: FixedPoint::from_raw(90),
            fee_amount: FixedPoint::from_raw(1),
            reserves_before: Reserves::new(
                FixedPoint::from_raw(1000),
                FixedPoint::from_raw(1000),
            ),
            reserves_after: Reserves::new(
                FixedPoint::from_raw(mana_after),
                FixedPoint::from_raw(1000),
            ),
            timestamp_ns: 1,
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let log = TradeLog::new();
        let pool_id = PoolId::new();

        log.append(test_trade(pool_id, 1100));
        log.append(test_trade(pool_id, 1200));
        log.append(test_trade(pool_id, 1300));

        let trades = log.trades_for_pool(pool_id, 0, 10);
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].reserves_after.mana.raw(), 1100);
        assert_eq!(trades[2].reserves_after.mana.raw(), 1300);

        let page = log.trades_for_pool(pool_id, 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].reserves_after.mana.raw(), 1200);
    }

    #[test]
    fn test_last_price_follows_latest_trade() {
        let log = TradeLog::new();
        let pool_id = PoolId::new();
        assert!(log.last_price(pool_id).is_none());

        log.append(test_trade(pool_id, 2000));
        // 2000 mana / 1000 tokens = 2.0
        assert_eq!(log.last_price(pool_id).unwrap(), Decimal::from(2));
    }
}

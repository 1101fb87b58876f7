//! Immutable trade records.
//!
//! Trades are append-only audit entries; price history is reconstructed by
//! replaying them, never synthesized. A record is written exactly once, at
//! commit, and never mutated or deleted.

use crate::fixed_point::FixedPoint;
use crate::ids::{PoolId, TradeId, UserId};
use crate::pool::Reserves;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub pool_id: PoolId,
    pub trader_id: UserId,
    pub side: TradeSide,
    /// What the trader put in (mana for buys, tokens for sells).
    pub input_amount: FixedPoint,
    /// What the trader received (tokens for buys, mana for sells).
    pub output_amount: FixedPoint,
    /// Fee retained by the pool, denominated in mana.
    pub fee_amount: FixedPoint,
    pub reserves_before: Reserves,
    pub reserves_after: Reserves,
    pub timestamp_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_record_json_round_trip() {
        let trade = Trade {
            id: TradeId::new(),
            pool_id: PoolId::new(),
            trader_id: UserId::from("trader-1"),
            side: TradeSide::Buy,
            input_amount: FixedPoint::from_raw(1000),
            output_amount: FixedPoint::from_raw(1955),
            fee_amount: FixedPoint::from_raw(3),
            reserves_before: Reserves::new(
                FixedPoint::from_raw(50_000),
                FixedPoint::from_raw(100_000),
            ),
            reserves_after: Reserves::new(
                FixedPoint::from_raw(51_000),
                FixedPoint::from_raw(98_045),
            ),
            timestamp_ns: 1_700_000_000_000_000_000,
        };

        let json = serde_json::to_string(&trade).unwrap();
        let parsed: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, trade);
    }
}

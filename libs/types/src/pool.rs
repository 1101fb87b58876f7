//! Pool State and Liquidity Positions
//!
//! [`Pool`] is the single long-lived mutable entity in the engine. It is
//! pure data plus invariant predicates; all mutation goes through the
//! trade executor, which bumps `version` on every committed change so the
//! store can reject stale writes.

use crate::fixed_point::{FixedPoint, Result as FpResult};
use crate::ids::{PoolId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of the two sides of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
    /// Base currency side, smallest units.
    pub mana: FixedPoint,
    /// Token side, smallest units.
    pub token: FixedPoint,
}

impl Reserves {
    pub fn new(mana: FixedPoint, token: FixedPoint) -> Self {
        Self { mana, token }
    }

    /// Both sides strictly positive; a live pool never has an empty side.
    pub fn both_positive(&self) -> bool {
        !self.mana.is_zero() && !self.token.is_zero()
    }

    /// The constant product `k = mana * token`.
    pub fn constant_product(&self) -> FpResult<u128> {
        self.mana.checked_product(self.token)
    }

    /// Token price in mana, for reporting only.
    pub fn spot_price(&self) -> Option<Decimal> {
        if self.token.is_zero() {
            return None;
        }
        Some(self.mana.to_decimal() / self.token.to_decimal())
    }
}

/// A constant-product liquidity pool for one token symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    /// Unique token ticker.
    pub symbol: String,
    pub reserves: Reserves,
    /// Sum of all outstanding LP position shares.
    pub total_lp_shares: FixedPoint,
    /// Bumped on every committed mutation; optimistic-concurrency token.
    pub version: u64,
    pub creator_id: UserId,
    pub created_at_ns: u64,
}

impl Pool {
    /// Reserve positivity: a live pool never has an empty side.
    pub fn reserves_positive(&self) -> bool {
        self.reserves.both_positive()
    }

    /// Fee-inclusive constant-product check against a pre-trade product:
    /// the committed product never decreases, and strictly grows when a
    /// fee was charged.
    pub fn product_preserved(&self, k_before: u128) -> bool {
        match self.reserves.constant_product() {
            Ok(k_after) => k_after >= k_before,
            Err(_) => false,
        }
    }

    pub fn summary(&self) -> PoolSummary {
        PoolSummary {
            id: self.id,
            symbol: self.symbol.clone(),
            reserves: self.reserves,
            total_lp_shares: self.total_lp_shares,
            version: self.version,
            spot_price: self.reserves.spot_price(),
        }
    }
}

/// Read-only pool listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub id: PoolId,
    pub symbol: String,
    pub reserves: Reserves,
    pub total_lp_shares: FixedPoint,
    pub version: u64,
    pub spot_price: Option<Decimal>,
}

/// A provider's proportional claim on a pool's reserves.
///
/// Created on first deposit, adjusted by later deposits and withdrawals,
/// removed once shares reach zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpPosition {
    pub pool_id: PoolId,
    pub owner_id: UserId,
    pub shares: FixedPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pool() -> Pool {
        Pool {
            id: PoolId::new(),
            symbol: "MEME".to_string(),
            reserves: Reserves::new(FixedPoint::from_units(50_000), FixedPoint::from_units(100_000)),
            total_lp_shares: FixedPoint::from_units(1_000_000),
            version: 1,
            creator_id: UserId::from("creator"),
            created_at_ns: 1,
        }
    }

    #[test]
    fn test_reserves_positive() {
        let pool = test_pool();
        assert!(pool.reserves_positive());

        let mut drained = pool.clone();
        drained.reserves.token = FixedPoint::ZERO;
        assert!(!drained.reserves_positive());
    }

    #[test]
    fn test_product_preserved() {
        let pool = test_pool();
        let k = pool.reserves.constant_product().unwrap();
        assert!(pool.product_preserved(k));
        assert!(pool.product_preserved(k - 1));
        assert!(!pool.product_preserved(k + 1));
    }

    #[test]
    fn test_spot_price() {
        let pool = test_pool();
        // 50_000 mana / 100_000 tokens = 0.5 mana per token
        assert_eq!(
            pool.reserves.spot_price().unwrap(),
            Decimal::new(5, 1)
        );
    }
}

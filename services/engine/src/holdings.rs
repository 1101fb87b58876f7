//! Trader token holdings.
//!
//! The Balance Ledger custodies only the base currency; tokens bought out
//! of a pool are accounted here, per `(pool, owner)`. Buys credit
//! holdings, sells and deposits debit them, withdrawals credit them.
//! Mutations happen under the owning pool's lock, so a get-then-set here
//! is race-free.

use crate::error::{EngineError, Result};
use dashmap::DashMap;
use types::{FixedPoint, PoolId, UserId};

#[derive(Debug, Default)]
pub struct TokenHoldings {
    balances: DashMap<(PoolId, UserId), FixedPoint>,
}

impl TokenHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, pool_id: PoolId, owner: &UserId) -> FixedPoint {
        self.balances
            .get(&(pool_id, owner.clone()))
            .map(|entry| *entry.value())
            .unwrap_or(FixedPoint::ZERO)
    }

    pub fn credit(&self, pool_id: PoolId, owner: &UserId, amount: FixedPoint) -> Result<()> {
        let mut entry = self
            .balances
            .entry((pool_id, owner.clone()))
            .or_insert(FixedPoint::ZERO);
        let updated = entry.value().checked_add(amount)?;
        *entry.value_mut() = updated;
        Ok(())
    }

    /// Debit tokens; fails with `InsufficientBalance` and no mutation if
    /// the owner holds less than `amount`.
    pub fn debit(&self, pool_id: PoolId, owner: &UserId, amount: FixedPoint) -> Result<()> {
        let mut entry = self
            .balances
            .get_mut(&(pool_id, owner.clone()))
            .ok_or_else(|| EngineError::InsufficientBalance {
                user: owner.clone(),
            })?;
        let remaining =
            entry
                .value()
                .checked_sub(amount)
                .map_err(|_| EngineError::InsufficientBalance {
                    user: owner.clone(),
                })?;
        *entry.value_mut() = remaining;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_debit_cycle() {
        let holdings = TokenHoldings::new();
        let pool_id = PoolId::new();
        let owner = UserId::from("trader");

        holdings
            .credit(pool_id, &owner, FixedPoint::from_raw(100))
            .unwrap();
        holdings
            .debit(pool_id, &owner, FixedPoint::from_raw(60))
            .unwrap();
        assert_eq!(
            holdings.balance_of(pool_id, &owner),
            FixedPoint::from_raw(40)
        );
    }

    #[test]
    fn test_overdraft_rejected() {
        let holdings = TokenHoldings::new();
        let pool_id = PoolId::new();
        let owner = UserId::from("trader");

        holdings
            .credit(pool_id, &owner, FixedPoint::from_raw(10))
            .unwrap();
        assert!(matches!(
            holdings.debit(pool_id, &owner, FixedPoint::from_raw(11)),
            Err(EngineError::InsufficientBalance { .. })
        ));
        assert_eq!(
            holdings.balance_of(pool_id, &owner),
            FixedPoint::from_raw(10)
        );
    }

    #[test]
    fn test_holdings_are_scoped_per_pool() {
        let holdings = TokenHoldings::new();
        let owner = UserId::from("trader");
        let pool_a = PoolId::new();
        let pool_b = PoolId::new();

        holdings
            .credit(pool_a, &owner, FixedPoint::from_raw(5))
            .unwrap();
        assert_eq!(holdings.balance_of(pool_b, &owner), FixedPoint::ZERO);
        assert!(holdings
            .debit(pool_b, &owner, FixedPoint::from_raw(1))
            .is_err());
    }
}

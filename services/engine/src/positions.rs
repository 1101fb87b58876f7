//! LP position book.
//!
//! Tracks every provider's outstanding shares per pool. The accounting
//! identity kept here: a pool's `total_lp_shares` equals the sum of its
//! positions' shares — both sides of that equation are only ever updated
//! together, under the pool's lock. Positions are removed when their
//! shares reach zero.

use crate::error::{EngineError, Result};
use dashmap::DashMap;
use types::{FixedPoint, LpPosition, PoolId, UserId};

#[derive(Debug, Default)]
pub struct PositionBook {
    positions: DashMap<(PoolId, UserId), FixedPoint>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shares_of(&self, pool_id: PoolId, owner: &UserId) -> FixedPoint {
        self.positions
            .get(&(pool_id, owner.clone()))
            .map(|entry| *entry.value())
            .unwrap_or(FixedPoint::ZERO)
    }

    pub fn mint(&self, pool_id: PoolId, owner: &UserId, shares: FixedPoint) -> Result<()> {
        let mut entry = self
            .positions
            .entry((pool_id, owner.clone()))
            .or_insert(FixedPoint::ZERO);
        let updated = entry.value().checked_add(shares)?;
        *entry.value_mut() = updated;
        Ok(())
    }

    /// Burn shares from a position; the position disappears at zero.
    pub fn burn(&self, pool_id: PoolId, owner: &UserId, shares: FixedPoint) -> Result<()> {
        let key = (pool_id, owner.clone());
        {
            let mut entry =
                self.positions
                    .get_mut(&key)
                    .ok_or_else(|| EngineError::InsufficientShares {
                        requested: shares,
                        owned: FixedPoint::ZERO,
                    })?;
            let owned = *entry.value();
            let remaining =
                owned
                    .checked_sub(shares)
                    .map_err(|_| EngineError::InsufficientShares {
                        requested: shares,
                        owned,
                    })?;
            *entry.value_mut() = remaining;
        }
        self.positions.remove_if(&key, |_, shares| shares.is_zero());
        Ok(())
    }

    pub fn positions_for_pool(&self, pool_id: PoolId) -> Vec<LpPosition> {
        self.positions
            .iter()
            .filter(|entry| entry.key().0 == pool_id)
            .map(|entry| LpPosition {
                pool_id,
                owner_id: entry.key().1.clone(),
                shares: *entry.value(),
            })
            .collect()
    }

    /// Sum of outstanding shares for a pool, for share-supply audits.
    pub fn total_for_pool(&self, pool_id: PoolId) -> FixedPoint {
        self.positions_for_pool(pool_id)
            .into_iter()
            .fold(FixedPoint::ZERO, |acc, position| {
                acc.checked_add(position.shares).unwrap_or(acc)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_accumulates() {
        let book = PositionBook::new();
        let pool_id = PoolId::new();
        let owner = UserId::from("lp-1");

        book.mint(pool_id, &owner, FixedPoint::from_raw(100)).unwrap();
        book.mint(pool_id, &owner, FixedPoint::from_raw(50)).unwrap();
        assert_eq!(book.shares_of(pool_id, &owner), FixedPoint::from_raw(150));
    }

    #[test]
    fn test_burn_to_zero_removes_position() {
        let book = PositionBook::new();
        let pool_id = PoolId::new();
        let owner = UserId::from("lp-1");

        book.mint(pool_id, &owner, FixedPoint::from_raw(100)).unwrap();
        book.burn(pool_id, &owner, FixedPoint::from_raw(100)).unwrap();

        assert_eq!(book.shares_of(pool_id, &owner), FixedPoint::ZERO);
        assert!(book.positions_for_pool(pool_id).is_empty());
    }

    #[test]
    fn test_burn_more_than_owned_rejected() {
        let book = PositionBook::new();
        let pool_id = PoolId::new();
        let owner = UserId::from("lp-1");

        book.mint(pool_id, &owner, FixedPoint::from_raw(10)).unwrap();
        let result = book.burn(pool_id, &owner, FixedPoint::from_raw(11));
        assert!(matches!(
            result,
            Err(EngineError::InsufficientShares { .. })
        ));
        assert_eq!(book.shares_of(pool_id, &owner), FixedPoint::from_raw(10));
    }

    #[test]
    fn test_total_sums_all_owners() {
        let book = PositionBook::new();
        let pool_id = PoolId::new();

        book.mint(pool_id, &UserId::from("a"), FixedPoint::from_raw(30))
            .unwrap();
        book.mint(pool_id, &UserId::from("b"), FixedPoint::from_raw(70))
            .unwrap();
        // A different pool's positions don't leak in
        book.mint(PoolId::new(), &UserId::from("c"), FixedPoint::from_raw(999))
            .unwrap();

        assert_eq!(book.total_for_pool(pool_id), FixedPoint::from_raw(100));
    }
}

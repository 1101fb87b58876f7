//! LP-share accounting: proportional mint on deposit, burn on withdrawal.
//!
//! Deposits must arrive in the pool's current reserve ratio; the required
//! token side and the minted shares are both floored so the pool never
//! credits more than the contribution is worth. Withdrawals are floored
//! symmetrically so the pool never pays out more than the proportional
//! claim. Whether a caller actually owns the shares being burned is the
//! engine's check, against its position book.

use crate::{AmmError, Result};
use types::{FixedPoint, Reserves};

/// Quote for a ratio-matched deposit into an existing pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositQuote {
    /// Tokens the depositor must supply alongside the mana.
    pub token_in_required: FixedPoint,
    pub lp_shares_minted: FixedPoint,
}

/// Quote for burning LP shares back into reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawQuote {
    pub mana_out: FixedPoint,
    pub token_out: FixedPoint,
}

pub struct LiquidityMath;

impl LiquidityMath {
    /// Compute the token requirement and share mint for a deposit of
    /// `mana_in` into an existing pool.
    ///
    /// `token_in_required = mana_in * token_reserve / mana_reserve` and
    /// `lp_shares_minted = total_lp_shares * mana_in / mana_reserve`, both
    /// floored.
    pub fn quote_deposit(
        reserves: &Reserves,
        total_lp_shares: FixedPoint,
        mana_in: FixedPoint,
    ) -> Result<DepositQuote> {
        if mana_in.is_zero() {
            return Err(AmmError::InvalidAmount("deposit amount must be positive"));
        }
        if !reserves.both_positive() || total_lp_shares.is_zero() {
            return Err(AmmError::InsufficientLiquidity(
                "pool has no reserves to match against",
            ));
        }

        let token_in_required = mana_in.mul_div_floor(reserves.token, reserves.mana)?;
        let lp_shares_minted = mana_in.mul_div_floor(total_lp_shares, reserves.mana)?;
        if lp_shares_minted.is_zero() {
            return Err(AmmError::InvalidAmount("deposit too small to mint any shares"));
        }

        Ok(DepositQuote {
            token_in_required,
            lp_shares_minted,
        })
    }

    /// Compute the proportional payout for burning `lp_shares`.
    ///
    /// Both sides floored. Fails if the burn would exceed the outstanding
    /// supply, or would drain a reserve to zero while shares remain — a
    /// live pool never has an empty side.
    pub fn quote_withdraw(
        reserves: &Reserves,
        total_lp_shares: FixedPoint,
        lp_shares: FixedPoint,
    ) -> Result<WithdrawQuote> {
        if lp_shares.is_zero() {
            return Err(AmmError::InvalidAmount("withdrawal shares must be positive"));
        }
        if lp_shares > total_lp_shares {
            return Err(AmmError::InsufficientShares {
                requested: lp_shares,
                available: total_lp_shares,
            });
        }

        let mana_out = lp_shares.mul_div_floor(reserves.mana, total_lp_shares)?;
        let token_out = lp_shares.mul_div_floor(reserves.token, total_lp_shares)?;

        if mana_out >= reserves.mana || token_out >= reserves.token {
            return Err(AmmError::InsufficientLiquidity(
                "withdrawal would drain a reserve to zero",
            ));
        }

        Ok(WithdrawQuote { mana_out, token_out })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_reserves() -> Reserves {
        Reserves::new(FixedPoint::from_raw(50_000), FixedPoint::from_raw(100_000))
    }

    #[test]
    fn test_deposit_matches_reserve_ratio() {
        let total = FixedPoint::from_raw(1_000_000);
        let quote = LiquidityMath::quote_deposit(
            &reference_reserves(),
            total,
            FixedPoint::from_raw(5000),
        )
        .unwrap();

        // token_in = 5000 * 100_000 / 50_000 = 10_000
        assert_eq!(quote.token_in_required.raw(), 10_000);
        // shares = 1_000_000 * 5000 / 50_000 = 100_000
        assert_eq!(quote.lp_shares_minted.raw(), 100_000);
    }

    #[test]
    fn test_deposit_floors_in_pool_favor() {
        // Awkward ratio: 3 mana / 7 tokens, total 10 shares
        let reserves = Reserves::new(FixedPoint::from_raw(3), FixedPoint::from_raw(7));
        let total = FixedPoint::from_raw(10);
        let quote =
            LiquidityMath::quote_deposit(&reserves, total, FixedPoint::from_raw(2)).unwrap();

        // token_in = floor(2 * 7 / 3) = 4, shares = floor(2 * 10 / 3) = 6
        assert_eq!(quote.token_in_required.raw(), 4);
        assert_eq!(quote.lp_shares_minted.raw(), 6);
    }

    #[test]
    fn test_withdraw_proportional_and_floored() {
        let total = FixedPoint::from_raw(1_000_000);
        let quote = LiquidityMath::quote_withdraw(
            &reference_reserves(),
            total,
            FixedPoint::from_raw(100_000),
        )
        .unwrap();

        // 10% of the pool, exactly
        assert_eq!(quote.mana_out.raw(), 5000);
        assert_eq!(quote.token_out.raw(), 10_000);
    }

    #[test]
    fn test_deposit_then_withdraw_reconstructs_within_dust() {
        let reserves = reference_reserves();
        let total = FixedPoint::from_raw(1_000_000);
        let mana_in = FixedPoint::from_raw(7777);

        let deposit = LiquidityMath::quote_deposit(&reserves, total, mana_in).unwrap();

        let reserves_after = Reserves::new(
            reserves.mana.checked_add(mana_in).unwrap(),
            reserves
                .token
                .checked_add(deposit.token_in_required)
                .unwrap(),
        );
        let total_after = total.checked_add(deposit.lp_shares_minted).unwrap();

        let withdraw =
            LiquidityMath::quote_withdraw(&reserves_after, total_after, deposit.lp_shares_minted)
                .unwrap();

        // Flooring both ways: never more than deposited, short by at most dust
        assert!(withdraw.mana_out <= mana_in);
        assert!(withdraw.token_out <= deposit.token_in_required);
        assert!(mana_in.raw() - withdraw.mana_out.raw() <= 2);
        assert!(deposit.token_in_required.raw() - withdraw.token_out.raw() <= 2);
    }

    #[test]
    fn test_withdraw_more_than_outstanding_rejected() {
        let total = FixedPoint::from_raw(100);
        let result = LiquidityMath::quote_withdraw(
            &reference_reserves(),
            total,
            FixedPoint::from_raw(101),
        );
        assert!(matches!(result, Err(AmmError::InsufficientShares { .. })));
    }

    #[test]
    fn test_full_exit_rejected_to_keep_pool_alive() {
        let total = FixedPoint::from_raw(100);
        let result =
            LiquidityMath::quote_withdraw(&reference_reserves(), total, FixedPoint::from_raw(100));
        assert!(matches!(result, Err(AmmError::InsufficientLiquidity(_))));
    }

    #[test]
    fn test_zero_inputs_rejected() {
        let total = FixedPoint::from_raw(100);
        assert!(matches!(
            LiquidityMath::quote_deposit(&reference_reserves(), total, FixedPoint::ZERO),
            Err(AmmError::InvalidAmount(_))
        ));
        assert!(matches!(
            LiquidityMath::quote_withdraw(&reference_reserves(), total, FixedPoint::ZERO),
            Err(AmmError::InvalidAmount(_))
        ));
    }
}

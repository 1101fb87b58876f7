//! Constant-product swap quoting with exact fixed-point math.
//!
//! Quotes are pure functions over a [`Reserves`] snapshot; the executor is
//! responsible for re-quoting against the freshest state once it holds the
//! pool lock. The fee is always taken from the side entering the pool:
//! buys charge it on the mana input before the swap, sells take it out of
//! the gross mana proceeds after the swap. Either way the fee stays in the
//! pool's mana reserve, so the committed product strictly grows whenever a
//! fee was charged.

use crate::{AmmError, Result};
use rust_decimal::Decimal;
use types::fixed_point::ceil_div;
use types::{FixedPoint, Reserves};

/// Result of pricing a buy (mana in, tokens out).
#[derive(Debug, Clone, PartialEq)]
pub struct BuyQuote {
    pub tokens_out: FixedPoint,
    pub fee_amount: FixedPoint,
    /// Relative price move caused by this trade, as an absolute fraction.
    /// Reporting only; never fed back into reserve math.
    pub price_impact: Decimal,
    /// Reserves to commit if this quote executes (fee already accrued).
    pub reserves_after: Reserves,
}

/// Result of pricing a sell (tokens in, mana out).
#[derive(Debug, Clone, PartialEq)]
pub struct SellQuote {
    pub mana_out: FixedPoint,
    pub fee_amount: FixedPoint,
    pub price_impact: Decimal,
    pub reserves_after: Reserves,
}

/// Stateless constant-product pricing functions.
pub struct QuoteEngine;

impl QuoteEngine {
    /// Price a buy of tokens with `mana_in` against a pool snapshot.
    ///
    /// The fee is charged on the input up front (rounded up), the swap runs
    /// on the net amount, and the post-trade token reserve is rounded up so
    /// the curve product never decreases. The full input, fee included,
    /// lands in the committed mana reserve.
    pub fn quote_buy(reserves: &Reserves, mana_in: FixedPoint, fee_bps: u32) -> Result<BuyQuote> {
        if mana_in.is_zero() {
            return Err(AmmError::InvalidAmount("buy amount must be positive"));
        }
        if !reserves.both_positive() {
            return Err(AmmError::InsufficientLiquidity("pool has an empty reserve"));
        }

        let fee_amount = mana_in.mul_bps_ceil(fee_bps)?;
        let mana_in_after_fee = mana_in.checked_sub(fee_amount)?;
        if mana_in_after_fee.is_zero() {
            return Err(AmmError::InvalidAmount("buy amount consumed entirely by fee"));
        }

        let k = reserves.constant_product()?;
        let curve_mana = reserves.mana.checked_add(mana_in_after_fee)?;
        let new_token = FixedPoint::from_raw(ceil_div(k, curve_mana.raw())?);

        // curve_mana > mana_reserve guarantees new_token <= token_reserve
        let tokens_out = reserves.token.checked_sub(new_token)?;
        if tokens_out.is_zero() {
            return Err(AmmError::InvalidAmount("buy amount too small for any output"));
        }
        if tokens_out >= reserves.token {
            return Err(AmmError::InsufficientLiquidity(
                "buy would drain the token reserve",
            ));
        }

        // Fee accrues to the pool: the full input lands in the mana reserve
        let committed_mana = reserves.mana.checked_add(mana_in)?;
        let reserves_after = Reserves::new(committed_mana, new_token);

        Ok(BuyQuote {
            tokens_out,
            fee_amount,
            price_impact: price_impact(reserves, curve_mana, new_token),
            reserves_after,
        })
    }

    /// Price a sell of `tokens_in` for mana against a pool snapshot.
    ///
    /// The swap runs on the gross token input, the post-trade mana reserve
    /// is rounded up, and the fee is taken out of the gross mana proceeds
    /// (reducing the payout, not the input). The fee stays in the committed
    /// mana reserve.
    pub fn quote_sell(reserves: &Reserves, tokens_in: FixedPoint, fee_bps: u32) -> Result<SellQuote> {
        if tokens_in.is_zero() {
            return Err(AmmError::InvalidAmount("sell amount must be positive"));
        }
        if !reserves.both_positive() {
            return Err(AmmError::InsufficientLiquidity("pool has an empty reserve"));
        }

        let k = reserves.constant_product()?;
        let new_token = reserves.token.checked_add(tokens_in)?;
        let new_mana = FixedPoint::from_raw(ceil_div(k, new_token.raw())?);

        // new_token > token_reserve guarantees new_mana <= mana_reserve
        let gross_mana_out = reserves.mana.checked_sub(new_mana)?;
        let fee_amount = gross_mana_out.mul_bps_ceil(fee_bps)?;
        let mana_out = gross_mana_out.checked_sub(fee_amount)?;
        if mana_out.is_zero() {
            return Err(AmmError::InvalidAmount("sell amount too small for any payout"));
        }
        if mana_out >= reserves.mana {
            return Err(AmmError::InsufficientLiquidity(
                "sell would drain the mana reserve",
            ));
        }

        // Fee accrues to the pool on top of the curve floor
        let committed_mana = new_mana.checked_add(fee_amount)?;
        let reserves_after = Reserves::new(committed_mana, new_token);

        Ok(SellQuote {
            mana_out,
            fee_amount,
            price_impact: price_impact(reserves, new_mana, new_token),
            reserves_after,
        })
    }
}

/// `|1 - (new_mana/new_token) / (mana/token)|` over the curve reserves.
fn price_impact(before: &Reserves, curve_mana: FixedPoint, curve_token: FixedPoint) -> Decimal {
    let old_price = match before.spot_price() {
        Some(p) if !p.is_zero() => p,
        _ => return Decimal::ZERO,
    };
    if curve_token.is_zero() {
        return Decimal::ZERO;
    }
    let new_price = curve_mana.to_decimal() / curve_token.to_decimal();
    (Decimal::ONE - new_price / old_price).abs()
}

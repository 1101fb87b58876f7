//! # Manaswap AMM Library - Constant-Product Pricing Engine
//!
//! ## Purpose
//!
//! Pure mathematical core for the Manaswap memecoin exchange: exact
//! constant-product (x*y=k) swap quoting and proportional LP-share
//! accounting over immutable pool snapshots. All arithmetic is
//! fixed-point integer math with explicit per-call rounding, so the
//! fee-inclusive invariant `k_after >= k_before` is checkable exactly,
//! with zero floating-point drift.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots read by the trade executor after it
//!   holds the pool lock; fee rate from engine configuration
//! - **Output Destinations**: Trade executor (quote + committed reserves),
//!   liquidity manager (share mint/burn amounts), read-only quote APIs
//! - **Precision**: All amounts in smallest units ([`types::FixedPoint`]);
//!   `Decimal` only for reporting-only ratios (price impact)
//! - **Statelessness**: No function here mutates anything or performs I/O;
//!   quoting never takes a lock
//!
//! ## Rounding Discipline
//!
//! The pool side of every division rounds in the pool's favor: post-trade
//! reserve floors round up, trader payouts round down, fees charged round
//! up. The trader absorbs sub-unit dust, which keeps the constant product
//! non-decreasing under any committed trade sequence.

pub mod liquidity;
pub mod quote;

pub use liquidity::{DepositQuote, LiquidityMath, WithdrawQuote};
pub use quote::{BuyQuote, QuoteEngine, SellQuote};

use thiserror::Error;
use types::FixedPointError;

/// Errors surfaced by quote-time math. All are side-effect free: a failed
/// quote means the trade never started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(&'static str),

    #[error("Insufficient shares: requested {requested} of {available} outstanding")]
    InsufficientShares {
        requested: types::FixedPoint,
        available: types::FixedPoint,
    },

    #[error(transparent)]
    Arithmetic(#[from] FixedPointError),
}

pub type Result<T> = std::result::Result<T, AmmError>;

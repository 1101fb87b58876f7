//! # Manaswap Types - Shared Type System for the AMM Engine
//!
//! ## Purpose
//!
//! Unified type foundation for all Manaswap engine crates: fixed-point
//! monetary amounts, opaque identifiers, and the pool/position/trade data
//! model with its invariant predicates. Every other crate builds on these
//! types so that reserve arithmetic, audit records, and persistence all
//! agree on one representation.
//!
//! ## Critical Rules
//!
//! 1. **NO FLOATING POINT**: never use f32/f64 for reserve or amount math.
//!    All quantities are [`FixedPoint`] integers in smallest units.
//! 2. **Explicit rounding**: every division picks floor or ceil at the call
//!    site. Amounts charged to a trader round up, amounts paid out round
//!    down, so a pool never loses sub-unit dust.
//! 3. **Checked arithmetic**: operations fail with
//!    [`FixedPointError::ArithmeticOverflow`] instead of wrapping.
//! 4. **Nanosecond timestamps**: all `*_ns` fields carry nanoseconds since
//!    the Unix epoch, never truncated to milliseconds.

pub mod fixed_point;
pub mod ids;
pub mod pool;
pub mod time;
pub mod trade;

pub use fixed_point::{FixedPoint, FixedPointError, BPS_DENOMINATOR, SCALE};
pub use ids::{PoolId, TradeId, UserId};
pub use pool::{LpPosition, Pool, PoolSummary, Reserves};
pub use time::now_ns;
pub use trade::{Trade, TradeSide};

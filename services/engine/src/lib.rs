//! # Manaswap Engine - Constant-Product AMM Execution Service
//!
//! ## Purpose
//!
//! The stateful half of the Manaswap exchange: pool creation and lookup,
//! trade execution with per-pool exclusivity, liquidity provisioning, and
//! the append-only trade log. Pricing itself lives in `manaswap-amm`;
//! this crate owns the discipline around it — locking, re-quoting,
//! slippage enforcement, ledger settlement, and versioned commits.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Trade/deposit/withdraw requests from the product
//!   API layer; quotes served read-only without locking
//! - **Output Destinations**: Balance Ledger (currency custody, external),
//!   Pool Store (durable pool state with compare-and-swap), trade log
//! - **Boundaries**: [`BalanceLedger`] and [`PoolStore`] are traits; the
//!   in-memory implementations back tests and the demo binary
//!
//! ## Consistency Model
//!
//! One writer per pool at a time, enforced by a per-pool async mutex held
//! across the trade protocol; no cross-pool locking. Committed trades per
//! pool form a total order whose sequential replay reproduces the final
//! state. The ledger call is the only external I/O inside the critical
//! section and runs under a bounded timeout.

pub mod engine;
pub mod error;
pub mod executor;
pub mod holdings;
pub mod ledger;
pub mod liquidity;
pub mod locks;
pub mod positions;
pub mod registry;
pub mod store;
pub mod trade_log;

pub use engine::Engine;
pub use error::{EngineError, Result};
pub use executor::TradeExecutor;
pub use holdings::TokenHoldings;
pub use ledger::{BalanceLedger, InMemoryLedger, LedgerError};
pub use liquidity::{DepositReceipt, LiquidityManager, WithdrawReceipt};
pub use locks::PoolLocks;
pub use positions::PositionBook;
pub use registry::PoolRegistry;
pub use store::{InMemoryPoolStore, PoolStore, StoreError};
pub use trade_log::TradeLog;

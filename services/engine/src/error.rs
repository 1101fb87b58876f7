//! Engine error taxonomy.
//!
//! Quote-time failures (amount validity, liquidity, slippage) are
//! recoverable and side-effect free: the trade never started. Concurrency
//! conflicts are "try again" failures. [`EngineError::CommitFailed`] is
//! the one terminal condition: a ledger debit landed but the pool commit
//! could not be persisted within its retry budget — it is logged loudly
//! and surfaced for reconciliation, never swallowed.

use crate::ledger::LedgerError;
use crate::store::StoreError;
use manaswap_amm::AmmError;
use thiserror::Error;
use types::{FixedPoint, FixedPointError, PoolId, UserId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("No pool for symbol: {0}")]
    UnknownSymbol(String),

    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Slippage exceeded: realized output {output} below floor {min_output}")]
    SlippageExceeded {
        output: FixedPoint,
        min_output: FixedPoint,
    },

    #[error("Insufficient balance for user {user}")]
    InsufficientBalance { user: UserId },

    #[error("Insufficient shares: requested {requested}, owned {owned}")]
    InsufficientShares {
        requested: FixedPoint,
        owned: FixedPoint,
    },

    #[error("Deposit ratio mismatch: supplied {supplied} tokens, required {required}")]
    RatioMismatch {
        supplied: FixedPoint,
        required: FixedPoint,
    },

    #[error("Concurrency conflict on pool {0}: try again")]
    ConcurrencyConflict(PoolId),

    #[error("Ledger call timed out after {0} ms")]
    LedgerTimeout(u64),

    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("Trade debited but pool commit failed for {pool_id}: manual reconciliation required")]
    CommitFailed { pool_id: PoolId },

    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(transparent)]
    Arithmetic(#[from] FixedPointError),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl EngineError {
    /// Translate a ledger failure on a debit of `user`.
    pub(crate) fn from_debit_failure(err: LedgerError, user: &UserId) -> Self {
        match err {
            LedgerError::InsufficientBalance { .. } => EngineError::InsufficientBalance {
                user: user.clone(),
            },
            LedgerError::Unavailable(msg) => EngineError::LedgerUnavailable(msg),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(pool_id) => EngineError::PoolNotFound(pool_id),
            StoreError::SymbolNotFound(symbol) => EngineError::UnknownSymbol(symbol),
            StoreError::DuplicateId(_) => EngineError::Store(err),
            StoreError::DuplicateSymbol(symbol) => EngineError::DuplicateSymbol(symbol),
            StoreError::VersionConflict { pool_id, .. } => EngineError::ConcurrencyConflict(pool_id),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

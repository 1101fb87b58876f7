//! Balance Ledger boundary.
//!
//! The ledger custodies the base currency (mana) and is external to the
//! engine: the engine only ever asks it to debit or credit a user
//! atomically. Token accounting never crosses this boundary. Every call
//! is made under a bounded timeout by the callers in this crate; the
//! trait itself stays transport-agnostic.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use types::{FixedPoint, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {user}: requested {requested}, available {available}")]
    InsufficientBalance {
        user: UserId,
        requested: FixedPoint,
        available: FixedPoint,
    },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Atomic debit/credit of a user's spendable mana.
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    async fn debit(&self, user: &UserId, amount: FixedPoint) -> Result<(), LedgerError>;
    async fn credit(&self, user: &UserId, amount: FixedPoint) -> Result<(), LedgerError>;
}

/// Debit under the engine's ledger timeout, mapping failures into the
/// engine taxonomy. A timeout means the pool must remain untouched.
pub(crate) async fn debit_with_timeout(
    ledger: &dyn BalanceLedger,
    user: &UserId,
    amount: FixedPoint,
    timeout_ms: u64,
) -> crate::error::Result<()> {
    let deadline = std::time::Duration::from_millis(timeout_ms);
    match tokio::time::timeout(deadline, ledger.debit(user, amount)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(crate::error::EngineError::from_debit_failure(err, user)),
        Err(_) => Err(crate::error::EngineError::LedgerTimeout(timeout_ms)),
    }
}

/// Credit under the engine's ledger timeout.
pub(crate) async fn credit_with_timeout(
    ledger: &dyn BalanceLedger,
    user: &UserId,
    amount: FixedPoint,
    timeout_ms: u64,
) -> crate::error::Result<()> {
    let deadline = std::time::Duration::from_millis(timeout_ms);
    match tokio::time::timeout(deadline, ledger.credit(user, amount)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(LedgerError::Unavailable(msg))) => {
            Err(crate::error::EngineError::LedgerUnavailable(msg))
        }
        Ok(Err(err)) => Err(crate::error::EngineError::LedgerUnavailable(err.to_string())),
        Err(_) => Err(crate::error::EngineError::LedgerTimeout(timeout_ms)),
    }
}

/// In-process ledger used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: DashMap<UserId, FixedPoint>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a starting balance (test/demo setup only).
    pub fn seed(&self, user: UserId, amount: FixedPoint) {
        self.balances.insert(user, amount);
    }

    pub fn balance_of(&self, user: &UserId) -> FixedPoint {
        self.balances
            .get(user)
            .map(|entry| *entry.value())
            .unwrap_or(FixedPoint::ZERO)
    }
}

#[async_trait]
impl BalanceLedger for InMemoryLedger {
    async fn debit(&self, user: &UserId, amount: FixedPoint) -> Result<(), LedgerError> {
        let mut entry = self
            .balances
            .entry(user.clone())
            .or_insert(FixedPoint::ZERO);
        let available = *entry.value();
        let remaining = available
            .checked_sub(amount)
            .map_err(|_| LedgerError::InsufficientBalance {
                user: user.clone(),
                requested: amount,
                available,
            })?;
        *entry.value_mut() = remaining;
        Ok(())
    }

    async fn credit(&self, user: &UserId, amount: FixedPoint) -> Result<(), LedgerError> {
        let mut entry = self
            .balances
            .entry(user.clone())
            .or_insert(FixedPoint::ZERO);
        let updated = entry
            .value()
            .checked_add(amount)
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        *entry.value_mut() = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_and_credit() {
        let ledger = InMemoryLedger::new();
        let user = UserId::from("trader-1");
        ledger.seed(user.clone(), FixedPoint::from_units(100));

        ledger
            .debit(&user, FixedPoint::from_units(40))
            .await
            .unwrap();
        ledger
            .credit(&user, FixedPoint::from_units(15))
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(&user), FixedPoint::from_units(75));
    }

    #[tokio::test]
    async fn test_overdraft_rejected_without_mutation() {
        let ledger = InMemoryLedger::new();
        let user = UserId::from("trader-1");
        ledger.seed(user.clone(), FixedPoint::from_units(10));

        let result = ledger.debit(&user, FixedPoint::from_units(11)).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.balance_of(&user), FixedPoint::from_units(10));
    }

    #[tokio::test]
    async fn test_unknown_user_has_zero_balance() {
        let ledger = InMemoryLedger::new();
        let user = UserId::from("nobody");
        assert_eq!(ledger.balance_of(&user), FixedPoint::ZERO);
        assert!(ledger.debit(&user, FixedPoint::from_raw(1)).await.is_err());
    }
}

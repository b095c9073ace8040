//! Account - Native currency balance held by the custodian
//!
//! Holders, the custodial account and the treasury each own one account.
//! Key characteristics:
//! - Balances are unsigned; a debit can never overdraw
//! - Version field bumps on every mutation for optimistic concurrency
//! - Zero-amount movements are rejected; callers skip them

use super::address::{Address, Amount};
use crate::error::TransferError;
use serde::{Deserialize, Serialize};

/// Balance record for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub owner: Address,

    /// Spendable balance
    pub available: Amount,

    /// Version for optimistic concurrency control
    pub version: u64,

    /// Timestamp of last modification (Unix milliseconds)
    pub updated_at: i64,
}

impl Account {
    /// Create a new empty account
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            available: 0,
            version: 0,
            updated_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create an account with initial balance
    pub fn with_balance(owner: Address, initial_balance: Amount) -> Self {
        let mut account = Self::new(owner);
        account.available = initial_balance;
        account
    }

    pub fn credit(&mut self, amount: Amount) -> Result<(), TransferError> {
        if amount == 0 {
            return Err(TransferError::Rejected("amount must be positive".into()));
        }

        self.available = self
            .available
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow(self.owner.clone()))?;
        self.touch();
        Ok(())
    }

    pub fn debit(&mut self, amount: Amount) -> Result<(), TransferError> {
        if amount == 0 {
            return Err(TransferError::Rejected("amount must be positive".into()));
        }

        if self.available < amount {
            return Err(TransferError::InsufficientBalance {
                account: self.owner.clone(),
                required: amount,
                available: self.available,
            });
        }

        self.available -= amount;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Account({}, available={})", self.owner, self.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_debit() {
        let mut account = Account::new(Address::new("farmer"));

        account.credit(100).unwrap();
        assert_eq!(account.available, 100);

        account.debit(30).unwrap();
        assert_eq!(account.available, 70);
        assert_eq!(account.version, 2);
    }

    #[test]
    fn test_insufficient_balance() {
        let mut account = Account::with_balance(Address::new("farmer"), 50);
        let result = account.debit(100);
        assert!(matches!(result, Err(TransferError::InsufficientBalance { .. })));
        assert_eq!(account.available, 50);
        assert_eq!(account.version, 0);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut account = Account::new(Address::new("farmer"));
        assert!(account.credit(0).is_err());
        assert!(account.debit(0).is_err());
    }

    #[test]
    fn test_credit_overflow() {
        let mut account = Account::with_balance(Address::new("whale"), Amount::MAX);
        assert!(matches!(account.credit(1), Err(TransferError::Overflow(_))));
    }
}

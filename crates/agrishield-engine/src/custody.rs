//! Fund custody
//!
//! All native-currency movement goes through a [`Custodian`]. A batch of
//! transfers is all-or-nothing: if any leg fails, no balance changes.

use agrishield_common::{error::TransferError, Account, Address, Amount};
use std::collections::HashMap;
use tracing::debug;

/// Single fund movement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(from: &Address, to: &Address, amount: Amount) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            amount,
        }
    }
}

/// Moves funds between accounts
pub trait Custodian: Send {
    /// Apply every transfer or none. Zero-amount legs are skipped; a leg
    /// whose source and target coincide fails the batch.
    fn execute(&mut self, transfers: &[Transfer]) -> Result<(), TransferError>;

    /// Spendable balance of an address (0 if unknown)
    fn balance(&self, address: &Address) -> Amount;
}

/// Custodian backed by in-process account records
#[derive(Debug, Default)]
pub struct InMemoryCustodian {
    accounts: HashMap<Address, Account>,
}

impl InMemoryCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an address from outside the system
    pub fn deposit(&mut self, address: &Address, amount: Amount) -> Result<(), TransferError> {
        self.accounts
            .entry(address.clone())
            .or_insert_with(|| Account::new(address.clone()))
            .credit(amount)
    }

    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }
}

impl Custodian for InMemoryCustodian {
    fn execute(&mut self, transfers: &[Transfer]) -> Result<(), TransferError> {
        let mut staged: HashMap<Address, Account> = HashMap::new();

        for transfer in transfers.iter().filter(|t| t.amount > 0) {
            if transfer.from == transfer.to {
                return Err(TransferError::SelfTransfer(transfer.from.clone()));
            }
            for address in [&transfer.from, &transfer.to] {
                if !staged.contains_key(address) {
                    let account = self
                        .accounts
                        .get(address)
                        .cloned()
                        .unwrap_or_else(|| Account::new(address.clone()));
                    staged.insert(address.clone(), account);
                }
            }

            if let Some(source) = staged.get_mut(&transfer.from) {
                source.debit(transfer.amount)?;
            }
            if let Some(target) = staged.get_mut(&transfer.to) {
                target.credit(transfer.amount)?;
            }

            debug!(
                from = %transfer.from,
                to = %transfer.to,
                amount = transfer.amount,
                "Transfer staged"
            );
        }

        self.accounts.extend(staged);
        Ok(())
    }

    fn balance(&self, address: &Address) -> Amount {
        self.accounts.get(address).map_or(0, |a| a.available)
    }
}

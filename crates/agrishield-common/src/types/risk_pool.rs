//! RiskPool - Per crop-type reserve ledger
//!
//! Pools accumulate premium contributions (net of protocol fee) and fund
//! payouts and refunds. Conservation holds at all times:
//!
//! ```text
//! available_funds = total_premiums - total_payouts - total_refunds
//! ```
//!
//! Debits are checked; a pool never goes negative.

use super::address::Amount;
use crate::error::TransferError;
use serde::{Deserialize, Serialize};

/// Aggregate reserve for one crop type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskPool {
    pub crop_type: String,
    /// Contributions ever received, net of fee
    pub total_premiums: Amount,
    pub total_payouts: Amount,
    pub total_refunds: Amount,
    pub active_policies: u64,
    /// Target reserve ratio in basis points (informational)
    pub reserve_ratio_bps: u32,
    pub available_funds: Amount,
}

impl RiskPool {
    /// New pool seeded by its first policy's contribution
    pub fn new(crop_type: impl Into<String>, contribution: Amount, reserve_ratio_bps: u32) -> Self {
        Self {
            crop_type: crop_type.into(),
            total_premiums: contribution,
            total_payouts: 0,
            total_refunds: 0,
            active_policies: 1,
            reserve_ratio_bps,
            available_funds: contribution,
        }
    }

    /// Copy with a new policy's contribution added
    pub fn with_contribution(&self, contribution: Amount) -> Result<Self, TransferError> {
        let overflow = || TransferError::Rejected(format!("{} pool overflow", self.crop_type));
        Ok(Self {
            total_premiums: self.total_premiums.checked_add(contribution).ok_or_else(overflow)?,
            available_funds: self.available_funds.checked_add(contribution).ok_or_else(overflow)?,
            active_policies: self.active_policies + 1,
            ..self.clone()
        })
    }

    /// Copy with a payout debited
    pub fn with_payout(&self, amount: Amount) -> Result<Self, TransferError> {
        let available_funds = self.debit(amount)?;
        Ok(Self {
            total_payouts: self.total_payouts.saturating_add(amount),
            active_policies: self.active_policies.saturating_sub(1),
            available_funds,
            ..self.clone()
        })
    }

    /// Copy with a refund debited; recorded premiums and payouts are unchanged
    pub fn with_refund(&self, amount: Amount) -> Result<Self, TransferError> {
        let available_funds = self.debit(amount)?;
        Ok(Self {
            total_refunds: self.total_refunds.saturating_add(amount),
            active_policies: self.active_policies.saturating_sub(1),
            available_funds,
            ..self.clone()
        })
    }

    /// Conservation check
    pub fn is_balanced(&self) -> bool {
        self.total_premiums
            .checked_sub(self.total_payouts)
            .and_then(|v| v.checked_sub(self.total_refunds))
            == Some(self.available_funds)
    }

    fn debit(&self, amount: Amount) -> Result<Amount, TransferError> {
        self.available_funds
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientPoolReserve {
                crop_type: self.crop_type.clone(),
                required: amount,
                available: self.available_funds,
            })
    }
}

//! Risk pool ledger
//!
//! Owns every [`RiskPool`]. Mutations are staged as whole-record copies and
//! written back with [`RiskPoolLedger::commit`] once the surrounding
//! operation can no longer fail.

use agrishield_common::{
    error::{NotFoundError, TransferError},
    AgriShieldError, Amount, RiskPool,
};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct RiskPoolLedger {
    pools: HashMap<String, RiskPool>,
}

impl RiskPoolLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, crop_type: &str) -> Option<&RiskPool> {
        self.pools.get(crop_type)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskPool> {
        self.pools.values()
    }

    /// Pool after a new policy's contribution, creating it if absent
    pub fn stage_contribution(
        &self,
        crop_type: &str,
        contribution: Amount,
        default_reserve_ratio_bps: u32,
    ) -> Result<RiskPool, TransferError> {
        match self.pools.get(crop_type) {
            Some(pool) => pool.with_contribution(contribution),
            None => Ok(RiskPool::new(
                crop_type,
                contribution,
                default_reserve_ratio_bps,
            )),
        }
    }

    /// Pool after a payout; refuses to go below zero
    pub fn stage_payout(&self, crop_type: &str, amount: Amount) -> Result<RiskPool, AgriShieldError> {
        Ok(self.require(crop_type)?.with_payout(amount)?)
    }

    /// Pool after a refund; refuses to go below zero
    pub fn stage_refund(&self, crop_type: &str, amount: Amount) -> Result<RiskPool, AgriShieldError> {
        Ok(self.require(crop_type)?.with_refund(amount)?)
    }

    pub fn commit(&mut self, pool: RiskPool) {
        self.pools.insert(pool.crop_type.clone(), pool);
    }

    fn require(&self, crop_type: &str) -> Result<&RiskPool, NotFoundError> {
        self.pools
            .get(crop_type)
            .ok_or_else(|| NotFoundError::RiskPool(crop_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrishield_common::ErrorKind;

    #[test]
    fn test_upsert() {
        let mut ledger = RiskPoolLedger::new();

        let pool = ledger.stage_contribution("maize", 95, 7000).unwrap();
        assert!(ledger.get("maize").is_none());
        ledger.commit(pool);

        let pool = ledger.stage_contribution("maize", 190, 9000).unwrap();
        ledger.commit(pool);

        let pool = ledger.get("maize").unwrap();
        assert_eq!(pool.total_premiums, 285);
        assert_eq!(pool.active_policies, 2);
        // Existing pool keeps its ratio
        assert_eq!(pool.reserve_ratio_bps, 7000);
    }

    #[test]
    fn test_missing_pool() {
        let ledger = RiskPoolLedger::new();
        let err = ledger.stage_payout("rice", 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_staged_debit_does_not_mutate() {
        let mut ledger = RiskPoolLedger::new();
        ledger.commit(RiskPool::new("maize", 500, 7000));

        let staged = ledger.stage_refund("maize", 200).unwrap();
        assert_eq!(staged.available_funds, 300);
        assert_eq!(ledger.get("maize").unwrap().available_funds, 500);

        let err = ledger.stage_payout("maize", 501).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);
    }
}

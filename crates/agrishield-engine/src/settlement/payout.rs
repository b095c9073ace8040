//! Payout executor - Coverage transfer on a threshold breach

use crate::custody::{Custodian, Transfer};
use crate::oracle::OracleAuthority;
use crate::state::EngineState;
use agrishield_common::{Amount, BlockHeight, LedgerEvent, PolicyId, Result};
use tracing::info;

/// Settles a triggered policy by paying its full coverage
pub struct PayoutExecutor;

impl PayoutExecutor {
    /// Pay out a policy
    ///
    /// Fails `NotFound` for unknown ids and `StateConflict` once settled, so a
    /// second call never pays twice. A pool that cannot cover the amount
    /// fails with `Transfer` before any funds move.
    pub fn execute<A: OracleAuthority, C: Custodian>(
        state: &mut EngineState<A, C>,
        height: BlockHeight,
        policy_id: PolicyId,
    ) -> Result<Amount> {
        let settled = state.policies.mark_paid_out(policy_id)?;
        let amount = settled.coverage_amount;
        let staged_pool = state.pools.stage_payout(&settled.crop_type, amount)?;

        state.custodian.execute(&[Transfer::new(
            &state.config.custody_account,
            &settled.holder,
            amount,
        )])?;

        // Commit
        state.pools.commit(staged_pool);
        state.journal.append(
            height,
            LedgerEvent::PayoutExecuted {
                policy_id,
                holder: settled.holder.clone(),
                crop_type: settled.crop_type.clone(),
                amount,
            },
        );
        info!(
            policy_id,
            holder = %settled.holder,
            crop_type = %settled.crop_type,
            amount,
            "Payout executed"
        );
        state.policies.replace(settled);

        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        fund_pool, issue, policy_app, seeded_state, state_with, FlakyCustodian, FARMER,
    };
    use agrishield_common::{
        error::TransferError, Address, AgriShieldError, ErrorKind, PolicyStatus,
    };

    #[test]
    fn test_payout_updates_pool() {
        let mut state = seeded_state();
        fund_pool(&mut state, 2_000);
        let id = issue(&mut state, 10, policy_app()).policy.id;

        let paid = PayoutExecutor::execute(&mut state, 20, id).unwrap();
        assert_eq!(paid, 1000);

        let pool = state.pools.get("maize").unwrap();
        assert_eq!(pool.total_payouts, 1000);
        assert_eq!(pool.available_funds, 1900 + 95 - 1000);
        assert_eq!(pool.active_policies, 1);
        assert!(pool.is_balanced());
        assert_eq!(state.journal.len(), 1);
    }

    #[test]
    fn test_no_double_payout() {
        let mut state = seeded_state();
        fund_pool(&mut state, 5_000);
        let id = issue(&mut state, 10, policy_app()).policy.id;

        PayoutExecutor::execute(&mut state, 20, id).unwrap();
        let pool_before = state.pools.get("maize").cloned();
        let farmer_before = state.custodian.balance(&Address::new(FARMER));

        let err = PayoutExecutor::execute(&mut state, 21, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(state.pools.get("maize").cloned(), pool_before);
        assert_eq!(state.custodian.balance(&Address::new(FARMER)), farmer_before);
    }

    #[test]
    fn test_underfunded_pool_refused() {
        let mut state = seeded_state();
        let id = issue(&mut state, 10, policy_app()).policy.id;

        let err = PayoutExecutor::execute(&mut state, 20, id).unwrap_err();
        assert!(matches!(
            err,
            AgriShieldError::Transfer(TransferError::InsufficientPoolReserve {
                required: 1000,
                available: 95,
                ..
            })
        ));
        assert_eq!(state.policies.get(id).unwrap().status(), PolicyStatus::Active);
        assert!(state.journal.is_empty());
    }

    #[test]
    fn test_transfer_failure_rolls_back() {
        let mut state = state_with(FlakyCustodian::new());
        fund_pool(&mut state, 2_000);
        let id = issue(&mut state, 10, policy_app()).policy.id;

        state.custodian.offline = true;
        let pool_before = state.pools.get("maize").cloned();
        let farmer_before = state.custodian.balance(&Address::new(FARMER));

        let err = PayoutExecutor::execute(&mut state, 20, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);
        let policy = state.policies.get(id).unwrap();
        assert!(policy.active);
        assert!(!policy.payout_executed);
        assert_eq!(state.pools.get("maize").cloned(), pool_before);
        assert_eq!(state.custodian.balance(&Address::new(FARMER)), farmer_before);
        assert!(state.journal.is_empty());

        // Retry succeeds once the custodian recovers
        state.custodian.offline = false;
        assert_eq!(PayoutExecutor::execute(&mut state, 21, id).unwrap(), 1000);
    }
}

//! Refund calculator - Pro-rata cancellation
//!
//! ```text
//! total     = end - start
//! elapsed   = height - start
//! remaining = total - elapsed          (0 once the window has passed)
//! bps       = remaining × 10000 / total
//! refund    = premium × bps / 10000
//! ```
//!
//! Both divisions truncate. The refund is drawn from pool reserves; recorded
//! premiums and payouts are unchanged.

use crate::custody::{Custodian, Transfer};
use crate::oracle::OracleAuthority;
use crate::state::EngineState;
use agrishield_common::{
    apply_bps, error::AuthorizationError, Amount, BlockHeight, LedgerEvent, Policy, PolicyId,
    Result, TxContext, BPS_DENOMINATOR,
};
use tracing::info;

pub struct RefundCalculator;

impl RefundCalculator {
    /// Share of the window still unused, in basis points
    pub fn refund_bps(policy: &Policy, height: BlockHeight) -> u64 {
        let total = policy.duration();
        if total == 0 {
            return 0;
        }
        let elapsed = height.saturating_sub(policy.start_height);
        let remaining = total.saturating_sub(elapsed);
        ((remaining as u128 * BPS_DENOMINATOR as u128) / total as u128) as u64
    }

    pub fn refund_amount(policy: &Policy, height: BlockHeight) -> Amount {
        let bps = Self::refund_bps(policy, height);
        // bps never exceeds 10000, so the result never exceeds the premium
        apply_bps(policy.premium_amount, bps).unwrap_or(0)
    }

    /// Cancel a policy on behalf of its holder and refund the unused share
    ///
    /// Cancellation after the window ends succeeds with a refund of 0.
    pub fn cancel<A: OracleAuthority, C: Custodian>(
        state: &mut EngineState<A, C>,
        ctx: &TxContext,
        policy_id: PolicyId,
    ) -> Result<Amount> {
        let policy = state.policies.require(policy_id)?;
        if policy.holder != ctx.sender {
            return Err(AuthorizationError::NotPolicyHolder {
                policy_id,
                caller: ctx.sender.clone(),
            }
            .into());
        }

        let cancelled = state.policies.mark_cancelled(policy_id)?;
        let refund = Self::refund_amount(&cancelled, ctx.height);
        let staged_pool = state.pools.stage_refund(&cancelled.crop_type, refund)?;

        state.custodian.execute(&[Transfer::new(
            &state.config.custody_account,
            &cancelled.holder,
            refund,
        )])?;

        // Commit
        state.pools.commit(staged_pool);
        state.journal.append(
            ctx.height,
            LedgerEvent::PolicyCancelled {
                policy_id,
                holder: cancelled.holder.clone(),
                crop_type: cancelled.crop_type.clone(),
                refund,
            },
        );
        info!(
            policy_id,
            holder = %cancelled.holder,
            refund,
            "Policy cancelled"
        );
        state.policies.replace(cancelled);

        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyApplication;
    use crate::testing::{
        fund_pool, issue, policy_app, seeded_state, state_with, FlakyCustodian, FARMER,
    };
    use agrishield_common::{Address, ErrorKind, PolicyStatus};

    fn sample(start: BlockHeight, duration: u64, premium: Amount) -> Policy {
        let mut state = seeded_state();
        let app = PolicyApplication {
            premium_amount: premium,
            duration,
            ..policy_app()
        };
        issue(&mut state, start, app).policy
    }

    #[test]
    fn test_refund_math() {
        let policy = sample(100, 1000, 100);

        assert_eq!(RefundCalculator::refund_amount(&policy, 100), 100);
        assert_eq!(RefundCalculator::refund_amount(&policy, 600), 50);
        assert_eq!(RefundCalculator::refund_bps(&policy, 433), 6670);
        assert_eq!(RefundCalculator::refund_amount(&policy, 433), 66);
        assert_eq!(RefundCalculator::refund_amount(&policy, 1100), 0);
        assert_eq!(RefundCalculator::refund_amount(&policy, 5000), 0);
    }

    #[test]
    fn test_refund_truncation() {
        // 1/3 of window left: 3333 bps of 7 = 2.33 -> 2
        let policy = sample(0, 3000, 7);
        assert_eq!(RefundCalculator::refund_bps(&policy, 2000), 3333);
        assert_eq!(RefundCalculator::refund_amount(&policy, 2000), 2);
    }

    #[test]
    fn test_cancel_updates_pool_and_holder() {
        let mut state = seeded_state();
        let id = issue(&mut state, 100, policy_app()).policy.id;

        let refund = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 600), id).unwrap();
        assert_eq!(refund, 50);

        let policy = state.policies.get(id).unwrap();
        assert_eq!(policy.status(), PolicyStatus::Cancelled);
        assert!(!policy.payout_executed);

        let pool = state.pools.get("maize").unwrap();
        assert_eq!(pool.total_premiums, 95);
        assert_eq!(pool.total_payouts, 0);
        assert_eq!(pool.total_refunds, 50);
        assert_eq!(pool.available_funds, 45);
        assert_eq!(pool.active_policies, 0);
        assert!(pool.is_balanced());
    }

    #[test]
    fn test_cancel_rules() {
        let mut state = seeded_state();
        let id = issue(&mut state, 100, policy_app()).policy.id;

        let err = RefundCalculator::cancel(&mut state, &TxContext::new("stranger", 200), id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 200), 42)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 2000), id).unwrap();
        let err = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 2001), id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_full_refund_exceeding_pool_is_refused() {
        let mut state = seeded_state();
        let id = issue(&mut state, 100, policy_app()).policy.id;

        // Premium 100 but only 95 reached the pool
        let err = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 100), id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(state.policies.get(id).unwrap().active);
        assert_eq!(state.pools.get("maize").unwrap().available_funds, 95);
    }

    #[test]
    fn test_cancel_transfer_failure_rolls_back() {
        let mut state = state_with(FlakyCustodian::new());
        fund_pool(&mut state, 2_000);
        let id = issue(&mut state, 100, policy_app()).policy.id;

        state.custodian.offline = true;
        let pool_before = state.pools.get("maize").cloned();
        let farmer_before = state.custodian.balance(&Address::new(FARMER));

        let err = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 600), id)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transfer);

        let policy = state.policies.get(id).unwrap();
        assert_eq!(policy.status(), PolicyStatus::Active);
        assert_eq!(state.pools.get("maize").cloned(), pool_before);
        assert_eq!(state.custodian.balance(&Address::new(FARMER)), farmer_before);
        assert!(state.journal.is_empty());

        // Same refund once the custodian recovers
        state.custodian.offline = false;
        let refund = RefundCalculator::cancel(&mut state, &TxContext::new(FARMER, 600), id).unwrap();
        assert_eq!(refund, 50);
        assert_eq!(state.policies.get(id).unwrap().status(), PolicyStatus::Cancelled);
    }
}

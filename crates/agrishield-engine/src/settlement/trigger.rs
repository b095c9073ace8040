//! Trigger evaluator
//!
//! One comparison path serves both the automatic fan-out after an observation
//! and manual evaluation requests.

use super::payout::PayoutExecutor;
use crate::custody::Custodian;
use crate::oracle::OracleAuthority;
use crate::state::EngineState;
use agrishield_common::{
    error::NotFoundError, AgriShieldError, BlockHeight, Policy, PolicyId, Result,
    WeatherObservation,
};
use tracing::{debug, warn};

/// Outcome of evaluating every policy at a location
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanOutReport {
    /// Policies paid out
    pub triggered: Vec<PolicyId>,
    /// Policies whose breach could not be settled; they stay active
    pub failed: Vec<(PolicyId, AgriShieldError)>,
    /// Policies evaluated (active and in window)
    pub evaluated: usize,
}

pub struct TriggerEvaluator;

impl TriggerEvaluator {
    /// Pure threshold check: drought OR flood OR frost
    pub fn is_triggered(policy: &Policy, observation: &WeatherObservation) -> bool {
        policy
            .thresholds
            .is_breached(observation.rainfall(), observation.temperature())
    }

    /// Evaluate one policy against the observation at its location and the
    /// current height, paying out on a breach
    ///
    /// Settled or out-of-window policies are a no-op returning `false`.
    pub fn evaluate<A: OracleAuthority, C: Custodian>(
        state: &mut EngineState<A, C>,
        height: BlockHeight,
        policy_id: PolicyId,
    ) -> Result<bool> {
        let policy = state.policies.require(policy_id)?;
        if !policy.is_evaluable(height) {
            debug!(policy_id, height, status = ?policy.status(), "Policy not evaluable");
            return Ok(false);
        }

        let observation = state.weather.get(&policy.location, height).ok_or_else(|| {
            NotFoundError::Observation {
                location: policy.location.clone(),
                height,
            }
        })?;

        if !Self::is_triggered(policy, observation) {
            debug!(policy_id, height, "Thresholds not breached");
            return Ok(false);
        }

        PayoutExecutor::execute(state, height, policy_id)?;
        Ok(true)
    }

    /// Evaluate every evaluable policy at a location
    ///
    /// Each policy settles independently; one failure does not stop the rest.
    pub fn fan_out<A: OracleAuthority, C: Custodian>(
        state: &mut EngineState<A, C>,
        location: &str,
        height: BlockHeight,
    ) -> FanOutReport {
        let mut report = FanOutReport::default();

        for policy_id in state.policies.at_location(location) {
            let evaluable = state
                .policies
                .get(policy_id)
                .is_some_and(|p| p.is_evaluable(height));
            if !evaluable {
                continue;
            }

            report.evaluated += 1;
            match Self::evaluate(state, height, policy_id) {
                Ok(true) => report.triggered.push(policy_id),
                Ok(false) => {}
                Err(err) => {
                    warn!(policy_id, location, height, error = %err, "Automatic payout failed");
                    report.failed.push((policy_id, err));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyApplication;
    use crate::testing::{fund_pool, issue, policy_app, record, seeded_state, FARMER};
    use agrishield_common::{Address, ErrorKind, PolicyStatus};

    #[test]
    fn test_threshold_or_semantics() {
        let mut state = seeded_state();
        let policy = issue(&mut state, 10, policy_app()).policy;
        let obs = |rain, temp| {
            WeatherObservation::new(
                agrishield_common::WeatherReading::new(rain, temp, 50),
                Address::new("oracle"),
            )
        };

        assert!(TriggerEvaluator::is_triggered(&policy, &obs(50, 20)));
        assert!(TriggerEvaluator::is_triggered(&policy, &obs(600, 20)));
        assert!(TriggerEvaluator::is_triggered(&policy, &obs(300, -10)));
        assert!(!TriggerEvaluator::is_triggered(&policy, &obs(300, 10)));
    }

    #[test]
    fn test_missing_observation() {
        let mut state = seeded_state();
        let id = issue(&mut state, 10, policy_app()).policy.id;

        let err = TriggerEvaluator::evaluate(&mut state, 20, id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = TriggerEvaluator::evaluate(&mut state, 20, 77).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_out_of_window_is_noop() {
        let mut state = seeded_state();
        let id = issue(&mut state, 10, policy_app()).policy.id;

        // Drought reading after the window closed
        record(&mut state, 1011, "nakuru", 0, 20);
        assert!(!TriggerEvaluator::evaluate(&mut state, 1011, id).unwrap());
        assert_eq!(state.policies.get(id).unwrap().status(), PolicyStatus::Active);
    }

    #[test]
    fn test_triggered_pays_out() {
        let mut state = seeded_state();
        fund_pool(&mut state, 2_000);
        let id = issue(&mut state, 10, policy_app()).policy.id;

        record(&mut state, 20, "nakuru", 300, -10);
        assert!(TriggerEvaluator::evaluate(&mut state, 20, id).unwrap());

        let policy = state.policies.get(id).unwrap();
        assert_eq!(policy.status(), PolicyStatus::PaidOut);

        // Settled policies are a no-op afterwards
        assert!(!TriggerEvaluator::evaluate(&mut state, 20, id).unwrap());
        assert_eq!(state.custodian.balance(&Address::new(FARMER)), 10_000 - 100 + 1000);
    }

    #[test]
    fn test_fan_out_isolates_failures() {
        let mut state = seeded_state();
        // Maize pool funded, rice pool too small for its coverage
        fund_pool(&mut state, 2_000);
        let maize = issue(&mut state, 10, policy_app()).policy.id;
        let rice_app = PolicyApplication {
            crop_type: "rice".to_string(),
            ..policy_app()
        };
        let rice = issue(&mut state, 10, rice_app).policy.id;
        let elsewhere_app = PolicyApplication {
            location: "eldoret".to_string(),
            ..policy_app()
        };
        let elsewhere = issue(&mut state, 10, elsewhere_app).policy.id;

        record(&mut state, 30, "nakuru", 50, 20);
        let report = TriggerEvaluator::fan_out(&mut state, "nakuru", 30);

        assert_eq!(report.evaluated, 2);
        assert_eq!(report.triggered, vec![maize]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, rice);
        assert_eq!(report.failed[0].1.kind(), ErrorKind::Transfer);

        assert_eq!(state.policies.get(rice).unwrap().status(), PolicyStatus::Active);
        assert_eq!(state.policies.get(elsewhere).unwrap().status(), PolicyStatus::Active);
    }
}

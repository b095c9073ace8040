//! Insurance engine - External interface
//!
//! Serializes every call behind one lock: each write runs to completion as a
//! single atomic unit and later calls observe all effects of earlier ones.

use crate::custody::{Custodian, InMemoryCustodian};
use crate::oracle::{OracleAuthority, SelfRegistry};
use crate::policy::PolicyApplication;
use crate::settlement::{FanOutReport, RefundCalculator, TriggerEvaluator};
use crate::state::EngineState;
use agrishield_common::{
    error::TransferError, Address, AgriShieldError, Amount, BlockHeight, EngineConfig, FanOutMode,
    JournalEntry, LedgerEvent, ObservationKey, OracleRegistration, Policy, PolicyId, Result,
    RiskPool, TxContext, WeatherObservation, WeatherReading,
};
use parking_lot::Mutex;
use tracing::{info, instrument};

/// Result of submitting an observation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub key: ObservationKey,
    /// Automatic evaluation results; empty in lazy fan-out mode
    pub fan_out: FanOutReport,
}

/// Policy lifecycle and trigger-evaluation engine
pub struct InsuranceEngine<A = SelfRegistry, C = InMemoryCustodian> {
    state: Mutex<EngineState<A, C>>,
}

impl InsuranceEngine {
    /// Engine with self-registering oracles and in-memory custody
    pub fn new(config: EngineConfig) -> Result<Self> {
        let oracles = SelfRegistry::new(config.max_oracle_name_len);
        Self::with_components(config, oracles, InMemoryCustodian::new())
    }
}

impl<A: OracleAuthority> InsuranceEngine<A, InMemoryCustodian> {
    /// Fund an address from outside the system
    pub fn deposit(&self, address: &Address, amount: Amount) -> Result<()> {
        let mut state = self.state.lock();
        state.custodian.deposit(address, amount)?;
        Ok(())
    }
}

impl<A: OracleAuthority, C: Custodian> InsuranceEngine<A, C> {
    pub fn with_components(config: EngineConfig, oracles: A, custodian: C) -> Result<Self> {
        config.validate()?;
        info!(
            fee_rate_bps = config.fee_rate_bps,
            fan_out = ?config.fan_out,
            "Insurance engine initialized"
        );
        Ok(Self {
            state: Mutex::new(EngineState::new(config, oracles, custodian)),
        })
    }

    /// Run one write operation under the lock
    ///
    /// The clock advances only when the operation succeeds.
    fn transact<T>(
        &self,
        ctx: &TxContext,
        op: impl FnOnce(&mut EngineState<A, C>) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock();
        state.check_height(ctx.height)?;
        let value = op(&mut *state)?;
        state.last_height = ctx.height;
        Ok(value)
    }

    // ---- Write operations ----

    /// Register the caller as a weather oracle
    #[instrument(skip(self))]
    pub fn authorize_oracle(&self, ctx: &TxContext, name: &str) -> Result<OracleRegistration> {
        self.transact(ctx, |state| {
            let registration = state.oracles.authorize(ctx, name)?;
            state.journal.append(
                ctx.height,
                LedgerEvent::OracleAuthorized {
                    oracle: ctx.sender.clone(),
                    name: registration.name.clone(),
                },
            );
            Ok(registration)
        })
    }

    /// Deactivate the caller's oracle registration
    #[instrument(skip(self))]
    pub fn revoke_oracle(&self, ctx: &TxContext) -> Result<OracleRegistration> {
        self.transact(ctx, |state| {
            let registration = state.oracles.revoke(ctx)?;
            state.journal.append(
                ctx.height,
                LedgerEvent::OracleRevoked {
                    oracle: ctx.sender.clone(),
                },
            );
            Ok(registration)
        })
    }

    /// Buy a policy; the caller becomes the holder
    #[instrument(skip(self))]
    pub fn purchase_insurance(
        &self,
        ctx: &TxContext,
        application: PolicyApplication,
    ) -> Result<PolicyId> {
        self.transact(ctx, |state| {
            let issuance = state.policies.create(
                ctx,
                application,
                &state.config,
                &state.oracles,
                &mut state.pools,
                &mut state.custodian,
            )?;
            let policy = issuance.policy;
            state.journal.append(
                ctx.height,
                LedgerEvent::PolicyIssued {
                    policy_id: policy.id,
                    holder: policy.holder,
                    location: policy.location,
                    crop_type: policy.crop_type,
                    coverage_amount: policy.coverage_amount,
                    premium_amount: policy.premium_amount,
                    protocol_fee: issuance.protocol_fee,
                    pool_contribution: issuance.pool_contribution,
                },
            );
            Ok(policy.id)
        })
    }

    /// Submit an observation at the current height
    ///
    /// In eager mode every active, in-window policy at the location is then
    /// evaluated; each settles on its own and failures are reported rather
    /// than undoing the observation.
    #[instrument(skip(self))]
    pub fn record_weather_data(
        &self,
        ctx: &TxContext,
        location: &str,
        reading: WeatherReading,
    ) -> Result<RecordOutcome> {
        self.transact(ctx, |state| {
            let key = state
                .weather
                .record(&state.oracles, ctx, location, reading)?;
            state.journal.append(
                ctx.height,
                LedgerEvent::WeatherRecorded {
                    location: key.location.clone(),
                    observed_at: key.height,
                    reporter: ctx.sender.clone(),
                    rainfall: reading.rainfall,
                    temperature: reading.temperature,
                    humidity: reading.humidity,
                },
            );

            let fan_out = match state.config.fan_out {
                FanOutMode::Eager => TriggerEvaluator::fan_out(state, location, ctx.height),
                FanOutMode::Lazy => FanOutReport::default(),
            };
            Ok(RecordOutcome { key, fan_out })
        })
    }

    /// Cross-confirm another oracle's observation
    #[instrument(skip(self))]
    pub fn confirm_weather_data(
        &self,
        ctx: &TxContext,
        location: &str,
        height: BlockHeight,
        reading: WeatherReading,
    ) -> Result<WeatherObservation> {
        self.transact(ctx, |state| {
            let key = ObservationKey::new(location, height);
            let confirmed = state.weather.confirm(
                &state.oracles,
                ctx,
                &key,
                reading,
                &state.config.tolerance,
            )?;
            state.journal.append(
                ctx.height,
                LedgerEvent::WeatherConfirmed {
                    location: key.location,
                    observed_at: key.height,
                    confirmer: ctx.sender.clone(),
                },
            );
            Ok(confirmed)
        })
    }

    /// Cancel the caller's policy; returns the refund paid
    #[instrument(skip(self))]
    pub fn terminate_policy(&self, ctx: &TxContext, policy_id: PolicyId) -> Result<Amount> {
        self.transact(ctx, |state| RefundCalculator::cancel(state, ctx, policy_id))
    }

    /// Manual evaluation; returns whether the policy paid out
    #[instrument(skip(self))]
    pub fn trigger_policy_evaluation(&self, ctx: &TxContext, policy_id: PolicyId) -> Result<bool> {
        self.transact(ctx, |state| {
            TriggerEvaluator::evaluate(state, ctx.height, policy_id)
        })
    }

    // ---- Read-only views ----

    pub fn get_policy(&self, policy_id: PolicyId) -> Option<Policy> {
        self.state.lock().policies.get(policy_id).cloned()
    }

    pub fn get_weather_data(&self, location: &str, height: BlockHeight) -> Option<WeatherObservation> {
        self.state.lock().weather.get(location, height).cloned()
    }

    pub fn get_risk_pool(&self, crop_type: &str) -> Option<RiskPool> {
        self.state.lock().pools.get(crop_type).cloned()
    }

    pub fn check_oracle_authorization(&self, address: &Address) -> bool {
        self.state.lock().oracles.is_authorized(address)
    }

    pub fn get_oracle(&self, address: &Address) -> Option<OracleRegistration> {
        self.state.lock().oracles.registration(address).cloned()
    }

    pub fn policies_for_holder(&self, holder: &Address) -> Vec<PolicyId> {
        self.state.lock().policies.for_holder(holder)
    }

    pub fn policies_at_location(&self, location: &str) -> Vec<PolicyId> {
        self.state.lock().policies.at_location(location)
    }

    pub fn balance(&self, address: &Address) -> Amount {
        self.state.lock().custodian.balance(address)
    }

    pub fn last_height(&self) -> BlockHeight {
        self.state.lock().last_height
    }

    pub fn config(&self) -> EngineConfig {
        self.state.lock().config.clone()
    }

    pub fn events(&self) -> Vec<JournalEntry> {
        self.state.lock().journal.entries().to_vec()
    }

    pub fn events_since(&self, sequence: u64) -> Vec<JournalEntry> {
        self.state.lock().journal.since(sequence).to_vec()
    }

    pub fn events_json(&self) -> Result<String> {
        self.state.lock().journal.to_json()
    }

    /// Every pool satisfies `available = premiums - payouts - refunds`
    pub fn pools_balanced(&self) -> bool {
        self.state.lock().pools.iter().all(RiskPool::is_balanced)
    }

    /// Custody holds at least what the pools claim to have available
    pub fn check_solvency(&self) -> Result<()> {
        let state = self.state.lock();
        let claimed: u128 = state.pools.iter().map(|p| p.available_funds as u128).sum();
        let held = state.custodian.balance(&state.config.custody_account);
        if (held as u128) < claimed {
            return Err(AgriShieldError::Transfer(TransferError::InsufficientBalance {
                account: state.config.custody_account.clone(),
                required: Amount::try_from(claimed).unwrap_or(Amount::MAX),
                available: held,
            }));
        }
        Ok(())
    }
}

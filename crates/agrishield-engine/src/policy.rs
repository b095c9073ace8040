//! Policy store
//!
//! Exclusive owner of [`Policy`] records. Keeps the id sequence and two
//! secondary indexes (location, holder) used for trigger fan-out and holder
//! views.
//!
//! Issuance is all-or-nothing: validation, oracle check, pool staging and
//! the premium/fee transfer batch all run before anything is written.

use crate::custody::{Custodian, Transfer};
use crate::ensure_label;
use crate::oracle::OracleAuthority;
use crate::pool::RiskPoolLedger;
use agrishield_common::{
    apply_bps,
    error::{AuthorizationError, NotFoundError, ValidationError},
    Address, Amount, EngineConfig, Policy, PolicyId, Result, TriggerThresholds, TxContext,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Parameters of a purchase request; the holder is the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyApplication {
    pub location: String,
    pub crop_type: String,
    pub coverage_amount: Amount,
    pub premium_amount: Amount,
    /// Coverage window length in blocks
    pub duration: u64,
    pub thresholds: TriggerThresholds,
    pub oracle: Address,
}

impl PolicyApplication {
    /// Parameter checks that need no ledger state
    pub fn validate(&self, config: &EngineConfig) -> std::result::Result<(), ValidationError> {
        if self.coverage_amount == 0 {
            return Err(ValidationError::ZeroCoverage);
        }
        if self.premium_amount == 0 {
            return Err(ValidationError::ZeroPremium);
        }
        let minimum = config.min_policy_duration.max(1);
        if self.duration < minimum {
            return Err(ValidationError::DurationTooShort {
                duration: self.duration,
                minimum,
            });
        }
        self.thresholds.validate(config.max_frost_threshold)?;
        ensure_label("location", &self.location, config.max_location_len)?;
        ensure_label("crop type", &self.crop_type, config.max_crop_type_len)?;
        Ok(())
    }
}

/// Fee split of a successful issuance
#[derive(Debug, Clone, PartialEq)]
pub struct Issuance {
    pub policy: Policy,
    pub protocol_fee: Amount,
    pub pool_contribution: Amount,
}

#[derive(Debug)]
pub struct PolicyStore {
    policies: BTreeMap<PolicyId, Policy>,
    by_location: HashMap<String, BTreeSet<PolicyId>>,
    by_holder: HashMap<Address, BTreeSet<PolicyId>>,
    /// Next id to hand out; only advances on commit
    next_id: PolicyId,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyStore {
    pub fn new() -> Self {
        Self {
            policies: BTreeMap::new(),
            by_location: HashMap::new(),
            by_holder: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.get(&id)
    }

    pub fn require(&self, id: PolicyId) -> std::result::Result<&Policy, NotFoundError> {
        self.policies.get(&id).ok_or(NotFoundError::Policy(id))
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn next_id(&self) -> PolicyId {
        self.next_id
    }

    /// Ids of every policy ever issued at a location, ascending
    pub fn at_location(&self, location: &str) -> Vec<PolicyId> {
        self.by_location
            .get(location)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn for_holder(&self, holder: &Address) -> Vec<PolicyId> {
        self.by_holder
            .get(holder)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Issue a policy to the caller
    ///
    /// Premium moves holder → custody and the protocol fee custody → treasury
    /// in one batch. The remainder is contributed to the crop-type pool.
    pub fn create<A: OracleAuthority, C: Custodian>(
        &mut self,
        ctx: &TxContext,
        application: PolicyApplication,
        config: &EngineConfig,
        oracles: &A,
        pools: &mut RiskPoolLedger,
        custodian: &mut C,
    ) -> Result<Issuance> {
        if ctx.sender == config.custody_account || ctx.sender == config.treasury_account {
            return Err(AuthorizationError::SystemAccountHolder(ctx.sender.clone()).into());
        }
        application.validate(config)?;
        oracles.ensure_authorized(&application.oracle)?;

        let protocol_fee = apply_bps(application.premium_amount, config.fee_rate_bps as u64)
            .ok_or(ValidationError::Overflow("protocol fee"))?;
        let pool_contribution = application.premium_amount - protocol_fee;

        let end_height = ctx
            .height
            .checked_add(application.duration)
            .ok_or(ValidationError::Overflow("end height"))?;

        let policy = Policy {
            id: self.next_id,
            holder: ctx.sender.clone(),
            location: application.location,
            crop_type: application.crop_type,
            coverage_amount: application.coverage_amount,
            premium_amount: application.premium_amount,
            start_height: ctx.height,
            end_height,
            active: true,
            payout_executed: false,
            thresholds: application.thresholds,
            oracle: application.oracle,
        };

        let staged_pool = pools.stage_contribution(
            &policy.crop_type,
            pool_contribution,
            config.default_reserve_ratio_bps,
        )?;

        custodian.execute(&[
            Transfer::new(&policy.holder, &config.custody_account, policy.premium_amount),
            Transfer::new(&config.custody_account, &config.treasury_account, protocol_fee),
        ])?;

        // Commit
        pools.commit(staged_pool);
        self.next_id += 1;
        self.insert(policy.clone());

        info!(
            policy_id = policy.id,
            holder = %policy.holder,
            location = %policy.location,
            crop_type = %policy.crop_type,
            coverage = policy.coverage_amount,
            premium = policy.premium_amount,
            protocol_fee,
            "Policy issued"
        );

        Ok(Issuance {
            policy,
            protocol_fee,
            pool_contribution,
        })
    }

    /// Staged PaidOut copy of a policy; nothing is written
    pub fn mark_paid_out(&self, id: PolicyId) -> Result<Policy> {
        Ok(self.require(id)?.paid_out()?)
    }

    /// Staged Cancelled copy of a policy; nothing is written
    pub fn mark_cancelled(&self, id: PolicyId) -> Result<Policy> {
        Ok(self.require(id)?.cancelled()?)
    }

    /// Whole-record replacement of an existing policy
    pub fn replace(&mut self, policy: Policy) {
        debug!(policy_id = policy.id, status = ?policy.status(), "Policy replaced");
        self.policies.insert(policy.id, policy);
    }

    fn insert(&mut self, policy: Policy) {
        self.by_location
            .entry(policy.location.clone())
            .or_default()
            .insert(policy.id);
        self.by_holder
            .entry(policy.holder.clone())
            .or_default()
            .insert(policy.id);
        self.policies.insert(policy.id, policy);
    }
}

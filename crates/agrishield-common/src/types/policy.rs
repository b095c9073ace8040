//! Policy - Parametric coverage contract
//!
//! A policy ties a holder to a location, a crop type, a coverage window and
//! three weather thresholds. Its lifecycle has exactly three states:
//! - Active: issued, premium paid, eligible for trigger evaluation
//! - Cancelled: terminated early by the holder with a pro-rata refund
//! - PaidOut: a threshold was breached and coverage was transferred
//!
//! Cancelled and PaidOut are terminal; the record is immutable afterwards.

use super::address::{Address, Amount, BlockHeight, PolicyId};
use crate::error::{StateError, ValidationError};
use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the active and payout flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    Active,
    Cancelled,
    PaidOut,
}

/// Weather thresholds whose breach fires a payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerThresholds {
    /// Rainfall floor (mm)
    pub drought: i64,
    /// Rainfall ceiling (mm), strictly above drought
    pub flood: i64,
    /// Temperature floor (°C)
    pub frost: i64,
}

impl TriggerThresholds {
    pub fn new(drought: i64, flood: i64, frost: i64) -> Self {
        Self {
            drought,
            flood,
            frost,
        }
    }

    /// Check threshold ordering; `frost_cap` is the exclusive upper bound on frost
    pub fn validate(&self, frost_cap: i64) -> Result<(), ValidationError> {
        if self.drought <= 0 {
            return Err(ValidationError::NonPositiveDrought(self.drought));
        }
        if self.flood <= self.drought {
            return Err(ValidationError::FloodNotAboveDrought {
                drought: self.drought,
                flood: self.flood,
            });
        }
        if self.frost >= frost_cap {
            return Err(ValidationError::FrostTooHigh {
                frost: self.frost,
                cap: frost_cap,
            });
        }
        Ok(())
    }

    /// True if any single threshold is breached
    ///
    /// All three comparisons are evaluated and OR-combined; none has priority.
    pub fn is_breached(&self, rainfall: i64, temperature: i64) -> bool {
        let drought = rainfall < self.drought;
        let flood = rainfall > self.flood;
        let frost = temperature < self.frost;
        drought | flood | frost
    }
}

/// Coverage contract record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub holder: Address,
    pub location: String,
    pub crop_type: String,
    /// Maximum payout
    pub coverage_amount: Amount,
    /// Premium paid in full at issuance
    pub premium_amount: Amount,
    pub start_height: BlockHeight,
    pub end_height: BlockHeight,
    pub active: bool,
    pub payout_executed: bool,
    pub thresholds: TriggerThresholds,
    /// Oracle designated at issuance
    pub oracle: Address,
}

impl Policy {
    pub fn status(&self) -> PolicyStatus {
        match (self.active, self.payout_executed) {
            (_, true) => PolicyStatus::PaidOut,
            (true, false) => PolicyStatus::Active,
            (false, false) => PolicyStatus::Cancelled,
        }
    }

    /// Coverage window is inclusive on both ends
    pub fn covers(&self, height: BlockHeight) -> bool {
        self.start_height <= height && height <= self.end_height
    }

    pub fn duration(&self) -> u64 {
        self.end_height - self.start_height
    }

    /// Active, unsettled and inside its window
    pub fn is_evaluable(&self, height: BlockHeight) -> bool {
        self.status() == PolicyStatus::Active && self.covers(height)
    }

    /// Guard shared by payout and cancellation
    pub fn ensure_settleable(&self) -> Result<(), StateError> {
        if self.payout_executed {
            return Err(StateError::AlreadyPaidOut(self.id));
        }
        if !self.active {
            return Err(StateError::PolicyInactive(self.id));
        }
        Ok(())
    }

    /// Copy of this record in the PaidOut state
    pub fn paid_out(&self) -> Result<Self, StateError> {
        self.ensure_settleable()?;
        Ok(Self {
            active: false,
            payout_executed: true,
            ..self.clone()
        })
    }

    /// Copy of this record in the Cancelled state
    pub fn cancelled(&self) -> Result<Self, StateError> {
        self.ensure_settleable()?;
        Ok(Self {
            active: false,
            ..self.clone()
        })
    }
}

//! # AgriShield Engine
//!
//! Policy lifecycle and trigger-evaluation engine for parametric crop
//! insurance. Payouts are decided solely by weather observations submitted
//! by authorized oracles.
//!
//! ## Components
//!
//! - **Oracle authority**: which addresses may submit and confirm observations
//! - **Weather ledger**: one observation per (location, height)
//! - **Risk pools**: per crop-type reserves funding payouts and refunds
//! - **Policy store**: policy records, id sequence, location/holder indexes
//! - **Settlement**: trigger evaluation, payout, pro-rata refund
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       InsuranceEngine                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  record ──► WeatherLedger ──► TriggerEvaluator ──► Payout    │
//! │  evaluate ─────────────────────────┘                  │      │
//! │  terminate ──► RefundCalculator ───────────┐          │      │
//! │                                            ▼          ▼      │
//! │  purchase ──► PolicyStore ──────────► RiskPoolLedger         │
//! │                                     Custodian · Journal      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod custody;
pub mod engine;
pub mod journal;
pub mod oracle;
pub mod policy;
pub mod pool;
pub mod settlement;
pub mod state;
pub mod weather;

pub use custody::{Custodian, InMemoryCustodian, Transfer};
pub use engine::{InsuranceEngine, RecordOutcome};
pub use oracle::{OracleAuthority, SelfRegistry};
pub use policy::{Issuance, PolicyApplication, PolicyStore};
pub use pool::RiskPoolLedger;
pub use settlement::{FanOutReport, PayoutExecutor, RefundCalculator, TriggerEvaluator};
pub use weather::WeatherLedger;

use agrishield_common::error::ValidationError;

/// Non-empty and within `max` bytes
pub(crate) fn ensure_label(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

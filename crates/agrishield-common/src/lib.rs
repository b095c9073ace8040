//! # AgriShield Common
//!
//! Shared types, errors, and configuration for AgriShield parametric crop
//! insurance.
//!
//! ## Core Types
//!
//! - [`Policy`]: coverage contract with drought/flood/frost thresholds
//! - [`WeatherObservation`]: reading keyed by (location, height)
//! - [`RiskPool`]: per crop-type reserve ledger
//! - [`OracleRegistration`]: authorized weather data source
//! - [`Account`]: native currency balance
//!
//! ## Ambient
//!
//! - [`error`]: one error category per failure class, all abort with no side effects
//! - [`config`]: engine parameters, loadable from `AGRISHIELD_*` environment
//! - [`events`]: journal of committed state changes

pub mod config;
pub mod error;
pub mod events;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{EngineConfig, FanOutMode, ToleranceSettings};
pub use error::{AgriShieldError, ErrorKind, Result};
pub use events::{JournalEntry, LedgerEvent};
pub use types::{
    account::Account,
    address::{Address, Amount, BlockHeight, PolicyId, TxContext},
    observation::{ObservationKey, WeatherObservation, WeatherReading},
    oracle::OracleRegistration,
    policy::{Policy, PolicyStatus, TriggerThresholds},
    risk_pool::RiskPool,
};

/// AgriShield version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Basis-point denominator (100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Protocol fee taken from each premium (5%)
pub const DEFAULT_FEE_RATE_BPS: u32 = 500;

/// Minimum policy duration in blocks
pub const MIN_POLICY_DURATION: u64 = 1000;

/// Reserve ratio assigned to new pools (70%)
pub const DEFAULT_RESERVE_RATIO_BPS: u32 = 7000;

/// Frost thresholds must be strictly below this (°C)
pub const MAX_FROST_THRESHOLD: i64 = 30;

/// `amount × bps / 10000`, truncating
///
/// Computed in u128 so the product cannot overflow.
pub fn apply_bps(amount: Amount, bps: u64) -> Option<Amount> {
    let scaled = (amount as u128).checked_mul(bps as u128)? / BPS_DENOMINATOR as u128;
    Amount::try_from(scaled).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_bps_truncates() {
        assert_eq!(apply_bps(100, 500), Some(5));
        assert_eq!(apply_bps(19, 500), Some(0));
        assert_eq!(apply_bps(199, 500), Some(9));
        assert_eq!(apply_bps(Amount::MAX, 10_000), Some(Amount::MAX));
    }
}

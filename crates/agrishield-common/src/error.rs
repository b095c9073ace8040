//! Error types for AgriShield
//!
//! Provides a unified error type and one sub-enum per error category.
//! Every error aborts the operation that raised it with no side effects;
//! retries are always caller-initiated.

use crate::types::{Address, Amount, BlockHeight, PolicyId};
use thiserror::Error;

/// Result type alias using AgriShieldError
pub type Result<T> = std::result::Result<T, AgriShieldError>;

/// Unified error type for AgriShield operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgriShieldError {
    // Malformed parameters
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Caller is not allowed to perform the operation
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    // Missing policy, observation, pool or registration
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    // Operation no longer applicable to the record
    #[error("State conflict: {0}")]
    StateConflict(#[from] StateError),

    // Fund movement failed
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    // Confirmation reading outside tolerance
    #[error("Data mismatch: {0}")]
    DataMismatch(#[from] DataMismatchError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Error category, for callers that dispatch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    StateConflict,
    Transfer,
    DataMismatch,
    Config,
    Serialization,
}

impl AgriShieldError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgriShieldError::Validation(_) => ErrorKind::Validation,
            AgriShieldError::Authorization(_) => ErrorKind::Authorization,
            AgriShieldError::NotFound(_) => ErrorKind::NotFound,
            AgriShieldError::StateConflict(_) => ErrorKind::StateConflict,
            AgriShieldError::Transfer(_) => ErrorKind::Transfer,
            AgriShieldError::DataMismatch(_) => ErrorKind::DataMismatch,
            AgriShieldError::Config(_) => ErrorKind::Config,
            AgriShieldError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Whether retrying the same call can succeed once the environment changes
    ///
    /// Only transfer failures qualify (e.g. after a balance top-up) and missing
    /// preconditions such as an observation that has not been submitted yet.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transfer | ErrorKind::NotFound
        )
    }
}

/// Malformed or out-of-range parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Coverage amount must be positive")]
    ZeroCoverage,

    #[error("Premium amount must be positive")]
    ZeroPremium,

    #[error("Policy duration too short: {duration} < {minimum}")]
    DurationTooShort { duration: u64, minimum: u64 },

    #[error("Drought threshold must be positive, got {0}")]
    NonPositiveDrought(i64),

    #[error("Flood threshold {flood} must exceed drought threshold {drought}")]
    FloodNotAboveDrought { drought: i64, flood: i64 },

    #[error("Frost threshold {frost} must be below {cap}")]
    FrostTooHigh { frost: i64, cap: i64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} too long: {len} > {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Block height regressed: {height} < last seen {last}")]
    HeightRegressed {
        height: BlockHeight,
        last: BlockHeight,
    },

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// Caller lacks the right to perform the operation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthorizationError {
    #[error("Address {0} is not an authorized oracle")]
    UnauthorizedOracle(Address),

    #[error("Address {caller} is not the holder of policy {policy_id}")]
    NotPolicyHolder { policy_id: PolicyId, caller: Address },

    #[error("Confirming oracle {0} is the original reporter")]
    SelfConfirmation(Address),

    #[error("System account {0} cannot hold a policy")]
    SystemAccountHolder(Address),
}

/// Required record is absent
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotFoundError {
    #[error("Policy {0} not found")]
    Policy(PolicyId),

    #[error("No weather observation for {location} at height {height}")]
    Observation {
        location: String,
        height: BlockHeight,
    },

    #[error("No risk pool for crop type {0}")]
    RiskPool(String),

    #[error("No oracle registration for {0}")]
    Oracle(Address),
}

/// Policy lifecycle conflicts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Policy {0} is not active")]
    PolicyInactive(PolicyId),

    #[error("Policy {0} has already been paid out")]
    AlreadyPaidOut(PolicyId),
}

/// Fund movement failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("Insufficient balance in {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient reserve in {crop_type} pool: required {required}, available {available}")]
    InsufficientPoolReserve {
        crop_type: String,
        required: Amount,
        available: Amount,
    },

    #[error("Balance overflow in {0}")]
    Overflow(Address),

    #[error("Transfer from {0} to itself")]
    SelfTransfer(Address),

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Confirmation reading disagrees with the stored observation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataMismatchError {
    #[error("Rainfall differs by {diff}mm (tolerance < {tolerance})")]
    Rainfall { diff: u64, tolerance: u64 },

    #[error("Temperature differs by {diff}C (tolerance < {tolerance})")]
    Temperature { diff: u64, tolerance: u64 },

    #[error("Humidity differs by {diff}% (tolerance < {tolerance})")]
    Humidity { diff: u64, tolerance: u64 },
}

impl From<serde_json::Error> for AgriShieldError {
    fn from(err: serde_json::Error) -> Self {
        AgriShieldError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AgriShieldError {
    fn from(err: anyhow::Error) -> Self {
        AgriShieldError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgriShieldError::NotFound(NotFoundError::Policy(42));
        assert!(err.to_string().contains("Policy 42"));
    }

    #[test]
    fn test_error_kind() {
        let err: AgriShieldError = StateError::AlreadyPaidOut(7).into();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(!err.is_retryable());

        let err: AgriShieldError = TransferError::Rejected("offline".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_mismatch_display() {
        let err = DataMismatchError::Rainfall {
            diff: 5,
            tolerance: 5,
        };
        assert!(err.to_string().contains("5mm"));
    }
}

//! Ledger events emitted by committed operations
//!
//! Events are appended only after an operation commits, so the journal never
//! contains effects of a rolled-back call.

use crate::types::{Address, Amount, BlockHeight, PolicyId};
use serde::{Deserialize, Serialize};

/// Committed state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    /// Oracle registered (or re-registered) itself
    OracleAuthorized { oracle: Address, name: String },
    /// Oracle deactivated its registration
    OracleRevoked { oracle: Address },
    /// Policy issued and premium collected
    PolicyIssued {
        policy_id: PolicyId,
        holder: Address,
        location: String,
        crop_type: String,
        coverage_amount: Amount,
        premium_amount: Amount,
        protocol_fee: Amount,
        pool_contribution: Amount,
    },
    /// Observation stored (overwrites any previous one at the key)
    WeatherRecorded {
        location: String,
        observed_at: BlockHeight,
        reporter: Address,
        rainfall: i64,
        temperature: i64,
        humidity: u64,
    },
    /// Observation cross-confirmed by a second oracle
    WeatherConfirmed {
        location: String,
        observed_at: BlockHeight,
        confirmer: Address,
    },
    /// Threshold breached and coverage paid to the holder
    PayoutExecuted {
        policy_id: PolicyId,
        holder: Address,
        crop_type: String,
        amount: Amount,
    },
    /// Policy cancelled by its holder with a pro-rata refund
    PolicyCancelled {
        policy_id: PolicyId,
        holder: Address,
        crop_type: String,
        refund: Amount,
    },
}

impl LedgerEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::OracleAuthorized { .. } => "oracle_authorized",
            LedgerEvent::OracleRevoked { .. } => "oracle_revoked",
            LedgerEvent::PolicyIssued { .. } => "policy_issued",
            LedgerEvent::WeatherRecorded { .. } => "weather_recorded",
            LedgerEvent::WeatherConfirmed { .. } => "weather_confirmed",
            LedgerEvent::PayoutExecuted { .. } => "payout_executed",
            LedgerEvent::PolicyCancelled { .. } => "policy_cancelled",
        }
    }
}

/// Journal entry wrapping an event with ordering metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0
    pub sequence: u64,
    /// Unique event id (UUIDv7, time-ordered)
    pub event_id: String,
    /// Height of the operation that produced the event
    pub height: BlockHeight,
    /// Wall-clock time of commit (Unix millis)
    pub timestamp: i64,
    pub event: LedgerEvent,
}

impl JournalEntry {
    pub fn new(sequence: u64, height: BlockHeight, event: LedgerEvent) -> Self {
        Self {
            sequence,
            event_id: uuid::Uuid::now_v7().to_string(),
            height,
            timestamp: chrono::Utc::now().timestamp_millis(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tagged() {
        let event = LedgerEvent::OracleRevoked {
            oracle: Address::new("oracle-1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "OracleRevoked");
        assert_eq!(json["data"]["oracle"], "oracle-1");
    }

    #[test]
    fn test_entry_ids_unique() {
        let a = JournalEntry::new(0, 1, LedgerEvent::OracleRevoked { oracle: "o".into() });
        let b = JournalEntry::new(1, 1, LedgerEvent::OracleRevoked { oracle: "o".into() });
        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.event.name(), "oracle_revoked");
    }
}

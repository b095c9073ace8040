//! Addresses, height clock, and per-call transaction context

use serde::{Deserialize, Serialize};

/// Monotonic external sequence counter used as clock and observation key
pub type BlockHeight = u64;

/// Policy identifier, assigned in strictly increasing order
pub type PolicyId = u64;

/// Monetary amount in the native currency's smallest unit
pub type Amount = u64;

/// Account address of a holder, oracle, or system account
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw address string
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Caller and clock reading for one write operation
///
/// The height is read once by the sequencer and treated as constant for the
/// whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Address,
    pub height: BlockHeight,
}

impl TxContext {
    pub fn new(sender: impl Into<Address>, height: BlockHeight) -> Self {
        Self {
            sender: sender.into(),
            height,
        }
    }
}

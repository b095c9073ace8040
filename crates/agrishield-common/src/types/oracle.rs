//! Oracle registrations

use super::address::{Address, BlockHeight};
use serde::{Deserialize, Serialize};

/// Registration of a weather data source
///
/// An address is an authorized oracle iff a registration exists and is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRegistration {
    pub name: String,
    pub registered_at: BlockHeight,
    pub registered_by: Address,
    pub active: bool,
}

impl OracleRegistration {
    pub fn new(name: impl Into<String>, registered_at: BlockHeight, registered_by: Address) -> Self {
        Self {
            name: name.into(),
            registered_at,
            registered_by,
            active: true,
        }
    }

    pub fn deactivated(&self) -> Self {
        Self {
            active: false,
            ..self.clone()
        }
    }
}

//! Oracle authority
//!
//! Decides which addresses may submit and confirm weather observations.
//! The default [`SelfRegistry`] lets any caller register itself; a stricter
//! governance-backed authority can be swapped in behind the same trait.

use agrishield_common::{
    error::{AuthorizationError, NotFoundError, ValidationError},
    Address, OracleRegistration, Result, TxContext,
};
use std::collections::HashMap;
use tracing::info;

/// Capability interface for weather data sources
pub trait OracleAuthority: Send {
    /// Register the caller as an oracle
    fn authorize(&mut self, ctx: &TxContext, name: &str) -> Result<OracleRegistration>;

    /// Deactivate the caller's registration
    fn revoke(&mut self, ctx: &TxContext) -> Result<OracleRegistration>;

    fn registration(&self, address: &Address) -> Option<&OracleRegistration>;

    /// Unknown addresses are simply not authorized
    fn is_authorized(&self, address: &Address) -> bool {
        self.registration(address).is_some_and(|r| r.active)
    }

    fn ensure_authorized(&self, address: &Address) -> std::result::Result<(), AuthorizationError> {
        if self.is_authorized(address) {
            Ok(())
        } else {
            Err(AuthorizationError::UnauthorizedOracle(address.clone()))
        }
    }
}

/// Self-service registration
#[derive(Debug)]
pub struct SelfRegistry {
    registrations: HashMap<Address, OracleRegistration>,
    max_name_len: usize,
}

impl SelfRegistry {
    pub fn new(max_name_len: usize) -> Self {
        Self {
            registrations: HashMap::new(),
            max_name_len,
        }
    }
}

impl OracleAuthority for SelfRegistry {
    fn authorize(&mut self, ctx: &TxContext, name: &str) -> Result<OracleRegistration> {
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "oracle name" }.into());
        }
        if name.len() > self.max_name_len {
            return Err(ValidationError::TooLong {
                field: "oracle name",
                len: name.len(),
                max: self.max_name_len,
            }
            .into());
        }

        let registration = OracleRegistration::new(name, ctx.height, ctx.sender.clone());
        self.registrations
            .insert(ctx.sender.clone(), registration.clone());

        info!(oracle = %ctx.sender, name, "Oracle registered");
        Ok(registration)
    }

    fn revoke(&mut self, ctx: &TxContext) -> Result<OracleRegistration> {
        let current = self
            .registrations
            .get(&ctx.sender)
            .ok_or_else(|| NotFoundError::Oracle(ctx.sender.clone()))?;

        let revoked = current.deactivated();
        self.registrations.insert(ctx.sender.clone(), revoked.clone());

        info!(oracle = %ctx.sender, "Oracle revoked");
        Ok(revoked)
    }

    fn registration(&self, address: &Address) -> Option<&OracleRegistration> {
        self.registrations.get(address)
    }
}

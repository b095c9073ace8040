//! Weather ledger
//!
//! Stores one observation per (location, height). A second, distinct oracle
//! may confirm an observation; confirmation only raises confidence and is not
//! required for trigger evaluation.

use crate::ensure_label;
use crate::oracle::OracleAuthority;
use agrishield_common::{
    error::{AuthorizationError, NotFoundError},
    AgriShieldError, BlockHeight, ObservationKey, Result, ToleranceSettings, TxContext,
    WeatherObservation, WeatherReading,
};
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug)]
pub struct WeatherLedger {
    observations: HashMap<ObservationKey, WeatherObservation>,
    max_location_len: usize,
}

impl WeatherLedger {
    pub fn new(max_location_len: usize) -> Self {
        Self {
            observations: HashMap::new(),
            max_location_len,
        }
    }

    pub fn get(&self, location: &str, height: BlockHeight) -> Option<&WeatherObservation> {
        self.observations
            .get(&ObservationKey::new(location, height))
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Store a reading at the caller's current height
    ///
    /// Overwrites any observation already at the key and resets verification.
    pub fn record<A: OracleAuthority>(
        &mut self,
        oracles: &A,
        ctx: &TxContext,
        location: &str,
        reading: WeatherReading,
    ) -> Result<ObservationKey> {
        oracles.ensure_authorized(&ctx.sender)?;
        ensure_label("location", location, self.max_location_len)?;

        let key = ObservationKey::new(location, ctx.height);
        let observation = WeatherObservation::new(reading, ctx.sender.clone());
        if self.observations.insert(key.clone(), observation).is_some() {
            warn!(location, height = ctx.height, "Observation overwritten");
        }

        info!(
            location,
            height = ctx.height,
            reporter = %ctx.sender,
            rainfall = reading.rainfall,
            temperature = reading.temperature,
            humidity = reading.humidity,
            "Weather observation recorded"
        );
        Ok(key)
    }

    /// Cross-confirm a stored observation
    ///
    /// The confirmer must be authorized and differ from the reporter; every
    /// field must agree within tolerance. On mismatch the record stays
    /// unverified.
    pub fn confirm<A: OracleAuthority>(
        &mut self,
        oracles: &A,
        ctx: &TxContext,
        key: &ObservationKey,
        reading: WeatherReading,
        tolerance: &ToleranceSettings,
    ) -> Result<WeatherObservation> {
        oracles.ensure_authorized(&ctx.sender)?;

        let stored = self
            .observations
            .get(key)
            .ok_or_else(|| NotFoundError::Observation {
                location: key.location.clone(),
                height: key.height,
            })?;

        if stored.reporter == ctx.sender {
            return Err(AuthorizationError::SelfConfirmation(ctx.sender.clone()).into());
        }

        if let Err(mismatch) = stored.reading.within_tolerance(&reading, tolerance) {
            warn!(
                location = %key.location,
                height = key.height,
                confirmer = %ctx.sender,
                %mismatch,
                "Confirmation rejected"
            );
            return Err(AgriShieldError::DataMismatch(mismatch));
        }

        let confirmed = stored.confirmed(ctx.sender.clone());
        self.observations.insert(key.clone(), confirmed.clone());

        info!(
            location = %key.location,
            height = key.height,
            confirmer = %ctx.sender,
            "Weather observation verified"
        );
        Ok(confirmed)
    }
}

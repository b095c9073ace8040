//! Ledger state behind the engine's sequencer lock

use crate::custody::Custodian;
use crate::journal::Journal;
use crate::oracle::OracleAuthority;
use crate::policy::PolicyStore;
use crate::pool::RiskPoolLedger;
use crate::weather::WeatherLedger;
use agrishield_common::{error::ValidationError, BlockHeight, EngineConfig};

/// Every collection the engine owns, mutated by one operation at a time
pub struct EngineState<A, C> {
    pub config: EngineConfig,
    pub oracles: A,
    pub weather: WeatherLedger,
    pub pools: RiskPoolLedger,
    pub policies: PolicyStore,
    pub custodian: C,
    pub journal: Journal,
    /// Highest height observed by a committed operation
    pub last_height: BlockHeight,
}

impl<A: OracleAuthority, C: Custodian> EngineState<A, C> {
    pub fn new(config: EngineConfig, oracles: A, custodian: C) -> Self {
        let weather = WeatherLedger::new(config.max_location_len);
        Self {
            config,
            oracles,
            weather,
            pools: RiskPoolLedger::new(),
            policies: PolicyStore::new(),
            custodian,
            journal: Journal::new(),
            last_height: 0,
        }
    }

    /// The external clock never runs backwards
    pub fn check_height(&self, height: BlockHeight) -> Result<(), ValidationError> {
        if height < self.last_height {
            return Err(ValidationError::HeightRegressed {
                height,
                last: self.last_height,
            });
        }
        Ok(())
    }
}

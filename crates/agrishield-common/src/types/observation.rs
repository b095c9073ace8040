//! Weather observations and cross-oracle confirmation

use super::address::{Address, BlockHeight};
use crate::config::ToleranceSettings;
use crate::error::DataMismatchError;
use serde::{Deserialize, Serialize};

/// Storage key: one observation per (location, height)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservationKey {
    pub location: String,
    pub height: BlockHeight,
}

impl ObservationKey {
    pub fn new(location: impl Into<String>, height: BlockHeight) -> Self {
        Self {
            location: location.into(),
            height,
        }
    }
}

/// Raw sensor values as submitted by an oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Rainfall (mm)
    pub rainfall: i64,
    /// Temperature (°C)
    pub temperature: i64,
    /// Relative humidity (%)
    pub humidity: u64,
}

impl WeatherReading {
    pub fn new(rainfall: i64, temperature: i64, humidity: u64) -> Self {
        Self {
            rainfall,
            temperature,
            humidity,
        }
    }

    /// Compare against another reading; every field must differ by strictly
    /// less than its tolerance
    pub fn within_tolerance(
        &self,
        other: &WeatherReading,
        tolerance: &ToleranceSettings,
    ) -> Result<(), DataMismatchError> {
        let rain_diff = self.rainfall.abs_diff(other.rainfall);
        if rain_diff >= tolerance.rainfall {
            return Err(DataMismatchError::Rainfall {
                diff: rain_diff,
                tolerance: tolerance.rainfall,
            });
        }

        let temp_diff = self.temperature.abs_diff(other.temperature);
        if temp_diff >= tolerance.temperature {
            return Err(DataMismatchError::Temperature {
                diff: temp_diff,
                tolerance: tolerance.temperature,
            });
        }

        let humidity_diff = self.humidity.abs_diff(other.humidity);
        if humidity_diff >= tolerance.humidity {
            return Err(DataMismatchError::Humidity {
                diff: humidity_diff,
                tolerance: tolerance.humidity,
            });
        }

        Ok(())
    }
}

/// Stored observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub reading: WeatherReading,
    pub reporter: Address,
    /// Set once a second, distinct oracle confirms within tolerance
    pub verified: bool,
    pub confirmed_by: Option<Address>,
}

impl WeatherObservation {
    pub fn new(reading: WeatherReading, reporter: Address) -> Self {
        Self {
            reading,
            reporter,
            verified: false,
            confirmed_by: None,
        }
    }

    pub fn rainfall(&self) -> i64 {
        self.reading.rainfall
    }

    pub fn temperature(&self) -> i64 {
        self.reading.temperature
    }

    pub fn humidity(&self) -> u64 {
        self.reading.humidity
    }

    /// Copy of this record marked verified by `confirmer`
    pub fn confirmed(&self, confirmer: Address) -> Self {
        Self {
            verified: true,
            confirmed_by: Some(confirmer),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_boundary() {
        let tolerance = ToleranceSettings::default();
        let stored = WeatherReading::new(200, 15, 60);

        assert!(stored
            .within_tolerance(&WeatherReading::new(204, 15, 60), &tolerance)
            .is_ok());
        assert_eq!(
            stored.within_tolerance(&WeatherReading::new(205, 15, 60), &tolerance),
            Err(DataMismatchError::Rainfall {
                diff: 5,
                tolerance: 5
            })
        );
        assert!(stored
            .within_tolerance(&WeatherReading::new(195, 15, 60), &tolerance)
            .is_err());
    }

    #[test]
    fn test_tolerance_per_field() {
        let tolerance = ToleranceSettings::default();
        let stored = WeatherReading::new(200, -3, 60);

        assert!(stored
            .within_tolerance(&WeatherReading::new(200, -2, 64), &tolerance)
            .is_ok());
        assert!(matches!(
            stored.within_tolerance(&WeatherReading::new(200, -5, 60), &tolerance),
            Err(DataMismatchError::Temperature { diff: 2, .. })
        ));
        assert!(matches!(
            stored.within_tolerance(&WeatherReading::new(200, -3, 55), &tolerance),
            Err(DataMismatchError::Humidity { diff: 5, .. })
        ));
    }

    #[test]
    fn test_confirmed_copy() {
        let obs = WeatherObservation::new(WeatherReading::new(1, 2, 3), Address::new("o1"));
        let confirmed = obs.confirmed(Address::new("o2"));
        assert!(!obs.verified);
        assert!(confirmed.verified);
        assert_eq!(confirmed.confirmed_by, Some(Address::new("o2")));
        assert_eq!(confirmed.reading, obs.reading);
    }
}

//! Engine configuration

use crate::error::{AgriShieldError, Result};
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// When policies are re-evaluated after a new observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutMode {
    /// Evaluate every policy at the location on submission
    Eager,
    /// Only evaluate on manual request
    Lazy,
}

impl std::str::FromStr for FanOutMode {
    type Err = AgriShieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eager" => Ok(FanOutMode::Eager),
            "lazy" => Ok(FanOutMode::Lazy),
            other => Err(AgriShieldError::Config(format!("unknown fan-out mode: {}", other))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Protocol fee in basis points of the premium
    pub fee_rate_bps: u32,
    /// Minimum policy duration in blocks
    pub min_policy_duration: u64,
    /// Reserve ratio assigned to newly created pools
    pub default_reserve_ratio_bps: u32,
    /// Exclusive upper bound on the frost threshold (°C)
    pub max_frost_threshold: i64,
    /// Confirmation tolerances
    pub tolerance: ToleranceSettings,
    /// Trigger fan-out after observations
    pub fan_out: FanOutMode,
    /// Custodial account holding premiums and paying settlements
    pub custody_account: Address,
    /// Account receiving protocol fees
    pub treasury_account: Address,
    pub max_location_len: usize,
    pub max_crop_type_len: usize,
    pub max_oracle_name_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate_bps: crate::DEFAULT_FEE_RATE_BPS,
            min_policy_duration: crate::MIN_POLICY_DURATION,
            default_reserve_ratio_bps: crate::DEFAULT_RESERVE_RATIO_BPS,
            max_frost_threshold: crate::MAX_FROST_THRESHOLD,
            tolerance: ToleranceSettings::default(),
            fan_out: FanOutMode::Eager,
            custody_account: Address::new("agrishield.custody"),
            treasury_account: Address::new("agrishield.treasury"),
            max_location_len: 100,
            max_crop_type_len: 50,
            max_oracle_name_len: 50,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment and `.env`
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("AGRISHIELD_FEE_RATE_BPS") {
            cfg.fee_rate_bps = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_MIN_POLICY_DURATION") {
            cfg.min_policy_duration = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_DEFAULT_RESERVE_RATIO_BPS") {
            cfg.default_reserve_ratio_bps = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_MAX_FROST_THRESHOLD") {
            cfg.max_frost_threshold = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_FAN_OUT") {
            cfg.fan_out = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_CUSTODY_ACCOUNT") {
            cfg.custody_account = Address::new(val);
        }
        if let Ok(val) = std::env::var("AGRISHIELD_TREASURY_ACCOUNT") {
            cfg.treasury_account = Address::new(val);
        }

        // Tolerances
        if let Ok(val) = std::env::var("AGRISHIELD_TOLERANCE_RAINFALL") {
            cfg.tolerance.rainfall = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_TOLERANCE_TEMPERATURE") {
            cfg.tolerance.temperature = val.parse()?;
        }
        if let Ok(val) = std::env::var("AGRISHIELD_TOLERANCE_HUMIDITY") {
            cfg.tolerance.humidity = val.parse()?;
        }

        cfg.validate()?;
        tracing::debug!(
            fee_rate_bps = cfg.fee_rate_bps,
            min_policy_duration = cfg.min_policy_duration,
            fan_out = ?cfg.fan_out,
            "Loaded engine configuration"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee_rate_bps > crate::BPS_DENOMINATOR {
            return Err(AgriShieldError::Config(format!(
                "fee rate {} exceeds {} bps",
                self.fee_rate_bps,
                crate::BPS_DENOMINATOR
            )));
        }
        if self.custody_account.is_empty() || self.treasury_account.is_empty() {
            return Err(AgriShieldError::Config("system accounts must be named".into()));
        }
        if self.custody_account == self.treasury_account {
            return Err(AgriShieldError::Config(
                "custody and treasury accounts must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Maximum disagreement between a stored observation and its confirmation
///
/// Differences must be strictly below each value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceSettings {
    /// Rainfall (mm)
    pub rainfall: u64,
    /// Temperature (°C)
    pub temperature: u64,
    /// Humidity (%)
    pub humidity: u64,
}

impl Default for ToleranceSettings {
    fn default() -> Self {
        Self {
            rainfall: 5,
            temperature: 2,
            humidity: 5,
        }
    }
}

//! Engine tunables.
//!
//! Defaults match a 95% service level, one-week lead time and the
//! ordering/holding cost assumptions used for EOQ. Values can be overridden
//! through `FORGECAST_*` environment variables.

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

pub const ENV_SERVICE_LEVEL: &str = "FORGECAST_SERVICE_LEVEL";
pub const ENV_LEAD_TIME_DAYS: &str = "FORGECAST_LEAD_TIME_DAYS";
pub const ENV_ORDERING_COST: &str = "FORGECAST_ORDERING_COST";
pub const ENV_HOLDING_COST_RATE: &str = "FORGECAST_HOLDING_COST_RATE";
pub const ENV_DEFAULT_HORIZON_DAYS: &str = "FORGECAST_DEFAULT_HORIZON_DAYS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Target probability of not stocking out during lead time, in (0, 1].
    pub service_level: f64,
    /// Days between placing and receiving an order.
    pub lead_time_days: f64,
    /// Fixed cost per order placed.
    pub ordering_cost: f64,
    /// Yearly holding cost as a fraction of unit price.
    pub holding_cost_rate: f64,
    /// Horizon used when a caller does not pass one.
    pub default_horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            service_level: 0.95,
            lead_time_days: 7.0,
            ordering_cost: 100.0,
            holding_cost_rate: 0.25,
            default_horizon_days: 30,
        }
    }
}

impl ForecastConfig {
    /// Load from the process environment, keeping defaults for unset keys.
    pub fn from_env() -> Result<Self, ForecastError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests, alternative sources).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ForecastError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            service_level: parse_or(&lookup, ENV_SERVICE_LEVEL, defaults.service_level)?,
            lead_time_days: parse_or(&lookup, ENV_LEAD_TIME_DAYS, defaults.lead_time_days)?,
            ordering_cost: parse_or(&lookup, ENV_ORDERING_COST, defaults.ordering_cost)?,
            holding_cost_rate: parse_or(
                &lookup,
                ENV_HOLDING_COST_RATE,
                defaults.holding_cost_rate,
            )?,
            default_horizon_days: parse_or(
                &lookup,
                ENV_DEFAULT_HORIZON_DAYS,
                defaults.default_horizon_days,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_service_level(mut self, service_level: f64) -> Self {
        self.service_level = service_level;
        self
    }

    pub fn with_lead_time_days(mut self, lead_time_days: f64) -> Self {
        self.lead_time_days = lead_time_days;
        self
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(self.service_level > 0.0 && self.service_level <= 1.0) {
            return Err(ForecastError::invalid_input(
                "service_level must be within (0, 1]",
            ));
        }
        if !(self.lead_time_days.is_finite() && self.lead_time_days > 0.0) {
            return Err(ForecastError::invalid_input(
                "lead_time_days must be a finite positive number",
            ));
        }
        if !(self.ordering_cost.is_finite() && self.ordering_cost >= 0.0) {
            return Err(ForecastError::invalid_input(
                "ordering_cost must be a finite non-negative number",
            ));
        }
        if !(self.holding_cost_rate.is_finite() && self.holding_cost_rate >= 0.0) {
            return Err(ForecastError::invalid_input(
                "holding_cost_rate must be a finite non-negative number",
            ));
        }
        if self.default_horizon_days == 0 {
            return Err(ForecastError::invalid_input(
                "default_horizon_days must be at least 1",
            ));
        }
        Ok(())
    }

    /// Standard-normal quantile for the configured service level, bucketed.
    pub fn z_score(&self) -> f64 {
        if self.service_level >= 0.99 {
            2.33
        } else if self.service_level >= 0.95 {
            1.65
        } else if self.service_level >= 0.90 {
            1.28
        } else {
            1.0
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ForecastError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ForecastError::invalid_input(format!("{key}={raw:?}: {e}"))),
    }
}

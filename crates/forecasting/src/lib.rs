//! `forgecast-forecasting`
//!
//! **Responsibility:** turn a product's stock ledger into a demand forecast and
//! restocking thresholds, and score forecast accuracy on held-out history.
//!
//! - Read-only: inputs come from an [`forgecast_inventory::InventoryReader`].
//! - Stateless: every call refits from scratch; nothing is cached.
//! - Deterministic given the ledger and the injected clock.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod multi_regression;
pub mod prediction;
pub mod regression;
pub mod series;
mod stats;
pub mod validation;

pub use config::ForecastConfig;
pub use engine::ForecastEngine;
pub use error::ForecastError;
pub use multi_regression::{FeatureObservation, MultiFeatureModel};
pub use prediction::{ForecastMethod, ForecastResult, RiskLevel, StockoutDays};
pub use regression::RegressionModel;
pub use series::{DailyObservation, aggregate_daily_sales};
pub use validation::{ForecastValidator, PerformanceBand, ValidationLabel, ValidationResult};

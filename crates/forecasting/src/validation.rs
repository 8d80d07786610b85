//! Backtest-style accuracy scoring for the linear forecast.
//!
//! The ledger is split 80/20 by position. Each SALE in the trailing 20% is
//! compared against a one-day-ahead forecast from the engine, which still sees
//! the full, unsplit history: no refit on the training slice happens.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use forgecast_core::{Clock, ProductId};
use forgecast_inventory::{InventoryReader, Movement};

use crate::engine::ForecastEngine;
use crate::error::ForecastError;
use crate::stats;

/// Histories shorter than this are not scored.
pub const MIN_VALIDATION_MOVEMENTS: usize = 20;
/// Share of the ledger treated as training data.
pub const TRAINING_FRACTION: f64 = 0.8;
/// A prediction within this relative error counts as accurate.
pub const ACCURACY_TOLERANCE: f64 = 0.20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationLabel {
    #[serde(rename = "Linear Regression")]
    LinearRegression,
    #[serde(rename = "Insufficient data for validation")]
    InsufficientData,
}

/// Qualitative band for an accuracy percentage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl PerformanceBand {
    pub fn from_accuracy(accuracy_percent: f64) -> Self {
        if accuracy_percent >= 80.0 {
            PerformanceBand::Excellent
        } else if accuracy_percent >= 60.0 {
            PerformanceBand::Good
        } else if accuracy_percent >= 40.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub label: ValidationLabel,
    pub mean_squared_error: f64,
    pub mean_absolute_error: f64,
    pub accuracy_percent: f64,
    /// Holdout SALE entries scored.
    pub sample_count: usize,
}

impl ValidationResult {
    pub fn insufficient_data() -> Self {
        Self {
            label: ValidationLabel::InsufficientData,
            mean_squared_error: 0.0,
            mean_absolute_error: 0.0,
            accuracy_percent: 0.0,
            sample_count: 0,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.label == ValidationLabel::InsufficientData
    }

    pub fn performance(&self) -> PerformanceBand {
        PerformanceBand::from_accuracy(self.accuracy_percent)
    }
}

/// Scores the engine's linear forecast against held-out sales.
#[derive(Debug)]
pub struct ForecastValidator<'a, R, C> {
    engine: &'a ForecastEngine<R, C>,
}

impl<'a, R, C> ForecastValidator<'a, R, C>
where
    R: InventoryReader,
    C: Clock,
{
    pub fn new(engine: &'a ForecastEngine<R, C>) -> Self {
        Self { engine }
    }

    /// `holdout_window_days` is recorded but does not size the split.
    pub fn validate(
        &self,
        product_id: ProductId,
        holdout_window_days: u32,
    ) -> Result<ValidationResult, ForecastError> {
        let (_, history) = self.engine.load(product_id)?;
        if history.len() < MIN_VALIDATION_MOVEMENTS {
            warn!(
                product = %product_id,
                movements = history.len(),
                "insufficient history for validation"
            );
            return Ok(ValidationResult::insufficient_data());
        }

        let split = split_index(history.len());
        let actual = holdout_sales(&history[split..]);

        let mut predicted = Vec::with_capacity(actual.len());
        for _ in &actual {
            predicted.push(self.engine.forecast_simple(product_id, 1)?.predicted_demand);
        }

        let result = ValidationResult {
            label: ValidationLabel::LinearRegression,
            mean_squared_error: mean_squared_error(&actual, &predicted),
            mean_absolute_error: mean_absolute_error(&actual, &predicted),
            accuracy_percent: accuracy_percent(&actual, &predicted),
            sample_count: actual.len(),
        };

        info!(
            product = %product_id,
            holdout_window_days,
            samples = result.sample_count,
            mse = result.mean_squared_error,
            mae = result.mean_absolute_error,
            accuracy = result.accuracy_percent,
            "validation computed"
        );
        Ok(result)
    }
}

/// `floor(0.8 * n)`.
fn split_index(n: usize) -> usize {
    (n as f64 * TRAINING_FRACTION).floor() as usize
}

fn holdout_sales(holdout: &[Movement]) -> Vec<f64> {
    holdout
        .iter()
        .filter(|m| m.is_sale())
        .map(|m| f64::from(m.quantity))
        .collect()
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .collect();
    stats::mean(&errors)
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .collect();
    stats::mean(&errors)
}

/// Percentage of points within [`ACCURACY_TOLERANCE`] relative error.
///
/// A zero actual has no relative error and counts as a miss.
pub fn accuracy_percent(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let hits = actual
        .iter()
        .zip(predicted)
        .filter(|&(&a, &p)| a != 0.0 && (a - p).abs() / a.abs() <= ACCURACY_TOLERANCE)
        .count();
    hits as f64 / actual.len() as f64 * 100.0
}

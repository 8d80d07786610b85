//! Three-feature demand regression (trend, synthetic season, price).
//!
//! Each coefficient is fitted against sales on its own, from mean-centred
//! values, and the intercept absorbs the means. This is not a joint
//! least-squares solve: correlated features bias the coefficients, and the
//! outputs are expected to match this exact per-feature method.

use serde::{Deserialize, Serialize};

use forgecast_inventory::Movement;

use crate::series::daily_sales_totals;
use crate::stats::{self, EPSILON};

/// Minimum observations for a real fit.
pub const MIN_FIT_OBSERVATIONS: usize = 4;

/// One selling day described by its three features.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureObservation {
    /// 1-based position among distinct sale dates.
    pub trend: f64,
    /// Synthetic 12-step cycle over positions (1..=12), not the calendar month.
    pub season: f64,
    pub price: f64,
    pub sales: f64,
}

/// Build feature observations from a ledger, one per selling day.
///
/// `price` is attached to every observation as given.
pub fn feature_observations(movements: &[Movement], price: f64) -> Vec<FeatureObservation> {
    daily_sales_totals(movements)
        .into_iter()
        .enumerate()
        .map(|(i, (_, sales))| FeatureObservation {
            trend: (i + 1) as f64,
            season: ((i % 12) + 1) as f64,
            price,
            sales,
        })
        .collect()
}

/// `sales = beta0 + beta1*trend + beta2*season + beta3*price`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiFeatureModel {
    pub beta0: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub beta3: f64,
    pub r_squared: f64,
}

impl MultiFeatureModel {
    /// Placeholder returned when there is too little data to fit.
    pub fn insufficient() -> Self {
        Self {
            beta0: 1.0,
            beta1: 0.1,
            beta2: 0.0,
            beta3: 0.0,
            r_squared: 0.0,
        }
    }

    pub fn predict(&self, trend: f64, season: f64, price: f64) -> f64 {
        self.beta0 + self.beta1 * trend + self.beta2 * season + self.beta3 * price
    }

    pub fn fit(points: &[FeatureObservation]) -> Self {
        if points.len() < MIN_FIT_OBSERVATIONS {
            return Self::insufficient();
        }

        let sales: Vec<f64> = points.iter().map(|p| p.sales).collect();
        let trend: Vec<f64> = points.iter().map(|p| p.trend).collect();
        let season: Vec<f64> = points.iter().map(|p| p.season).collect();
        let price: Vec<f64> = points.iter().map(|p| p.price).collect();

        let mean_y = stats::mean(&sales);
        let beta1 = centred_slope(&trend, &sales, mean_y);
        let beta2 = centred_slope(&season, &sales, mean_y);
        let beta3 = centred_slope(&price, &sales, mean_y);
        let beta0 = mean_y
            - beta1 * stats::mean(&trend)
            - beta2 * stats::mean(&season)
            - beta3 * stats::mean(&price);

        let mut model = Self {
            beta0,
            beta1,
            beta2,
            beta3,
            r_squared: 0.0,
        };
        let predicted: Vec<f64> = points
            .iter()
            .map(|p| model.predict(p.trend, p.season, p.price))
            .collect();
        model.r_squared = stats::r_squared(&sales, &predicted);
        model
    }
}

/// `Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²`, or 0 when `x` has no variance.
fn centred_slope(xs: &[f64], ys: &[f64], mean_y: f64) -> f64 {
    let mean_x = stats::mean(xs);
    let (sxy, sxx) = xs.iter().zip(ys).fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    if sxx.abs() < EPSILON { 0.0 } else { sxy / sxx }
}

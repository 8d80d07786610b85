use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use forgecast_core::ProductId;

/// How a forecast was produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastMethod {
    /// Fixed heuristic for thin histories.
    #[serde(rename = "Simple Average")]
    SimpleAverage,
    #[serde(rename = "Linear Regression")]
    LinearRegression,
    #[serde(rename = "Multiple Linear Regression")]
    MultipleLinearRegression,
}

impl ForecastMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ForecastMethod::SimpleAverage => "Simple Average",
            ForecastMethod::LinearRegression => "Linear Regression",
            ForecastMethod::MultipleLinearRegression => "Multiple Linear Regression",
        }
    }
}

impl core::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stockout risk given current stock and the computed thresholds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Estimated days until current stock runs out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockoutDays {
    /// No depletion expected (zero forecast demand).
    Never,
    Days(u64),
}

impl Serialize for StockoutDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StockoutDays::Never => serializer.serialize_str("infinite"),
            StockoutDays::Days(d) => serializer.serialize_u64(*d),
        }
    }
}

/// Demand forecast and restocking thresholds for one product.
///
/// Computed fresh on every request; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: i64,
    /// Total units expected over the horizon (>= 0).
    pub predicted_demand: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub optimal_order_quantity: f64,
    pub generated_at: DateTime<Utc>,
    pub horizon_days: u32,
    pub method: ForecastMethod,
    /// In [0, 1]; R² for regression paths.
    pub confidence: f64,
}

impl ForecastResult {
    pub fn restock_needed(&self) -> bool {
        (self.current_stock as f64) <= self.reorder_point
    }

    pub fn recommended_order_quantity(&self) -> f64 {
        if !self.restock_needed() {
            return 0.0;
        }
        self.optimal_order_quantity
            .max(self.predicted_demand - self.current_stock as f64)
    }

    pub fn risk_level(&self) -> RiskLevel {
        let stock = self.current_stock as f64;
        if stock <= self.safety_stock {
            RiskLevel::High
        } else if stock <= self.reorder_point {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn stockout_days(&self) -> StockoutDays {
        if self.predicted_demand <= 0.0 || self.horizon_days == 0 {
            return StockoutDays::Never;
        }
        let daily = self.predicted_demand / f64::from(self.horizon_days);
        let days = (self.current_stock as f64 / daily).ceil();
        StockoutDays::Days(if days > 0.0 { days as u64 } else { 0 })
    }
}

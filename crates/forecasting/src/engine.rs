//! Forecast orchestration.
//!
//! Each call fetches the product and its ledger, picks a path based on how
//! much history exists, and fits from scratch. Nothing is cached between calls.
//!
//! Path selection:
//! - fewer than 5 movements, or fewer than 3 selling days: simple heuristic
//! - otherwise: OLS over the daily sales series
//! - multi-feature requests additionally need more than 10 movements and at
//!   least 5 selling days, else they take the linear path

use chrono::Datelike;
use tracing::{debug, info};

use forgecast_core::{Clock, ProductId, SystemClock};
use forgecast_inventory::{InventoryReader, Movement, ProductSnapshot};

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::metrics;
use crate::multi_regression::{MultiFeatureModel, feature_observations};
use crate::prediction::{ForecastMethod, ForecastResult};
use crate::regression::RegressionModel;
use crate::series::aggregate_daily_sales;
use crate::stats;

/// Below this many movements the history is too thin to fit.
pub const MIN_REGRESSION_MOVEMENTS: usize = 5;
/// Below this many selling days the history is too thin to fit.
pub const MIN_REGRESSION_OBSERVATIONS: usize = 3;
/// Multi-feature fitting needs strictly more movements than this.
pub const MULTI_FEATURE_MOVEMENT_THRESHOLD: usize = 10;
/// Multi-feature fitting needs at least this many selling days.
pub const MIN_MULTI_FEATURE_OBSERVATIONS: usize = 5;

const SIMPLE_CONFIDENCE: f64 = 0.5;
const MULTI_FEATURE_SAFETY_FACTOR: f64 = 0.15;
/// The multi-feature reorder point always covers a week, independent of config.
const MULTI_FEATURE_LEAD_TIME_DAYS: f64 = 7.0;

/// Inventory quantities attached to a forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Thresholds {
    predicted_demand: f64,
    safety_stock: f64,
    reorder_point: f64,
    optimal_order_quantity: f64,
}

/// Demand forecasting engine over a read-only inventory source.
#[derive(Debug, Clone)]
pub struct ForecastEngine<R, C = SystemClock> {
    reader: R,
    clock: C,
    config: ForecastConfig,
}

impl<R> ForecastEngine<R, SystemClock>
where
    R: InventoryReader,
{
    pub fn new(reader: R) -> Self {
        Self::with_clock(reader, SystemClock)
    }
}

impl<R, C> ForecastEngine<R, C>
where
    R: InventoryReader,
    C: Clock,
{
    pub fn with_clock(reader: R, clock: C) -> Self {
        Self {
            reader,
            clock,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast with the single-feature (day index) regression.
    pub fn forecast_simple(
        &self,
        product_id: ProductId,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError> {
        ensure_horizon(horizon_days)?;
        let (product, history) = self.load(product_id)?;
        let result = self.linear_forecast(&product, &history, horizon_days);
        info!(
            product = %product_id,
            method = %result.method,
            horizon_days,
            predicted_demand = result.predicted_demand,
            confidence = result.confidence,
            "forecast computed"
        );
        Ok(result)
    }

    /// Forecast with trend, season and price features when history allows.
    pub fn forecast_multi_feature(
        &self,
        product_id: ProductId,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError> {
        ensure_horizon(horizon_days)?;
        let (product, history) = self.load(product_id)?;
        let result = self.multi_feature_forecast(&product, &history, horizon_days);
        info!(
            product = %product_id,
            method = %result.method,
            horizon_days,
            predicted_demand = result.predicted_demand,
            confidence = result.confidence,
            "forecast computed"
        );
        Ok(result)
    }

    /// Linear-path forecasts for every product that needs restocking.
    pub fn restock_recommendations(
        &self,
        horizon_days: u32,
    ) -> Result<Vec<ForecastResult>, ForecastError> {
        ensure_horizon(horizon_days)?;
        let products = self.reader.list_products()?;

        let mut recommendations = Vec::new();
        for product in &products {
            let history = self.history(product.id)?;
            let result = self.linear_forecast(product, &history, horizon_days);
            if result.restock_needed() {
                recommendations.push(result);
            }
        }

        info!(
            products = products.len(),
            recommendations = recommendations.len(),
            horizon_days,
            "restock recommendations computed"
        );
        Ok(recommendations)
    }

    /// Product plus its ledger, oldest first.
    pub(crate) fn load(
        &self,
        product_id: ProductId,
    ) -> Result<(ProductSnapshot, Vec<Movement>), ForecastError> {
        let product = self
            .reader
            .product(product_id)
            .map_err(|e| ForecastError::from_store(product_id, e))?;
        let history = self.history(product_id)?;
        Ok((product, history))
    }

    fn history(&self, product_id: ProductId) -> Result<Vec<Movement>, ForecastError> {
        let mut history = self
            .reader
            .movement_history(product_id)
            .map_err(|e| ForecastError::from_store(product_id, e))?;
        history.sort_by_key(|m| m.timestamp);
        Ok(history)
    }

    fn linear_forecast(
        &self,
        product: &ProductSnapshot,
        history: &[Movement],
        horizon_days: u32,
    ) -> ForecastResult {
        if history.len() < MIN_REGRESSION_MOVEMENTS {
            debug!(product = %product.id, movements = history.len(), "too few movements; simple average");
            return self.simple_average(product, horizon_days);
        }

        let series = aggregate_daily_sales(history);
        if series.len() < MIN_REGRESSION_OBSERVATIONS {
            debug!(product = %product.id, selling_days = series.len(), "too few selling days; simple average");
            return self.simple_average(product, horizon_days);
        }

        let model = RegressionModel::fit(&series);
        let horizon = f64::from(horizon_days);

        // Sample the trend at the middle of the horizon.
        let daily_demand = model.predict(series.len() as f64 + horizon / 2.0);
        let predicted_demand = (daily_demand * horizon).max(0.0);

        let safety_stock =
            metrics::safety_stock_from_residuals(&model.abs_residuals(&series), &self.config);
        let reorder_point = metrics::reorder_point(daily_demand, safety_stock, &self.config);
        let optimal_order_quantity =
            metrics::economic_order_quantity(predicted_demand, product.unit_price, &self.config);

        debug!(
            product = %product.id,
            selling_days = series.len(),
            slope = model.slope,
            intercept = model.intercept,
            r_squared = model.r_squared,
            "linear regression fitted"
        );

        let thresholds = Thresholds {
            predicted_demand,
            safety_stock,
            reorder_point,
            optimal_order_quantity,
        };
        self.result(product, horizon_days, ForecastMethod::LinearRegression, thresholds, model.r_squared)
    }

    fn multi_feature_forecast(
        &self,
        product: &ProductSnapshot,
        history: &[Movement],
        horizon_days: u32,
    ) -> ForecastResult {
        if history.len() <= MULTI_FEATURE_MOVEMENT_THRESHOLD {
            debug!(product = %product.id, movements = history.len(), "not enough movements for multi-feature; linear path");
            return self.linear_forecast(product, history, horizon_days);
        }

        let observations = feature_observations(history, product.unit_price);
        if observations.len() < MIN_MULTI_FEATURE_OBSERVATIONS {
            debug!(product = %product.id, selling_days = observations.len(), "not enough selling days for multi-feature; linear path");
            return self.linear_forecast(product, history, horizon_days);
        }

        let model = MultiFeatureModel::fit(&observations);
        let horizon = f64::from(horizon_days);
        let season = f64::from(self.clock.now().month());

        let daily_demand = model.predict(observations.len() as f64, season, product.unit_price);
        let predicted_demand = (daily_demand * horizon).max(0.0);

        let safety_stock = predicted_demand * MULTI_FEATURE_SAFETY_FACTOR;
        // Unclamped: a falling trend can push this below zero.
        let reorder_point = daily_demand * MULTI_FEATURE_LEAD_TIME_DAYS + safety_stock;
        let optimal_order_quantity =
            metrics::economic_order_quantity(predicted_demand, product.unit_price, &self.config);

        debug!(
            product = %product.id,
            selling_days = observations.len(),
            beta0 = model.beta0,
            beta1 = model.beta1,
            beta2 = model.beta2,
            beta3 = model.beta3,
            r_squared = model.r_squared,
            "multi-feature regression fitted"
        );

        let thresholds = Thresholds {
            predicted_demand,
            safety_stock,
            reorder_point,
            optimal_order_quantity,
        };
        self.result(
            product,
            horizon_days,
            ForecastMethod::MultipleLinearRegression,
            thresholds,
            model.r_squared,
        )
    }

    /// Fixed heuristic from current stock; ignores history.
    fn simple_average(&self, product: &ProductSnapshot, horizon_days: u32) -> ForecastResult {
        let demand = (product.quantity as f64 * 0.1).max(1.0);
        let thresholds = Thresholds {
            predicted_demand: demand,
            safety_stock: demand * 0.2,
            reorder_point: demand * 1.5,
            optimal_order_quantity: demand * 2.0,
        };
        self.result(product, horizon_days, ForecastMethod::SimpleAverage, thresholds, SIMPLE_CONFIDENCE)
    }

    fn result(
        &self,
        product: &ProductSnapshot,
        horizon_days: u32,
        method: ForecastMethod,
        thresholds: Thresholds,
        confidence: f64,
    ) -> ForecastResult {
        ForecastResult {
            product_id: product.id,
            product_name: product.name.clone(),
            current_stock: product.quantity,
            predicted_demand: thresholds.predicted_demand,
            safety_stock: thresholds.safety_stock,
            reorder_point: thresholds.reorder_point,
            optimal_order_quantity: thresholds.optimal_order_quantity,
            generated_at: self.clock.now(),
            horizon_days,
            method,
            confidence: stats::clamp_unit(confidence),
        }
    }
}

fn ensure_horizon(horizon_days: u32) -> Result<(), ForecastError> {
    if horizon_days == 0 {
        return Err(ForecastError::invalid_input("horizon_days must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::StockoutDays;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use forgecast_core::{DomainError, DomainResult, FixedClock};
    use proptest::prelude::*;

    #[derive(Debug, Default)]
    struct StubReader {
        products: Vec<ProductSnapshot>,
        movements: Vec<Movement>,
        unavailable: bool,
    }

    impl InventoryReader for StubReader {
        fn product(&self, id: ProductId) -> DomainResult<ProductSnapshot> {
            if self.unavailable {
                return Err(DomainError::unavailable("connection refused"));
            }
            self.products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(DomainError::not_found)
        }

        fn movement_history(&self, id: ProductId) -> DomainResult<Vec<Movement>> {
            if self.unavailable {
                return Err(DomainError::unavailable("connection refused"));
            }
            Ok(self.movements.iter().filter(|m| m.product_id == id).cloned().collect())
        }

        fn list_products(&self) -> DomainResult<Vec<ProductSnapshot>> {
            if self.unavailable {
                return Err(DomainError::unavailable("connection refused"));
            }
            Ok(self.products.clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn sales(pid: ProductId, quantities: &[u32]) -> Vec<Movement> {
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| Movement::sale(pid, q, day(i as i64)).unwrap())
            .collect()
    }

    fn engine_for(
        product: ProductSnapshot,
        movements: Vec<Movement>,
    ) -> ForecastEngine<StubReader, FixedClock> {
        let reader = StubReader {
            products: vec![product],
            movements,
            unavailable: false,
        };
        ForecastEngine::with_clock(reader, FixedClock::new(now()))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn thin_history_uses_simple_average() {
        let pid = ProductId::new();
        let product = ProductSnapshot::new(pid, "Widget", 20.0, 100);
        let engine = engine_for(product, sales(pid, &[4]));

        let r = engine.forecast_simple(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::SimpleAverage);
        assert_eq!(r.confidence, 0.5);
        assert_eq!(r.predicted_demand, 10.0);
        assert_eq!(r.safety_stock, 2.0);
        assert_eq!(r.reorder_point, 15.0);
        assert_eq!(r.optimal_order_quantity, 20.0);
        assert_eq!(r.generated_at, now());
    }

    #[test]
    fn simple_average_demand_is_at_least_one() {
        let pid = ProductId::new();
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 20.0, 3), vec![]);
        let r = engine.forecast_simple(pid, 30).unwrap();
        assert_eq!(r.predicted_demand, 1.0);
    }

    #[test]
    fn many_movements_on_few_days_use_simple_average() {
        let pid = ProductId::new();
        let movements = (0..6)
            .map(|i| Movement::sale(pid, 2, day(i % 2) + Duration::hours(i)).unwrap())
            .collect();
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 20.0, 50), movements);

        let r = engine.forecast_simple(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::SimpleAverage);
    }

    #[test]
    fn linear_trend_golden_values() {
        // units = 2*d + 1 for selling days d = 1..=9
        let pid = ProductId::new();
        let mut movements = sales(pid, &[3, 5, 7, 9, 11, 13, 15, 17, 19]);
        movements.push(Movement::purchase(pid, 200, day(3)).unwrap());
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 20.0, 100), movements);

        let r = engine.forecast_simple(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::LinearRegression);
        // daily at x = 9 + 15 = 24 -> 49, total 1470
        assert!(approx(r.predicted_demand, 1470.0));
        assert!(approx(r.safety_stock, 1.0));
        assert!(approx(r.reorder_point, 49.0 * 7.0 + 1.0));
        // sqrt(2 * 17640 * 100 / 5)
        assert!(approx(r.optimal_order_quantity, 840.0));
        assert!(approx(r.confidence, 1.0));
        assert!(r.restock_needed());
    }

    #[test]
    fn declining_sales_clamp_demand_to_zero() {
        let pid = ProductId::new();
        let movements = sales(pid, &[20, 18, 16, 14, 12, 10, 8, 6, 4]);
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 20.0, 40), movements);

        let r = engine.forecast_simple(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::LinearRegression);
        assert_eq!(r.predicted_demand, 0.0);
        assert_eq!(r.stockout_days(), StockoutDays::Never);
        assert!(r.reorder_point >= r.safety_stock);
    }

    #[test]
    fn exactly_ten_movements_fall_back_to_linear() {
        let pid = ProductId::new();
        let movements = sales(pid, &[5, 7, 6, 9, 8, 10, 12, 11, 13, 14]);
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 12.0, 80), movements);

        let r = engine.forecast_multi_feature(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::LinearRegression);
    }

    #[test]
    fn many_movements_on_four_days_fall_back_to_linear() {
        let pid = ProductId::new();
        let movements = (0..12)
            .map(|i| Movement::sale(pid, 3, day(i % 4) + Duration::minutes(i)).unwrap())
            .collect();
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 12.0, 80), movements);

        let r = engine.forecast_multi_feature(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::LinearRegression);
    }

    #[test]
    fn multi_feature_golden_values_for_flat_sales() {
        let pid = ProductId::new();
        let movements = sales(pid, &[3; 15]);
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 12.0, 80), movements);

        let r = engine.forecast_multi_feature(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::MultipleLinearRegression);
        assert!(approx(r.predicted_demand, 90.0));
        assert!(approx(r.safety_stock, 13.5));
        assert!(approx(r.reorder_point, 3.0 * 7.0 + 13.5));
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn falling_multi_feature_trend_gives_negative_reorder_point() {
        // 60, 56, ..., 4 over fifteen days
        let pid = ProductId::new();
        let quantities: Vec<u32> = (0..15).map(|i| 60 - 4 * i).collect();
        let movements = sales(pid, &quantities);
        let product = ProductSnapshot::new(pid, "Widget", 12.0, 0);

        let model = MultiFeatureModel::fit(&feature_observations(&movements, 12.0));
        let daily = model.predict(15.0, 12.0, 12.0);
        assert!(daily < 0.0);

        let engine = ForecastEngine::with_clock(
            StubReader { products: vec![product], movements, unavailable: false },
            FixedClock::new(Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap()),
        );
        let r = engine.forecast_multi_feature(pid, 30).unwrap();
        assert_eq!(r.method, ForecastMethod::MultipleLinearRegression);
        assert_eq!(r.predicted_demand, 0.0);
        assert_eq!(r.safety_stock, 0.0);
        assert!(approx(r.reorder_point, daily * 7.0));
        assert!(r.reorder_point < 0.0);
        assert!(!r.restock_needed());
        assert_eq!(r.recommended_order_quantity(), 0.0);
    }

    #[test]
    fn lead_time_applies_to_linear_path_only() {
        let pid = ProductId::new();
        let product = ProductSnapshot::new(pid, "Widget", 12.0, 80);
        let config = ForecastConfig::default().with_lead_time_days(14.0);

        // flat sales: daily demand 3, safety stock floored at 1
        let linear = engine_for(product.clone(), sales(pid, &[3; 9])).with_config(config.clone());
        let r = linear.forecast_simple(pid, 30).unwrap();
        assert!(approx(r.reorder_point, 3.0 * 14.0 + 1.0));

        let multi = engine_for(product, sales(pid, &[3; 15])).with_config(config);
        let r = multi.forecast_multi_feature(pid, 30).unwrap();
        assert!(approx(r.reorder_point, 3.0 * 7.0 + 13.5));
    }

    #[test]
    fn multi_feature_uses_clock_month_for_season() {
        let pid = ProductId::new();
        let movements = sales(pid, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 1, 2, 3]);
        let product = ProductSnapshot::new(pid, "Widget", 12.0, 80);

        let january = ForecastEngine::with_clock(
            StubReader { products: vec![product.clone()], movements: movements.clone(), unavailable: false },
            FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()),
        );
        let december = ForecastEngine::with_clock(
            StubReader { products: vec![product], movements, unavailable: false },
            FixedClock::new(Utc.with_ymd_and_hms(2024, 12, 10, 0, 0, 0).unwrap()),
        );

        let jan = january.forecast_multi_feature(pid, 30).unwrap();
        let dec = december.forecast_multi_feature(pid, 30).unwrap();
        assert_eq!(jan.method, ForecastMethod::MultipleLinearRegression);
        assert!(dec.predicted_demand > jan.predicted_demand);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let engine = engine_for(ProductSnapshot::new(ProductId::new(), "Widget", 1.0, 1), vec![]);
        let missing = ProductId::new();
        assert_eq!(
            engine.forecast_simple(missing, 30).unwrap_err(),
            ForecastError::ProductNotFound(missing)
        );
        assert_eq!(
            engine.forecast_multi_feature(missing, 30).unwrap_err(),
            ForecastError::ProductNotFound(missing)
        );
    }

    #[test]
    fn store_failure_is_propagated() {
        let engine = ForecastEngine::with_clock(
            StubReader { unavailable: true, ..StubReader::default() },
            FixedClock::new(now()),
        );
        let err = engine.forecast_simple(ProductId::new(), 30).unwrap_err();
        assert!(matches!(err, ForecastError::Store(_)));
        assert!(matches!(engine.restock_recommendations(30), Err(ForecastError::Store(_))));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let pid = ProductId::new();
        let engine = engine_for(ProductSnapshot::new(pid, "Widget", 1.0, 1), vec![]);
        assert!(matches!(
            engine.forecast_simple(pid, 0),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn ledger_order_does_not_matter() {
        let pid = ProductId::new();
        let movements = sales(pid, &[4, 9, 2, 7, 5, 8, 3]);
        let mut reversed = movements.clone();
        reversed.reverse();
        let product = ProductSnapshot::new(pid, "Widget", 9.0, 30);

        let a = engine_for(product.clone(), movements).forecast_simple(pid, 14).unwrap();
        let b = engine_for(product, reversed).forecast_simple(pid, 14).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn restock_recommendations_keep_only_products_at_or_below_reorder_point() {
        let low = ProductSnapshot::new(ProductId::new(), "Low", 5.0, 1);
        let high = ProductSnapshot::new(ProductId::new(), "High", 5.0, 10_000);
        let mut movements = sales(low.id, &[5, 6, 5, 7, 6, 8]);
        movements.extend(sales(high.id, &[5, 6, 5, 7, 6, 8]));

        let engine = ForecastEngine::with_clock(
            StubReader { products: vec![low.clone(), high], movements, unavailable: false },
            FixedClock::new(now()),
        );

        let recs = engine.restock_recommendations(30).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].product_id, low.id);
        assert_eq!(recs[0].method, ForecastMethod::LinearRegression);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Any ledger yields a well-formed, repeatable forecast on both paths.
        #[test]
        fn forecasts_are_well_formed_and_repeatable(
            entries in prop::collection::vec((1u32..200, 0i64..60, any::<bool>()), 0..40),
            stock in 0i64..1_000,
            price in 0.0f64..500.0,
            horizon in 1u32..120,
        ) {
            let pid = ProductId::new();
            let movements: Vec<Movement> = entries
                .iter()
                .map(|&(q, d, is_sale)| {
                    if is_sale {
                        Movement::sale(pid, q, day(d)).unwrap()
                    } else {
                        Movement::purchase(pid, q, day(d)).unwrap()
                    }
                })
                .collect();
            let engine = engine_for(ProductSnapshot::new(pid, "Widget", price, stock), movements);

            for r in [
                engine.forecast_simple(pid, horizon).unwrap(),
                engine.forecast_multi_feature(pid, horizon).unwrap(),
            ] {
                prop_assert!(r.predicted_demand >= 0.0);
                prop_assert!((0.0..=1.0).contains(&r.confidence));
                prop_assert!(r.safety_stock >= 0.0);
                prop_assert!(r.optimal_order_quantity >= 0.0);
                prop_assert_eq!(r.restock_needed(), stock as f64 <= r.reorder_point);
                if entries.len() < MIN_REGRESSION_MOVEMENTS {
                    prop_assert_eq!(r.method, ForecastMethod::SimpleAverage);
                    prop_assert_eq!(r.confidence, 0.5);
                }
            }

            prop_assert_eq!(
                engine.forecast_simple(pid, horizon).unwrap(),
                engine.forecast_simple(pid, horizon).unwrap()
            );
        }
    }
}

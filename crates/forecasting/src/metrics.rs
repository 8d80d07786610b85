//! Inventory-control thresholds derived from a demand forecast.

use crate::config::ForecastConfig;
use crate::stats;

/// Safety stock never drops below this on the regression path.
pub const MIN_SAFETY_STOCK: f64 = 1.0;

/// `z * stddev(residuals) * sqrt(lead_time)`, floored at [`MIN_SAFETY_STOCK`].
pub fn safety_stock_from_residuals(residuals: &[f64], config: &ForecastConfig) -> f64 {
    let raw = config.z_score() * stats::stddev_population(residuals) * config.lead_time_days.sqrt();
    if raw.is_nan() {
        return MIN_SAFETY_STOCK;
    }
    raw.max(MIN_SAFETY_STOCK)
}

/// Stock level that should trigger replenishment; never below safety stock.
pub fn reorder_point(daily_demand: f64, safety_stock: f64, config: &ForecastConfig) -> f64 {
    safety_stock.max(daily_demand * config.lead_time_days + safety_stock)
}

/// Economic order quantity.
///
/// Annual demand and holding cost are floored at 1.0 so neither a zero
/// forecast nor a free product can blow up the square root.
pub fn economic_order_quantity(predicted_demand: f64, unit_price: f64, config: &ForecastConfig) -> f64 {
    let annual_demand = (predicted_demand * 12.0).max(1.0);
    let holding_cost = (unit_price * config.holding_cost_rate).max(1.0);
    (2.0 * annual_demand * config.ordering_cost / holding_cost).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn safety_stock_uses_z_stddev_and_lead_time() {
        // residual stddev = 2, z = 1.65, sqrt(7)
        let residuals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let ss = safety_stock_from_residuals(&residuals, &ForecastConfig::default());
        assert!(approx(ss, 1.65 * 2.0 * 7f64.sqrt()));
    }

    #[test]
    fn safety_stock_is_floored() {
        let ss = safety_stock_from_residuals(&[0.0, 0.0, 0.0], &ForecastConfig::default());
        assert_eq!(ss, MIN_SAFETY_STOCK);
    }

    #[test]
    fn higher_service_level_means_more_safety_stock() {
        let residuals = [1.0, 6.0, 2.0, 9.0];
        let base = safety_stock_from_residuals(&residuals, &ForecastConfig::default());
        let strict = safety_stock_from_residuals(
            &residuals,
            &ForecastConfig::default().with_service_level(0.99),
        );
        assert!(strict > base);
    }

    #[test]
    fn reorder_point_adds_lead_time_demand() {
        let rp = reorder_point(3.0, 5.0, &ForecastConfig::default());
        assert!(approx(rp, 26.0));
    }

    #[test]
    fn reorder_point_never_below_safety_stock() {
        let rp = reorder_point(-4.0, 5.0, &ForecastConfig::default());
        assert_eq!(rp, 5.0);
    }

    #[test]
    fn eoq_matches_closed_form() {
        // annual = 100*12 = 1200, holding = 40*0.25 = 10 -> sqrt(2*1200*100/10)
        let q = economic_order_quantity(100.0, 40.0, &ForecastConfig::default());
        assert!(approx(q, (24_000.0f64).sqrt()));
    }

    #[test]
    fn eoq_floors_demand_and_holding_cost() {
        let q = economic_order_quantity(0.0, 0.0, &ForecastConfig::default());
        assert!(approx(q, 200.0f64.sqrt()));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Thresholds stay finite and ordered for any non-negative inputs.
        #[test]
        fn thresholds_are_finite_and_ordered(
            residuals in prop::collection::vec(0.0f64..1_000.0, 0..50),
            daily in -100.0f64..1_000.0,
            demand in 0.0f64..100_000.0,
            price in 0.0f64..10_000.0,
        ) {
            let config = ForecastConfig::default();
            let ss = safety_stock_from_residuals(&residuals, &config);
            let rp = reorder_point(daily, ss, &config);
            let eoq = economic_order_quantity(demand, price, &config);

            prop_assert!(ss.is_finite() && ss >= MIN_SAFETY_STOCK);
            prop_assert!(rp.is_finite() && rp >= ss);
            prop_assert!(eoq.is_finite() && eoq >= 0.0);
        }
    }
}

//! Ordinary least squares of daily sales against the day index.

use serde::{Deserialize, Serialize};

use crate::series::DailyObservation;
use crate::stats::{self, EPSILON};

/// Fitted line `units = intercept + slope * day_index`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination, clamped to [0, 1].
    pub r_squared: f64,
}

impl RegressionModel {
    /// Flat line through `level`, explaining nothing.
    pub fn flat(level: f64) -> Self {
        Self {
            intercept: level,
            slope: 0.0,
            r_squared: 0.0,
        }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Absolute residuals `|actual - predicted|` over a series.
    pub fn abs_residuals(&self, series: &[DailyObservation]) -> Vec<f64> {
        series
            .iter()
            .map(|o| (o.units_sold - self.predict(f64::from(o.day_index))).abs())
            .collect()
    }

    /// Closed-form OLS fit.
    ///
    /// - empty input: flat line at 0
    /// - one point: flat line through it
    /// - identical x values (zero denominator): flat line at mean(y)
    pub fn fit(series: &[DailyObservation]) -> Self {
        match series {
            [] => return Self::flat(0.0),
            [only] => return Self::flat(only.units_sold),
            _ => {}
        }

        let n = series.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for o in series {
            let x = f64::from(o.day_index);
            let y = o.units_sold;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        let denominator = n * sum_x2 - sum_x * sum_x;
        let (intercept, slope) = if denominator.abs() < EPSILON {
            (sum_y / n, 0.0)
        } else {
            let slope = (n * sum_xy - sum_x * sum_y) / denominator;
            ((sum_y - slope * sum_x) / n, slope)
        };

        let actual: Vec<f64> = series.iter().map(|o| o.units_sold).collect();
        let predicted: Vec<f64> = series
            .iter()
            .map(|o| intercept + slope * f64::from(o.day_index))
            .collect();

        Self {
            intercept,
            slope,
            r_squared: stats::r_squared(&actual, &predicted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(ys: &[f64]) -> Vec<DailyObservation> {
        ys.iter()
            .zip(1u32..)
            .map(|(&units_sold, day_index)| DailyObservation {
                day_index,
                units_sold,
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exact_line_is_recovered() {
        let model = RegressionModel::fit(&series(&[3.0, 5.0, 7.0, 9.0]));
        assert!(approx(model.slope, 2.0));
        assert!(approx(model.intercept, 1.0));
        assert!(approx(model.r_squared, 1.0));
        assert!(approx(model.predict(5.0), 11.0));
    }

    #[test]
    fn known_noisy_fit() {
        // x = 1..5, y = 2,4,5,4,5 -> slope 0.6, intercept 2.2, R^2 = 0.6
        let model = RegressionModel::fit(&series(&[2.0, 4.0, 5.0, 4.0, 5.0]));
        assert!(approx(model.slope, 0.6));
        assert!(approx(model.intercept, 2.2));
        assert!(approx(model.r_squared, 0.6));
    }

    #[test]
    fn single_point_is_flat() {
        let model = RegressionModel::fit(&series(&[12.0]));
        assert_eq!(model, RegressionModel::flat(12.0));
    }

    #[test]
    fn identical_x_falls_back_to_mean() {
        let points = vec![
            DailyObservation { day_index: 4, units_sold: 2.0 },
            DailyObservation { day_index: 4, units_sold: 6.0 },
        ];
        let model = RegressionModel::fit(&points);
        assert_eq!(model.slope, 0.0);
        assert!(approx(model.intercept, 4.0));
        assert_eq!(model.r_squared, 0.0);
    }

    #[test]
    fn constant_sales_have_zero_confidence() {
        let model = RegressionModel::fit(&series(&[5.0, 5.0, 5.0]));
        assert!(approx(model.slope, 0.0));
        assert!(approx(model.intercept, 5.0));
        assert_eq!(model.r_squared, 0.0);
    }

    #[test]
    fn residuals_are_absolute() {
        let model = RegressionModel {
            intercept: 0.0,
            slope: 1.0,
            r_squared: 0.0,
        };
        let residuals = model.abs_residuals(&series(&[0.0, 4.0]));
        assert_eq!(residuals, vec![1.0, 2.0]);
    }
}

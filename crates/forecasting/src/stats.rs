//! Small deterministic statistics helpers shared by the fitters.

/// Denominators below this are treated as zero.
pub(crate) const EPSILON: f64 = 1e-10;

pub(crate) fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population standard deviation (n), deterministic.
pub(crate) fn stddev_population(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs
        .iter()
        .map(|x| {
            let d = x - m;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}

/// `1 - SSres/SStot`, clamped to [0, 1].
///
/// A constant series (SStot = 0) explains nothing and scores 0.
pub(crate) fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean_y = mean(actual);
    let (ss_tot, ss_res) = actual
        .iter()
        .zip(predicted)
        .fold((0.0, 0.0), |(tot, res), (y, p)| {
            (tot + (y - mean_y).powi(2), res + (y - p).powi(2))
        });

    if ss_tot.abs() < EPSILON {
        return 0.0;
    }
    clamp_unit(1.0 - ss_res / ss_tot)
}

/// Clamp into [0, 1]; NaN maps to 0.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

//! Percentile helpers for the standard normal distribution N(0, 1).
use crate::error::MinimizerError;
use statrs::function::erf::{erf, erf_inv};
use std::f64::consts::SQRT_2;

fn check_percentile(percentile: f64) -> Result<(), MinimizerError> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(MinimizerError::InvalidArgument(format!(
            "percentile must be in [0, 100], got {}",
            percentile
        )));
    }
    Ok(())
}

/// Percentile point of sigma value `x`, i.e. `100 * CDF(x)`. Output is in [0, 100].
pub fn percentile_from_sigma(x: f64) -> f64 {
    100.0 * 0.5 * (1.0 + erf(x / SQRT_2))
}

/// Sigma value of a percentile point in [0, 100]. The end points map to infinities.
pub fn sigma_from_percentile(percentile: f64) -> Result<f64, MinimizerError> {
    check_percentile(percentile)?;
    Ok(SQRT_2 * erf_inv(2.0 * (percentile / 100.0) - 1.0))
}

/// Linearly interpolated percentile of `data`.
///
/// `data` is sorted in place as a side effect.
pub fn calculate_percentile(data: &mut [f64], percentile: f64) -> Result<f64, MinimizerError> {
    if data.is_empty() {
        return Err(MinimizerError::InvalidArgument(
            "data must have at least one member".to_string(),
        ));
    }
    check_percentile(percentile)?;

    data.sort_by(|a, b| a.total_cmp(b));

    let index = (percentile / 100.0) * (data.len() - 1) as f64;
    let lower = index as usize;
    let upper = lower + 1;
    if upper >= data.len() {
        return Ok(data[lower]);
    }

    let fraction = index - lower as f64;
    Ok(data[lower] * (1.0 - fraction) + data[upper] * fraction)
}

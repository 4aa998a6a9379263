//! Conversion between cartesian and hyperspherical coordinates.
//!
//! A point of dimension N is described by a radius and N-1 angles:
//!
//! ```text
//! x[0]   = r cos(t[0])
//! x[1]   = r sin(t[0]) cos(t[1])
//! ...
//! x[N-1] = r sin(t[0]) ... sin(t[N-2])
//! ```
use crate::error::MinimizerError;
use crate::math::{divide, norm};
use ndarray::{Data, prelude::*};
use std::f64::consts::PI;

const EPS: f64 = 1e-36;

/// Cartesian coordinates of radius `|r|` and angles `thetas`. Returns `thetas.len() + 1` values.
pub fn spherical_to_cartesian<S>(r: f64, thetas: &ArrayBase<S, Ix1>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let mut x = Array1::from_elem(thetas.len() + 1, r.abs());
    for (i, theta) in thetas.iter().enumerate() {
        x[i] *= theta.cos();
        let sin = theta.sin();
        for j in (i + 1)..x.len() {
            x[j] *= sin;
        }
    }
    x
}

/// Radius and angles of `x`, which must have at least two coordinates.
///
/// All angles are in [0, pi] except the last, which is in [0, 2 pi).
pub fn cartesian_to_spherical<S>(x: &ArrayBase<S, Ix1>) -> Result<(f64, Array1<f64>), MinimizerError>
where
    S: Data<Elem = f64>,
{
    if x.len() < 2 {
        return Err(MinimizerError::InvalidArgument(format!(
            "input vector must be at least 2 dimensional, got {}",
            x.len()
        )));
    }

    let r = norm(x, 0) + EPS;
    let normed = divide(x, r);

    let mut thetas = Array1::zeros(x.len() - 1);
    for i in 0..thetas.len() {
        let rr = norm(&normed, i) + EPS;
        thetas[i] = (normed[i] / rr).clamp(-1.0, 1.0).acos();
    }

    let last = thetas.len() - 1;
    if normed[normed.len() - 1] < 0.0 {
        thetas[last] = 2.0 * PI - thetas[last];
    }

    Ok((r, thetas))
}

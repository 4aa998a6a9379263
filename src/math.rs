//! Elementwise vector arithmetic and index sorting used by the minimizers.
//!
//! All functions take any one-dimensional `ndarray` container of `f64` (owned
//! arrays, views, simplex rows) and return owned arrays. Binary operations
//! check operand lengths and report [`MinimizerError::DimensionMismatch`]
//! instead of panicking inside `ndarray`.
use crate::error::MinimizerError;
use ndarray::{Data, RemoveAxis, prelude::*};
use std::cmp::Ordering;

pub mod percentile;
pub mod spherical;

fn check_len<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> Result<(), MinimizerError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    if a.len() != b.len() {
        return Err(MinimizerError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Elementwise `a + b`.
pub fn add<S1, S2>(a: &ArrayBase<S1, Ix1>, b: &ArrayBase<S2, Ix1>) -> Result<Array1<f64>, MinimizerError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    check_len(a, b)?;
    Ok(Array1::from_shape_fn(a.len(), |i| a[i] + b[i]))
}

/// Elementwise `a - b`.
pub fn subtract<S1, S2>(
    a: &ArrayBase<S1, Ix1>,
    b: &ArrayBase<S2, Ix1>,
) -> Result<Array1<f64>, MinimizerError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    check_len(a, b)?;
    Ok(Array1::from_shape_fn(a.len(), |i| a[i] - b[i]))
}

/// `scalar * v`
pub fn scale<S>(scalar: f64, v: &ArrayBase<S, Ix1>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    v.mapv(|x| scalar * x)
}

pub fn scale_in_place(v: &mut Array1<f64>, scalar: f64) {
    v.mapv_inplace(|x| x * scalar);
}

/// `v / scalar`; a zero divisor yields IEEE infinities or NaN.
pub fn divide<S>(v: &ArrayBase<S, Ix1>, scalar: f64) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    v.mapv(|x| x / scalar)
}

pub fn divide_in_place(v: &mut Array1<f64>, scalar: f64) {
    v.mapv_inplace(|x| x / scalar);
}

/// Euclidean norm of `v[start..]`. Returns 0 when `start` is past the end.
pub fn norm<S>(v: &ArrayBase<S, Ix1>, start: usize) -> f64
where
    S: Data<Elem = f64>,
{
    let mut value = 0.0;
    for x in v.iter().skip(start) {
        value += x * x;
    }
    value.sqrt()
}

/// Indices that sort `values` ascending. Equal values may come out in any order.
///
/// NaN entries compare equal to everything, so the resulting order around them
/// is unspecified.
pub fn argsort<S>(values: &ArrayBase<S, Ix1>) -> Vec<usize>
where
    S: Data<Elem = f64>,
{
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_unstable_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
    order
}

/// Indices that sort `values` ascending, keeping equal values in index order.
pub fn argsort_stable<S>(values: &ArrayBase<S, Ix1>) -> Vec<usize>
where
    S: Data<Elem = f64>,
{
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
    order
}

/// Reorders the outer axis of `values` by `indices`, e.g. the output of [`argsort`].
pub fn take<S, D>(values: &ArrayBase<S, D>, indices: &[usize]) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: RemoveAxis,
{
    values.select(Axis(0), indices)
}

#[cfg(test)]
mod math_tests {
    use super::*;
    use crate::util::*;
    use float_cmp::F64Margin;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    const MARGIN: F64Margin = F64Margin {
        epsilon: 1e-12,
        ulps: 4,
    };

    #[test]
    fn add_subtract() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![0.5, -2.0, 10.0];
        comp_row_f64(&array![1.5, 0.0, 13.0], &add(&a, &b).unwrap(), MARGIN, "add");
        comp_row_f64(
            &array![0.5, 4.0, -7.0],
            &subtract(&a, &b).unwrap(),
            MARGIN,
            "subtract",
        );
    }

    #[test]
    fn add_works_on_views() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        let sum = add(&m.row(0), &m.row(1)).unwrap();
        comp_row_f64(&array![4.0, 6.0], &sum, MARGIN, "add(rows)");
    }

    #[test]
    fn mismatched_lengths() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![1.0, 2.0];
        assert_eq!(
            add(&a, &b),
            Err(MinimizerError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            subtract(&b, &a),
            Err(MinimizerError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        );
    }

    #[test]
    fn scale_and_divide() {
        let v = array![1.0, -2.0, 4.0];
        comp_row_f64(&array![2.5, -5.0, 10.0], &scale(2.5, &v), MARGIN, "scale");
        comp_row_f64(&array![0.5, -1.0, 2.0], &divide(&v, 2.0), MARGIN, "divide");

        let mut w = v.clone();
        scale_in_place(&mut w, 3.0);
        comp_row_f64(&array![3.0, -6.0, 12.0], &w, MARGIN, "scale_in_place");
        divide_in_place(&mut w, 3.0);
        comp_row_f64(&v, &w, MARGIN, "divide_in_place");
    }

    #[test]
    fn divide_by_zero_is_ieee() {
        let v = divide(&array![1.0, -1.0, 0.0], 0.0);
        assert_eq!(v[0], f64::INFINITY);
        assert_eq!(v[1], f64::NEG_INFINITY);
        assert!(v[2].is_nan());
    }

    #[test]
    fn norm_from_offset() {
        let v = array![2.0, 2.0];
        comp_f64(&(2.0 * 2f64.sqrt()), &norm(&v, 0), MARGIN, "norm", "");

        let v = array![100.0, 3.0, 4.0];
        comp_f64(&5.0, &norm(&v, 1), MARGIN, "norm(start=1)", "");
        assert_eq!(norm(&v, 3), 0.0);
        assert_eq!(norm(&v, 10), 0.0);
    }

    #[test]
    fn argsort_orders_values() {
        let values = array![3.0, -1.0, 2.5, 10.0, 0.0];
        let order = argsort(&values);
        assert_eq!(order, vec![1, 4, 2, 0, 3]);

        let sorted = take(&values, &order);
        for w in sorted.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn argsort_random_is_sorting_permutation() {
        let mut rng = StdRng::seed_from_u64(0);
        let dist = Normal::<f64>::new(0.0, 10.0).unwrap();

        for len in 0..=40 {
            // Coarse rounding so ties show up
            let values = Array1::from_shape_fn(len, |_| dist.sample(&mut rng).round());

            for order in [argsort(&values), argsort_stable(&values)] {
                let mut seen = order.clone();
                seen.sort_unstable();
                assert_eq!(seen, (0..len).collect::<Vec<_>>(), "len {}", len);

                let sorted = take(&values, &order);
                for w in sorted.windows(2) {
                    assert!(w[0] <= w[1], "len {}: {} > {}", len, w[0], w[1]);
                }
            }

            let stable = argsort_stable(&values);
            for w in stable.windows(2) {
                if values[w[0]] == values[w[1]] {
                    assert!(w[0] < w[1]);
                }
            }
        }
    }

    #[test]
    fn argsort_stable_keeps_ties_in_index_order() {
        let values = array![1.0, 0.0, 1.0, 0.0, 1.0];
        assert_eq!(argsort_stable(&values), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn argsort_empty() {
        let values: Array1<f64> = Array1::zeros(0);
        assert!(argsort(&values).is_empty());
        assert!(argsort_stable(&values).is_empty());
    }

    #[test]
    fn take_reorders_rows() {
        let m = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let taken = take(&m, &[2, 0, 1]);
        assert_eq!(taken, array![[2.0, 2.0], [0.0, 0.0], [1.0, 1.0]]);
    }
}

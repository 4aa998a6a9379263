use crate::error::MinimizerError;
use ndarray::prelude::*;

pub mod nelder_mead;

pub use self::nelder_mead::{
    NelderMeadMethod, NelderMeadOptions, NelderMeadResult, ScipyNelderMead, Termination,
};

// Define a trait for the objective function
pub trait ObjFn {
    fn call(&self, x: &Array1<f64>) -> f64;
}

impl<F> ObjFn for F
where
    F: Fn(&Array1<f64>) -> f64,
{
    fn call(&self, x: &Array1<f64>) -> f64 {
        self(x)
    }
}

pub trait Minimizer {
    type Output: MinimizerResult;

    fn name(&self) -> &str;

    /// Search for a local minimum of `f` starting from `initial_point`
    fn minimize(
        &self,
        f: &dyn ObjFn,
        initial_point: &Array1<f64>,
    ) -> Result<Self::Output, MinimizerError>;
}

pub trait MinimizerResult {
    fn xmin(&self) -> Array1<f64>;
    fn fmin(&self) -> f64;
    fn fn_evals(&self) -> usize;
    fn iters(&self) -> usize;
    fn converged(&self) -> bool;
}

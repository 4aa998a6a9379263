//! Nelder-Mead simplex minimizer following the scipy `minimize(method="Nelder-Mead")` variant.
//!
//! The optimizer object only carries configuration. Everything a run produces
//! (best point, counters, convergence status) comes back in a
//! [`NelderMeadResult`], so one [`ScipyNelderMead`] can be reused freely.
use crate::{
    error::MinimizerError,
    math::{add, argsort_stable, divide_in_place, scale, subtract, take},
    minimize::{Minimizer, MinimizerResult, ObjFn},
};
use log::{debug, trace};
use ndarray::{DataMut, prelude::*};
use std::fmt;

/// Simplex moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NelderMeadMethod {
    Reflection,
    Expansion,
    OutsideContraction,
    InsideContraction,
    Shrink,
}

impl fmt::Display for NelderMeadMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NelderMeadMethod::Reflection => write!(f, "Reflection"),
            NelderMeadMethod::Expansion => write!(f, "Expansion"),
            NelderMeadMethod::OutsideContraction => write!(f, "OutsideContraction"),
            NelderMeadMethod::InsideContraction => write!(f, "InsideContraction"),
            NelderMeadMethod::Shrink => write!(f, "Shrink"),
        }
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged {
        simplex_meets_xatol: bool,
        function_meets_fatol: bool,
    },
    MaxFunctionEvaluations,
    MaxIterations,
}

impl Termination {
    pub fn success(&self) -> bool {
        matches!(self, Termination::Converged { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Termination::Converged { .. } => write!(f, "Optimizer converged."),
            Termination::MaxFunctionEvaluations => write!(
                f,
                "Optimizer did not converge. Maximum number of function evaluations has been exceeded."
            ),
            Termination::MaxIterations => write!(
                f,
                "Optimizer did not converge. Maximum number of iterations has been exceeded."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadOptions {
    xatol: f64,
    fatol: f64,
    stencil: Vec<f64>,
    maxfun: usize,
    maxiter: usize,
    rho: f64,   // Reflection coefficient
    chi: f64,   // Expansion coefficient
    psi: f64,   // Contraction coefficient
    sigma: f64, // Shrink coefficient
    lower_bound: f64,
    upper_bound: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            xatol: 1e-4,
            fatol: 1e-4,
            stencil: vec![0.05],
            maxfun: 100,
            maxiter: 500,
            rho: 1.0,
            chi: 2.0,
            psi: 0.5,
            sigma: 0.5,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
        }
    }
}

impl NelderMeadOptions {
    /// Tolerance on the spread of the simplex in the search space
    pub fn set_xatol(&mut self, xatol: f64) {
        self.xatol = xatol;
    }

    /// Tolerance on the spread of the objective values over the simplex
    pub fn set_fatol(&mut self, fatol: f64) {
        self.fatol = fatol;
    }

    /// Perturbation used to build the initial simplex: one value for every
    /// axis, or one value per axis.
    pub fn set_stencil(&mut self, stencil: Vec<f64>) {
        self.stencil = stencil;
    }

    /// Budget of counted function evaluations. The initial simplex is not counted.
    pub fn set_maxfun(&mut self, maxfun: usize) {
        self.maxfun = maxfun;
    }

    pub fn set_maxiter(&mut self, maxiter: usize) {
        self.maxiter = maxiter;
    }

    pub fn set_rho(&mut self, rho: f64) {
        self.rho = rho;
    }

    pub fn set_chi(&mut self, chi: f64) {
        self.chi = chi;
    }

    pub fn set_psi(&mut self, psi: f64) {
        self.psi = psi;
    }

    pub fn set_sigma(&mut self, sigma: f64) {
        self.sigma = sigma;
    }

    /// Box applied identically to every coordinate
    pub fn set_bounds(&mut self, lower_bound: f64, upper_bound: f64) {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
    }

    pub fn xatol(&self) -> f64 {
        self.xatol
    }

    pub fn fatol(&self) -> f64 {
        self.fatol
    }

    pub fn stencil(&self) -> &[f64] {
        &self.stencil
    }

    pub fn maxfun(&self) -> usize {
        self.maxfun
    }

    pub fn maxiter(&self) -> usize {
        self.maxiter
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn chi(&self) -> f64 {
        self.chi
    }

    pub fn psi(&self) -> f64 {
        self.psi
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    fn check(&self, n: usize) -> Result<(), MinimizerError> {
        if self.stencil.len() != 1 && self.stencil.len() != n {
            return Err(MinimizerError::InvalidArgument(format!(
                "stencil must have either size of 1 or the same size as initial_point: \
                 stencil.len()={}, initial_point.len()={}",
                self.stencil.len(),
                n
            )));
        }
        if !(self.lower_bound <= self.upper_bound) {
            return Err(MinimizerError::InvalidArgument(format!(
                "lower_bound must not exceed upper_bound: lower_bound={}, upper_bound={}",
                self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }

    // Clips every coordinate into [lower_bound, upper_bound]
    fn enforce_bounds<S>(&self, x: &mut ArrayBase<S, Ix1>)
    where
        S: DataMut<Elem = f64>,
    {
        let (lb, ub) = (self.lower_bound, self.upper_bound);
        x.mapv_inplace(|p| {
            let p = if p < lb { lb } else { p };
            if ub < p { ub } else { p }
        });
    }
}

/// Result of Nelder-Mead optimization
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub xmin: Array1<f64>,
    pub fmin: f64,
    pub success: bool,
    pub status: String,
    pub termination: Termination,
    pub iters: usize,
    pub fn_evals: usize,
    /// Final simplex, one point per row, sorted best to worst
    pub simplex: Array2<f64>,
    /// Objective values of the final simplex rows
    pub res: Array1<f64>,
    /// Best objective value after the initial sort and after every iteration
    pub history: Array1<f64>,
}

impl MinimizerResult for NelderMeadResult {
    fn xmin(&self) -> Array1<f64> {
        self.xmin.clone()
    }

    fn fmin(&self) -> f64 {
        self.fmin
    }

    fn fn_evals(&self) -> usize {
        self.fn_evals
    }

    fn iters(&self) -> usize {
        self.iters
    }

    fn converged(&self) -> bool {
        self.success
    }
}

// Objective wrapper counting the evaluations charged against `maxfun`
struct CountedObjFn<'a> {
    f: &'a dyn ObjFn,
    calls: usize,
}

impl<'a> CountedObjFn<'a> {
    fn new(f: &'a dyn ObjFn) -> Self {
        Self { f, calls: 0 }
    }

    fn call(&mut self, x: &Array1<f64>) -> f64 {
        self.calls += 1;
        self.f.call(x)
    }
}

// Simplex points (rows) with their objective values
struct SimplexState {
    simplex: Array2<f64>,
    res: Array1<f64>,
}

impl SimplexState {
    fn nrows(&self) -> usize {
        self.simplex.nrows()
    }

    // Sort points from best to worst, ties keep their current order
    fn sort(&mut self) {
        let order = argsort_stable(&self.res);
        self.simplex = take(&self.simplex, &order);
        self.res = take(&self.res, &order);
    }

    fn meets_xatol(&self, xatol: f64) -> bool {
        let best = self.simplex.row(0);
        self.simplex
            .rows()
            .into_iter()
            .skip(1)
            .all(|x| x.iter().zip(best.iter()).all(|(a, b)| (a - b).abs() <= xatol))
    }

    fn meets_fatol(&self, fatol: f64) -> bool {
        let best = self.res[0];
        self.res.iter().skip(1).all(|f| (f - best).abs() <= fatol)
    }

    // Average of every point except the worst
    fn centroid(&self) -> Result<Array1<f64>, MinimizerError> {
        let n = self.nrows() - 1;
        let mut xbar = Array1::zeros(self.simplex.ncols());
        for i in 0..n {
            xbar = add(&xbar, &self.simplex.row(i))?;
        }
        divide_in_place(&mut xbar, n as f64);
        Ok(xbar)
    }

    fn worst(&self) -> Array1<f64> {
        self.simplex.row(self.nrows() - 1).to_owned()
    }

    fn replace_worst(&mut self, x: &Array1<f64>, f: f64) {
        let last = self.nrows() - 1;
        self.simplex.row_mut(last).assign(x);
        self.res[last] = f;
    }
}

#[derive(Debug, Clone)]
pub struct ScipyNelderMead {
    name: String,
    options: NelderMeadOptions,
}

impl Default for ScipyNelderMead {
    fn default() -> Self {
        Self::new(NelderMeadOptions::default())
    }
}

impl ScipyNelderMead {
    pub fn new(options: NelderMeadOptions) -> Self {
        Self {
            name: "Scipy Nelder Mead".to_string(),
            options,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn options(&self) -> &NelderMeadOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut NelderMeadOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: NelderMeadOptions) {
        self.options = options;
    }

    /// Initial simplex around `initial_point`, one point per row.
    ///
    /// Row 0 is `initial_point`; row `i` has coordinate `i - 1` moved by the
    /// stencil. Every row is clipped to the bounds.
    pub fn make_simplex(&self, initial_point: &Array1<f64>) -> Result<Array2<f64>, MinimizerError> {
        let n = initial_point.len();
        if n == 0 {
            return Err(MinimizerError::InvalidArgument(
                "initial point cannot be empty".to_string(),
            ));
        }
        self.options.check(n)?;

        let stencil = &self.options.stencil;
        let step = |i: usize| {
            if stencil.len() == 1 {
                stencil[0]
            } else {
                stencil[i]
            }
        };
        let mut simplex = Array2::from_shape_fn((n + 1, n), |(i, j)| {
            if i > 0 && j == i - 1 {
                initial_point[j] + step(j)
            } else {
                initial_point[j]
            }
        });
        for mut row in simplex.rows_mut() {
            self.options.enforce_bounds(&mut row);
        }

        Ok(simplex)
    }

    /// Candidate replacement for the worst point, `(1 + coef) * xbar - coef * worst`,
    /// clipped to the bounds.
    ///
    /// Reflection uses `rho`, expansion `rho * chi`, outside contraction
    /// `psi * rho` and inside contraction `-psi`.
    fn generate_point(
        &self,
        coef: f64,
        xbar: &Array1<f64>,
        worst: &Array1<f64>,
    ) -> Result<Array1<f64>, MinimizerError> {
        let mut x = subtract(&scale(1.0 + coef, xbar), &scale(coef, worst))?;
        self.options.enforce_bounds(&mut x);
        Ok(x)
    }

    // Pull every point towards the best one and re-evaluate
    fn shrink(
        &self,
        state: &mut SimplexState,
        obj: &mut CountedObjFn,
    ) -> Result<(), MinimizerError> {
        let best = state.simplex.row(0).to_owned();
        for j in 1..state.nrows() {
            let delta = subtract(&state.simplex.row(j), &best)?;
            let mut x = add(&best, &scale(self.options.sigma, &delta))?;
            self.options.enforce_bounds(&mut x);
            state.res[j] = obj.call(&x);
            state.simplex.row_mut(j).assign(&x);
        }
        Ok(())
    }

    fn status(termination: &Termination, fcalls: usize, iters: usize) -> String {
        match termination {
            Termination::Converged {
                simplex_meets_xatol,
                function_meets_fatol,
            } => format!(
                "{} fcalls: {}, iterations: {}, simplex_meets_xatol: {}, function_meets_fatol: {}",
                termination, fcalls, iters, simplex_meets_xatol, function_meets_fatol
            ),
            _ => format!("{} fcalls: {}, iterations: {}", termination, fcalls, iters),
        }
    }
}

impl Minimizer for ScipyNelderMead {
    type Output = NelderMeadResult;

    fn name(&self) -> &str {
        &self.name
    }

    fn minimize(
        &self,
        f: &dyn ObjFn,
        initial_point: &Array1<f64>,
    ) -> Result<NelderMeadResult, MinimizerError> {
        let opt = &self.options;
        trace!("{}: initial point {}", self.name, initial_point);

        let simplex = self.make_simplex(initial_point)?;
        let res: Array1<f64> = simplex
            .rows()
            .into_iter()
            .map(|x| f.call(&x.to_owned()))
            .collect();
        let mut state = SimplexState { simplex, res };
        state.sort();

        let nrows = state.nrows();
        let mut obj = CountedObjFn::new(f);
        let mut iters = 0;
        let mut history = vec![state.res[0]];
        let mut converged = None;

        while obj.calls < opt.maxfun && iters < opt.maxiter {
            let simplex_meets_xatol = state.meets_xatol(opt.xatol);
            let function_meets_fatol = state.meets_fatol(opt.fatol);
            if simplex_meets_xatol || function_meets_fatol {
                converged = Some(Termination::Converged {
                    simplex_meets_xatol,
                    function_meets_fatol,
                });
                break;
            }

            trace!(
                "iteration: {}\tfmin: {}\tfcalls: {}",
                iters,
                state.res[0],
                obj.calls
            );

            let xbar = state.centroid()?;
            let worst = state.worst();
            let x_r = self.generate_point(opt.rho, &xbar, &worst)?;
            let f_r = obj.call(&x_r);

            let mut do_shrink = false;
            if f_r < state.res[0] {
                trace!("performing {}", NelderMeadMethod::Expansion);
                let x_e = self.generate_point(opt.rho * opt.chi, &xbar, &worst)?;
                let f_e = obj.call(&x_e);
                if f_e < f_r {
                    state.replace_worst(&x_e, f_e);
                } else {
                    state.replace_worst(&x_r, f_r);
                }
            } else if f_r < state.res[nrows - 2] {
                trace!("performing {}", NelderMeadMethod::Reflection);
                state.replace_worst(&x_r, f_r);
            } else if f_r < state.res[nrows - 1] {
                trace!("performing {}", NelderMeadMethod::OutsideContraction);
                let x_c = self.generate_point(opt.psi * opt.rho, &xbar, &worst)?;
                let f_c = obj.call(&x_c);
                if f_c <= f_r {
                    state.replace_worst(&x_c, f_c);
                } else {
                    do_shrink = true;
                }
            } else {
                trace!("performing {}", NelderMeadMethod::InsideContraction);
                let x_cc = self.generate_point(-opt.psi, &xbar, &worst)?;
                let f_cc = obj.call(&x_cc);
                if f_cc < state.res[nrows - 1] {
                    state.replace_worst(&x_cc, f_cc);
                } else {
                    do_shrink = true;
                }
            }

            if do_shrink {
                trace!("performing {}", NelderMeadMethod::Shrink);
                self.shrink(&mut state, &mut obj)?;
            }

            iters += 1;
            state.sort();
            history.push(state.res[0]);
        }

        let termination = converged.unwrap_or(if obj.calls >= opt.maxfun {
            Termination::MaxFunctionEvaluations
        } else {
            Termination::MaxIterations
        });
        let status = Self::status(&termination, obj.calls, iters);
        debug!("{}: {}", self.name, status);

        Ok(NelderMeadResult {
            xmin: state.simplex.row(0).to_owned(),
            fmin: state.res[0],
            success: termination.success(),
            status,
            termination,
            iters,
            fn_evals: obj.calls,
            simplex: state.simplex,
            res: state.res,
            history: Array1::from_vec(history),
        })
    }
}

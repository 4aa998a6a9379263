//! Derivative-free local minimization with a bounded Nelder-Mead simplex,
//! plus the small vector arithmetic it is built on.
pub mod error;
pub mod math;
pub mod minimize;
pub mod prelude;
pub mod util;

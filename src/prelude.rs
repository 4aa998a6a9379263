//! simplexmin prelude.
//!
//! This module contains the most used types, traits and functions
//! that you can import easily as a group.
//!
//! ```
//! use simplexmin::prelude::*;
//!
//! ```

#[doc(no_inline)]
pub use crate::error::MinimizerError;

#[doc(no_inline)]
pub use crate::math::{
    add, argsort, argsort_stable, divide, divide_in_place, norm, scale, scale_in_place, subtract,
    take,
};

#[doc(no_inline)]
pub use crate::minimize::{
    Minimizer, MinimizerResult, NelderMeadMethod, NelderMeadOptions, NelderMeadResult, ObjFn,
    ScipyNelderMead, Termination,
};

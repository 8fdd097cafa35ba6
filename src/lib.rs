//! # factory-belts
//!
//! Batch solvers for factory production planning and belt-network flow
//! feasibility.
//!
//! ## Modules
//!
//! - [`belts`] - Bounded-flow feasibility and max-flow over a belt network
//! - [`factory`] - Steady-state production-rate planning via linear programming
//! - [`error`] - Shared error type
//! - [`numeric`] - Epsilon policy and rounding conventions
//!
//! Both engines are invoked as one-shot batch solvers: read a single JSON
//! object from stdin, write a single JSON object to stdout, see the
//! `belts` and `factory` binaries.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod belts;
pub mod error;
pub mod factory;
pub mod numeric;

pub use error::{Error, Result};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::belts::{solve_belts, BeltsOutput};
    pub use crate::factory::{solve_factory, FactoryOutput};
    pub use crate::Error;
    pub use crate::Result;
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! tolcheck — relative-tolerance checks for numeric simulation results
//!
//! Compare a predicted value (or array of values) from a simulation, such
//! as a quantum-circuit run, against a known-correct reference and print
//! `Success!!` or a failure line.
//!
//! - [`check`]: the comparison itself ([`test_result`])
//! - [`validation`]: accumulate many checks with a summary and exit code
//! - [`baseline`]: JSON files of labelled reference results
//! - [`tolerances`]: named thresholds with their justification

pub mod baseline;
pub mod check;
pub mod error;
pub mod report;
pub mod tolerances;
pub mod validation;

pub use check::{evaluate, test_result, Measured, Verdict};
pub use error::{Error, Result};

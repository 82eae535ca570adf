// SPDX-License-Identifier: AGPL-3.0-or-later
//! Named relative tolerances for simulation result checks.
//!
//! Every threshold passed to [`crate::check::test_result`] from a baseline
//! or a validation binary should come from here, with its origin written
//! down. No ad-hoc magic numbers.
//!
//! # Tolerance categories
//!
//! | Category | Basis | Example |
//! |----------|-------|---------|
//! | Exact | IEEE 754 f64 | 0.0 for bit counts |
//! | Machine | f64 arithmetic | 1e-12 for closed-form amplitudes |
//! | Simulator | State-vector precision | 1e-9 (f64), 1e-5 (f32) |
//! | Sampling | Shot noise | 0.05 for 10k-shot expectation values |

// ═══════════════════════════════════════════════════════════════════
// Machine-precision tolerances (IEEE 754 f64)
// ═══════════════════════════════════════════════════════════════════

/// Only an exact match passes. With a strict `<` comparison this fails
/// every check; use it to force a failure line while debugging.
pub const EXACT: f64 = 0.0;

/// Closed-form results (Bell-state probabilities, `cos²(θ/2)` rotations).
///
/// f64 has ~15.9 significant digits; 1e-12 leaves room for a few
/// digits of rounding in short gate chains.
pub const ANALYTICAL_F64: f64 = 1e-12;

// ═══════════════════════════════════════════════════════════════════
// Simulator tolerances
// ═══════════════════════════════════════════════════════════════════

/// Double-precision state-vector simulators over tens of gates.
pub const STATEVECTOR_F64: f64 = 1e-9;

/// Single-precision (GPU) state-vector simulators.
///
/// f32 carries ~7.2 significant digits; accumulated gate error on
/// 20-qubit circuits stays within two of them.
pub const STATEVECTOR_F32: f64 = 1e-5;

// ═══════════════════════════════════════════════════════════════════
// Sampling tolerances
// ═══════════════════════════════════════════════════════════════════

/// Expectation value estimated from 10 000 shots.
///
/// Standard error of a ±1 observable is at most `1/sqrt(10_000) = 0.01`;
/// 0.05 is five standard errors relative to a unit-magnitude reference.
pub const SAMPLED_10K_SHOTS: f64 = 0.05;

/// Default for interactive checks and baseline cases without `tol`.
pub const NOTEBOOK_DEFAULT: f64 = 1e-3;

/// Every named tolerance, as written in baseline files.
pub const NAMED: [(&str, f64); 6] = [
    ("EXACT", EXACT),
    ("ANALYTICAL_F64", ANALYTICAL_F64),
    ("STATEVECTOR_F64", STATEVECTOR_F64),
    ("STATEVECTOR_F32", STATEVECTOR_F32),
    ("SAMPLED_10K_SHOTS", SAMPLED_10K_SHOTS),
    ("NOTEBOOK_DEFAULT", NOTEBOOK_DEFAULT),
];

/// Look up a tolerance by its constant name.
///
/// ```
/// use tolcheck::tolerances;
///
/// assert_eq!(tolerances::by_name("STATEVECTOR_F64"), Some(tolerances::STATEVECTOR_F64));
/// assert_eq!(tolerances::by_name("statevector_f64"), None);
/// ```
#[must_use]
pub fn by_name(name: &str) -> Option<f64> {
    NAMED
        .iter()
        .find_map(|&(known, tol)| (known == name).then_some(tol))
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! Relative-error comparison of predicted values against known results.
//!
//! [`test_result`] is the single entry point for both input shapes:
//!
//! - **Scalar**: `diff = |pred - ans| / ans`. Prints `Success!!` when
//!   `diff < tol`, otherwise `Failure, off by {diff}.`
//! - **Elementwise**: the same relative error per position, except where
//!   `ans[i] == 0`, in which case the raw prediction `pred[i]` is the
//!   compared quantity. Prints `Success!!` when every position is below
//!   `tol`, otherwise `Failure :(`.
//!
//! The zero-reference branch is taken before dividing, so no division by
//! zero is ever performed.
//!
//! ```
//! use tolcheck::check::{evaluate, Verdict};
//!
//! assert_eq!(evaluate(&1.0001, &1.0, 0.001).unwrap(), Verdict::Success);
//! assert_eq!(evaluate(&[0.5, 5.0], &[0.0, 5.0], 0.01).unwrap(), Verdict::Failure);
//! ```

use std::fmt;
use std::io::{self, Write};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::report;

/// Computed deviation of a prediction from its reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Deviation {
    /// Relative error of a single value.
    Scalar(f64),
    /// Per-position relative error, zero-reference rule applied.
    Elementwise(Vec<f64>),
}

impl Deviation {
    /// Whether every compared quantity is strictly below `tol`.
    ///
    /// NaN is never below anything, so a NaN deviation fails. An empty
    /// elementwise deviation passes.
    #[must_use]
    pub fn within(&self, tol: f64) -> bool {
        match self {
            Self::Scalar(diff) => *diff < tol,
            Self::Elementwise(diffs) => diffs.iter().all(|&d| d < tol),
        }
    }

    /// Largest compared quantity, NaN-propagating. `None` for an empty
    /// elementwise deviation.
    #[must_use]
    pub fn worst(&self) -> Option<f64> {
        match self {
            Self::Scalar(diff) => Some(*diff),
            Self::Elementwise(diffs) => diffs.iter().copied().reduce(|worst, d| {
                if d.is_nan() || d > worst {
                    d
                } else {
                    worst
                }
            }),
        }
    }

    /// Number of compared quantities.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Elementwise(diffs) => diffs.len(),
        }
    }

    /// True for an empty elementwise deviation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Judge against `tol`, keeping the diff only for the scalar form.
    #[must_use]
    pub fn verdict(&self, tol: f64) -> Verdict {
        match (self, self.within(tol)) {
            (_, true) => Verdict::Success,
            (Self::Scalar(diff), false) => Verdict::OffBy(*diff),
            (Self::Elementwise(_), false) => Verdict::Failure,
        }
    }
}

/// Outcome of one comparison. `Display` renders the exact report line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// All compared quantities below tolerance.
    Success,
    /// Scalar comparison failed by this relative error.
    OffBy(f64),
    /// Elementwise comparison failed at one or more positions.
    Failure,
}

impl Verdict {
    /// Whether the comparison succeeded.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str(report::SUCCESS),
            Self::OffBy(diff) => f.write_str(&report::off_by(*diff)),
            Self::Failure => f.write_str(report::ARRAY_FAILURE),
        }
    }
}

/// A value (or sequence of values) that can be compared with a reference
/// of the same shape.
pub trait Measured {
    /// Deviation of `self` (the prediction) from `reference`.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when the lengths differ,
    /// [`Error::ZeroReference`] for a scalar reference of zero.
    fn deviation(&self, reference: &Self) -> Result<Deviation>;
}

impl Measured for f64 {
    fn deviation(&self, reference: &Self) -> Result<Deviation> {
        if *reference == 0.0 {
            return Err(Error::ZeroReference);
        }
        Ok(Deviation::Scalar(relative_error(*self, *reference)))
    }
}

impl Measured for [f64] {
    fn deviation(&self, reference: &Self) -> Result<Deviation> {
        elementwise_relative_error(self, reference).map(Deviation::Elementwise)
    }
}

impl Measured for Vec<f64> {
    fn deviation(&self, reference: &Self) -> Result<Deviation> {
        self.as_slice().deviation(reference.as_slice())
    }
}

impl<const N: usize> Measured for [f64; N] {
    fn deviation(&self, reference: &Self) -> Result<Deviation> {
        self.as_slice().deviation(reference.as_slice())
    }
}

/// `|pred - ans| / ans`, dividing by the signed reference.
///
/// A negative reference therefore yields a non-positive error.
#[must_use]
pub fn relative_error(pred: f64, ans: f64) -> f64 {
    (pred - ans).abs() / ans
}

/// Per-position relative error with the zero-reference rule.
///
/// Where `ans[i] == 0` the result is `pred[i]` itself (signed, not its
/// magnitude), so the position is effectively an absolute check of the
/// prediction against the tolerance.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] if `pred` and `ans` differ in length.
pub fn elementwise_relative_error(pred: &[f64], ans: &[f64]) -> Result<Vec<f64>> {
    if pred.len() != ans.len() {
        return Err(Error::ShapeMismatch {
            pred: pred.len(),
            ans: ans.len(),
        });
    }
    Ok(pred
        .iter()
        .zip(ans)
        .map(|(&p, &a)| if a == 0.0 { p } else { relative_error(p, a) })
        .collect())
}

/// Compare `pred` against `ans` without printing anything.
///
/// # Errors
///
/// [`Error::InvalidTolerance`] for a NaN `tol`, plus any error from
/// [`Measured::deviation`].
pub fn evaluate<T: Measured + ?Sized>(pred: &T, ans: &T, tol: f64) -> Result<Verdict> {
    if tol.is_nan() {
        return Err(Error::InvalidTolerance(tol));
    }
    let deviation = pred.deviation(ans)?;
    if let Deviation::Elementwise(diffs) = &deviation {
        for (i, d) in diffs.iter().enumerate().filter(|(_, d)| !(**d < tol)) {
            trace!(index = i, diff = d, tol, "position out of tolerance");
        }
    }
    let verdict = deviation.verdict(tol);
    debug!(
        len = deviation.len(),
        worst = ?deviation.worst(),
        tol,
        passed = verdict.passed(),
        "evaluated result"
    );
    Ok(verdict)
}

/// Compare and write the report line to `out`.
///
/// # Errors
///
/// Any error from [`evaluate`]; [`Error::Output`] if the line cannot be
/// written. Nothing is written when evaluation fails.
pub fn test_result_to<W, T>(out: &mut W, pred: &T, ans: &T, tol: f64) -> Result<Verdict>
where
    W: Write + ?Sized,
    T: Measured + ?Sized,
{
    let verdict = evaluate(pred, ans, tol)?;
    writeln!(out, "{verdict}").map_err(Error::Output)?;
    Ok(verdict)
}

/// Compare `pred` against `ans` within relative tolerance `tol` and print
/// one line to standard output.
///
/// ```
/// use tolcheck::check::test_result;
///
/// // prints "Success!!"
/// assert!(test_result(&[1.0, 2.0], &[1.0, 2.0], 0.01).unwrap().passed());
/// // prints "Failure, off by 0.10000000000000009."
/// assert!(!test_result(&1.1, &1.0, 0.001).unwrap().passed());
/// ```
///
/// # Errors
///
/// Same as [`test_result_to`].
pub fn test_result<T: Measured + ?Sized>(pred: &T, ans: &T, tol: f64) -> Result<Verdict> {
    test_result_to(&mut io::stdout().lock(), pred, ans, tol)
}

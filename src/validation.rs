// SPDX-License-Identifier: AGPL-3.0-or-later
//! Check accumulator for validation runs over many results.
//!
//! A [`Suite`] writes a banner, one labelled report line per check (the
//! same line [`test_result`] prints) and a closing summary, all to the
//! same writer, and counts how many checks passed. The run ends in a
//! [`RunStatus`] whose exit code follows the validation-binary contract:
//!
//! - 0 = all passed, 1 = at least one failed, 2 = skipped, 3 = error
//!
//! # Usage
//!
//! Prefer [`Suite`] over bare [`test_result`] calls when checking more
//! than a handful of values; it avoids manual pass/fail bookkeeping.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::warn;

use crate::check::{evaluate, Measured, Verdict};

#[cfg(doc)]
use crate::check::test_result;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// How a validation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every check passed (also an empty run).
    Pass,
    /// At least one check failed or could not be evaluated.
    Fail,
    /// Nothing was checked because the input data is unavailable.
    Skipped,
    /// The run itself could not proceed (unreadable baseline, malformed
    /// single comparison).
    Error,
}

impl RunStatus {
    /// `Pass` when `all_passed`, otherwise `Fail`.
    #[must_use]
    pub const fn from_passed(all_passed: bool) -> Self {
        if all_passed { Self::Pass } else { Self::Fail }
    }

    /// Process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Skipped => 2,
            Self::Error => 3,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        Self::from(status.code())
    }
}

/// Write the closing summary for `passed` of `total` checks.
///
/// Write errors are ignored; the status depends only on the counts.
pub fn write_summary<W: Write + ?Sized>(
    out: &mut W,
    name: &str,
    passed: u32,
    total: u32,
) -> RunStatus {
    let status = RunStatus::from_passed(passed == total);
    let verdict = match status {
        RunStatus::Pass => String::from("PASS"),
        _ => format!("FAIL ({} checks failed)", total.saturating_sub(passed)),
    };
    let _ = write!(
        out,
        "\n{RULE}\n  {name}: {passed}/{total} checks passed\n  RESULT: {verdict}\n{RULE}\n"
    );
    status
}

/// Write a skip notice and return [`RunStatus::Skipped`].
pub fn write_skipped<W: Write + ?Sized>(out: &mut W, reason: &str) -> RunStatus {
    let _ = writeln!(out, "  SKIP: {reason}\n  (exit 2 = skipped, not a failure)");
    RunStatus::Skipped
}

/// Directory named by `env_var`, or `CARGO_MANIFEST_DIR/{default_subpath}`
/// when the variable is unset or empty.
///
/// ```text
/// let dir = data_dir("TOLCHECK_BASELINE_DIR", "baselines");
/// ```
#[must_use]
pub fn data_dir(env_var: &str, default_subpath: &str) -> PathBuf {
    match std::env::var_os(env_var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(default_subpath),
    }
}

/// Accumulated check state.
///
/// # Examples
///
/// ```
/// use tolcheck::tolerances;
/// use tolcheck::validation::{RunStatus, Suite};
///
/// let mut out = Vec::new();
/// let mut s = Suite::new_to(&mut out, "doc-test");
/// s.section_to(&mut out, "── closed form ──");
/// s.check_to(&mut out, "identity", &1.0, &1.0, tolerances::ANALYTICAL_F64);
/// s.check_to(&mut out, "probabilities", &[0.5, 0.5], &[0.5, 0.5], tolerances::STATEVECTOR_F64);
/// assert_eq!(s.counts(), (2, 2));
/// assert_eq!(s.summarize_to(&mut out), RunStatus::Pass);
/// assert!(String::from_utf8(out).unwrap().contains("doc-test: 2/2 checks passed"));
/// ```
pub struct Suite {
    name: String,
    passed: u32,
    total: u32,
}

impl Suite {
    /// Create a new suite and print its banner to stdout.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::new_to(&mut io::stdout().lock(), name)
    }

    /// Create a new suite and write its banner to `out`.
    pub fn new_to<W: Write + ?Sized>(out: &mut W, name: impl Into<String>) -> Self {
        let name = name.into();
        let _ = write!(out, "{RULE}\n  {name}\n{RULE}\n\n");
        Self {
            name,
            passed: 0,
            total: 0,
        }
    }

    /// Suite name as shown in the banner and summary.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a section header (no check counted).
    pub fn section_to<W: Write + ?Sized>(&self, out: &mut W, label: &str) {
        let _ = write!(out, "\n{label}\n");
    }

    /// Compare `pred` against `ans` within relative `tol`, printing to stdout.
    pub fn check<T: Measured + ?Sized>(&mut self, label: &str, pred: &T, ans: &T, tol: f64) {
        self.check_to(&mut io::stdout().lock(), label, pred, ans, tol);
    }

    /// Same as [`Suite::check`] but writes the labelled line to `out`.
    ///
    /// The verdict is counted before anything is written, so a broken
    /// output stream never changes the counts. A comparison error (shape
    /// mismatch, zero scalar reference, NaN tolerance) counts as a failed
    /// check and is printed in place of the report line.
    pub fn check_to<W, T>(&mut self, out: &mut W, label: &str, pred: &T, ans: &T, tol: f64)
    where
        W: Write + ?Sized,
        T: Measured + ?Sized,
    {
        match evaluate(pred, ans, tol) {
            Ok(verdict) => {
                self.record(verdict);
                let _ = writeln!(out, "  {label}: {verdict}");
            }
            Err(err) => {
                warn!(label, error = %err, "check could not be evaluated");
                self.record_failure();
                let _ = writeln!(out, "  {label}: Failure, {err}");
            }
        }
    }

    /// Count an externally computed verdict without printing.
    pub fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        if verdict.passed() {
            self.passed += 1;
        }
    }

    /// Count a check that could not be run at all.
    pub fn record_failure(&mut self) {
        self.total += 1;
    }

    /// Retrieve current (passed, total) for external logic.
    #[must_use]
    pub const fn counts(&self) -> (u32, u32) {
        (self.passed, self.total)
    }

    /// Write the summary to `out` and return the run status.
    pub fn summarize_to<W: Write + ?Sized>(&self, out: &mut W) -> RunStatus {
        write_summary(out, &self.name, self.passed, self.total)
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//! Check a simulation result against its known-correct value.
//!
//! Usage:
//!   test-result --pred 1.0001 --ans 1.0 --tol 0.001
//!   test-result --pred 0.5,5 --ans 0,5 --tol 0.01
//!   test-result --baseline bell_state.json
//!
//! A single comparison prints one report line. A baseline prints one
//! labelled line per case followed by a summary.
//!
//! Exit codes: 0 = all passed, 1 = at least one failed, 2 = skipped
//! (baseline file not found), 3 = error (malformed comparison such as a
//! shape mismatch or zero scalar reference, unreadable baseline).
//!
//! Relative baseline paths that do not exist in the working directory are
//! looked up in `$TOLCHECK_BASELINE_DIR` (default: `baselines/`).

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use tolcheck::baseline::Baseline;
use tolcheck::check::{Verdict, test_result_to};
use tolcheck::tolerances;
use tolcheck::validation::{RunStatus, Suite, data_dir, write_skipped};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const BASELINE_DIR_ENV: &str = "TOLCHECK_BASELINE_DIR";

#[derive(Parser, Debug)]
#[command(name = "test-result")]
#[command(about = "Relative-tolerance pass/fail check of numeric results")]
struct Args {
    /// Predicted value(s); repeat or comma-separate for an array.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "ans")]
    pred: Vec<f64>,

    /// Known-correct value(s), same shape as --pred.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "pred")]
    ans: Vec<f64>,

    /// Relative tolerance.
    #[arg(long, default_value_t = tolerances::NOTEBOOK_DEFAULT, allow_negative_numbers = true)]
    tol: f64,

    /// Treat a single --pred/--ans value as a one-element array.
    #[arg(long)]
    array: bool,

    /// Check every case of a JSON baseline file instead.
    #[arg(long, conflicts_with_all = ["pred", "ans", "array"])]
    baseline: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let fallback_dir = data_dir(BASELINE_DIR_ENV, "baselines");

    match run(&args, &fallback_dir, &mut io::stdout().lock()) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            RunStatus::Error.into()
        }
    }
}

/// Dispatch on the parsed arguments, writing report lines to `out`.
fn run<W>(args: &Args, fallback_dir: &Path, out: &mut W) -> anyhow::Result<RunStatus>
where
    W: Write + ?Sized,
{
    if let Some(path) = &args.baseline {
        return run_baseline(&resolve_baseline(path, fallback_dir), out);
    }
    if args.pred.is_empty() {
        bail!("nothing to check: pass --pred/--ans or --baseline");
    }
    let verdict = compare(args, out).context("comparison failed")?;
    Ok(RunStatus::from_passed(verdict.passed()))
}

/// One `--pred`/`--ans` pair is a scalar unless `--array` is given.
fn compare<W: Write + ?Sized>(args: &Args, out: &mut W) -> tolcheck::Result<Verdict> {
    match (args.pred.as_slice(), args.ans.as_slice()) {
        ([pred], [ans]) if !args.array => test_result_to(out, pred, ans, args.tol),
        (pred, ans) => test_result_to(out, pred, ans, args.tol),
    }
}

fn resolve_baseline(path: &Path, fallback_dir: &Path) -> PathBuf {
    if path.is_relative() && !path.exists() {
        let candidate = fallback_dir.join(path);
        debug!(candidate = %candidate.display(), "baseline not in working directory");
        if candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}

fn run_baseline<W: Write + ?Sized>(path: &Path, out: &mut W) -> anyhow::Result<RunStatus> {
    if !path.exists() {
        return Ok(write_skipped(
            out,
            &format!("baseline not found: {}", path.display()),
        ));
    }
    let baseline = Baseline::from_path(path)
        .with_context(|| format!("loading baseline {}", path.display()))?;

    let mut suite = Suite::new_to(out, baseline.display_name());
    baseline.run_to(out, &mut suite);
    let (passed, total) = suite.counts();
    info!(suite = suite.name(), passed, total, "baseline run complete");
    Ok(suite.summarize_to(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("test-result").chain(argv.iter().copied())).unwrap()
    }

    fn run_capture(argv: &[&str], fallback_dir: &Path) -> (anyhow::Result<RunStatus>, String) {
        let args = parse(argv);
        let mut out = Vec::new();
        let status = run(&args, fallback_dir, &mut out);
        (status, String::from_utf8(out).unwrap())
    }

    fn no_fallback() -> TempDir {
        TempDir::new().unwrap()
    }

    #[test]
    fn scalar_pass_exits_zero() {
        let dir = no_fallback();
        let (status, text) =
            run_capture(&["--pred", "1.0001", "--ans", "1.0", "--tol", "0.001"], dir.path());
        assert_eq!(status.unwrap(), RunStatus::Pass);
        assert_eq!(text, "Success!!\n");
    }

    #[test]
    fn scalar_fail_exits_one_with_diff() {
        let dir = no_fallback();
        let (status, text) =
            run_capture(&["--pred", "1.1", "--ans", "1.0", "--tol", "0.001"], dir.path());
        assert_eq!(status.unwrap().code(), 1);
        assert_eq!(text, "Failure, off by 0.10000000000000009.\n");
    }

    #[test]
    fn comma_list_is_array() {
        let dir = no_fallback();
        let (status, text) =
            run_capture(&["--pred", "0.5,5", "--ans", "0,5", "--tol", "0.01"], dir.path());
        assert_eq!(status.unwrap(), RunStatus::Fail);
        assert_eq!(text, "Failure :(\n");
    }

    #[test]
    fn repeated_flags_are_array() {
        let args = parse(&["--pred", "1", "--pred", "2", "--ans", "1", "--ans", "2"]);
        assert_eq!(args.pred, vec![1.0, 2.0]);
        let mut out = Vec::new();
        assert_eq!(compare(&args, &mut out).unwrap(), Verdict::Success);
    }

    #[test]
    fn single_value_dispatches_scalar_unless_array_flag() {
        let scalar = parse(&["--pred", "1.5", "--ans", "1.0", "--tol", "0.1"]);
        assert_eq!(compare(&scalar, &mut io::sink()).unwrap(), Verdict::OffBy(0.5));

        let array = parse(&["--pred", "1.5", "--ans", "1.0", "--tol", "0.1", "--array"]);
        let mut out = Vec::new();
        assert_eq!(compare(&array, &mut out).unwrap(), Verdict::Failure);
        assert_eq!(out, b"Failure :(\n");
    }

    #[test]
    fn array_flag_applies_zero_reference_rule() {
        // scalar form would reject a zero reference
        let args = parse(&["--pred", "0.0", "--ans", "0.0", "--array"]);
        assert_eq!(compare(&args, &mut io::sink()).unwrap(), Verdict::Success);
    }

    #[test]
    fn negative_values_parse() {
        let args = parse(&["--pred", "-3", "--ans", "-2", "--tol", "0.01"]);
        assert_eq!(args.pred, vec![-3.0]);
        assert_eq!(args.ans, vec![-2.0]);
    }

    #[test]
    fn default_tolerance() {
        let args = parse(&["--pred", "1", "--ans", "1"]);
        assert_eq!(args.tol.to_bits(), tolerances::NOTEBOOK_DEFAULT.to_bits());
    }

    #[test]
    fn comparison_errors_are_not_tolerance_failures() {
        let dir = no_fallback();
        let (status, text) = run_capture(&["--pred", "1", "--ans", "0"], dir.path());
        let err = status.unwrap_err();
        assert!(err.to_string().contains("comparison failed"));
        assert!(text.is_empty());

        let (status, _) = run_capture(&["--pred", "1,2", "--ans", "1"], dir.path());
        assert!(status.is_err());
        assert_eq!(RunStatus::Error.code(), 3);
    }

    #[test]
    fn nothing_to_check_is_error() {
        let dir = no_fallback();
        let (status, _) = run_capture(&[], dir.path());
        assert!(status.is_err());
    }

    #[test]
    fn pred_requires_ans_and_vice_versa() {
        assert!(Args::try_parse_from(["test-result", "--pred", "1"]).is_err());
        assert!(Args::try_parse_from(["test-result", "--ans", "1"]).is_err());
    }

    #[test]
    fn baseline_conflicts_with_values() {
        assert!(
            Args::try_parse_from(["test-result", "--baseline", "b.json", "--pred", "1", "--ans", "1"])
                .is_err()
        );
        assert!(Args::try_parse_from(["test-result", "--baseline", "b.json", "--array"]).is_err());
        assert!(Args::try_parse_from(["test-result", "--baseline", "b.json", "--tol", "0.1"]).is_ok());
    }

    #[test]
    fn missing_baseline_is_skipped() {
        let dir = no_fallback();
        let (status, text) =
            run_capture(&["--baseline", "does_not_exist.json"], dir.path());
        assert_eq!(status.unwrap().code(), 2);
        assert!(text.starts_with("  SKIP: baseline not found"));
    }

    #[test]
    fn baseline_run_reports_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grover.json");
        fs::write(
            &path,
            r#"{ "cases": [
                { "label": "p(marked)", "pred": 0.945, "ans": 0.9453, "tol": 0.01 },
                { "label": "p(other)", "pred": [0.02, 0.02, 0.015], "ans": [0.0182, 0.0182, 0.0182], "tol": 0.01 }
            ] }"#,
        )
        .unwrap();
        let (status, text) =
            run_capture(&["--baseline", path.to_str().unwrap()], dir.path());
        assert_eq!(status.unwrap(), RunStatus::Fail);
        assert!(text.contains("  grover\n"));
        assert!(text.contains("  p(marked): Success!!\n"));
        assert!(text.contains("  p(other): Failure :(\n"));
        assert!(text.contains("grover: 1/2 checks passed"));
    }

    #[test]
    fn unreadable_baseline_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let (status, _) = run_capture(&["--baseline", path.to_str().unwrap()], dir.path());
        assert!(status.unwrap_err().to_string().contains("loading baseline"));
    }

    #[test]
    fn relative_baseline_found_in_fallback_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("tolcheck_fallback_only.json"),
            r#"{ "cases": [ { "label": "one", "pred": 1, "ans": 1 } ] }"#,
        )
        .unwrap();
        let relative = Path::new("tolcheck_fallback_only.json");
        assert_eq!(
            resolve_baseline(relative, dir.path()),
            dir.path().join("tolcheck_fallback_only.json")
        );
        let (status, _) = run_capture(&["--baseline", "tolcheck_fallback_only.json"], dir.path());
        assert_eq!(status.unwrap(), RunStatus::Pass);
    }

    #[test]
    fn unresolvable_path_is_returned_unchanged() {
        let dir = TempDir::new().unwrap();
        let relative = Path::new("tolcheck_nowhere.json");
        assert_eq!(resolve_baseline(relative, dir.path()), relative);
        let absolute = dir.path().join("absent.json");
        assert_eq!(resolve_baseline(&absolute, Path::new("/unused")), absolute);
    }

    #[test]
    fn baseline_dir_env_selects_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("tolcheck_env_only.json"),
            r#"{ "cases": [ { "label": "one", "pred": 1, "ans": 1 } ] }"#,
        )
        .unwrap();
        // SAFETY: test-only env mutation; no other test reads this variable.
        unsafe { std::env::set_var(BASELINE_DIR_ENV, dir.path()) };
        let fallback = data_dir(BASELINE_DIR_ENV, "baselines");
        // SAFETY: cleanup matching the set_var above.
        unsafe { std::env::remove_var(BASELINE_DIR_ENV) };

        assert_eq!(fallback, dir.path());
        assert_eq!(
            resolve_baseline(Path::new("tolcheck_env_only.json"), &fallback),
            dir.path().join("tolcheck_env_only.json")
        );
    }

    #[test]
    fn shipped_baseline_found_by_default_dir() {
        let fallback = Path::new(env!("CARGO_MANIFEST_DIR")).join("baselines");
        let (status, text) = run_capture(&["--baseline", "bell_state.json"], &fallback);
        assert_eq!(status.unwrap(), RunStatus::Pass);
        assert!(text.contains("4/4 checks passed"));
    }
}

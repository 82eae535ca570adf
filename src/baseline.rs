// SPDX-License-Identifier: AGPL-3.0-or-later
//! Baseline files: known-correct results to check predictions against.
//!
//! A baseline is a JSON document listing cases:
//!
//! ```json
//! {
//!   "name": "bell-state sampling",
//!   "cases": [
//!     { "label": "p(00)", "pred": 0.4987, "ans": 0.5, "tol": 0.05 },
//!     { "label": "histogram", "pred": [0.49, 0.0, 0.0, 0.51], "ans": [0.5, 0.0, 0.0, 0.5] }
//!   ]
//! }
//! ```
//!
//! `pred` and `ans` are a number or an array of numbers. `tol` is a number
//! or the name of a constant in [`tolerances`] (`"STATEVECTOR_F64"`); a
//! case without `tol` uses [`tolerances::NOTEBOOK_DEFAULT`]. A case may
//! carry a `section` header, printed before it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::check::{Deviation, Measured};
use crate::error::{Error, Result};
use crate::tolerances;
use crate::validation::Suite;

/// A scalar or array result as written in a baseline file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single number.
    Scalar(f64),
    /// An ordered sequence of numbers.
    Array(Vec<f64>),
}

impl Value {
    /// Number of elements (1 for a scalar).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Array(values) => values.len(),
        }
    }

    /// True for an empty array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Self::Array(values)
    }
}

impl Measured for Value {
    /// Scalars compare as scalars, arrays elementwise. Mixing the two is a
    /// shape mismatch, even for a one-element array.
    fn deviation(&self, reference: &Self) -> Result<Deviation> {
        match (self, reference) {
            (Self::Scalar(pred), Self::Scalar(ans)) => pred.deviation(ans),
            (Self::Array(pred), Self::Array(ans)) => pred.deviation(ans),
            (pred, ans) => Err(Error::ShapeMismatch {
                pred: pred.len(),
                ans: ans.len(),
            }),
        }
    }
}

const fn default_tol() -> f64 {
    tolerances::NOTEBOOK_DEFAULT
}

fn deserialize_tol<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tol {
        Value(f64),
        Named(String),
    }

    match Tol::deserialize(deserializer)? {
        Tol::Value(tol) => Ok(tol),
        Tol::Named(name) => tolerances::by_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown tolerance `{name}`"))),
    }
}

/// One labelled comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Human-readable label printed before the report line.
    pub label: String,
    /// Predicted value(s).
    pub pred: Value,
    /// Known-correct value(s).
    pub ans: Value,
    /// Relative tolerance.
    #[serde(default = "default_tol", deserialize_with = "deserialize_tol")]
    pub tol: f64,
    /// Section header printed before this case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// A named set of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Suite name; defaults to the file stem when loaded from disk.
    #[serde(default)]
    pub name: Option<String>,
    /// Cases in file order.
    pub cases: Vec<Case>,
}

impl FromStr for Baseline {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text, Path::new("<inline>"))
    }
}

impl Baseline {
    /// Load and validate a baseline file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::Baseline`] if it
    /// is not valid baseline JSON, [`Error::InvalidInput`] for a case with
    /// an empty label.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut baseline = Self::parse(&text, path)?;
        if baseline.name.is_none() {
            baseline.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        info!(
            path = %path.display(),
            cases = baseline.cases.len(),
            "loaded baseline"
        );
        Ok(baseline)
    }

    fn parse(text: &str, origin: &Path) -> Result<Self> {
        let baseline: Self = serde_json::from_str(text).map_err(|source| Error::Baseline {
            path: PathBuf::from(origin),
            source,
        })?;
        if let Some(i) = baseline.cases.iter().position(|c| c.label.trim().is_empty()) {
            return Err(Error::InvalidInput(format!(
                "case {i} in {} has an empty label",
                origin.display()
            )));
        }
        debug!(cases = baseline.cases.len(), "parsed baseline");
        Ok(baseline)
    }

    /// Display name: `name` if set, else `"baseline"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("baseline")
    }

    /// Check every case into `suite`, printing to stdout.
    pub fn run(&self, suite: &mut Suite) {
        self.run_to(&mut std::io::stdout().lock(), suite);
    }

    /// Check every case into `suite`, writing report lines to `out`.
    pub fn run_to<W: Write + ?Sized>(&self, out: &mut W, suite: &mut Suite) {
        for case in &self.cases {
            if let Some(section) = &case.section {
                suite.section_to(out, section);
            }
            suite.check_to(out, &case.label, &case.pred, &case.ans, case.tol);
        }
    }
}

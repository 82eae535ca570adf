// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for tolerance checks and baseline loading.
//!
//! Every fallible operation in the crate returns [`Result`], with one
//! [`Error`] variant per failure mode.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by comparisons and baseline files.
#[derive(Debug, Error)]
pub enum Error {
    /// `pred` and `ans` do not have the same shape.
    #[error("shape mismatch: pred has {pred} element(s), ans has {ans}")]
    ShapeMismatch {
        /// Length of the prediction (1 for a scalar).
        pred: usize,
        /// Length of the reference (1 for a scalar).
        ans: usize,
    },
    /// Scalar comparison against a reference of exactly zero.
    #[error("relative error undefined: scalar reference value is zero")]
    ZeroReference,
    /// Tolerance that no value can be compared against.
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(f64),
    /// File I/O error with path context.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Report line could not be written.
    #[error("failed to write report line: {0}")]
    Output(#[source] std::io::Error),
    /// Baseline JSON could not be parsed.
    #[error("baseline parse error in {}: {source}", .path.display())]
    Baseline {
        /// Baseline file (or `<inline>` for in-memory text).
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Invalid input parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for tolcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

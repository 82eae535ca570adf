// SPDX-License-Identifier: AGPL-3.0-or-later
//! Report line texts and number formatting.
//!
//! The printed lines are part of the public contract: notebooks and shell
//! scripts grep for them, so they are fixed strings.

/// Printed when every compared quantity is below tolerance.
pub const SUCCESS: &str = "Success!!";

/// Printed when an elementwise comparison fails (no detail).
pub const ARRAY_FAILURE: &str = "Failure :(";

/// Scalar failure line carrying the relative error.
///
/// ```
/// assert_eq!(tolcheck::report::off_by(0.5), "Failure, off by 0.5.");
/// ```
#[must_use]
pub fn off_by(diff: f64) -> String {
    format!("Failure, off by {}.", float_repr(diff))
}

/// Render an `f64` the way an interactive numeric session echoes it.
///
/// Shortest round-trip digits, always with a fractional part or an
/// exponent. Magnitudes below `1e-4` or from `1e16` upwards use exponent
/// notation with a sign and at least two exponent digits.
///
/// ```
/// use tolcheck::report::float_repr;
///
/// assert_eq!(float_repr(1.0), "1.0");
/// assert_eq!(float_repr(0.25), "0.25");
/// assert_eq!(float_repr(1e-5), "1e-05");
/// assert_eq!(float_repr(f64::NAN), "nan");
/// ```
#[must_use]
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return String::from("nan");
    }
    if x.is_infinite() {
        return String::from(if x > 0.0 { "inf" } else { "-inf" });
    }

    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{x:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.unsigned_abs());
            }
        }
        return sci;
    }

    let fixed = format!("{x}");
    if fixed.contains('.') {
        fixed
    } else {
        format!("{fixed}.0")
    }
}

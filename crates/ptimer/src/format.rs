//! Duration formatters
//!
//! A [`TimeFmt`] turns an elapsed time in seconds into the text that follows
//! the explainer in a report line. The three built-ins render numbers with a
//! fixed number of significant digits using [`format_general`].

use crate::error::{TimerError, TimerResult};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Selector name of the millisecond formatter.
pub const TIME_FMT_MS: &str = "time_fmt_ms";
/// Selector name of the seconds formatter.
pub const TIME_FMT_S: &str = "time_fmt_s";
/// Selector name of the minutes formatter.
pub const TIME_FMT_M: &str = "time_fmt_m";

/// A user-supplied formatter.
pub type FormatFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// How an elapsed duration is rendered.
///
/// Built-in formatters are selected either directly or by their selector
/// name through [`FromStr`]. A custom formatter is stored as-is and is never
/// wrapped, so the `Arc` handed in is the one handed back.
#[derive(Clone, Default)]
pub enum TimeFmt {
    /// `time_fmt_ms`: milliseconds, 4 significant digits
    #[default]
    Milliseconds,
    /// `time_fmt_s`: seconds, 4 significant digits
    Seconds,
    /// `time_fmt_m`: whole minutes plus seconds to 3 significant digits
    Minutes,
    /// Caller-provided formatter
    Custom(FormatFn),
}

impl TimeFmt {
    /// Wrap a closure as a custom formatter.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> String + Send + Sync + 'static,
    {
        TimeFmt::Custom(Arc::new(f))
    }

    /// Render `secs` with this formatter.
    pub fn apply(&self, secs: f64) -> String {
        match self {
            TimeFmt::Milliseconds => time_fmt_ms(secs),
            TimeFmt::Seconds => time_fmt_s(secs),
            TimeFmt::Minutes => time_fmt_m(secs),
            TimeFmt::Custom(f) => f(secs),
        }
    }

    /// The selector name for built-ins, `None` for custom formatters.
    pub fn selector(&self) -> Option<&'static str> {
        match self {
            TimeFmt::Milliseconds => Some(TIME_FMT_MS),
            TimeFmt::Seconds => Some(TIME_FMT_S),
            TimeFmt::Minutes => Some(TIME_FMT_M),
            TimeFmt::Custom(_) => None,
        }
    }

    /// Whether this is a caller-provided formatter.
    pub fn is_custom(&self) -> bool {
        matches!(self, TimeFmt::Custom(_))
    }
}

impl FromStr for TimeFmt {
    type Err = TimerError;

    fn from_str(s: &str) -> TimerResult<Self> {
        match s {
            TIME_FMT_MS => Ok(TimeFmt::Milliseconds),
            TIME_FMT_S => Ok(TimeFmt::Seconds),
            TIME_FMT_M => Ok(TimeFmt::Minutes),
            other => Err(TimerError::UnknownFormat(other.to_string())),
        }
    }
}

impl PartialEq for TimeFmt {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TimeFmt::Milliseconds, TimeFmt::Milliseconds)
            | (TimeFmt::Seconds, TimeFmt::Seconds)
            | (TimeFmt::Minutes, TimeFmt::Minutes) => true,
            (TimeFmt::Custom(a), TimeFmt::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for TimeFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.selector() {
            Some(name) => f.write_str(name),
            None => f.write_str("Custom(..)"),
        }
    }
}

/// Milliseconds to 4 significant digits, e.g. `0.0034` -> `"3.4 ms"`.
pub fn time_fmt_ms(secs: f64) -> String {
    format!("{} ms", format_general(secs * 1e3, 4))
}

/// Seconds to 4 significant digits, e.g. `0.0034` -> `"0.0034 s"`.
pub fn time_fmt_s(secs: f64) -> String {
    format!("{} s", format_general(secs, 4))
}

/// Whole minutes and the remaining seconds to 3 significant digits,
/// e.g. `75.5` -> `"1m15.5s"`.
///
/// The seconds are rounded after the split, so `59.9996` renders as
/// `"0m60.0s"`.
pub fn time_fmt_m(secs: f64) -> String {
    let minutes = secs.div_euclid(60.0);
    let seconds = secs.rem_euclid(60.0);
    format!("{}m{}s", minutes as i64, format_general(seconds, 3))
}

/// Render `value` with `precision` significant digits in general notation.
///
/// Fixed notation is used when the decimal exponent of the rounded value
/// lies in `-4..precision - 1`, otherwise scientific notation. Trailing zeros
/// are dropped, but fixed output always keeps one digit after the point
/// (`100.0`, `3.4`), and exponents keep at least two digits (`1e+03`,
/// `1.23e-05`).
pub fn format_general(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = precision.max(1);
    // Rounds to `precision` digits first so the exponent reflects carries
    // such as 9999.6 -> 1.000e4.
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= precision as i32 - 1 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_fraction_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let trimmed = strip_fraction_zeros(&fixed);
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{trimmed}.0")
        }
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

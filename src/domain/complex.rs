//! Complex numbers and their textual literal form.
//!
//! Literals follow the `(re±imj)` notation. Each component is written as the
//! shortest decimal that parses back to the identical `f64`, so a value
//! survives any backend that can store a string.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::error::DomainError;

/// A complex number with `f64` components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

/// Format one component: shortest round-trip decimal, no trailing `.0`.
fn fmt_component(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{value:?}");
    match text.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.im.is_sign_negative() && !self.im.is_nan() {
            '-'
        } else {
            '+'
        };
        write!(
            f,
            "({}{}{}j)",
            fmt_component(self.re),
            sign,
            fmt_component(self.im.abs())
        )
    }
}

const NUMBER: &str = r"(?:(?:\d+(?:\.\d*)?|\.\d+)(?:e[+-]?\d+)?|inf(?:inity)?|nan)";

fn literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)^(?:(?P<re>[+-]?{n})(?P<im>[+-]{n}?)j|(?P<real>[+-]?{n})|(?P<imag>[+-]?{n}?)j)$",
            n = NUMBER
        );
        Regex::new(&pattern).expect("complex literal pattern is valid")
    })
}

/// Parse an imaginary coefficient; a bare sign or empty string means one.
fn parse_imag(text: &str) -> Result<f64, DomainError> {
    match text {
        "" | "+" => Ok(1.0),
        "-" => Ok(-1.0),
        other => parse_real(other),
    }
}

fn parse_real(text: &str) -> Result<f64, DomainError> {
    text.parse::<f64>()
        .map_err(|e| DomainError::decode(format!("invalid component '{text}': {e}")))
}

impl FromStr for Complex {
    type Err = DomainError;

    /// Parse the literal forms produced by `Display`, plus the shorthand
    /// `3`, `4j`, `-j` and `3+4j` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(inner) => inner.trim(),
            None => trimmed,
        };

        let caps = literal_regex()
            .captures(inner)
            .ok_or_else(|| DomainError::decode(format!("not a complex literal: '{s}'")))?;

        if let (Some(re), Some(im)) = (caps.name("re"), caps.name("im")) {
            return Ok(Complex::new(parse_real(re.as_str())?, parse_imag(im.as_str())?));
        }
        if let Some(real) = caps.name("real") {
            return Ok(Complex::new(parse_real(real.as_str())?, 0.0));
        }
        let imag = caps.name("imag").map(|m| m.as_str()).unwrap_or("");
        Ok(Complex::new(0.0, parse_imag(imag)?))
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Exact rational share of a container, `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fraction {
    numerator: u64,
    denominator: u64,
}

impl Fraction {
    /// The full span, used when no width is declared.
    pub const WHOLE: Fraction = Fraction {
        numerator: 1,
        denominator: 1,
    };

    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(LayoutError::ZeroDenominator(format!(
                "{numerator}/{denominator}"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Parse an optional `"<int>/<int>"` declaration. Absent or empty means [`Fraction::WHOLE`].
    pub fn parse(decl: Option<&str>) -> Result<Self> {
        match decl {
            None => Ok(Self::WHOLE),
            Some("") => Ok(Self::WHOLE),
            Some(text) => text.parse(),
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Product of two shares, cross-reduced before multiplying.
    pub fn of(self, outer: Fraction) -> Fraction {
        let left = gcd(self.numerator, outer.denominator).max(1);
        let right = gcd(outer.numerator, self.denominator).max(1);
        Fraction {
            numerator: (self.numerator / left).saturating_mul(outer.numerator / right),
            denominator: (self.denominator / right).saturating_mul(outer.denominator / left),
        }
    }

    /// Columns this share covers when `total` columns are available.
    pub fn units_of(&self, total: u32) -> f64 {
        total as f64 * self.numerator as f64 / self.denominator as f64
    }

    pub fn to_percent(&self) -> Percent {
        Percent::new(self.as_f64() * 100.0)
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::WHOLE
    }
}

impl FromStr for Fraction {
    type Err = LayoutError;

    fn from_str(text: &str) -> Result<Self> {
        let malformed = || LayoutError::MalformedFraction(text.to_string());
        let (numerator, denominator) = text.split_once('/').ok_or_else(malformed)?;
        let numerator = parse_digits(numerator).ok_or_else(malformed)?;
        let denominator = parse_digits(denominator).ok_or_else(malformed)?;
        if denominator == 0 {
            return Err(LayoutError::ZeroDenominator(text.to_string()));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
}

impl TryFrom<String> for Fraction {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(Some(value.as_str()))
    }
}

impl From<Fraction> for String {
    fn from(value: Fraction) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Percentage rounded to four fractional digits.
///
/// Displays without trailing zeros: `33.3333%`, `50%`. Generated styles
/// depend on this exact text.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Self {
        Self((value * 10_000.0).round() / 10_000.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", trim_number(self.0))
    }
}

impl Serialize for Percent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Format with at most four fractional digits and no trailing zeros.
pub(crate) fn trim_number(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

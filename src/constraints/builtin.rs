use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ConstraintError, RouteConstraint, RouteDirection};
use crate::values::RouteValues;

static GUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:[0-9a-f]{32}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|\{[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\}|\([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\))$",
    )
    .expect("GUID regex should be valid")
});

/// Constraints available by name in inline templates
#[derive(Clone)]
pub enum BuiltinConstraint {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// Finite floating point number
    Double,
    /// `true` or `false`, case-insensitive
    Bool,
    /// ASCII letters only
    Alpha,
    /// GUID in `N`, `D`, `B` or `P` format
    Guid,
    Min(i64),
    Max(i64),
    Range(i64, i64),
    /// Exact length in characters
    Length(usize),
    LengthRange(usize, usize),
    MinLength(usize),
    MaxLength(usize),
    /// Case-insensitive, unanchored pattern
    Regex(Regex),
    /// Non-empty value
    Required,
}

impl BuiltinConstraint {
    /// Build a case-insensitive `regex(...)` constraint
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(BuiltinConstraint::Regex)
    }

    /// Check one value
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            BuiltinConstraint::Int => value.parse::<i32>().is_ok(),
            BuiltinConstraint::Long => value.parse::<i64>().is_ok(),
            BuiltinConstraint::Double => value.parse::<f64>().is_ok_and(f64::is_finite),
            BuiltinConstraint::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            BuiltinConstraint::Alpha => value.chars().all(|c| c.is_ascii_alphabetic()),
            BuiltinConstraint::Guid => GUID_REGEX.is_match(value),
            BuiltinConstraint::Min(min) => value.parse::<i64>().is_ok_and(|v| v >= *min),
            BuiltinConstraint::Max(max) => value.parse::<i64>().is_ok_and(|v| v <= *max),
            BuiltinConstraint::Range(min, max) => value
                .parse::<i64>()
                .is_ok_and(|v| (*min..=*max).contains(&v)),
            BuiltinConstraint::Length(len) => value.chars().count() == *len,
            BuiltinConstraint::LengthRange(min, max) => {
                (*min..=*max).contains(&value.chars().count())
            }
            BuiltinConstraint::MinLength(min) => value.chars().count() >= *min,
            BuiltinConstraint::MaxLength(max) => value.chars().count() <= *max,
            BuiltinConstraint::Regex(re) => re.is_match(value),
            BuiltinConstraint::Required => !value.is_empty(),
        }
    }
}

impl RouteConstraint for BuiltinConstraint {
    fn matches(
        &self,
        key: &str,
        values: &RouteValues,
        _direction: RouteDirection,
    ) -> Result<bool, ConstraintError> {
        Ok(values.get(key).is_some_and(|v| self.accepts(v)))
    }
}

impl fmt::Debug for BuiltinConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinConstraint::Int => f.write_str("int"),
            BuiltinConstraint::Long => f.write_str("long"),
            BuiltinConstraint::Double => f.write_str("double"),
            BuiltinConstraint::Bool => f.write_str("bool"),
            BuiltinConstraint::Alpha => f.write_str("alpha"),
            BuiltinConstraint::Guid => f.write_str("guid"),
            BuiltinConstraint::Min(v) => write!(f, "min({v})"),
            BuiltinConstraint::Max(v) => write!(f, "max({v})"),
            BuiltinConstraint::Range(a, b) => write!(f, "range({a},{b})"),
            BuiltinConstraint::Length(v) => write!(f, "length({v})"),
            BuiltinConstraint::LengthRange(a, b) => write!(f, "length({a},{b})"),
            BuiltinConstraint::MinLength(v) => write!(f, "minlength({v})"),
            BuiltinConstraint::MaxLength(v) => write!(f, "maxlength({v})"),
            BuiltinConstraint::Regex(re) => write!(f, "regex({})", re.as_str()),
            BuiltinConstraint::Required => f.write_str("required"),
        }
    }
}

//! # Constraints Module
//!
//! Route constraints restrict the values a parameter accepts, e.g. `{id:int}` or
//! `{slug:regex(^[a-z-]+$)}`. Constraints run after a template matched
//! structurally (inbound) and after link values were selected (outbound).
//!
//! ## Components
//!
//! - [`RouteConstraint`] - the trait every constraint implements
//! - [`BuiltinConstraint`] - `int`, `long`, `double`, `bool`, `alpha`, `guid`, `min`,
//!   `max`, `range`, `length`, `minlength`, `maxlength`, `regex`, `required`
//! - [`ConstraintResolver`] - turns inline constraint references into constraint objects
//! - [`RouteConstraints`] - the per-entry constraint set and its evaluation
//!
//! Constraint errors are never swallowed: [`RouteConstraints::matches`] returns
//! them to the caller of `route` / `get_virtual_path` unchanged.

mod builtin;
mod resolver;

pub use builtin::BuiltinConstraint;
pub use resolver::{ConstraintFactory, ConstraintResolver, ResolveError};

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::values::{eq_ignore_case, RouteValues};

/// Whether constraints run for an incoming request or for link generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteDirection {
    IncomingRequest,
    UrlGeneration,
}

impl fmt::Display for RouteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteDirection::IncomingRequest => f.write_str("incoming"),
            RouteDirection::UrlGeneration => f.write_str("generation"),
        }
    }
}

/// Error raised by a constraint that could not evaluate a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// The constraint failed while evaluating `key`
    Evaluation {
        constraint: String,
        key: String,
        reason: String,
    },
}

impl ConstraintError {
    pub fn evaluation(
        constraint: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConstraintError::Evaluation {
            constraint: constraint.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::Evaluation {
                constraint,
                key,
                reason,
            } => write!(
                f,
                "constraint '{constraint}' failed to evaluate route value '{key}': {reason}"
            ),
        }
    }
}

impl std::error::Error for ConstraintError {}

/// A check on one route value.
///
/// `values` holds every value known at this point (captured plus defaults when
/// matching, combined values when generating); implementations look up `key`.
pub trait RouteConstraint: fmt::Debug + Send + Sync {
    fn matches(
        &self,
        key: &str,
        values: &RouteValues,
        direction: RouteDirection,
    ) -> Result<bool, ConstraintError>;
}

/// Wraps the constraints of an optional parameter: an absent or empty value passes
#[derive(Debug, Clone)]
pub struct OptionalConstraint {
    inner: Arc<dyn RouteConstraint>,
}

impl OptionalConstraint {
    #[must_use]
    pub fn new(inner: Arc<dyn RouteConstraint>) -> Self {
        Self { inner }
    }
}

impl RouteConstraint for OptionalConstraint {
    fn matches(
        &self,
        key: &str,
        values: &RouteValues,
        direction: RouteDirection,
    ) -> Result<bool, ConstraintError> {
        match values.get(key) {
            None | Some("") => Ok(true),
            Some(_) => self.inner.matches(key, values, direction),
        }
    }
}

/// Constraints of one route entry, grouped by route value key
#[derive(Debug, Clone, Default)]
pub struct RouteConstraints {
    entries: Vec<(String, Vec<Arc<dyn RouteConstraint>>)>,
}

impl RouteConstraints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys with at least one constraint
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add a constraint for `key` (case-insensitive)
    pub fn add(&mut self, key: &str, constraint: Arc<dyn RouteConstraint>) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| eq_ignore_case(k, key))
        {
            Some((_, list)) => list.push(constraint),
            None => self.entries.push((key.to_string(), vec![constraint])),
        }
    }

    /// Constraints registered for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> &[Arc<dyn RouteConstraint>] {
        self.entries
            .iter()
            .find(|(k, _)| eq_ignore_case(k, key))
            .map_or(&[], |(_, list)| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<dyn RouteConstraint>])> {
        self.entries
            .iter()
            .map(|(k, list)| (k.as_str(), list.as_slice()))
    }

    /// Evaluate every constraint; stops at the first rejection or error
    pub fn matches(
        &self,
        values: &RouteValues,
        direction: RouteDirection,
    ) -> Result<bool, ConstraintError> {
        for (key, constraints) in &self.entries {
            for constraint in constraints {
                if !constraint.matches(key, values, direction)? {
                    debug!(
                        key = %key,
                        value = values.get(key).unwrap_or_default(),
                        constraint = ?constraint,
                        direction = %direction,
                        "Route value rejected by constraint"
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Failing;

    impl RouteConstraint for Failing {
        fn matches(
            &self,
            key: &str,
            _values: &RouteValues,
            _direction: RouteDirection,
        ) -> Result<bool, ConstraintError> {
            Err(ConstraintError::evaluation("failing", key, "always fails"))
        }
    }

    #[test]
    fn test_matches_all_constraints() {
        let mut constraints = RouteConstraints::new();
        constraints.add("id", Arc::new(BuiltinConstraint::Int));
        constraints.add("ID", Arc::new(BuiltinConstraint::Min(10)));
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints.get("Id").len(), 2);

        let ok = RouteValues::from([("id", "12")]);
        let low = RouteValues::from([("id", "3")]);
        let bad = RouteValues::from([("id", "x")]);
        let dir = RouteDirection::IncomingRequest;
        assert_eq!(constraints.matches(&ok, dir), Ok(true));
        assert_eq!(constraints.matches(&low, dir), Ok(false));
        assert_eq!(constraints.matches(&bad, dir), Ok(false));
        assert_eq!(constraints.matches(&RouteValues::new(), dir), Ok(false));
    }

    #[test]
    fn test_optional_constraint_accepts_missing_value() {
        let mut constraints = RouteConstraints::new();
        constraints.add(
            "id",
            Arc::new(OptionalConstraint::new(Arc::new(BuiltinConstraint::Int))),
        );
        let dir = RouteDirection::UrlGeneration;
        assert_eq!(constraints.matches(&RouteValues::new(), dir), Ok(true));
        assert_eq!(constraints.matches(&RouteValues::from([("id", "")]), dir), Ok(true));
        assert_eq!(constraints.matches(&RouteValues::from([("id", "a")]), dir), Ok(false));
    }

    #[test]
    fn test_constraint_error_propagates() {
        let mut constraints = RouteConstraints::new();
        constraints.add("id", Arc::new(Failing));
        let err = constraints
            .matches(&RouteValues::from([("id", "1")]), RouteDirection::IncomingRequest)
            .unwrap_err();
        assert!(err.to_string().contains("always fails"));
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{BuiltinConstraint, RouteConstraint};
use crate::template::InlineConstraint;

/// Creates a constraint from the optional argument text of an inline reference.
/// An `Err` carries a human readable reason.
pub type ConstraintFactory =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, String> + Send + Sync>;

/// Error resolving an inline constraint reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No factory registered under this name
    UnknownConstraint { name: String },
    /// The factory rejected the argument
    InvalidArgument {
        name: String,
        argument: Option<String>,
        reason: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownConstraint { name } => {
                write!(f, "unknown route constraint '{name}'")
            }
            ResolveError::InvalidArgument {
                name,
                argument,
                reason,
            } => write!(
                f,
                "invalid argument {:?} for route constraint '{name}': {reason}",
                argument.as_deref().unwrap_or_default()
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Maps constraint names (case-insensitive) to factories.
///
/// [`ConstraintResolver::new`] knows every [`BuiltinConstraint`]; applications
/// add their own with [`register`](ConstraintResolver::register).
#[derive(Clone)]
pub struct ConstraintResolver {
    factories: HashMap<String, ConstraintFactory>,
}

impl Default for ConstraintResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ConstraintResolver")
            .field("constraints", &names)
            .finish()
    }
}

impl ConstraintResolver {
    /// Resolver with all built-in constraints registered
    #[must_use]
    pub fn new() -> Self {
        let mut resolver = Self::empty();

        resolver.register_simple("int", BuiltinConstraint::Int);
        resolver.register_simple("long", BuiltinConstraint::Long);
        resolver.register_simple("double", BuiltinConstraint::Double);
        resolver.register_simple("bool", BuiltinConstraint::Bool);
        resolver.register_simple("alpha", BuiltinConstraint::Alpha);
        resolver.register_simple("guid", BuiltinConstraint::Guid);
        resolver.register_simple("required", BuiltinConstraint::Required);

        resolver.register("min", |arg| {
            let [min] = parse_args::<i64, 1>(arg)?;
            Ok(Arc::new(BuiltinConstraint::Min(min)) as Arc<dyn RouteConstraint>)
        });
        resolver.register("max", |arg| {
            let [max] = parse_args::<i64, 1>(arg)?;
            Ok(Arc::new(BuiltinConstraint::Max(max)) as Arc<dyn RouteConstraint>)
        });
        resolver.register("range", |arg| {
            let [min, max] = parse_args::<i64, 2>(arg)?;
            if min > max {
                return Err(format!("minimum {min} is greater than maximum {max}"));
            }
            Ok(Arc::new(BuiltinConstraint::Range(min, max)) as Arc<dyn RouteConstraint>)
        });
        resolver.register("length", |arg| {
            let constraint = match arg.map(|a| a.contains(',')) {
                Some(true) => {
                    let [min, max] = parse_args::<usize, 2>(arg)?;
                    if min > max {
                        return Err(format!("minimum {min} is greater than maximum {max}"));
                    }
                    BuiltinConstraint::LengthRange(min, max)
                }
                _ => {
                    let [len] = parse_args::<usize, 1>(arg)?;
                    BuiltinConstraint::Length(len)
                }
            };
            Ok(Arc::new(constraint) as Arc<dyn RouteConstraint>)
        });
        resolver.register("minlength", |arg| {
            let [min] = parse_args::<usize, 1>(arg)?;
            Ok(Arc::new(BuiltinConstraint::MinLength(min)) as Arc<dyn RouteConstraint>)
        });
        resolver.register("maxlength", |arg| {
            let [max] = parse_args::<usize, 1>(arg)?;
            Ok(Arc::new(BuiltinConstraint::MaxLength(max)) as Arc<dyn RouteConstraint>)
        });
        resolver.register("regex", |arg| {
            let pattern = arg.ok_or_else(|| "a pattern is required".to_string())?;
            let constraint = BuiltinConstraint::regex(pattern).map_err(|e| e.to_string())?;
            Ok(Arc::new(constraint) as Arc<dyn RouteConstraint>)
        });

        resolver
    }

    /// Resolver with no constraints registered
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) a constraint factory
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, String> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    fn register_simple(&mut self, name: &'static str, constraint: BuiltinConstraint) {
        let constraint: Arc<dyn RouteConstraint> = Arc::new(constraint);
        self.register(name, move |arg| match arg {
            None => Ok(Arc::clone(&constraint)),
            Some(_) => Err(format!("'{name}' takes no argument")),
        });
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolve an inline reference such as `range(1,10)`
    pub fn resolve(
        &self,
        constraint: &InlineConstraint,
    ) -> Result<Arc<dyn RouteConstraint>, ResolveError> {
        let factory = self
            .factories
            .get(&constraint.name.to_ascii_lowercase())
            .ok_or_else(|| ResolveError::UnknownConstraint {
                name: constraint.name.clone(),
            })?;
        factory(constraint.argument.as_deref()).map_err(|reason| ResolveError::InvalidArgument {
            name: constraint.name.clone(),
            argument: constraint.argument.clone(),
            reason,
        })
    }
}

fn parse_args<T, const N: usize>(arg: Option<&str>) -> Result<[T; N], String>
where
    T: std::str::FromStr + Copy + Default,
    T::Err: fmt::Display,
{
    let arg = arg.ok_or_else(|| format!("expected {N} argument(s)"))?;
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} argument(s), got {}", parts.len()));
    }
    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("cannot parse '{part}': {e}"))?;
    }
    Ok(out)
}

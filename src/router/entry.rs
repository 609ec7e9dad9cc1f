//! Route entries and the prepared matcher/binder pairs built from them.

use std::fmt;
use std::sync::Arc;

use crate::constraints::RouteConstraints;
use crate::template::{RouteTemplate, TemplateBinder, TemplateMatcher};
use crate::values::{eq_ignore_case, RouteValues};

/// An inbound route: a template that selects `handler` for matching request paths
#[derive(Debug, Clone)]
pub struct InboundRouteEntry<H> {
    /// Opaque value returned on a successful match
    pub handler: H,
    pub route_template: Arc<RouteTemplate>,
    /// Constraints keyed by parameter name
    pub constraints: RouteConstraints,
    /// Parameter defaults from the template
    pub defaults: RouteValues,
    /// Priority bucket; lower buckets are searched first
    pub order: i32,
    /// Inbound precedence; lower is more specific
    pub precedence: f64,
    pub route_name: Option<String>,
}

/// Value a link must carry for an outbound entry to be selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredValue {
    /// The value must equal this text (case-insensitive); `""` means absent
    Exact(String),
    /// Any value is accepted
    Any,
}

impl RequiredValue {
    /// Wildcard spelling used by route tables
    pub const ANY_TOKEN: &'static str = "*";

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, RequiredValue::Any)
    }

    #[must_use]
    pub fn as_exact(&self) -> Option<&str> {
        match self {
            RequiredValue::Exact(v) => Some(v),
            RequiredValue::Any => None,
        }
    }
}

impl From<&str> for RequiredValue {
    fn from(value: &str) -> Self {
        if value == Self::ANY_TOKEN {
            RequiredValue::Any
        } else {
            RequiredValue::Exact(value.to_string())
        }
    }
}

impl fmt::Display for RequiredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredValue::Exact(v) => f.write_str(v),
            RequiredValue::Any => f.write_str(Self::ANY_TOKEN),
        }
    }
}

/// An outbound route: a template used to generate links for a required value set
#[derive(Debug, Clone)]
pub struct OutboundRouteEntry<H> {
    pub handler: H,
    pub route_template: Arc<RouteTemplate>,
    pub constraints: RouteConstraints,
    pub defaults: RouteValues,
    /// Values that select this entry, e.g. `controller = Products`
    pub required_link_values: Vec<(String, RequiredValue)>,
    pub order: i32,
    /// Outbound precedence; higher is more specific
    pub precedence: f64,
    pub route_name: Option<String>,
}

impl<H> OutboundRouteEntry<H> {
    /// Required value for `key` (case-insensitive)
    #[must_use]
    pub fn required_value(&self, key: &str) -> Option<&RequiredValue> {
        self.required_link_values
            .iter()
            .find(|(k, _)| eq_ignore_case(k, key))
            .map(|(_, v)| v)
    }

    /// True when at least one required value is a wildcard
    #[must_use]
    pub fn is_conventional(&self) -> bool {
        self.required_link_values.iter().any(|(_, v)| v.is_any())
    }
}

/// An inbound entry with its prepared matcher
#[derive(Debug)]
pub struct InboundMatch<H> {
    pub entry: InboundRouteEntry<H>,
    pub matcher: TemplateMatcher,
}

impl<H> InboundMatch<H> {
    #[must_use]
    pub fn new(entry: InboundRouteEntry<H>) -> Self {
        let matcher = TemplateMatcher::new(
            RouteTemplate::clone(&entry.route_template),
            entry.defaults.clone(),
        );
        Self { entry, matcher }
    }

    /// Template text, used for deterministic tie-breaks
    #[must_use]
    pub fn template_text(&self) -> &str {
        self.entry.route_template.text()
    }
}

/// An outbound entry with its prepared binder
#[derive(Debug)]
pub struct OutboundMatch<H> {
    pub entry: OutboundRouteEntry<H>,
    pub binder: TemplateBinder,
}

impl<H> OutboundMatch<H> {
    #[must_use]
    pub fn new(entry: OutboundRouteEntry<H>) -> Self {
        let binder = TemplateBinder::new(
            RouteTemplate::clone(&entry.route_template),
            entry.defaults.clone(),
        );
        Self { entry, binder }
    }

    #[must_use]
    pub fn template_text(&self) -> &str {
        self.entry.route_template.text()
    }
}

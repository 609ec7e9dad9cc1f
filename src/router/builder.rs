//! Route table builder.
//!
//! Collects inbound and outbound entries, then freezes them into a
//! [`TreeRouter`]. All template and constraint errors surface here, at build
//! time, never while serving requests.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::core::TreeRouter;
use super::entry::{
    InboundMatch, InboundRouteEntry, OutboundMatch, OutboundRouteEntry, RequiredValue,
};
use super::link_tree::LinkGenerationDecisionTree;
use super::node::UrlMatchingTree;
use crate::constraints::{ConstraintResolver, OptionalConstraint, ResolveError, RouteConstraints};
use crate::runtime_config::RouterConfig;
use crate::template::{precedence, RouteTemplate, TemplateError};
use crate::values::{eq_ignore_case, fold_case, RouteValues};

/// Error building a route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Template text could not be parsed
    Template(TemplateError),
    /// An inline constraint could not be resolved
    Constraint {
        template: String,
        parameter: String,
        source: ResolveError,
    },
    /// Two entries share a route name but not a template
    DuplicateRouteName {
        name: String,
        first_template: String,
        second_template: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Template(e) => write!(f, "{e}"),
            BuildError::Constraint {
                template,
                parameter,
                source,
            } => write!(
                f,
                "route template '{template}', parameter '{parameter}': {source}"
            ),
            BuildError::DuplicateRouteName {
                name,
                first_template,
                second_template,
            } => write!(
                f,
                "route name '{name}' is used by two different templates: '{first_template}' and '{second_template}'"
            ),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Template(e) => Some(e),
            BuildError::Constraint { source, .. } => Some(source),
            BuildError::DuplicateRouteName { .. } => None,
        }
    }
}

impl From<TemplateError> for BuildError {
    fn from(e: TemplateError) -> Self {
        BuildError::Template(e)
    }
}

/// Mutable route table; [`build`](TreeRouteBuilder::build) produces an immutable router.
///
/// ```rust
/// use treerouter::router::{RequiredValue, TreeRouteBuilder};
///
/// let mut builder = TreeRouteBuilder::new();
/// builder.map_inbound("details", "products/{id:int}", Some("product"), 0)?;
/// builder.map_outbound(
///     "details",
///     "products/{id:int}",
///     [("controller", RequiredValue::from("Products"))],
///     Some("product"),
///     0,
/// )?;
/// let router = builder.build()?;
/// assert_eq!(router.match_path("/products/7").unwrap().unwrap().handler(), &"details");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TreeRouteBuilder<H> {
    resolver: ConstraintResolver,
    config: RouterConfig,
    inbound: Vec<InboundRouteEntry<H>>,
    outbound: Vec<OutboundRouteEntry<H>>,
}

impl<H> Default for TreeRouteBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TreeRouteBuilder<H> {
    /// Builder with the built-in constraints and default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(ConstraintResolver::new())
    }

    #[must_use]
    pub fn with_resolver(resolver: ConstraintResolver) -> Self {
        Self {
            resolver,
            config: RouterConfig::default(),
            inbound: Vec::new(),
            outbound: Vec::new(),
        }
    }

    /// Runtime settings handed to every router built from here
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &ConstraintResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut ConstraintResolver {
        &mut self.resolver
    }

    #[must_use]
    pub fn inbound_entries(&self) -> &[InboundRouteEntry<H>] {
        &self.inbound
    }

    #[must_use]
    pub fn outbound_entries(&self) -> &[OutboundRouteEntry<H>] {
        &self.outbound
    }

    /// Add an inbound entry
    pub fn map_inbound(
        &mut self,
        handler: H,
        template: &str,
        route_name: Option<&str>,
        order: i32,
    ) -> Result<&mut InboundRouteEntry<H>, BuildError> {
        let template = RouteTemplate::parse(template)?;
        let constraints = self.build_constraints(&template)?;
        let entry = InboundRouteEntry {
            handler,
            constraints,
            defaults: template_defaults(&template),
            order,
            precedence: precedence::compute_inbound(&template),
            route_name: route_name.map(str::to_string),
            route_template: Arc::new(template),
        };

        let index = self.inbound.len();
        self.inbound.push(entry);
        Ok(&mut self.inbound[index])
    }

    /// Add an outbound entry selected by `required_link_values`
    pub fn map_outbound<K, I>(
        &mut self,
        handler: H,
        template: &str,
        required_link_values: I,
        route_name: Option<&str>,
        order: i32,
    ) -> Result<&mut OutboundRouteEntry<H>, BuildError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RequiredValue)>,
    {
        let template = RouteTemplate::parse(template)?;
        let constraints = self.build_constraints(&template)?;
        let entry = OutboundRouteEntry {
            handler,
            constraints,
            defaults: template_defaults(&template),
            required_link_values: required_link_values
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
            order,
            precedence: precedence::compute_outbound(&template),
            route_name: route_name.map(str::to_string),
            route_template: Arc::new(template),
        };

        let index = self.outbound.len();
        self.outbound.push(entry);
        Ok(&mut self.outbound[index])
    }

    /// Remove every entry, keeping the resolver and configuration
    pub fn clear(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }

    fn build_constraints(&self, template: &RouteTemplate) -> Result<RouteConstraints, BuildError> {
        let mut constraints = RouteConstraints::new();
        for parameter in template.parameters() {
            for inline in &parameter.constraints {
                let constraint =
                    self.resolver
                        .resolve(inline)
                        .map_err(|source| BuildError::Constraint {
                            template: template.text().to_string(),
                            parameter: parameter.name.clone(),
                            source,
                        })?;
                if parameter.is_optional {
                    constraints.add(&parameter.name, Arc::new(OptionalConstraint::new(constraint)));
                } else {
                    constraints.add(&parameter.name, constraint);
                }
            }
        }
        Ok(constraints)
    }

    /// Freeze the entries into a router
    pub fn build(&self) -> Result<TreeRouter<H>, BuildError>
    where
        H: Clone,
    {
        check_route_names(&self.inbound, &self.outbound)?;

        let mut trees: BTreeMap<i32, UrlMatchingTree<H>> = BTreeMap::new();
        let mut inbound = Vec::with_capacity(self.inbound.len());
        for entry in &self.inbound {
            let candidate = Arc::new(InboundMatch::new(entry.clone()));
            trees
                .entry(entry.order)
                .or_insert_with(|| UrlMatchingTree::new(entry.order))
                .add_entry(Arc::clone(&candidate));
            inbound.push(candidate);
        }

        let mut outbound = Vec::with_capacity(self.outbound.len());
        let mut named: HashMap<String, Arc<OutboundMatch<H>>> = HashMap::new();
        for entry in &self.outbound {
            let candidate = Arc::new(OutboundMatch::new(entry.clone()));
            if let Some(name) = &entry.route_name {
                named
                    .entry(fold_case(name).into_owned())
                    .or_insert_with(|| Arc::clone(&candidate));
            }
            outbound.push(candidate);
        }

        let link_tree = LinkGenerationDecisionTree::new(&outbound);
        let trees: Vec<UrlMatchingTree<H>> = trees.into_values().collect();

        for tree in &trees {
            debug!(
                order = tree.order(),
                nodes = tree.root().node_count(),
                "Built inbound matching tree"
            );
        }
        info!(
            inbound_count = inbound.len(),
            outbound_count = outbound.len(),
            tree_count = trees.len(),
            named_count = named.len(),
            conventional_count = link_tree.conventional().len(),
            "Route table built"
        );

        Ok(TreeRouter::new(
            trees,
            inbound,
            outbound,
            link_tree,
            named,
            self.config,
        ))
    }
}

fn template_defaults(template: &RouteTemplate) -> RouteValues {
    template
        .parameters()
        .filter_map(|p| {
            p.default_value
                .as_deref()
                .map(|d| (p.name.as_str(), d))
        })
        .collect()
}

/// Route names are unique across inbound and outbound entries unless the
/// templates are the same (case-insensitive).
fn check_route_names<H>(
    inbound: &[InboundRouteEntry<H>],
    outbound: &[OutboundRouteEntry<H>],
) -> Result<(), BuildError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let named = inbound
        .iter()
        .filter_map(|e| e.route_name.as_deref().map(|n| (n, e.route_template.text())))
        .chain(
            outbound
                .iter()
                .filter_map(|e| e.route_name.as_deref().map(|n| (n, e.route_template.text()))),
        );

    for (name, template) in named {
        let key = fold_case(name);
        match seen.get(key.as_ref()) {
            Some(first) if !eq_ignore_case(first, template) => {
                return Err(BuildError::DuplicateRouteName {
                    name: name.to_string(),
                    first_template: (*first).to_string(),
                    second_template: template.to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(key.into_owned(), template);
            }
        }
    }
    Ok(())
}

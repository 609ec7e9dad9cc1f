//! Router core module - inbound matching and link generation.
//!
//! [`TreeRouter`] is the immutable snapshot produced by
//! [`TreeRouteBuilder::build`](super::TreeRouteBuilder::build). It holds no
//! per-request state and is safe to share across threads.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::enumerator::TreeEnumerator;
use super::entry::{InboundMatch, InboundRouteEntry, OutboundMatch, OutboundRouteEntry};
use super::link_tree::{LinkGenerationDecisionTree, OutboundMatchResult};
use super::node::UrlMatchingTree;
use crate::constraints::{ConstraintError, RouteDirection};
use crate::runtime_config::RouterConfig;
use crate::template::PathTokenizer;
use crate::values::{fold_case, RouteValues};

/// Result of successfully matching a request path
#[derive(Debug, Clone)]
pub struct RouteMatch<'r, H> {
    /// The selected entry
    pub entry: &'r InboundRouteEntry<H>,
    /// Captured values plus template defaults
    pub values: RouteValues,
}

impl<'r, H> RouteMatch<'r, H> {
    #[inline]
    #[must_use]
    pub fn handler(&self) -> &'r H {
        &self.entry.handler
    }

    /// Get a route value by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }

    #[must_use]
    pub fn route_name(&self) -> Option<&'r str> {
        self.entry.route_name.as_deref()
    }

    #[must_use]
    pub fn template(&self) -> &'r str {
        self.entry.route_template.text()
    }
}

/// Input for link generation
#[derive(Debug, Clone, Default)]
pub struct VirtualPathContext {
    /// Generate with this named route only
    pub route_name: Option<String>,
    /// Explicit values
    pub values: RouteValues,
    /// Values of the request being served
    pub ambient_values: Option<RouteValues>,
}

impl VirtualPathContext {
    #[must_use]
    pub fn new(values: RouteValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_ambient_values(mut self, ambient: RouteValues) -> Self {
        self.ambient_values = Some(ambient);
        self
    }
}

/// A generated link
#[derive(Debug)]
pub struct VirtualPathData<H> {
    /// Path with a leading `/`, including the query string if any
    pub path: String,
    /// Outbound route that produced the path
    pub matched: Arc<OutboundMatch<H>>,
}

impl<H> VirtualPathData<H> {
    #[must_use]
    pub fn entry(&self) -> &OutboundRouteEntry<H> {
        &self.matched.entry
    }

    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.matched.entry.route_name.as_deref()
    }
}

/// Tree-indexed router
///
/// Inbound matching visits one trie per order bucket in ascending order; the
/// first candidate whose template and constraints accept the path wins.
/// Outbound generation tries candidates from the link decision tree (or a
/// single named route) until one produces a path.
#[derive(Debug)]
pub struct TreeRouter<H> {
    trees: Vec<UrlMatchingTree<H>>,
    inbound: Vec<Arc<InboundMatch<H>>>,
    outbound: Vec<Arc<OutboundMatch<H>>>,
    link_tree: LinkGenerationDecisionTree<H>,
    named: HashMap<String, Arc<OutboundMatch<H>>>,
    config: RouterConfig,
}

impl<H> TreeRouter<H> {
    pub(crate) fn new(
        trees: Vec<UrlMatchingTree<H>>,
        inbound: Vec<Arc<InboundMatch<H>>>,
        outbound: Vec<Arc<OutboundMatch<H>>>,
        link_tree: LinkGenerationDecisionTree<H>,
        named: HashMap<String, Arc<OutboundMatch<H>>>,
        config: RouterConfig,
    ) -> Self {
        Self {
            trees,
            inbound,
            outbound,
            link_tree,
            named,
            config,
        }
    }

    /// Match a request path.
    ///
    /// On success the captured values and defaults are written into `values`
    /// and the entry is returned. A candidate that fails its template or its
    /// constraints leaves `values` as it was. Constraint errors are returned
    /// as they are.
    pub fn route(
        &self,
        path: &str,
        values: &mut RouteValues,
    ) -> Result<Option<&InboundRouteEntry<H>>, ConstraintError> {
        debug!(path = %path, trees = self.trees.len(), "Route match attempt");
        let match_start = Instant::now();
        let tokens = PathTokenizer::new(path);

        for tree in &self.trees {
            for node in TreeEnumerator::new(tree.root(), &tokens) {
                for candidate in node.matches() {
                    let Some(captures) = candidate.matcher.capture(path) else {
                        continue;
                    };
                    let mut scope = values.scope();
                    candidate.matcher.apply(captures, &mut scope);
                    if !candidate
                        .entry
                        .constraints
                        .matches(&scope, RouteDirection::IncomingRequest)?
                    {
                        continue;
                    }
                    scope.commit();

                    let match_duration = match_start.elapsed();
                    if match_duration > self.config.slow_match_threshold {
                        warn!(
                            path = %path,
                            template = %candidate.template_text(),
                            order = tree.order(),
                            duration_us = match_duration.as_micros(),
                            "Slow route matching detected"
                        );
                    } else {
                        debug!(
                            path = %path,
                            template = %candidate.template_text(),
                            order = tree.order(),
                            duration_us = match_duration.as_micros(),
                            "Route matched"
                        );
                    }
                    return Ok(Some(&candidate.entry));
                }
            }
        }

        debug!(
            path = %path,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        Ok(None)
    }

    /// Match a request path into fresh values
    pub fn match_path(&self, path: &str) -> Result<Option<RouteMatch<'_, H>>, ConstraintError> {
        let mut values = RouteValues::new();
        Ok(self
            .route(path, &mut values)?
            .map(|entry| RouteMatch { entry, values }))
    }

    /// Ranked outbound candidates for a value set
    #[must_use]
    pub fn link_candidates(
        &self,
        values: &RouteValues,
        ambient: Option<&RouteValues>,
    ) -> Vec<OutboundMatchResult<H>> {
        self.link_tree.get_matches(values, ambient)
    }

    /// Generate a link.
    ///
    /// With a route name only that route is tried. Otherwise candidates are
    /// tried in rank order and the first one that binds wins.
    pub fn get_virtual_path(
        &self,
        context: &VirtualPathContext,
    ) -> Result<Option<VirtualPathData<H>>, ConstraintError> {
        if let Some(name) = &context.route_name {
            let Some(candidate) = self.named.get(fold_case(name).as_ref()) else {
                debug!(route_name = %name, "No outbound route with this name");
                return Ok(None);
            };
            return self.generate(context, candidate);
        }

        for result in self
            .link_tree
            .get_matches(&context.values, context.ambient_values.as_ref())
        {
            if let Some(data) = self.generate(context, &result.matched)? {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }

    fn generate(
        &self,
        context: &VirtualPathContext,
        candidate: &Arc<OutboundMatch<H>>,
    ) -> Result<Option<VirtualPathData<H>>, ConstraintError> {
        let entry = &candidate.entry;

        // Required values that are not parameters select the entry; they must
        // not end up in the query string.
        let input: RouteValues = context
            .values
            .iter()
            .filter(|(key, _)| {
                entry.required_value(key).is_none() || entry.route_template.parameter(key).is_some()
            })
            .collect();

        let Some(result) = candidate
            .binder
            .get_values(context.ambient_values.as_ref(), &input)
        else {
            return Ok(None);
        };
        if !entry
            .constraints
            .matches(&result.combined_values, RouteDirection::UrlGeneration)?
        {
            return Ok(None);
        }
        let Some(path) = candidate.binder.bind_values(&result.accepted_values) else {
            return Ok(None);
        };

        debug!(
            template = %candidate.template_text(),
            path = %path,
            "Link generated"
        );
        Ok(Some(VirtualPathData {
            path: format!("/{path}"),
            matched: Arc::clone(candidate),
        }))
    }

    /// Trees in ascending order
    #[must_use]
    pub fn trees(&self) -> &[UrlMatchingTree<H>] {
        &self.trees
    }

    /// Inbound entries in registration order
    pub fn inbound_entries(&self) -> impl Iterator<Item = &InboundRouteEntry<H>> {
        self.inbound.iter().map(|m| &m.entry)
    }

    /// Outbound entries in registration order
    pub fn outbound_entries(&self) -> impl Iterator<Item = &OutboundRouteEntry<H>> {
        self.outbound.iter().map(|m| &m.entry)
    }

    /// Outbound entry registered under `name` (case-insensitive)
    #[must_use]
    pub fn named_route(&self, name: &str) -> Option<&OutboundRouteEntry<H>> {
        self.named.get(fold_case(name).as_ref()).map(|m| &m.entry)
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Write one line per registered entry, inbound entries first.
    pub fn dump_routes<W: Write>(&self, out: &mut W) -> io::Result<()>
    where
        H: fmt::Display,
    {
        for m in &self.inbound {
            let entry = &m.entry;
            writeln!(
                out,
                "inbound  order={:<3} {:<40} -> {}{}",
                entry.order,
                m.template_text(),
                entry.handler,
                name_suffix(entry.route_name.as_deref())
            )?;
        }
        for m in &self.outbound {
            let entry = &m.entry;
            let required: Vec<String> = entry
                .required_link_values
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            writeln!(
                out,
                "outbound order={:<3} {:<40} -> {} [{}]{}",
                entry.order,
                m.template_text(),
                entry.handler,
                required.join(", "),
                name_suffix(entry.route_name.as_deref())
            )?;
        }
        debug!(
            inbound_count = self.inbound.len(),
            outbound_count = self.outbound.len(),
            "Routes dumped"
        );
        Ok(())
    }
}

fn name_suffix(name: Option<&str>) -> String {
    name.map(|n| format!(" name={n}")).unwrap_or_default()
}

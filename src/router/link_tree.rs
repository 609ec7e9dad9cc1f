//! Outbound candidate selection.
//!
//! Outbound entries whose required values are all exact are indexed in a
//! [`DecisionTreeNode`] keyed by those values. Entries with a wildcard
//! requirement ("conventional" routes) cannot be indexed by value and are
//! appended to every result.

use std::cmp::Ordering;
use std::sync::Arc;

use super::entry::OutboundMatch;
use crate::decision_tree::{DecisionTreeBuilder, DecisionTreeNode};
use crate::values::RouteValues;

/// A link generation candidate
#[derive(Debug)]
pub struct OutboundMatchResult<H> {
    pub matched: Arc<OutboundMatch<H>>,
    /// Found only through a "value absent" branch
    pub is_fallback: bool,
}

impl<H> Clone for OutboundMatchResult<H> {
    fn clone(&self) -> Self {
        Self {
            matched: Arc::clone(&self.matched),
            is_fallback: self.is_fallback,
        }
    }
}

/// Decision tree over the required link values of outbound entries
#[derive(Debug)]
pub struct LinkGenerationDecisionTree<H> {
    root: DecisionTreeNode<Arc<OutboundMatch<H>>>,
    conventional: Vec<Arc<OutboundMatch<H>>>,
}

impl<H> LinkGenerationDecisionTree<H> {
    #[must_use]
    pub fn new(entries: &[Arc<OutboundMatch<H>>]) -> Self {
        let (conventional, attribute): (Vec<_>, Vec<_>) = entries
            .iter()
            .map(Arc::clone)
            .partition(|m| m.entry.is_conventional());

        let classifier = |m: &Arc<OutboundMatch<H>>| -> Vec<(String, String)> {
            m.entry
                .required_link_values
                .iter()
                .filter_map(|(key, value)| {
                    value.as_exact().map(|v| (key.clone(), v.to_string()))
                })
                .collect()
        };
        let root = DecisionTreeBuilder::build(&attribute, &classifier);

        Self { root, conventional }
    }

    #[must_use]
    pub fn root(&self) -> &DecisionTreeNode<Arc<OutboundMatch<H>>> {
        &self.root
    }

    #[must_use]
    pub fn conventional(&self) -> &[Arc<OutboundMatch<H>>] {
        &self.conventional
    }

    /// Every candidate whose required values can be satisfied, best first.
    ///
    /// Ordering: ascending order, descending precedence, non-fallback first,
    /// then template text. A candidate reached more than once keeps its best
    /// position.
    #[must_use]
    pub fn get_matches(
        &self,
        values: &RouteValues,
        ambient: Option<&RouteValues>,
    ) -> Vec<OutboundMatchResult<H>> {
        if self.root.is_empty() && self.conventional.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        walk(&mut results, values, ambient, &self.root, false);
        results.extend(self.conventional.iter().map(|m| OutboundMatchResult {
            matched: Arc::clone(m),
            is_fallback: false,
        }));

        results.sort_by(compare_results);

        let mut unique: Vec<OutboundMatchResult<H>> = Vec::with_capacity(results.len());
        for result in results {
            if !unique
                .iter()
                .any(|seen| Arc::ptr_eq(&seen.matched, &result.matched))
            {
                unique.push(result);
            }
        }
        unique
    }
}

fn walk<H>(
    results: &mut Vec<OutboundMatchResult<H>>,
    values: &RouteValues,
    ambient: Option<&RouteValues>,
    node: &DecisionTreeNode<Arc<OutboundMatch<H>>>,
    is_fallback: bool,
) {
    results.extend(node.matches.iter().map(|m| OutboundMatchResult {
        matched: Arc::clone(m),
        is_fallback,
    }));

    for criterion in &node.criteria {
        match values.get(&criterion.key) {
            Some(value) => {
                if let Some(branch) = criterion.branch(value) {
                    walk(results, values, ambient, branch, is_fallback);
                }
            }
            None => {
                // No explicit value: try the ambient value and the "absent" branch.
                if let Some(value) = ambient
                    .and_then(|a| a.get(&criterion.key))
                    .filter(|v| !v.is_empty())
                {
                    if let Some(branch) = criterion.branch(value) {
                        walk(results, values, ambient, branch, is_fallback);
                    }
                }
                if let Some(branch) = criterion.branch("") {
                    walk(results, values, ambient, branch, true);
                }
            }
        }
    }
}

fn compare_results<H>(a: &OutboundMatchResult<H>, b: &OutboundMatchResult<H>) -> Ordering {
    let (x, y) = (&a.matched.entry, &b.matched.entry);
    x.order
        .cmp(&y.order)
        .then_with(|| y.precedence.total_cmp(&x.precedence))
        .then_with(|| a.is_fallback.cmp(&b.is_fallback))
        .then_with(|| a.matched.template_text().cmp(b.matched.template_text()))
}

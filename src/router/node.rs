//! Inbound matching trie.
//!
//! Templates are indexed segment by segment. Literal segments branch on their
//! case-folded text; every other segment kind has one child slot per category,
//! so a node has at most four non-literal children no matter how many templates
//! share it. Which of the templates in a slot actually matches is decided later
//! by the template matcher and the constraints.

use std::collections::HashMap;
use std::sync::Arc;

use super::entry::InboundMatch;
use crate::template::{TemplatePart, TemplateSegment};
use crate::values::fold_case;

/// One vertex of the inbound trie
#[derive(Debug)]
pub struct UrlMatchingNode<H> {
    /// Number of path segments consumed to reach this node
    pub(crate) depth: usize,
    pub(crate) is_catch_all: bool,
    /// Templates ending here, by ascending precedence then template text
    pub(crate) matches: Vec<Arc<InboundMatch<H>>>,
    /// Literal children keyed by lowercase segment text
    pub(crate) literals: HashMap<String, UrlMatchingNode<H>>,
    pub(crate) parameters: Option<Box<UrlMatchingNode<H>>>,
    pub(crate) constrained_parameters: Option<Box<UrlMatchingNode<H>>>,
    pub(crate) catch_alls: Option<Box<UrlMatchingNode<H>>>,
    pub(crate) constrained_catch_alls: Option<Box<UrlMatchingNode<H>>>,
}

impl<H> UrlMatchingNode<H> {
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            is_catch_all: false,
            matches: Vec::new(),
            literals: HashMap::new(),
            parameters: None,
            constrained_parameters: None,
            catch_alls: None,
            constrained_catch_alls: None,
        }
    }

    fn new_catch_all(depth: usize) -> Self {
        Self {
            is_catch_all: true,
            ..Self::new(depth)
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.is_catch_all
    }

    #[must_use]
    pub fn matches(&self) -> &[Arc<InboundMatch<H>>] {
        &self.matches
    }

    /// Literal child for a request segment (case-insensitive)
    #[must_use]
    pub fn literal(&self, segment: &str) -> Option<&UrlMatchingNode<H>> {
        self.literals.get(fold_case(segment).as_ref())
    }

    pub fn literal_keys(&self) -> impl Iterator<Item = &str> {
        self.literals.keys().map(String::as_str)
    }

    #[must_use]
    pub fn parameters(&self) -> Option<&UrlMatchingNode<H>> {
        self.parameters.as_deref()
    }

    #[must_use]
    pub fn constrained_parameters(&self) -> Option<&UrlMatchingNode<H>> {
        self.constrained_parameters.as_deref()
    }

    #[must_use]
    pub fn catch_alls(&self) -> Option<&UrlMatchingNode<H>> {
        self.catch_alls.as_deref()
    }

    #[must_use]
    pub fn constrained_catch_alls(&self) -> Option<&UrlMatchingNode<H>> {
        self.constrained_catch_alls.as_deref()
    }

    /// Total number of nodes in this subtree, including `self`
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.literals.values().map(Self::node_count).sum::<usize>()
            + [
                &self.parameters,
                &self.constrained_parameters,
                &self.catch_alls,
                &self.constrained_catch_alls,
            ]
            .into_iter()
            .flatten()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    fn add_match(&mut self, candidate: Arc<InboundMatch<H>>) {
        self.matches.push(candidate);
        // Stable: equal keys keep insertion order.
        self.matches.sort_by(|a, b| {
            a.entry
                .precedence
                .total_cmp(&b.entry.precedence)
                .then_with(|| a.template_text().cmp(b.template_text()))
        });
    }
}

/// The trie for one order bucket
#[derive(Debug)]
pub struct UrlMatchingTree<H> {
    order: i32,
    root: UrlMatchingNode<H>,
}

impl<H> UrlMatchingTree<H> {
    #[must_use]
    pub fn new(order: i32) -> Self {
        Self {
            order,
            root: UrlMatchingNode::new(0),
        }
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[must_use]
    pub fn root(&self) -> &UrlMatchingNode<H> {
        &self.root
    }

    /// Index an inbound entry
    pub(crate) fn add_entry(&mut self, candidate: Arc<InboundMatch<H>>) {
        let template = Arc::clone(&candidate.entry.route_template);
        let segments = template.segments();
        let mut current = &mut self.root;

        for (i, segment) in segments.iter().enumerate() {
            let depth = i + 1;
            let Some(part) = segment.simple_part() else {
                // Complex segments index like constrained parameters.
                current = &mut **current
                    .constrained_parameters
                    .get_or_insert_with(|| Box::new(UrlMatchingNode::new(depth)));
                continue;
            };

            match part {
                TemplatePart::Literal(literal) => {
                    current = current
                        .literals
                        .entry(fold_case(&literal.text).into_owned())
                        .or_insert_with(|| UrlMatchingNode::new(depth));
                }
                TemplatePart::Parameter(parameter) => {
                    // Shorter paths must still reach templates whose tail can match nothing.
                    if remaining_segments_are_optional(&segments[i..]) {
                        current.add_match(Arc::clone(&candidate));
                    }

                    let slot = match (parameter.is_catch_all, parameter.has_constraints()) {
                        (true, true) => &mut current.constrained_catch_alls,
                        (true, false) => &mut current.catch_alls,
                        (false, true) => &mut current.constrained_parameters,
                        (false, false) => &mut current.parameters,
                    };
                    let is_catch_all = parameter.is_catch_all;
                    current = &mut **slot.get_or_insert_with(|| {
                        Box::new(if is_catch_all {
                            UrlMatchingNode::new_catch_all(depth)
                        } else {
                            UrlMatchingNode::new(depth)
                        })
                    });
                }
            }
        }

        current.add_match(candidate);
    }
}

fn remaining_segments_are_optional(segments: &[TemplateSegment]) -> bool {
    segments.iter().all(|segment| {
        matches!(
            segment.simple_part(),
            Some(TemplatePart::Parameter(p)) if p.is_optional_like()
        )
    })
}

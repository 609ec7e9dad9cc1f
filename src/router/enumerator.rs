//! Depth-first trie traversal for one request path.

use smallvec::SmallVec;

use super::node::UrlMatchingNode;
use crate::template::PathTokenizer;

/// Yields the trie nodes whose matches should be tried for a request path.
///
/// Uses an explicit stack. Children are pushed least specific first, so nodes
/// come out literal first, then constrained parameter, parameter, constrained
/// catch-all and catch-all.
pub struct TreeEnumerator<'a, 't, H> {
    stack: SmallVec<[&'a UrlMatchingNode<H>; 16]>,
    tokens: &'t PathTokenizer<'t>,
}

impl<'a, 't, H> TreeEnumerator<'a, 't, H> {
    #[must_use]
    pub fn new(root: &'a UrlMatchingNode<H>, tokens: &'t PathTokenizer<'t>) -> Self {
        let mut stack = SmallVec::new();
        stack.push(root);
        Self { stack, tokens }
    }
}

impl<'a, H> Iterator for TreeEnumerator<'a, '_, H> {
    type Item = &'a UrlMatchingNode<H>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_catch_all() && !node.matches().is_empty() {
                return Some(node);
            }
            if node.depth() >= self.tokens.count() {
                if node.depth() == self.tokens.count() && !node.matches().is_empty() {
                    return Some(node);
                }
                continue;
            }

            self.stack.extend(
                [
                    node.catch_alls(),
                    node.constrained_catch_alls(),
                    node.parameters(),
                    node.constrained_parameters(),
                ]
                .into_iter()
                .flatten(),
            );
            if let Some(literal) = self
                .tokens
                .get(node.depth())
                .and_then(|token| node.literal(token))
            {
                self.stack.push(literal);
            }
        }
        None
    }
}

//! # Decision Tree Module
//!
//! A generic decision tree that partitions items by discriminator keys.
//!
//! Each item declares a set of criteria (`key = value` pairs, compared
//! case-insensitively). The builder picks, at every node, the keys that split
//! the remaining items into the most branches first and recurses until every
//! criterion of an item has been consumed; the item then becomes a *match* of
//! that node.
//!
//! Lookups walk the tree by choosing, per criterion, the branch for a known
//! value. The outbound link tree in [`crate::router`] is built on top of this.
//!
//! An empty value is a valid branch key: it stands for "value absent".

use std::collections::{HashMap, HashSet};

use crate::values::fold_case;

/// Supplies the criteria of an item
pub trait Classifier<T> {
    /// `(key, value)` pairs; keys and values compare case-insensitively
    fn criteria(&self, item: &T) -> Vec<(String, String)>;
}

impl<T, F> Classifier<T> for F
where
    F: Fn(&T) -> Vec<(String, String)>,
{
    fn criteria(&self, item: &T) -> Vec<(String, String)> {
        self(item)
    }
}

/// One node of a built decision tree
#[derive(Debug, Clone)]
pub struct DecisionTreeNode<T> {
    /// Items whose criteria are all satisfied on the path to this node
    pub matches: Vec<T>,
    /// Remaining criteria, most branching first
    pub criteria: Vec<DecisionCriterion<T>>,
}

impl<T> Default for DecisionTreeNode<T> {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            criteria: Vec::new(),
        }
    }
}

impl<T> DecisionTreeNode<T> {
    /// True when the node holds neither matches nor criteria
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.criteria.is_empty()
    }
}

/// A discriminator key and its branches
#[derive(Debug, Clone)]
pub struct DecisionCriterion<T> {
    pub key: String,
    /// Branches keyed by the lowercase criterion value
    pub branches: HashMap<String, DecisionTreeNode<T>>,
}

impl<T> DecisionCriterion<T> {
    /// Branch for `value` (case-insensitive); `""` selects the "absent" branch
    #[must_use]
    pub fn branch(&self, value: &str) -> Option<&DecisionTreeNode<T>> {
        self.branches.get(fold_case(value).as_ref())
    }
}


struct ItemDescriptor<T> {
    item: T,
    /// Criteria with lowercase keys and values
    criteria: Vec<(String, String)>,
    /// Original key spelling, parallel to `criteria`
    keys: Vec<String>,
}

/// Builds a [`DecisionTreeNode`] from a list of items
pub struct DecisionTreeBuilder;

impl DecisionTreeBuilder {
    pub fn build<T, C>(items: &[T], classifier: &C) -> DecisionTreeNode<T>
    where
        T: Clone,
        C: Classifier<T> + ?Sized,
    {
        let descriptors: Vec<ItemDescriptor<T>> = items
            .iter()
            .map(|item| {
                let raw = classifier.criteria(item);
                ItemDescriptor {
                    item: item.clone(),
                    criteria: raw.iter().map(|(k, v)| (fold_case(k).into_owned(), fold_case(v).into_owned())).collect(),
                    keys: raw.into_iter().map(|(k, _)| k).collect(),
                }
            })
            .collect();

        let all: Vec<usize> = (0..descriptors.len()).collect();
        generate_node(&descriptors, &all, &HashSet::new())
    }
}

/// Branches of one criterion in insertion order
struct PendingCriterion {
    key: String,
    folded_key: String,
    branches: Vec<(String, Vec<usize>)>,
}

fn generate_node<T: Clone>(
    descriptors: &[ItemDescriptor<T>],
    items: &[usize],
    current: &HashSet<String>,
) -> DecisionTreeNode<T> {
    let mut pending: Vec<PendingCriterion> = Vec::new();
    let mut matches = Vec::new();

    for &index in items {
        let descriptor = &descriptors[index];
        let mut unsatisfied = 0;

        for (position, (key, value)) in descriptor.criteria.iter().enumerate() {
            if current.contains(key) {
                continue;
            }
            unsatisfied += 1;

            let criterion = match pending.iter().position(|c| &c.folded_key == key) {
                Some(i) => &mut pending[i],
                None => {
                    pending.push(PendingCriterion {
                        key: descriptor.keys[position].clone(),
                        folded_key: key.clone(),
                        branches: Vec::new(),
                    });
                    let last = pending.len() - 1;
                    &mut pending[last]
                }
            };
            match criterion.branches.iter_mut().find(|(v, _)| v == value) {
                Some((_, branch)) => branch.push(index),
                None => criterion.branches.push((value.clone(), vec![index])),
            }
        }

        if unsatisfied == 0 {
            matches.push(descriptor.item.clone());
        }
    }

    // Most branching criterion first; ties keep insertion order.
    pending.sort_by(|a, b| b.branches.len().cmp(&a.branches.len()));

    let mut matched: HashSet<usize> = HashSet::new();
    let mut criteria = Vec::new();
    for criterion in pending {
        let mut branches = HashMap::new();
        for (value, branch_items) in criterion.branches {
            let mut has_new_items = false;
            for &item in &branch_items {
                has_new_items |= matched.insert(item);
            }
            if has_new_items {
                let mut child_criteria = current.clone();
                child_criteria.insert(criterion.folded_key.clone());
                branches.insert(
                    value,
                    generate_node(descriptors, &branch_items, &child_criteria),
                );
            }
        }
        if !branches.is_empty() {
            criteria.push(DecisionCriterion {
                key: criterion.key,
                branches,
            });
        }
    }

    DecisionTreeNode { matches, criteria }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        criteria: Vec<(&'static str, &'static str)>,
    }

    fn item(name: &'static str, criteria: &[(&'static str, &'static str)]) -> Item {
        Item {
            name,
            criteria: criteria.to_vec(),
        }
    }

    fn classify(item: &Item) -> Vec<(String, String)> {
        item.criteria
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_empty() {
        let tree = DecisionTreeBuilder::build::<Item, _>(&[], &classify);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_items_without_criteria_are_root_matches() {
        let items = vec![item("a", &[])];
        let tree = DecisionTreeBuilder::build(&items, &classify);
        assert_eq!(tree.matches, items);
        assert!(tree.criteria.is_empty());
    }

    #[test]
    fn test_single_criterion_branches() {
        let items = vec![
            item("home", &[("controller", "Home")]),
            item("store", &[("controller", "Store")]),
        ];
        let tree = DecisionTreeBuilder::build(&items, &classify);
        assert!(tree.matches.is_empty());
        assert_eq!(tree.criteria.len(), 1);
        let criterion = &tree.criteria[0];
        assert_eq!(criterion.key, "controller");
        assert_eq!(criterion.branch("HOME").unwrap().matches[0].name, "home");
        assert_eq!(criterion.branch("store").unwrap().matches[0].name, "store");
        assert!(criterion.branch("checkout").is_none());
    }

    #[test]
    fn test_most_branching_criterion_first() {
        let items = vec![
            item("a", &[("area", ""), ("controller", "Home")]),
            item("b", &[("area", ""), ("controller", "Store")]),
            item("c", &[("area", ""), ("controller", "Account")]),
        ];
        let tree = DecisionTreeBuilder::build(&items, &classify);
        assert_eq!(tree.criteria.len(), 1);
        assert_eq!(tree.criteria[0].key, "controller");
        let home = tree.criteria[0].branch("home").unwrap();
        assert!(home.matches.is_empty());
        assert_eq!(home.criteria[0].key, "area");
        assert_eq!(home.criteria[0].branch("").unwrap().matches[0].name, "a");
    }

    #[test]
    fn test_items_reachable_through_every_key() {
        let items = vec![
            item("x", &[("controller", "Home"), ("action", "Index")]),
            item("y", &[("controller", "Home"), ("action", "About")]),
            item("z", &[("controller", "Store"), ("action", "Index")]),
        ];
        let tree = DecisionTreeBuilder::build(&items, &classify);
        let index = tree
            .criteria
            .iter()
            .find(|c| c.key == "action")
            .and_then(|c| c.branch("index"));
        let controller = tree.criteria.iter().find(|c| c.key == "controller").unwrap();
        let store = controller.branch("store").unwrap();
        let z = store.criteria[0].branch("index").unwrap();
        assert_eq!(z.matches[0].name, "z");
        // Every item was already routed through `controller`, so no `action` branches
        // are generated at the root.
        assert!(index.is_none());
    }
}

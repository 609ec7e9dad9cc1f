//! # Route Values
//!
//! Route values are the small key/value maps that flow through every part of the
//! engine: values captured from a request path, default values declared by a
//! template, explicit and ambient values used for link generation.
//!
//! Keys compare case-insensitively and keep their insertion order, which makes
//! the generated query strings and debug output deterministic.
//!
//! ## Checkpoints
//!
//! Inbound matching writes captured values into caller-owned storage before the
//! constraints of a candidate are evaluated. [`RouteValues::scope`] takes a
//! checkpoint and hands out a [`ValuesScope`] guard; dropping the guard without
//! calling [`ValuesScope::commit`] restores the checkpoint, so a rejected
//! candidate leaves no trace.
//!
//! ```rust
//! use treerouter::values::RouteValues;
//!
//! let mut values = RouteValues::new();
//! values.insert("area", "admin");
//! {
//!     let mut scope = values.scope();
//!     scope.insert("id", "42");
//!     // dropped without commit: "id" is rolled back
//! }
//! assert_eq!(values.get("id"), None);
//! assert_eq!(values.get("AREA"), Some("admin"));
//! ```

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Maximum number of route values before heap allocation.
/// Most templates carry ≤ 8 parameters and defaults.
pub const MAX_INLINE_VALUES: usize = 8;

type ValueVec = SmallVec<[(String, String); MAX_INLINE_VALUES]>;

/// Ordered, case-insensitive map of route value names to values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    entries: ValueVec,
}

impl RouteValues {
    /// Create an empty value map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values in the map
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| eq_ignore_case(k, key))
    }

    /// Look up a value by key (case-insensitive)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace a value.
    ///
    /// Replacing keeps the original spelling and position of the key and
    /// returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert only when the key is not present yet. Returns `true` if inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.entries.push((key.to_string(), value.to_string()));
        true
    }

    /// Remove a value, returning it if it was present
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Take a checkpoint and return a guard that restores it on drop
    /// unless [`ValuesScope::commit`] is called.
    pub fn scope(&mut self) -> ValuesScope<'_> {
        let checkpoint = self.entries.clone();
        ValuesScope {
            values: self,
            checkpoint: Some(checkpoint),
        }
    }
}

impl fmt::Debug for RouteValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = RouteValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RouteValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Checkpoint guard over a [`RouteValues`] map.
///
/// Dereferences to the underlying map. Writes made through the guard are kept
/// only if [`commit`](ValuesScope::commit) is called; otherwise the map is
/// restored to its state at the time the scope was opened.
pub struct ValuesScope<'a> {
    values: &'a mut RouteValues,
    checkpoint: Option<ValueVec>,
}

impl ValuesScope<'_> {
    /// Keep every write made through this scope
    pub fn commit(mut self) {
        self.checkpoint = None;
    }

    /// Roll back to the checkpoint now, keeping the scope open
    pub fn restore(&mut self) {
        if let Some(checkpoint) = &self.checkpoint {
            self.values.entries.clone_from(checkpoint);
        }
    }
}

impl Deref for ValuesScope<'_> {
    type Target = RouteValues;

    fn deref(&self) -> &RouteValues {
        &*self.values
    }
}

impl DerefMut for ValuesScope<'_> {
    fn deref_mut(&mut self) -> &mut RouteValues {
        &mut *self.values
    }
}

impl Drop for ValuesScope<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.values.entries = checkpoint;
        }
    }
}

/// True when a route value carries text
#[inline]
#[must_use]
pub fn is_non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Case-insensitive comparison of route text.
///
/// ASCII input takes the byte-wise path; anything else is compared on the
/// lowercase mapping of each character, so `Ä` equals `ä`.
#[must_use]
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
    }
}

/// Lowercase form of `text` used as a lookup key.
///
/// Two strings fold to the same key exactly when [`eq_ignore_case`] holds.
/// Borrows when `text` is already folded.
#[must_use]
pub fn fold_case(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(text.to_ascii_lowercase())
        } else {
            Cow::Borrowed(text)
        }
    } else {
        Cow::Owned(text.chars().flat_map(char::to_lowercase).collect())
    }
}

/// Case-insensitive equality used for route value comparisons
#[inline]
#[must_use]
pub fn route_parts_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => eq_ignore_case(a, b),
        (None, None) => true,
        (Some(v), None) | (None, Some(v)) => v.is_empty(),
    }
}

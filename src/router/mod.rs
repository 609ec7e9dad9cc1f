//! # Router Module
//!
//! Tree-indexed inbound matching and decision-tree driven link generation.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Collecting inbound and outbound entries in a [`TreeRouteBuilder`]
//! - Indexing inbound templates in one matching trie per order bucket
//! - Selecting the entry for a request path and extracting its route values
//! - Selecting outbound candidates from required link values and binding a path
//!
//! ## Architecture
//!
//! 1. **Build**: templates are parsed, constraints resolved, and entries frozen
//!    into a [`TreeRouter`]. Inbound entries are indexed segment by segment in a
//!    [`UrlMatchingTree`]; outbound entries are indexed by their required values
//!    in a [`LinkGenerationDecisionTree`].
//!
//! 2. **Match**: a [`TreeEnumerator`] walks the trie of each order bucket,
//!    literal children first. Candidates at a node are tried by ascending
//!    precedence; the first one whose template and constraints accept the path
//!    wins.
//!
//! 3. **Generate**: the decision tree yields ranked candidates for a value set;
//!    each is bound in turn until one produces a path.
//!
//! ## Example
//!
//! ```rust
//! use treerouter::router::{RequiredValue, TreeRouteBuilder, VirtualPathContext};
//! use treerouter::values::RouteValues;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeRouteBuilder::new();
//! builder.map_inbound("blog", "blog/{year:int}/{slug}", Some("post"), 0)?;
//! builder.map_outbound(
//!     "blog",
//!     "blog/{year:int}/{slug}",
//!     [("controller", RequiredValue::from("Blog"))],
//!     Some("post"),
//!     0,
//! )?;
//! let router = builder.build()?;
//!
//! let matched = router.match_path("/blog/2024/hello")?.ok_or("no match")?;
//! assert_eq!(matched.get("year"), Some("2024"));
//!
//! let values = RouteValues::from([("controller", "Blog"), ("year", "2025"), ("slug", "x")]);
//! let link = router
//!     .get_virtual_path(&VirtualPathContext::new(values))?
//!     .ok_or("no link")?;
//! assert_eq!(link.path, "/blog/2025/x");
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! Matching cost depends on the depth of the request path and the number of
//! templates sharing a trie slot, not on the total number of routes. Matches
//! slower than [`RouterConfig::slow_match_threshold`](crate::runtime_config::RouterConfig)
//! are logged at `warn`.

mod builder;
mod core;
mod entry;
mod enumerator;
mod link_tree;
mod node;
mod shared;

pub use builder::{BuildError, TreeRouteBuilder};
pub use core::{RouteMatch, TreeRouter, VirtualPathContext, VirtualPathData};
pub use entry::{
    InboundMatch, InboundRouteEntry, OutboundMatch, OutboundRouteEntry, RequiredValue,
};
pub use enumerator::TreeEnumerator;
pub use link_tree::{LinkGenerationDecisionTree, OutboundMatchResult};
pub use node::{UrlMatchingNode, UrlMatchingTree};
pub use shared::SharedRouter;

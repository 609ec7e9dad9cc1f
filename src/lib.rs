//! # treerouter
//!
//! **treerouter** is a tree-indexed URL routing engine. It maps request paths to
//! handlers through precedence-ordered matching tries, and generates links back
//! from route values through a decision tree over required link values.
//!
//! ## Overview
//!
//! Routes are described by templates such as `products/{id:int}`,
//! `blog/{year}/{slug?}` or `files/{*path}`. A [`router::TreeRouteBuilder`]
//! collects two kinds of entries:
//!
//! - **Inbound** entries select a handler for a request path and capture route
//!   values from it.
//! - **Outbound** entries produce a path from route values. Each carries
//!   required link values (`controller=Products`, `action=*`) that decide which
//!   entries are candidates for a given value set.
//!
//! Building freezes the entries into an immutable [`router::TreeRouter`].
//!
//! ## Architecture
//!
//! - **[`values`]** - Ordered, case-insensitive route value maps with checkpoint/restore
//! - **[`template`]** - Template parsing, precedence scoring, matching and binding
//! - **[`constraints`]** - Inline constraints (`int`, `range(1,9)`, `regex(...)`) and their resolver
//! - **[`decision_tree`]** - Generic decision tree over key/value criteria
//! - **[`router`]** - Matching tries, traversal, link decision tree and the router facade
//! - **[`table`]** - Route table files (YAML, TOML, JSON)
//! - **[`hot_reload`]** - Rebuild the router when a route table file changes
//! - **[`runtime_config`]** - Environment-driven router settings
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`cli`]** - The `treerouter` binary
//!
//! ### Request Matching Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Router as TreeRouter
//!     participant Tree as UrlMatchingTree (per order)
//!     participant Enum as TreeEnumerator
//!     participant Matcher as TemplateMatcher
//!     participant Constraints as RouteConstraints
//!
//!     Caller->>Router: route("/products/7", &mut values)
//!     loop each order bucket, ascending
//!         Router->>Enum: walk(tree.root, tokens)
//!         Enum-->>Router: candidate nodes (literal first)
//!         loop candidates by precedence
//!             Router->>Matcher: capture(path)
//!             Router->>Matcher: apply(captures, scope)
//!             Router->>Constraints: matches(scope, IncomingRequest)
//!         end
//!     end
//!     Router-->>Caller: Some(entry) + captured values
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use treerouter::router::TreeRouteBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = TreeRouteBuilder::new();
//! builder.map_inbound("file", "files/{*path}", None, 0)?;
//! builder.map_inbound("home", "{controller=Home}/{action=Index}/{id?}", None, 1)?;
//! let router = builder.build()?;
//!
//! let matched = router.match_path("/files/a/b.txt")?.ok_or("no match")?;
//! assert_eq!(matched.handler(), &"file");
//! assert_eq!(matched.get("path"), Some("a/b.txt"));
//!
//! let matched = router.match_path("/")?.ok_or("no match")?;
//! assert_eq!(matched.get("action"), Some("Index"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! A [`router::TreeRouter`] is immutable and `Send + Sync` when its handler type
//! is. To replace the table while serving, hold it in a [`router::SharedRouter`]:
//! readers load the current snapshot without locking and a rebuild swaps it
//! atomically.

pub mod cli;
pub mod constraints;
pub mod decision_tree;
pub mod hot_reload;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod table;
pub mod template;
pub mod values;

pub use router::{BuildError, TreeRouteBuilder, TreeRouter};
pub use values::RouteValues;

//! # CLI Module
//!
//! Command-line access to a route table file.
//!
//! ## Commands
//!
//! ### `match`
//!
//! Match a request path:
//!
//! ```bash
//! treerouter match --routes routes.yaml /products/7
//! ```
//!
//! ### `link`
//!
//! Generate a link from explicit and ambient values:
//!
//! ```bash
//! treerouter link --routes routes.yaml --value controller=Products --value id=7
//! treerouter link --routes routes.yaml --name product --value id=7
//! ```
//!
//! ### `routes` / `check`
//!
//! List the table, or only build it and report errors:
//!
//! ```bash
//! treerouter routes --routes routes.yaml
//! treerouter check --routes routes.yaml
//! ```
//!
//! ### `watch`
//!
//! Read request paths from stdin and match each against the current table,
//! rebuilding the router whenever the file changes:
//!
//! ```bash
//! treerouter watch --routes routes.yaml
//! ```
//!
//! ## Logging
//!
//! Logs go to stderr and are configured with `TREEROUTER_LOG_LEVEL` and
//! `TREEROUTER_LOG_FORMAT`; see [`crate::logging`].

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};

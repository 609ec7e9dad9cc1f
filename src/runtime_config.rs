//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for router runtime behavior.
//!
//! ## Environment Variables
//!
//! ### `TREEROUTER_SLOW_MATCH_US`
//!
//! Inbound matches that take longer than this many microseconds are logged at
//! `warn` with the path, template and duration. Accepts values in:
//! - Decimal: `1000`
//! - Hexadecimal: `0x3e8`
//!
//! Default: `1000` (1 ms)
//!
//! ## Usage
//!
//! ```rust
//! use treerouter::router::TreeRouteBuilder;
//! use treerouter::runtime_config::RouterConfig;
//!
//! let builder: TreeRouteBuilder<&str> =
//!     TreeRouteBuilder::new().with_config(RouterConfig::from_env());
//! assert!(builder.inbound_entries().is_empty());
//! ```

use std::env;
use std::time::Duration;

/// Name of the slow-match threshold variable
pub const SLOW_MATCH_ENV: &str = "TREEROUTER_SLOW_MATCH_US";

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Router configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Matches slower than this are logged at `warn` (default: 1 ms)
    pub slow_match_threshold: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let micros = env::var(SLOW_MATCH_ENV)
            .ok()
            .and_then(|val| parse_u64(&val))
            .unwrap_or(DEFAULT_SLOW_MATCH_US);
        RouterConfig {
            slow_match_threshold: Duration::from_micros(micros),
        }
    }
}

fn parse_u64(val: &str) -> Option<u64> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

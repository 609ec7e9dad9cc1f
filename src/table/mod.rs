//! # Route Table Module
//!
//! Route tables describe a set of entries in a file so a router can be built
//! (and rebuilt) without code. Handlers are plain strings.
//!
//! ## Format
//!
//! ```yaml
//! routes:
//!   - handler: products_details
//!     template: "products/{id:int}"
//!     name: product
//!     order: 0
//!     direction: both        # inbound | outbound | both
//!     required_values:
//!       controller: Products
//!       action: "*"          # any value
//! ```
//!
//! The file format follows the extension: `.yaml`/`.yml` for YAML, `.toml` for
//! TOML and anything else for JSON.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::router::{RequiredValue, TreeRouteBuilder, TreeRouter};
use crate::runtime_config::RouterConfig;

/// Which side of the router a definition feeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Inbound,
    Outbound,
    #[default]
    Both,
}

impl EntryDirection {
    #[must_use]
    pub fn is_inbound(self) -> bool {
        matches!(self, EntryDirection::Inbound | EntryDirection::Both)
    }

    #[must_use]
    pub fn is_outbound(self) -> bool {
        matches!(self, EntryDirection::Outbound | EntryDirection::Both)
    }
}

/// One route in a table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    pub handler: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub direction: EntryDirection,
    /// Values a link must carry to select this route; `"*"` accepts any value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_values: BTreeMap<String, String>,
}

/// A parsed route table file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<RouteDefinition>,
}

/// Serialization format of a route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Toml,
    Json,
}

impl TableFormat {
    /// Pick the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => TableFormat::Yaml,
            Some("toml") => TableFormat::Toml,
            _ => TableFormat::Json,
        }
    }
}

impl RouteTable {
    /// Parse table text
    pub fn parse(content: &str, format: TableFormat) -> Result<Self> {
        let table = match format {
            TableFormat::Yaml => serde_yaml::from_str(content)?,
            TableFormat::Toml => toml::from_str(content)?,
            TableFormat::Json => serde_json::from_str(content)?,
        };
        Ok(table)
    }

    /// Fill a builder with every definition.
    ///
    /// Template and constraint errors name the offending route.
    pub fn to_builder(&self, config: RouterConfig) -> Result<TreeRouteBuilder<String>> {
        let mut builder = TreeRouteBuilder::new().with_config(config);
        for (index, route) in self.routes.iter().enumerate() {
            if route.direction.is_inbound() {
                builder
                    .map_inbound(
                        route.handler.clone(),
                        &route.template,
                        route.name.as_deref(),
                        route.order,
                    )
                    .with_context(|| {
                        format!("route #{index} ({}): invalid inbound entry", route.handler)
                    })?;
            }
            if route.direction.is_outbound() {
                let required = route
                    .required_values
                    .iter()
                    .map(|(k, v)| (k.clone(), RequiredValue::from(v.as_str())));
                builder
                    .map_outbound(
                        route.handler.clone(),
                        &route.template,
                        required,
                        route.name.as_deref(),
                        route.order,
                    )
                    .with_context(|| {
                        format!("route #{index} ({}): invalid outbound entry", route.handler)
                    })?;
            }
        }
        Ok(builder)
    }

    /// Build a router in one step
    pub fn build_router(&self, config: RouterConfig) -> Result<TreeRouter<String>> {
        let router = self
            .to_builder(config)?
            .build()
            .context("failed to build route table")?;
        Ok(router)
    }
}

/// Read and parse a route table file
pub fn load_route_table<P: AsRef<Path>>(path: P) -> Result<RouteTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route table {}", path.display()))?;
    let table = RouteTable::parse(&content, TableFormat::from_path(path))
        .with_context(|| format!("failed to parse route table {}", path.display()))?;
    info!(
        path = %path.display(),
        route_count = table.routes.len(),
        "Route table loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
routes:
  - handler: details
    template: "products/{id:int}"
    name: product
    required_values:
      controller: Products
      action: "*"
  - handler: home
    template: ""
    direction: inbound
    order: 1
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("r.yaml")), TableFormat::Yaml);
        assert_eq!(TableFormat::from_path(Path::new("r.YML")), TableFormat::Yaml);
        assert_eq!(TableFormat::from_path(Path::new("r.toml")), TableFormat::Toml);
        assert_eq!(TableFormat::from_path(Path::new("r.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(Path::new("routes")), TableFormat::Json);
    }

    #[test]
    fn test_parse_yaml_defaults() {
        let table = RouteTable::parse(YAML, TableFormat::Yaml).unwrap();
        assert_eq!(table.routes.len(), 2);
        assert_eq!(table.routes[0].direction, EntryDirection::Both);
        assert_eq!(table.routes[0].order, 0);
        assert_eq!(table.routes[1].direction, EntryDirection::Inbound);
        assert!(table.routes[1].required_values.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
[[routes]]
handler = "list"
template = "items"
direction = "outbound"

[routes.required_values]
controller = "Items"
"#;
        let table = RouteTable::parse(text, TableFormat::Toml).unwrap();
        assert_eq!(table.routes[0].direction, EntryDirection::Outbound);
        assert_eq!(
            table.routes[0].required_values.get("controller").map(String::as_str),
            Some("Items")
        );
    }

    #[test]
    fn test_to_builder_respects_direction() {
        let table = RouteTable::parse(YAML, TableFormat::Yaml).unwrap();
        let builder = table.to_builder(RouterConfig::default()).unwrap();
        assert_eq!(builder.inbound_entries().len(), 2);
        assert_eq!(builder.outbound_entries().len(), 1);
        assert_eq!(
            builder.outbound_entries()[0].required_value("action"),
            Some(&RequiredValue::Any)
        );
    }

    #[test]
    fn test_bad_template_names_route() {
        let table = RouteTable {
            routes: vec![RouteDefinition {
                handler: "broken".to_string(),
                template: "a/{id".to_string(),
                name: None,
                order: 0,
                direction: EntryDirection::Inbound,
                required_values: BTreeMap::new(),
            }],
        };
        let err = table.to_builder(RouterConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("route #0 (broken)"));
    }
}

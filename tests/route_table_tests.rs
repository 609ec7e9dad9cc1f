use treerouter::router::VirtualPathContext;
use treerouter::runtime_config::RouterConfig;
use treerouter::table::{load_route_table, EntryDirection, RouteTable};
use treerouter::values::RouteValues;

mod common;
use common::temp_files;

const YAML_TABLE: &str = r#"
routes:
  - handler: product_details
    template: "products/{id:int}"
    name: product
    required_values:
      controller: Products
      action: Details
  - handler: product_list
    template: "products"
    required_values:
      controller: Products
      action: List
  - handler: conventional
    template: "{controller=Home}/{action=Index}/{id?}"
    order: 10
    required_values:
      controller: "*"
      action: "*"
"#;

const JSON_TABLE: &str = r#"{
  "routes": [
    { "handler": "health", "template": "health", "direction": "inbound" },
    {
      "handler": "docs",
      "template": "docs/{*page}",
      "name": "docs",
      "direction": "outbound",
      "required_values": { "area": "Docs" }
    }
  ]
}"#;

const TOML_TABLE: &str = r#"
[[routes]]
handler = "blog_post"
template = "blog/{year:int}/{slug}"
name = "post"

[routes.required_values]
controller = "Blog"
"#;

#[test]
fn test_load_yaml_table_and_route() {
    let (_dir, path) = temp_files::create_temp_table(YAML_TABLE, "yaml");
    let table = load_route_table(&path).unwrap();
    assert_eq!(table.routes.len(), 3);
    assert_eq!(table.routes[2].order, 10);

    let router = table.build_router(RouterConfig::default()).unwrap();
    assert_eq!(router.trees().len(), 2);

    let matched = router.match_path("/products/42").unwrap().unwrap();
    assert_eq!(matched.handler(), "product_details");
    assert_eq!(matched.get("id"), Some("42"));

    let matched = router.match_path("/products").unwrap().unwrap();
    assert_eq!(matched.handler(), "product_list");

    let matched = router.match_path("/").unwrap().unwrap();
    assert_eq!(matched.handler(), "conventional");
    assert_eq!(matched.get("controller"), Some("Home"));
}

#[test]
fn test_yaml_table_generates_links() {
    let (_dir, path) = temp_files::create_temp_table(YAML_TABLE, "yml");
    let router = load_route_table(&path)
        .unwrap()
        .build_router(RouterConfig::default())
        .unwrap();

    let values = RouteValues::from([("controller", "Products"), ("action", "Details"), ("id", "3")]);
    let link = router
        .get_virtual_path(&VirtualPathContext::new(values))
        .unwrap()
        .unwrap();
    assert_eq!(link.path, "/products/3");

    let values = RouteValues::from([("controller", "Orders"), ("action", "Index")]);
    let link = router
        .get_virtual_path(&VirtualPathContext::new(values))
        .unwrap()
        .unwrap();
    assert_eq!(link.path, "/Orders");
    assert_eq!(link.entry().handler, "conventional");
}

#[test]
fn test_load_json_table_respects_direction() {
    let (_dir, path) = temp_files::create_temp_table(JSON_TABLE, "json");
    let table = load_route_table(&path).unwrap();
    assert_eq!(table.routes[0].direction, EntryDirection::Inbound);
    assert_eq!(table.routes[1].direction, EntryDirection::Outbound);

    let router = table.build_router(RouterConfig::default()).unwrap();
    assert_eq!(router.inbound_entries().count(), 1);
    assert_eq!(router.outbound_entries().count(), 1);
    assert!(router.match_path("/docs/intro").unwrap().is_none());

    let context = VirtualPathContext::new(RouteValues::from([("page", "guide/intro")]))
        .with_route_name("docs");
    let link = router.get_virtual_path(&context).unwrap().unwrap();
    assert_eq!(link.path, "/docs/guide/intro");
}

#[test]
fn test_load_toml_table() {
    let (_dir, path) = temp_files::create_temp_table(TOML_TABLE, "toml");
    let router = load_route_table(&path)
        .unwrap()
        .build_router(RouterConfig::default())
        .unwrap();
    let matched = router.match_path("/blog/2024/rust").unwrap().unwrap();
    assert_eq!(matched.route_name(), Some("post"));
    assert!(router.named_route("POST").is_some());
}

#[test]
fn test_invalid_table_reports_route() {
    let table = RouteTable::parse(
        r#"{"routes": [{"handler": "bad", "template": "a/{id:unknown}"}]}"#,
        treerouter::table::TableFormat::Json,
    )
    .unwrap();
    let err = table.build_router(RouterConfig::default()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad"), "{message}");
    assert!(message.contains("unknown"), "{message}");
}

#[test]
fn test_duplicate_names_in_table_fail() {
    let table = RouteTable::parse(
        r#"
routes:
  - { handler: a, template: "a", name: same }
  - { handler: b, template: "b", name: same }
"#,
        treerouter::table::TableFormat::Yaml,
    )
    .unwrap();
    let err = table.build_router(RouterConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("same"));
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_route_table(dir.path().join("absent.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read route table"));
}

#[test]
fn test_malformed_file_is_error() {
    let (_dir, path) = temp_files::create_temp_table("routes: [ {", "yaml");
    let err = load_route_table(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse route table"));
}

use std::time::Duration;

use treerouter::hot_reload::{reload_route_table, watch_route_table};
use treerouter::router::SharedRouter;
use treerouter::runtime_config::RouterConfig;
use treerouter::table::load_route_table;

mod common;
use common::temp_files;

const TABLE_V1: &str = r#"
routes:
  - handler: foo_one
    template: foo
"#;

const TABLE_V2: &str = r#"
routes:
  - handler: foo_two
    template: foo
"#;

fn handler_for(shared: &SharedRouter<String>, path: &str) -> Option<String> {
    shared
        .load()
        .match_path(path)
        .unwrap()
        .map(|m| m.handler().clone())
}

#[test]
fn test_reload_route_table_swaps_router() {
    let (_dir, path) = temp_files::create_temp_yaml(TABLE_V1);
    let config = RouterConfig::default();
    let shared = SharedRouter::new(load_route_table(&path).unwrap().build_router(config).unwrap());
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_one"));

    std::fs::write(&path, TABLE_V2).unwrap();
    reload_route_table(&path, &shared, config).unwrap();
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_two"));
}

#[test]
fn test_reload_keeps_previous_router_on_error() {
    let (_dir, path) = temp_files::create_temp_yaml(TABLE_V1);
    let config = RouterConfig::default();
    let shared = SharedRouter::new(load_route_table(&path).unwrap().build_router(config).unwrap());

    std::fs::write(&path, "routes:\n  - handler: x\n    template: \"a/{\"\n").unwrap();
    assert!(reload_route_table(&path, &shared, config).is_err());
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_one"));
}

#[test]
fn test_watch_route_table_reload() {
    let (_dir, path) = temp_files::create_temp_yaml(TABLE_V1);
    let config = RouterConfig::default();
    let shared = SharedRouter::new(load_route_table(&path).unwrap().build_router(config).unwrap());

    let watcher = watch_route_table(&path, shared.clone(), config).expect("watch_route_table");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(&path, TABLE_V2).unwrap();

    for _ in 0..40 {
        if handler_for(&shared, "/foo").as_deref() == Some("foo_two") {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert_eq!(handler_for(&shared, "/foo").as_deref(), Some("foo_two"));

    drop(watcher);
}

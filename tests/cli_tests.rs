use std::process::Command;

mod common;
use common::temp_files;

const TABLE: &str = r#"
routes:
  - handler: product_details
    template: "products/{id:int}"
    name: product
    required_values:
      controller: Products
  - handler: catch_all
    template: "{*path}"
    order: 1
    direction: inbound
"#;

fn run(args: &[&str]) -> (bool, String, String) {
    let exe = env!("CARGO_BIN_EXE_treerouter");
    let output = Command::new(exe)
        .env("TREEROUTER_LOG_LEVEL", "error")
        .args(args)
        .output()
        .expect("run cli");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_cli_match() {
    let (_dir, path) = temp_files::create_temp_table(TABLE, "yaml");
    let table = path.to_str().unwrap();

    let (ok, stdout, stderr) = run(&["match", "--routes", table, "/products/9"]);
    assert!(ok, "{stderr}");
    assert!(stdout.contains("/products/9 -> product_details"), "{stdout}");
    assert!(stdout.contains("id=9"), "{stdout}");

    let (ok, stdout, _) = run(&["match", "--routes", table, "/anything/else"]);
    assert!(ok);
    assert!(stdout.contains("-> catch_all"), "{stdout}");
}

#[test]
fn test_cli_link() {
    let (_dir, path) = temp_files::create_temp_table(TABLE, "yaml");
    let table = path.to_str().unwrap();

    let (ok, stdout, stderr) = run(&[
        "link",
        "--routes",
        table,
        "--value",
        "controller=Products",
        "--value",
        "id=5",
    ]);
    assert!(ok, "{stderr}");
    assert!(stdout.starts_with("/products/5 "), "{stdout}");

    let (ok, stdout, _) = run(&["link", "--routes", table, "--name", "product", "--value", "id=x"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "no link");
}

#[test]
fn test_cli_routes_and_check() {
    let (_dir, path) = temp_files::create_temp_table(TABLE, "yaml");
    let table = path.to_str().unwrap();

    let (ok, stdout, _) = run(&["routes", "--routes", table]);
    assert!(ok);
    assert!(stdout.contains("products/{id:int}"));
    assert!(stdout.contains("controller=Products"));

    let (ok, stdout, _) = run(&["check", "--routes", table]);
    assert!(ok);
    assert_eq!(stdout.trim(), "ok: 2 inbound, 1 outbound, 2 order buckets");
}

#[test]
fn test_cli_check_fails_on_bad_table() {
    let (_dir, path) = temp_files::create_temp_table(
        "routes:\n  - { handler: a, template: \"a/{id:nope}\" }\n",
        "yaml",
    );
    let (ok, _, stderr) = run(&["check", "--routes", path.to_str().unwrap()]);
    assert!(!ok);
    assert!(stderr.contains("nope"), "{stderr}");
}

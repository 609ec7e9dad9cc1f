use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use treerouter::router::{TreeRouter, VirtualPathContext};
use treerouter::runtime_config::RouterConfig;
use treerouter::table::{RouteTable, TableFormat};
use treerouter::values::RouteValues;

fn example_table() -> &'static str {
    r#"
routes:
  - handler: root_handler
    template: ""
    required_values: { controller: Home, action: Index }
  - handler: get_animals
    template: "zoo/animals"
    required_values: { controller: Animals, action: List }
  - handler: get_animal
    template: "zoo/animals/{id:int}"
    name: animal
    required_values: { controller: Animals, action: Details }
  - handler: animal_toy
    template: "zoo/animals/{id:int}/toys/{toy_id}"
    required_values: { controller: Toys, action: Details }
  - handler: habitat_section
    template: "zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}"
    required_values: { controller: Habitats, action: Section }
  - handler: item_batch
    template: "inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}"
    required_values: { controller: Inventory, action: Batch }
  - handler: complex_many_params
    template: "complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}"
    required_values: { controller: Complex, action: Many }
  - handler: download
    template: "files/{name}.{ext?}"
    required_values: { controller: Files, action: Download }
  - handler: health_check
    template: "zoo/health"
    direction: inbound
  - handler: conventional
    template: "{controller}/{action=Index}/{id?}"
    order: 100
    required_values: { controller: "*", action: "*" }
"#
}

fn build_router() -> TreeRouter<String> {
    RouteTable::parse(example_table(), TableFormat::Yaml)
        .expect("failed to parse route table")
        .build_router(RouterConfig::default())
        .expect("failed to build router")
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("route_match", |b| {
        let test_paths = [
            "/zoo/animals/123",
            "/zoo/animals/123/toys/456",
            "/zoo/cats/animals/123/habitats/88/sections/5",
            "/inventory/1/feeds/2/items/3/batches/4",
            "/complex/1/2/3/4/5/6/7/8/9",
            "/files/report.pdf",
            "/Orders/Recent",
        ];
        b.iter(|| {
            for path in test_paths.iter() {
                let res = router.match_path(path);
                black_box(&res);
            }
        })
    });
}

fn bench_link_generation(c: &mut Criterion) {
    let router = build_router();
    let explicit = [
        RouteValues::from([("controller", "Animals"), ("action", "Details"), ("id", "7")]),
        RouteValues::from([("controller", "Files"), ("action", "Download"), ("name", "a"), ("ext", "zip")]),
        RouteValues::from([("controller", "Orders"), ("action", "Recent")]),
    ];
    let contexts: Vec<VirtualPathContext> = explicit
        .iter()
        .cloned()
        .map(VirtualPathContext::new)
        .collect();
    let named = VirtualPathContext::new(RouteValues::from([("id", "42")])).with_route_name("animal");

    c.bench_function("link_generation", |b| {
        b.iter(|| {
            for context in &contexts {
                black_box(router.get_virtual_path(context).ok());
            }
            black_box(router.get_virtual_path(&named).ok());
        })
    });
}

criterion_group!(benches, bench_route_throughput, bench_link_generation);
criterion_main!(benches);

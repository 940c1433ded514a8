use criterion::{criterion_group, criterion_main, Criterion};
use routeflow::prelude::*;
use routeflow::router::{Matcher, RouteCollection};
use std::hint::black_box;
use std::sync::Arc;

const TEMPLATES: &[&str] = &[
    "/",
    "/zoo/animals",
    "/zoo/health",
    "/zoo/animals/{id:int}",
    "/zoo/animals/{id:int}/toys/{toy_id}",
    "/zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}",
    "/inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}",
    "/complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}",
    "/files/{path*}",
    "/docs[/{lang=en}]",
];

fn collection() -> RouteCollection {
    let mut collection = RouteCollection::new();
    for (i, template) in TEMPLATES.iter().enumerate() {
        let route = RouteBuilder::new(*template, DispatchTarget::function(format!("handler_{i}")))
            .build()
            .expect("valid template");
        collection.add(route).expect("unique route");
    }
    collection
}

fn bench_exact(c: &mut Criterion) {
    let matcher = Matcher::new(Arc::new(collection()));
    c.bench_function("match_exact", |b| {
        b.iter(|| {
            for path in ["/", "/zoo/animals", "/zoo/health"] {
                black_box(matcher.match_route(black_box(path)).ok());
            }
        })
    });
}

fn bench_dynamic(c: &mut Criterion) {
    let matcher = Matcher::new(Arc::new(collection()));
    c.bench_function("match_dynamic", |b| {
        let paths = [
            "/zoo/animals/123",
            "/zoo/animals/123/toys/456",
            "/zoo/cats/animals/123/habitats/88/sections/5",
            "/inventory/1/feeds/2/items/3/batches/4",
            "/complex/1/2/3/4/5/6/7/8/9",
            "/files/a/b/c.txt",
            "/docs",
        ];
        b.iter(|| {
            for path in paths {
                black_box(matcher.match_route(black_box(path)).ok());
            }
        })
    });
}

fn bench_miss(c: &mut Criterion) {
    let matcher = Matcher::new(Arc::new(collection()));
    c.bench_function("match_miss", |b| {
        b.iter(|| black_box(matcher.match_route(black_box("/nowhere/at/all")).ok()))
    });
}

fn bench_router(c: &mut Criterion) {
    let mut targets = TargetRegistry::new();
    targets.function("show", |args| Ok(Reply::json(serde_json::json!(args.int("id")?))));
    let router = Router::<Http>::builder()
        .route(
            RouteBuilder::new("/zoo/animals/{id:int}", DispatchTarget::function("show"))
                .build()
                .expect("valid template"),
        )
        .targets(targets)
        .build()
        .expect("router builds");
    c.bench_function("router_handle", |b| {
        b.iter(|| black_box(router.handle(HttpRequest::get("/zoo/animals/42"))))
    });
}

criterion_group!(benches, bench_exact, bench_dynamic, bench_miss, bench_router);
criterion_main!(benches);

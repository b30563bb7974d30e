//! 데이터 트리 벤치마크
//!
//! JSON 변환, 경로 조회, 복제 성능을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Value};
use telestream_core::{DataContext, Node};

fn create_system_poller_payload(virtual_servers: usize) -> Value {
    let mut servers = serde_json::Map::new();
    for i in 0..virtual_servers {
        servers.insert(
            format!("/Tenant{}/App{}/vs{i}", i % 8, i % 4),
            json!({
                "availabilityState": "available",
                "enabledState": "enabled",
                "clientside.curConns": i,
                "destination": format!("10.0.0.{}:443", i % 255),
                "pool": format!("/Tenant{}/App{}/pool{i}", i % 8, i % 4),
            }),
        );
    }
    json!({
        "system": {
            "hostname": "bigip1.example.com",
            "version": "17.1.0",
            "cpu": 12,
            "diskStorage": {"/": {"1024-blocks": "428150", "Capacity": "55%"}},
        },
        "virtualServers": servers,
        "telemetryEventCategory": "systemInfo",
    })
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_conversion");
    group.throughput(Throughput::Elements(1));

    let payload = create_system_poller_payload(100);
    let node = Node::from(payload.clone());

    group.bench_function("value_to_node", |b| {
        b.iter(|| Node::from(black_box(payload.clone())));
    });

    group.bench_function("node_to_value", |b| {
        b.iter(|| black_box(&node).to_value());
    });

    group.bench_function("node_to_json_string", |b| {
        b.iter(|| serde_json::to_string(black_box(&node)));
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_lookup");
    group.throughput(Throughput::Elements(1));

    let node = Node::from(create_system_poller_payload(1000));
    let path = vec![
        "virtualServers".to_owned(),
        "/Tenant3/App3/vs499".to_owned(),
        "destination".to_owned(),
    ];

    group.bench_function("pointer_hit", |b| {
        b.iter(|| black_box(&node).pointer(black_box(&path)));
    });

    let missing = vec!["virtualServers".to_owned(), "/Missing/vs".to_owned()];
    group.bench_function("pointer_miss", |b| {
        b.iter(|| black_box(&node).pointer(black_box(&missing)));
    });

    group.bench_function("keys", |b| {
        let servers = node.get("virtualServers");
        b.iter(|| servers.map(|s| black_box(s).keys()));
    });

    group.finish();
}

fn bench_cloning(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_cloning");
    group.throughput(Throughput::Elements(1));

    for size in [10usize, 100, 1000] {
        let ctx = DataContext::new(create_system_poller_payload(size));
        group.bench_function(format!("context_clone_{size}"), |b| {
            b.iter(|| black_box(&ctx).clone());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_conversion, bench_lookup, bench_cloning);
criterion_main!(benches);

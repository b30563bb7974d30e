//! 액션 엔진 벤치마크
//!
//! 시스템 폴러 규모의 페이로드에 대한 액션 실행 비용을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use telestream_core::DataContext;
use telestream_pipeline::ActionEngine;

fn system_poller_payload(virtual_servers: usize) -> Value {
    let mut servers = serde_json::Map::new();
    let mut pools = serde_json::Map::new();
    for i in 0..virtual_servers {
        servers.insert(
            format!("/Tenant{}/App{}/vs{i}", i % 8, i % 4),
            json!({
                "availabilityState": "available",
                "clientside.curConns": i,
                "clientside.bitsIn": i * 1024,
                "destination": format!("10.0.{}.{}:443", i / 255, i % 255),
            }),
        );
        pools.insert(
            format!("/Tenant{}/App{}/pool{i}", i % 8, i % 4),
            json!({"activeMemberCnt": 2, "members": {"10.1.0.1:80": {"state": "up"}}}),
        );
    }
    json!({
        "system": {"hostname": "bigip1.example.com", "version": "17.1.0", "cpu": 12},
        "virtualServers": servers,
        "pools": pools,
        "telemetryEventCategory": "systemInfo",
    })
}

fn engine(actions: Value) -> ActionEngine {
    ActionEngine::from_json(&actions).unwrap()
}

fn bench_actions(c: &mut Criterion) {
    let cases = [
        (
            "set_tag_default",
            engine(json!([{"setTag": {"tenant": "`T`", "application": "`A`"}}])),
        ),
        (
            "set_tag_located",
            engine(json!([{
                "setTag": {"team": "netops"},
                "locations": {"virtualServers": {"/Tenant1/.*": true}}
            }])),
        ),
        (
            "include_data",
            engine(json!([{
                "includeData": {},
                "locations": {"system": true, "virtualServers": {".*": {"destination": true}}}
            }])),
        ),
        (
            "exclude_data",
            engine(json!([{
                "excludeData": {},
                "locations": {"virtualServers": {".*": {"clientside\\..*": true}}}
            }])),
        ),
        (
            "conditional_expression",
            engine(json!([{
                "JMESPath": {},
                "expression": "{ host: system.hostname, servers: keys(virtualServers) }",
                "ifAllMatch": {"system": {"hostname": "bigip1.*"}}
            }])),
        ),
    ];

    for size in [10usize, 100] {
        let payload = DataContext::new(system_poller_payload(size));
        let mut group = c.benchmark_group(format!("actions_{size}_vs"));
        group.throughput(Throughput::Elements(1));

        for (name, engine) in &cases {
            group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, payload| {
                b.iter(|| {
                    let mut ctx = payload.clone();
                    engine.execute(black_box(&mut ctx));
                    ctx
                })
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_actions);
criterion_main!(benches);

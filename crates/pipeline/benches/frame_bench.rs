//! 프레임 분할/분류 벤치마크
//!
//! 분할기, 스트림 누적기, 레코드 분류기의 처리량을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use telestream_pipeline::{FrameAccumulator, FrameSplitter, RecordClassifier};

/// LTM 요청 로그
const LTM_RECORD: &str = r#"event_source="request_logging",hostname="bigip1",client_ip="192.0.2.10",server_ip="10.0.0.5",http_method="GET",http_uri="/api/v1/users",virtual_name="/Common/app/vs_https",event_timestamp="2024-01-15T12:00:00.000Z""#;

/// APM 세션 이벤트
const APM_RECORD: &str = r#"Access_Profile="/Common/access",Partition="Common",Session_Id="a1b2c3d4",Client_IP="192.0.2.50",Username="alice",Access_Policy_Result="Logon_Allowed""#;

/// ASM 메시지를 싣고 있는 syslog 라인
const ASM_SYSLOG: &str = r#"<134>Jan 15 12:00:00 bigip1 ASM: policy_name="/Common/waf",request_status="blocked",attack_type="SQL-Injection",ip_client="203.0.113.45""#;

/// 일반 syslog 라인
const PLAIN_SYSLOG: &str =
    "<134>Jan 15 12:00:00 bigip1 info logger[1234]: Configuration saved by admin from 10.0.0.2";

fn stream_of(records: usize) -> String {
    let mut buffer = String::new();
    for i in 0..records {
        buffer.push_str(match i % 4 {
            0 => LTM_RECORD,
            1 => APM_RECORD,
            2 => ASM_SYSLOG,
            _ => PLAIN_SYSLOG,
        });
        buffer.push('\n');
    }
    buffer
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_split");

    for records in [10usize, 100, 1000] {
        let buffer = stream_of(records);
        group.throughput(Throughput::Bytes(buffer.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &buffer, |b, buffer| {
            b.iter(|| FrameSplitter::split(black_box(buffer), "\n"))
        });
    }

    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_accumulate");
    let buffer = stream_of(1000);
    group.throughput(Throughput::Bytes(buffer.len() as u64));

    for chunk_size in [512usize, 4096, 65536] {
        group.bench_with_input(
            BenchmarkId::new("chunk", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut accumulator = FrameAccumulator::new("\n", 1 << 20);
                    let mut frames = 0;
                    for chunk in buffer.as_bytes().chunks(chunk_size) {
                        frames += accumulator.push(black_box(chunk)).len();
                    }
                    frames + usize::from(accumulator.flush().is_some())
                })
            },
        );
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let classifier = RecordClassifier::new();
    let mut group = c.benchmark_group("record_classify");
    group.throughput(Throughput::Elements(1));

    for (name, record) in [
        ("ltm", LTM_RECORD),
        ("apm", APM_RECORD),
        ("asm_syslog", ASM_SYSLOG),
        ("plain_syslog", PLAIN_SYSLOG),
        ("raw", "unstructured text without pairs"),
    ] {
        group.bench_function(name, |b| b.iter(|| classifier.classify(black_box(record))));
    }

    group.finish();
}

criterion_group!(benches, bench_split, bench_accumulate, bench_classify);
criterion_main!(benches);

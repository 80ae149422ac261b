use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use melt_core::{AggregationTemporality, Entity, Log, Metric, Relationship, Span, ValueType};
use melt_exporter::{log::build_logs_payload, metric::build_metrics_payload, trace::build_spans_payload};
use prost::Message;

fn entities(count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| {
            let mut entity = Entity::new()
                .with_attribute("service.name", format!("svc-{i}"))
                .with_attribute("replicas", i as i64)
                .with_relationship(Relationship::default().with_attribute("parent", "cluster"));
            let mut sum = Metric::sum("reqs", ValueType::Long, true, AggregationTemporality::Delta)
                .with_attribute("route", "/");
            let mut gauge = Metric::gauge("cpu", ValueType::Double);
            for t in 0..32u64 {
                sum.add_data_point(t, t + 1, t as f64);
                gauge.add_data_point(t, t + 1, 0.5);
            }
            entity.add_metric(sum).add_metric(gauge);
            entity.add_log(
                Log::event("deploy", "deployed", 1).with_attribute("version", "1.2.3"),
            );
            entity.add_span(Span::new("GET /", vec![1u8; 16], vec![2u8; 8]));
            entity
        })
        .collect()
}

fn bench_build_and_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("Payload_Build");
    for count in [1usize, 10, 100] {
        let input = entities(count);
        group.bench_with_input(BenchmarkId::new("metrics", count), &input, |b, input| {
            b.iter(|| build_metrics_payload(input).encode_to_vec())
        });
        group.bench_with_input(BenchmarkId::new("logs", count), &input, |b, input| {
            b.iter(|| build_logs_payload(input).encode_to_vec())
        });
        group.bench_with_input(BenchmarkId::new("spans", count), &input, |b, input| {
            b.iter(|| build_spans_payload(input).encode_to_vec())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_and_encode);
criterion_main!(benches);

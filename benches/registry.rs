//! Benchmarks for block parsing and traffic transitions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use proxymanager::registry::{decode, encode};
use proxymanager::store::find_block;
use std::hint::black_box;

/// Generate block entry lines, every fourth host disabled behind its neighbour
fn generate_entries(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let ip = format!("10.{}.{}.{}", (i / 65536) % 256, (i / 256) % 256, i % 256);
            match i % 4 {
                0 => format!("#{} host{}", ip, i),
                1 => format!("{} host{} host{}", ip, i, i - 1),
                _ => format!("{} host{}", ip, i),
            }
        })
        .collect()
}

/// Wrap entries in a hosts file with a few unrelated blocks around them
fn generate_hosts_file(count: usize) -> Vec<String> {
    let mut lines = vec!["127.0.0.1 localhost".to_string()];
    for cluster in ["alpha", "beta", "web", "omega"] {
        lines.push(String::new());
        lines.push("# DO NOT EDIT, USE proxymanager".to_string());
        lines.push(format!("### LB_K8S({})", cluster));
        lines.extend(generate_entries(count));
        lines.push("### LB_K8S_END".to_string());
    }
    lines
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for size in [10, 100, 1000] {
        let entries = generate_entries(size);
        group.bench_with_input(BenchmarkId::new("decode", size), &entries, |b, entries| {
            b.iter(|| black_box(decode(entries).unwrap()))
        });

        let registry = decode(&entries).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", size), &registry, |b, registry| {
            b.iter(|| black_box(encode(registry)))
        });
    }

    group.finish();
}

fn bench_find_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_block");

    for size in [10, 100, 1000] {
        let lines = generate_hosts_file(size);
        group.bench_with_input(BenchmarkId::new("web", size), &lines, |b, lines| {
            b.iter(|| black_box(find_block(lines, "web").unwrap()))
        });
    }

    group.finish();
}

fn bench_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitions");

    for size in [10, 100, 1000] {
        let registry = decode(&generate_entries(size)).unwrap();

        group.bench_with_input(BenchmarkId::new("move", size), &registry, |b, registry| {
            b.iter(|| black_box(registry.move_traffic("host2", "host3").unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("restore", size), &registry, |b, registry| {
            b.iter(|| black_box(registry.restore_traffic("host0").unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_find_block, bench_transitions);
criterion_main!(benches);

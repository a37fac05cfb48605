//! Benchmarks for the chain line encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use beatchain_test::valid_chain;
use beatchain_wire::{decode_chain, encode_chain};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_chain");

    for len in [10usize, 100, 1000] {
        let chain = valid_chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &chain, |b, chain| {
            b.iter(|| encode_chain(black_box(chain)).unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_chain");

    for len in [10usize, 100, 1000] {
        let line = encode_chain(&valid_chain(len)).unwrap();
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &line, |b, line| {
            b.iter(|| decode_chain(black_box(line)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);

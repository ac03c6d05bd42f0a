//! Benchmarks for hash map views, byte order reversal and YAML emission.

use byml::binary::{reverse_document, Document, Endian};
use byml::yaml::emit_document;
use byml::{Byml, EmitterConfig, HashMap32};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A hash map with `count` entries mixing inline and referenced values.
fn make_hash_map(count: u32) -> Vec<u8> {
    let map = HashMap32::from_iter((0..count).map(|i| {
        let hash = i.wrapping_mul(0x9E37_79B9);
        let value = match i % 4 {
            0 => Byml::I32(i as i32),
            1 => Byml::U64(u64::from(i) << 32),
            2 => Byml::String(format!("value{}", i % 64)),
            _ => Byml::F32(i as f32 / 3.0),
        };
        (hash, value)
    }));
    Byml::HashMap32(map).to_binary(Endian::native()).unwrap()
}

fn root_of(doc: &Document<'_>) -> i32 {
    doc.root().unwrap().unwrap().1
}

fn bench_view_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_map32/access");

    for &count in &[16u32, 1024, 65536] {
        let data = make_hash_map(count);
        let doc = Document::new(&data).unwrap();
        let view = doc.hash_map32(root_of(&doc)).unwrap();

        group.throughput(Throughput::Elements(u64::from(count)));

        group.bench_with_input(BenchmarkId::new("at", count), &view, |b, view| {
            b.iter(|| {
                let mut sum = 0i64;
                for index in 0..view.len() {
                    sum += i64::from(view.at(index).unwrap().value);
                }
                black_box(sum)
            })
        });

        group.bench_with_input(BenchmarkId::new("iter", count), &view, |b, view| {
            b.iter(|| black_box(view.iter().map(|node| node.hash).fold(0u32, u32::wrapping_add)))
        });

        let lookups: Vec<u32> = (0..count).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
        group.bench_with_input(BenchmarkId::new("get", count), &view, |b, view| {
            b.iter(|| {
                let mut found = 0usize;
                for &hash in &lookups {
                    found += usize::from(view.get(hash).is_some());
                }
                black_box(found)
            })
        });
    }

    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_map32/reverse");

    for &count in &[1024u32, 65536] {
        let data = make_hash_map(count);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("document", count), &data, |b, data| {
            b.iter(|| {
                let mut copy = data.clone();
                reverse_document(&mut copy, Endian::native()).unwrap();
                black_box(copy)
            })
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash_map32/emit");

    for &count in &[16u32, 1024] {
        let data = make_hash_map(count);
        let doc = Document::new(&data).unwrap();
        group.throughput(Throughput::Elements(u64::from(count)));

        group.bench_with_input(BenchmarkId::new("flow", count), &doc, |b, doc| {
            b.iter(|| black_box(emit_document(doc, EmitterConfig::default()).unwrap()))
        });

        let indented = EmitterConfig::default().with_indented(true);
        group.bench_with_input(BenchmarkId::new("indented", count), &doc, |b, doc| {
            b.iter(|| black_box(emit_document(doc, indented.clone()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_view_access, bench_reverse, bench_emit);
criterion_main!(benches);

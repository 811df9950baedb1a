//! Criterion micro-benchmarks for arena allocation, prefix copy, and slot copy.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sluice_arena::{ByteArena, SlotIndex};
use sluice_bench::{reference_stream, BATCH};
use sluice_core::Command;

fn filled_arena() -> (ByteArena, SlotIndex) {
    let mut arena = ByteArena::new(BATCH * Command::WIRE_SIZE);
    let mut slots = SlotIndex::new(BATCH);
    for cmd in reference_stream(9, BATCH) {
        let offset = arena.alloc_copy(&cmd.encode()).unwrap();
        assert!(slots.push(offset));
    }
    (arena, slots)
}

fn bench_alloc_copy(c: &mut Criterion) {
    let records: Vec<[u8; Command::WIRE_SIZE]> = reference_stream(7, BATCH)
        .iter()
        .map(Command::encode)
        .collect();
    let mut arena = ByteArena::new(BATCH * Command::WIRE_SIZE);
    c.bench_function("arena_alloc_copy_256", |b| {
        b.iter(|| {
            for record in &records {
                black_box(arena.alloc_copy(record).unwrap());
            }
            arena.reset();
        });
    });
}

fn bench_prefix_copy(c: &mut Criterion) {
    let (src, _) = filled_arena();
    let mut dst = ByteArena::new(src.capacity());
    c.bench_function("arena_copy_from_5k", |b| {
        b.iter(|| {
            dst.copy_from(black_box(&src)).unwrap();
        });
    });
}

fn bench_slot_copy(c: &mut Criterion) {
    let (_, src) = filled_arena();
    let mut dst = SlotIndex::new(BATCH);
    c.bench_function("slots_copy_from_256", |b| {
        b.iter(|| {
            assert!(dst.copy_from(black_box(&src)));
        });
    });
}

criterion_group!(benches, bench_alloc_copy, bench_prefix_copy, bench_slot_copy);
criterion_main!(benches);

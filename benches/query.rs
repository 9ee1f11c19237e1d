//! Predicate evaluation over a populated store.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use realm_quest::query::{Predicate, QueryEngine};
use realm_quest::store::{GameData, THIS};

fn populate(count: usize) -> GameData {
    let mut data = GameData::new();
    for i in 0..count {
        let id = data.create_object(format!("Item {i}"));
        let Some(mut editor) = data.edit(id) else {
            continue;
        };
        editor.set(THIS, "item", "");
        if i % 2 == 0 {
            editor.set(THIS, "weapon", "");
        }
        if i % 5 == 0 {
            editor.set(THIS, "magic", "");
        }
        editor.set(THIS, "weight", ["L", "M", "H", "T"][i % 4]);
    }
    data
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    for count in [100usize, 1_000, 10_000] {
        let data = populate(count);

        group.bench_with_input(BenchmarkId::new("uncached", count), &data, |b, data| {
            let mut engine = QueryEngine::new();
            b.iter(|| engine.find(black_box("weapon,!magic,weight=H"), data.iter()).len());
        });

        group.bench_with_input(BenchmarkId::new("cached", count), &data, |b, data| {
            let mut engine = QueryEngine::with_cache();
            b.iter(|| engine.find(black_box("weapon,!magic,weight=H"), data.iter()).len());
        });

        group.bench_with_input(BenchmarkId::new("compiled", count), &data, |b, data| {
            let predicate = Predicate::parse("weapon,!magic,weight=H");
            b.iter(|| predicate.filter(data.iter()).len());
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| Predicate::parse(black_box("item,weapon,!magic,!large,weight=H,native=Lancers")))
    });
}

criterion_group!(benches, bench_find, bench_parse);
criterion_main!(benches);

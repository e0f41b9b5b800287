use std::fs;

use criterion::{criterion_group, criterion_main, Criterion};

use earcut_rings::{Earcut, Triangle};

fn load_fixture(name: &str) -> Vec<Vec<[f64; 2]>> {
    #[derive(serde::Deserialize)]
    struct Fixture {
        rings: Vec<Vec<[f64; 2]>>,
    }
    let s = fs::read_to_string("./tests/fixtures/".to_string() + name + ".json").unwrap();
    serde_json::from_str::<Fixture>(&s).unwrap().rings
}

fn bench(c: &mut Criterion) {
    let mut earcut = Earcut::new();
    let mut triangles: Vec<Triangle<f64>> = Vec::new();

    for name in ["building", "gear", "islands", "spiral"] {
        let rings = load_fixture(name);
        c.bench_function(name, |b| {
            b.iter(|| {
                triangles.clear();
                earcut.earcut(&rings, true, &mut triangles).unwrap();
            })
        });
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);

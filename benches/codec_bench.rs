use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fmtcodec::batch::decode_all;
use fmtcodec::Registry;
use serde_json::{json, Value};

fn document(entries: usize) -> Value {
    let items: Vec<Value> = (0..entries)
        .map(|i| json!({"id": i, "name": format!("item-{i}"), "tags": ["x", "y"], "active": i % 2 == 0}))
        .collect();
    json!({"version": 1, "items": items})
}

fn bench_encode(c: &mut Criterion) {
    let reg = Registry::builtin();
    let doc = document(500);

    for format in ["json", "json5", "yaml", "cson"] {
        c.bench_function(&format!("encode_{format}_500"), |b| {
            b.iter(|| reg.encode(black_box(&doc), format).unwrap())
        });
    }
}

fn bench_decode(c: &mut Criterion) {
    let reg = Registry::builtin();
    let doc = document(500);

    for format in ["json", "json5", "yaml", "cson"] {
        let encoded = reg.encode(&doc, format).unwrap();
        c.bench_function(&format!("decode_{format}_500"), |b| {
            b.iter(|| reg.decode(format, black_box(encoded.as_bytes()), None).unwrap())
        });
    }
}

fn bench_batch_decode(c: &mut Criterion) {
    let reg = Registry::builtin();
    let inputs: Vec<Vec<u8>> = (0..32)
        .map(|_| reg.encode(&document(50), "yaml").unwrap().into_bytes())
        .collect();

    c.bench_function("batch_decode_yaml_32x50", |b| {
        b.iter(|| decode_all(&reg, "yaml", black_box(&inputs)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_batch_decode);
criterion_main!(benches);

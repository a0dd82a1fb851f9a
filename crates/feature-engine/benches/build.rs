use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{build, schema, CycleRegularity, FieldKind, RawInputs, RawValue, YesNo};

fn full_submission() -> RawInputs {
    schema()
        .iter()
        .map(|spec| {
            let raw = match spec.kind {
                FieldKind::Binary => RawValue::YesNo(YesNo::Yes),
                FieldKind::CategoricalOrdinal => RawValue::Cycle(CycleRegularity::Irregular),
                FieldKind::Numeric => RawValue::Number(42.5),
                FieldKind::NumericOrTextFallback => RawValue::Text("1.99".to_string()),
            };
            (spec.name.to_string(), raw)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let full = full_submission();
    let empty = RawInputs::new();

    c.bench_function("build_full_submission", |b| {
        b.iter(|| black_box(build(black_box(&full))))
    });

    c.bench_function("build_defaults_only", |b| {
        b.iter(|| black_box(build(black_box(&empty))))
    });
}

criterion_group!(benches, bench_build);
criterion_main!(benches);

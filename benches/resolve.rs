//! Benchmarks for fingerprint resolution and hooked dispatch.
//!
//! Measures the costs a patch module pays at runtime:
//! - Cold resolution (index build on first lookup)
//! - Warm resolution against a built index
//! - Dispatch through an installed hook chain vs. the unhooked fast path

extern crate hookscope;

use criterion::{criterion_group, criterion_main, Criterion};
use hookscope::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

/// Builds an image with many decoy classes around one fingerprinted target.
fn wide_image(classes: usize) -> Arc<LoadedImage> {
    let mut builder = ImageBuilder::new("bench");
    for i in 0..classes {
        let name = format!("c{i}");
        let marker = format!("decoy-{i}");
        builder = builder.with_class(
            ClassSpec::new(&name).with_method(
                MethodSpec::new("m", 1)
                    .with_string_ref(&marker)
                    .with_body(|_, args| Ok(args[0].clone())),
            ),
        );
    }
    builder
        .with_class(
            ClassSpec::new("target").with_method(
                MethodSpec::new("t", 1)
                    .with_string_ref("bench-marker")
                    .with_body(|_, args| Ok(args[0].clone())),
            ),
        )
        .build()
}

/// Benchmark the first lookup, which pays for the full index build.
fn bench_resolve_cold(c: &mut Criterion) {
    c.bench_function("resolve_cold_500_classes", |b| {
        b.iter(|| {
            let resolver = FingerprintResolver::new(wide_image(500));
            let fp = Fingerprint::method("target").with_string_ref("bench-marker");
            black_box(resolver.resolve(black_box(&fp)))
        });
    });
}

/// Benchmark lookups against an already-built index.
fn bench_resolve_warm(c: &mut Criterion) {
    let resolver = FingerprintResolver::new(wide_image(500));
    let fp = Fingerprint::method("target").with_string_ref("bench-marker");
    // prime the index
    let _ = resolver.resolve(&fp);

    c.bench_function("resolve_warm", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&fp))));
    });
}

/// Benchmark the unhooked dispatch fast path.
fn bench_dispatch_unhooked(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(wide_image(10));
    let token = dispatcher
        .image()
        .methods()
        .iter()
        .find(|m| m.name() == "t")
        .map(|m| m.token())
        .unwrap();

    c.bench_function("dispatch_unhooked", |b| {
        b.iter(|| {
            dispatcher
                .invoke(black_box(token), None, &[Value::Int(1)])
                .unwrap()
        });
    });
}

/// Benchmark dispatch through one installed before/after pair.
fn bench_dispatch_hooked(c: &mut Criterion) {
    let session = PatchSession::new(Arc::new(Dispatcher::new(wide_image(10))));
    let reference = SymbolRef::new(Fingerprint::method("target").with_string_ref("bench-marker"));
    session
        .hook(
            &reference,
            HookPair::new()
                .with_before(|_| Ok(()))
                .with_after(|_| Ok(())),
        )
        .unwrap();
    let token = reference.peek().unwrap().token();

    c.bench_function("dispatch_hooked", |b| {
        b.iter(|| {
            session
                .dispatcher()
                .invoke(black_box(token), None, &[Value::Int(1)])
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_cold,
    bench_resolve_warm,
    bench_dispatch_unhooked,
    bench_dispatch_hooked
);
criterion_main!(benches);

//! Benchmarks for interning.
//!
//! Measures the hot paths of a construction session:
//! - String and type interning of already present keys
//! - Method reference interning (proto and type list sharing)
//! - Bulk class copy, single threaded and batched over rayon

extern crate dexbuilder;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use dexbuilder::prelude::*;
use std::hint::black_box;

fn sample_class(index: usize) -> ClassDef {
    let ty = format!("Lbench/C{index};");
    ClassDef::new(
        ty.clone(),
        AccessFlags::PUBLIC.bits(),
        Some("Ljava/lang/Object;".into()),
        &["Ljava/lang/Runnable;".into()],
        Some("Bench.java".into()),
        AnnotationSet::new(),
        vec![
            Field::new(ty.clone(), "a", "I", 0, None, AnnotationSet::new()),
            Field::new(
                ty.clone(),
                "B",
                "Ljava/lang/String;",
                AccessFlags::STATIC.bits(),
                Some(EncodedValue::String("b".into())),
                AnnotationSet::new(),
            ),
        ],
        vec![Method::new(
            ty,
            "run",
            vec![],
            "V",
            AccessFlags::PUBLIC.bits(),
            AnnotationSet::new(),
            Some(MethodImplementation::new(
                2,
                vec![
                    Instruction::Format21c {
                        opcode: Opcode::ConstString,
                        register_a: 0,
                        reference: Reference::String("hello".into()),
                    },
                    Instruction::Format35c {
                        opcode: Opcode::InvokeVirtual,
                        registers: vec![1, 0],
                        reference: Reference::Method(MethodReference::new(
                            "Ljava/io/PrintStream;",
                            "println",
                            vec!["Ljava/lang/String;".into()],
                            "V",
                        )),
                    },
                    Instruction::Format10x {
                        opcode: Opcode::ReturnVoid,
                    },
                ],
                vec![],
                vec![],
            )),
        )],
    )
    .unwrap()
}

/// Benchmark re-interning a string that is already present.
fn bench_string_hit(c: &mut Criterion) {
    let builder = DexBuilder::new();
    builder.intern_string("Ljava/lang/Object;");

    c.bench_function("intern_string_hit", |b| {
        b.iter(|| black_box(builder.intern_string(black_box("Ljava/lang/Object;"))));
    });
}

/// Benchmark re-interning a type that is already present.
fn bench_type_hit(c: &mut Criterion) {
    let builder = DexBuilder::new();
    builder.intern_type("Ljava/lang/String;").unwrap();

    c.bench_function("intern_type_hit", |b| {
        b.iter(|| black_box(builder.intern_type(black_box("Ljava/lang/String;")).unwrap()));
    });
}

/// Benchmark interning a method reference with an existing proto.
fn bench_method_reference(c: &mut Criterion) {
    let builder = DexBuilder::new();
    let method = MethodReference::new(
        "Ljava/util/Map;",
        "put",
        vec!["Ljava/lang/Object;".into(), "Ljava/lang/Object;".into()],
        "Ljava/lang/Object;",
    );

    c.bench_function("intern_method_reference", |b| {
        b.iter(|| black_box(builder.intern_method_reference(black_box(&method)).unwrap()));
    });
}

/// Benchmark copying 1000 classes into a fresh session on one thread.
fn bench_bulk_copy(c: &mut Criterion) {
    let classes: Vec<ClassDef> = (0..1000).map(sample_class).collect();

    c.bench_function("bulk_copy_1000_sequential", |b| {
        b.iter_batched(
            DexBuilder::new,
            |builder| {
                for class in &classes {
                    builder.intern_class_def(class).unwrap();
                }
                builder
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark copying 1000 classes into a fresh session with rayon.
fn bench_bulk_copy_parallel(c: &mut Criterion) {
    let classes: Vec<ClassDef> = (0..1000).map(sample_class).collect();

    c.bench_function("bulk_copy_1000_parallel", |b| {
        b.iter_batched(
            DexBuilder::new,
            |builder| {
                builder.intern_class_defs(&classes).unwrap();
                builder
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_string_hit,
    bench_type_hit,
    bench_method_reference,
    bench_bulk_copy,
    bench_bulk_copy_parallel
);
criterion_main!(benches);

//! Benchmarks for parsing and comparing signature files.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use apisig_core::format::FileFormat;
use apisig_core::signature::write_format;
use apisig_core::{check_compatibility, parse_signature, summarize_changes, ErrorConfiguration};

/// A signature file with `packages * classes` classes of a dozen members each.
fn generate_api(packages: usize, classes: usize, drift: bool) -> String {
    let mut text = String::from("// Signature format: 3.0\n");
    for p in 0..packages {
        text.push_str(&format!("package bench.pkg{} {{\n\n", p));
        for c in 0..classes {
            text.push_str(&format!("  public class Widget{} {{\n", c));
            text.push_str(&format!("    ctor public Widget{}(String name);\n", c));
            for m in 0..8 {
                let nullable = if drift && m == 0 { "" } else { "?" };
                text.push_str(&format!(
                    "    method public String{} op{}(java.util.List<String> items, int count);\n",
                    nullable, m
                ));
            }
            if !(drift && c == 0) {
                text.push_str("    method @Deprecated public void legacy();\n");
            }
            text.push_str(&format!("    field public static final int ID = {};\n", c));
            text.push_str("  }\n\n");
        }
        text.push_str("}\n\n");
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let text = generate_api(10, 20, false);
    c.bench_function("parse_200_classes", |b| {
        b.iter(|| parse_signature("bench", black_box(&text)))
    });
}

fn bench_write(c: &mut Criterion) {
    let codebase = parse_signature("bench", &generate_api(10, 20, false)).unwrap();
    c.bench_function("write_200_classes_v2", |b| {
        b.iter(|| write_format(black_box(&codebase), FileFormat::V2))
    });
}

fn bench_compare(c: &mut Criterion) {
    let old = parse_signature("old", &generate_api(10, 20, false)).unwrap();
    let new = parse_signature("new", &generate_api(10, 20, true)).unwrap();
    let config = ErrorConfiguration::new();

    c.bench_function("check_compatibility_200_classes", |b| {
        b.iter(|| check_compatibility(black_box(&old), black_box(&new), &config))
    });
    c.bench_function("summarize_changes_200_classes", |b| {
        b.iter(|| summarize_changes(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, bench_parse, bench_write, bench_compare);
criterion_main!(benches);

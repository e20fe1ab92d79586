use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sabnf::{analysis, input, parse, reduce, Compiler, Grammar};

/// A chain of `n` non-recursive rules, each alternating over literals and
/// the next rule.
fn chain_grammar(n: usize) -> String {
    let mut text = String::new();
    for i in 0..n {
        let next = if i + 1 < n {
            format!("r{}", i + 1)
        } else {
            "%d48-57".to_owned()
        };
        text.push_str(&format!(
            "r{i} = \"k{i}\" {next} / 1*('x' / %x41-5A) [{next}] / \"end\"\n"
        ));
    }
    text
}

/// `n` rules in a single mutual-recursion cycle, every one nested.
fn mutual_grammar(n: usize) -> String {
    let mut text = String::new();
    for i in 0..n {
        let next = (i + 1) % n;
        text.push_str(&format!("m{i} = \"(\" m{next} \")\" / \"v{i}\" *(\",\" m{next})\n"));
    }
    text
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    group.measurement_time(Duration::from_secs(5));

    for n in [10, 50, 200] {
        let text = chain_grammar(n);
        group.bench_with_input(BenchmarkId::new("chain", n), &text, |b, text| {
            b.iter(|| Compiler::new().source(black_box(text)).compile().unwrap());
        });
    }
    for n in [4, 16, 32] {
        let text = mutual_grammar(n);
        group.bench_with_input(BenchmarkId::new("mutual", n), &text, |b, text| {
            b.iter(|| Compiler::new().source(black_box(text)).compile().unwrap());
        });
    }
    group.finish();
}

fn bench_attributes(c: &mut Criterion) {
    let text = mutual_grammar(16);
    let input = input::analyze(&text, false);
    let syntax = parse::syntax(&input, false);
    let (rules, _, _) = parse::semantic(&input, &syntax).into_parts();
    let rules = reduce::reduce(rules);

    c.bench_function("attributes_mutual_16", |b| {
        b.iter(|| analysis::analyze(black_box(&rules)));
    });
}

fn bench_emit(c: &mut Criterion) {
    let grammar = Grammar::from_abnf(&chain_grammar(50)).unwrap();
    c.bench_function("emit_chain_50", |b| {
        b.iter(|| black_box(&grammar).to_rust_source());
    });
}

criterion_group!(benches, bench_compile, bench_attributes, bench_emit);
criterion_main!(benches);

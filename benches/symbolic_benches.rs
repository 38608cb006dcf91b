use RustedCAS::symbolic::symbolic_engine::Expr;
use RustedCAS::symbolic::symbolic_function::Function;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn sample() -> Expr {
    Expr::parse_expression("3*x^2 + 2*x + cos(x)^2 + sin(x)^2 + x*exp(x^2) + (x + 1)^3/(x^2 + 1)")
        .unwrap()
}

fn bench_simplify(c: &mut Criterion) {
    let e = sample();
    c.bench_function("simplify", |b| b.iter(|| black_box(&e).simplify()));
}

fn bench_diff(c: &mut Criterion) {
    let e = sample();
    c.bench_function("diff + simplify", |b| {
        b.iter(|| black_box(&e).diff("x").simplify())
    });
}

fn bench_integrate(c: &mut Criterion) {
    let e = Expr::parse_expression("x^2*sin(x) + x*exp(x^2) + 3*x^2 + 1/x").unwrap();
    c.bench_function("integrate indefinite", |b| {
        b.iter(|| black_box(&e).integrate_indefinite("x"))
    });
    let gaussian = Expr::parse_expression("exp(-x^2)").unwrap();
    c.bench_function("adaptive Simpson fallback", |b| {
        b.iter(|| black_box(&gaussian).integrate_definite("x", -2.0, 2.0))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let f = Function::new(vec!["x".to_string()], sample()).unwrap();
    let points: Vec<Vec<f64>> = (0..10_000).map(|i| vec![i as f64 * 1e-4]).collect();
    c.bench_function("evaluate", |b| b.iter(|| f.evaluate(black_box(&[0.5]))));
    c.bench_function("evaluate_many 10k", |b| {
        b.iter(|| f.evaluate_many(black_box(&points)))
    });
}

criterion_group!(benches, bench_simplify, bench_diff, bench_integrate, bench_evaluate);
criterion_main!(benches);

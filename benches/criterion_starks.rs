use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stark_engine::demo::fibonacci::{FibonacciConstraints, FibonacciTrace};
use stark_engine::hash::HashTag;
use stark_engine::{Goldilocks, Prover, STARKParameters};

fn params() -> STARKParameters {
    STARKParameters {
        blowup_factor: 8,
        fri_number_of_queries: 30,
        coset_offset: 3,
        grinding_factor: 0,
        fri_stopping_degree: 4,
        hash_tag: HashTag::Poseidon,
        num_workers: 0,
        security_level: 80,
        num_trace_randomizers: 2,
    }
}

fn prover_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("prove");
    for trace_length in [64usize, 256, 1024] {
        let trace = FibonacciTrace::<Goldilocks>::new(trace_length);
        let constraints = FibonacciConstraints::<Goldilocks>::new(trace_length);
        let prover = Prover::new(params()).unwrap();
        group.bench_function(format!("fibonacci/{trace_length}"), |bench| {
            bench.iter(|| black_box(prover.prove(&trace, &constraints).unwrap()));
        });
    }
}

criterion_group!(benches, prover_benches);
criterion_main!(benches);

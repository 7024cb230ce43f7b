use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, Criterion};
use criterion::measurement::WallTime;

use stark_engine::demo::fibonacci::{FibonacciConstraints, FibonacciTrace};
use stark_engine::fri::security_level;
use stark_engine::hash::HashTag;
use stark_engine::{Goldilocks, Prover, STARKParameters, Verifier};

fn params_for(fri_number_of_queries: usize) -> STARKParameters {
    STARKParameters {
        blowup_factor: 8,
        fri_number_of_queries,
        coset_offset: 3,
        grinding_factor: 0,
        fri_stopping_degree: 4,
        hash_tag: HashTag::Poseidon,
        num_workers: 0,
        security_level: 80,
        num_trace_randomizers: 2,
    }
}

fn run_verifier_bench(group: &mut BenchmarkGroup<'_, WallTime>, benchname: &str, queries: usize) {
    let params = params_for(queries);
    let bits = security_level(params.blowup_factor, params.fri_number_of_queries, params.grinding_factor);

    let trace = FibonacciTrace::<Goldilocks>::new(512);
    let constraints = FibonacciConstraints::<Goldilocks>::new(512);
    let prover = Prover::new(params.clone()).unwrap();
    let proof = prover.prove(&trace, &constraints).unwrap();
    let verifier = Verifier::new(params).unwrap();

    group.bench_function(format!("{benchname}/{bits:.0}_bits"), |bench| {
        bench.iter(|| black_box(verifier.verify(&proof, &constraints).unwrap()));
    });
}

fn verifier_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    run_verifier_bench(&mut group, "fibonacci/512", 30);
    run_verifier_bench(&mut group, "fibonacci/512", 60);
}

criterion_group!(benches, verifier_benches);
criterion_main!(benches);

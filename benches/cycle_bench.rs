use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crownet::{CrowNet, NetworkConfig};

fn build_network(total_neurons: usize) -> CrowNet {
    let mut cfg = NetworkConfig::default_for(total_neurons);
    cfg.rng_seed = 42;
    CrowNet::new(cfg).expect("benchmark config is valid")
}

fn cycle_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_cycle");
    for &size in &[50usize, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut net = build_network(size);
            b.iter(|| {
                net.run_cycle();
                black_box(net.get_output_activation());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, cycle_throughput);
criterion_main!(benches);

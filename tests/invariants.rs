//! Structural invariants that must hold after any sequence of cycles,
//! checked against randomized configurations.

use crownet::config::NetworkConfig;
use crownet::network::CrowNet;
use crownet::NeuronId;
use proptest::prelude::*;

fn run_for(seed: u64, total_neurons: usize, cycles: usize) -> CrowNet {
    let mut cfg = NetworkConfig::default_for(total_neurons);
    cfg.rng_seed = seed;
    let mut net = CrowNet::new(cfg).unwrap();
    for _ in 0..cycles {
        net.run_cycle();
    }
    net
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn population_and_id_lists_are_stable(seed in 0u64..1000, cycles in 0usize..15) {
        let total = 25;
        let mut cfg = NetworkConfig::default_for(total);
        cfg.rng_seed = seed;
        let mut net = CrowNet::new(cfg).unwrap();
        let input_ids_before = net.input_ids().to_vec();
        let output_ids_before = net.output_ids().to_vec();

        for _ in 0..cycles {
            net.run_cycle();
        }

        prop_assert_eq!(net.neuron_count(), total);
        prop_assert_eq!(net.input_ids().to_vec(), input_ids_before);
        prop_assert_eq!(net.output_ids().to_vec(), output_ids_before);
    }

    #[test]
    fn positions_stay_within_the_clamping_hypersphere(seed in 0u64..1000, cycles in 0usize..15) {
        let cfg = NetworkConfig::default_for(20);
        let space_max_dimension = cfg.space_max_dimension;
        let net = run_for(seed, 20, cycles);
        prop_assert!(net.max_position_norm() <= space_max_dimension + 1e-6);
        for activation in net.get_output_activation() {
            prop_assert!(activation.is_finite());
        }
        for &id in net.output_ids() {
            prop_assert!(net.current_threshold(id) >= cfg.threshold_floor - 1e-12);
        }
        prop_assert!(net.cortisol() >= 0.0 && net.cortisol() <= cfg.cortisol.max);
        prop_assert!(net.dopamine() >= 0.0 && net.dopamine() <= cfg.dopamine.max);
    }

    #[test]
    fn output_frequency_is_never_negative(seed in 0u64..1000, cycles in 0usize..20) {
        let net = run_for(seed, 20, cycles);
        for &id in net.output_ids() {
            let freq = net.get_output_frequency(id).unwrap();
            prop_assert!(freq >= 0.0);
        }
    }
}

#[test]
fn weights_and_thresholds_stay_in_bounds_across_many_seeds() {
    let max_weight = NetworkConfig::default_for(30).hebbian.max_weight;
    let threshold_floor = NetworkConfig::default_for(30).threshold_floor;

    for seed in 0..8u64 {
        let net = run_for(seed, 30, 12);
        let ids: Vec<NeuronId> = (0..net.neuron_count() as u32).map(NeuronId).collect();

        for &pre in &ids {
            assert_eq!(net.weight(pre, pre), 0.0, "self-weight must stay zero for {pre:?}");
            for &post in ids.iter().step_by(5) {
                let w = net.weight(pre, post);
                assert!(
                    (0.0..=max_weight).contains(&w),
                    "weight({pre:?} -> {post:?}) = {w} out of [0, {max_weight}] after the Hebbian pass"
                );
            }
        }

        for &id in &ids {
            assert!(
                net.current_threshold(id) >= threshold_floor - 1e-12,
                "current_threshold below the floor for {id:?}"
            );
        }
    }
}

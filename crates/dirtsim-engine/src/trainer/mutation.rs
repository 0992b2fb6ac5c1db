//! Gaussian weight mutation with a reset probability, spec §4.6.

use dirtsim_types::genome::Genome;
use rand::Rng;
use rand_distr::{Distribution, Normal};

pub struct MutationConfig {
    pub rate: f64,
    pub sigma: f64,
    pub reset_rate: f64,
}

/// For each weight: with probability `reset_rate` overwrite from a fresh
/// draw in `[-1, 1)`; otherwise with probability `rate` add `Normal(0,
/// sigma)`. `fresh_weight` stands in for the brain's own fresh-weight
/// distribution.
pub fn mutate(genome: &Genome, config: &MutationConfig, rng: &mut impl Rng) -> Genome {
    let normal = Normal::new(0.0, config.sigma).expect("sigma must be finite and non-negative");
    let weights = genome
        .weights
        .iter()
        .map(|&w| {
            if rng.gen_bool(config.reset_rate.clamp(0.0, 1.0)) {
                rng.gen_range(-1.0..1.0)
            } else if rng.gen_bool(config.rate.clamp(0.0, 1.0)) {
                w + normal.sample(rng)
            } else {
                w
            }
        })
        .collect();
    Genome::new(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn zero_rate_and_reset_leaves_genome_unchanged() {
        let genome = Genome::new(vec![1.0, 2.0, 3.0]);
        let config = MutationConfig { rate: 0.0, sigma: 1.0, reset_rate: 0.0 };
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mutated = mutate(&genome, &config, &mut rng);
        assert_eq!(mutated.weights, genome.weights);
    }

    #[test]
    fn full_reset_rate_replaces_every_weight_within_range() {
        let genome = Genome::new(vec![1.0, 2.0, 3.0]);
        let config = MutationConfig { rate: 0.0, sigma: 1.0, reset_rate: 1.0 };
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mutated = mutate(&genome, &config, &mut rng);
        assert!(mutated.weights.iter().all(|&w| (-1.0..1.0).contains(&w)));
    }
}

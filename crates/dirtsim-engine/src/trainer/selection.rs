//! Tournament selection and elitist replacement, grounded on
//! `original_source/dirtsim/src/core/organisms/evolution/Selection.h`/`.cpp`.

use rand::Rng;

/// Samples `tournament_size` indices uniformly from `0..fitness.len()` and
/// returns the index with the highest fitness; ties break on the lowest
/// index (the first-seen winner, since later candidates must strictly beat
/// the incumbent to replace it).
pub fn tournament_select(fitness: &[f64], tournament_size: u32, rng: &mut impl Rng) -> usize {
    assert!(!fitness.is_empty(), "cannot select from an empty population");
    let mut best_idx = rng.gen_range(0..fitness.len());
    let mut best_fitness = fitness[best_idx];
    for _ in 1..tournament_size.max(1) {
        let candidate = rng.gen_range(0..fitness.len());
        if fitness[candidate] > best_fitness {
            best_idx = candidate;
            best_fitness = fitness[candidate];
        }
    }
    best_idx
}

/// Merges parents and offspring by fitness, descending, and keeps the top
/// `population_size` indices into the merged `(parents ++ offspring)` list.
pub fn elitist_replace_indices(parent_fitness: &[f64], offspring_fitness: &[f64], population_size: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = parent_fitness
        .iter()
        .chain(offspring_fitness.iter())
        .copied()
        .enumerate()
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().take(population_size).map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn tournament_select_prefers_higher_fitness_with_full_coverage() {
        let fitness = vec![0.1, 0.9, 0.2];
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        // With a tournament size covering the whole population the winner
        // is deterministic regardless of which indices get sampled.
        let winner = tournament_select(&fitness, fitness.len() as u32 * 4, &mut rng);
        assert_eq!(winner, 1);
    }

    #[test]
    fn elitist_replace_keeps_the_strongest_across_both_groups() {
        let parents = vec![1.0, 5.0];
        let offspring = vec![4.0, 0.5];
        let kept = elitist_replace_indices(&parents, &offspring, 2);
        // index 1 (parents[1]=5.0) and index 2 (offspring[0]=4.0, at merged
        // position parents.len()+0) should survive.
        assert_eq!(kept, vec![1, 2]);
    }
}

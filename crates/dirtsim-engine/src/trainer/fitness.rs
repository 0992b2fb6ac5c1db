//! Fitness formulas named in spec §4.6, grounded on
//! `original_source/dirtsim/src/core/organisms/evolution/Selection.cpp`'s
//! neighboring fitness-reduction code.

use crate::world::OrganismFitnessInput;
use dirtsim_types::scenario::OrganismType;

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Inputs that don't vary per organism type but do vary per training run.
pub struct FitnessContext {
    pub max_simulation_time: f64,
    pub world_width: f64,
    pub world_height: f64,
    pub energy_reference: f64,
    pub water_reference: f64,
}

/// Reduces one evaluation's raw measurements to a single fitness score.
/// Trees use a richer formula than the generic mobile organisms (duck,
/// goose); anything else falls back to the mobile formula. `max_energy`
/// is the episode's running-maximum biomass, tracked independently of
/// `input.biomass` (the instantaneous reading at evaluation end) since
/// the two terms of the tree formula weigh peak and final state
/// separately.
pub fn evaluate(organism_type: OrganismType, input: &OrganismFitnessInput, ctx: &FitnessContext, max_energy: f64) -> f64 {
    match organism_type {
        OrganismType::Tree => tree_fitness(input, ctx, max_energy),
        OrganismType::Duck | OrganismType::Goose => mobile_fitness(input, ctx),
    }
}

fn mobile_fitness(input: &OrganismFitnessInput, ctx: &FitnessContext) -> f64 {
    let survival = clamp01(input.seconds_alive / ctx.max_simulation_time);
    if survival <= 0.0 {
        return 0.0;
    }
    let world_diag = (ctx.world_width.powi(2) + ctx.world_height.powi(2)).sqrt();
    let distance = clamp01(input.displacement / world_diag);
    survival * (1.0 + distance)
}

fn tree_fitness(input: &OrganismFitnessInput, ctx: &FitnessContext, max_energy: f64) -> f64 {
    let survival = clamp01(input.seconds_alive / ctx.max_simulation_time);
    if survival <= 0.0 {
        return 0.0;
    }
    // `DemoWorld` doesn't model energy/water/structure independently, so the
    // resource and structure terms degrade to their biomass/height proxies.
    // The energy term blends the episode's peak biomass against its final
    // reading, rewarding trees that grew large even if they shed biomass
    // before the evaluation ended.
    let energy = 0.7 * clamp01(max_energy / ctx.energy_reference) + 0.3 * clamp01(input.biomass / ctx.energy_reference);
    let resource = 0.6 * (1.0 - (-input.height / ctx.water_reference).exp());
    survival * (1.0 + energy) * (1.0 + resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FitnessContext {
        FitnessContext {
            max_simulation_time: 10.0,
            world_width: 100.0,
            world_height: 100.0,
            energy_reference: 1.0,
            water_reference: 1.0,
        }
    }

    #[test]
    fn zero_survival_short_circuits_to_zero() {
        let input = OrganismFitnessInput::default();
        assert_eq!(mobile_fitness(&input, &ctx()), 0.0);
        assert_eq!(tree_fitness(&input, &ctx(), 0.0), 0.0);
    }

    #[test]
    fn full_survival_and_distance_hits_the_formula_ceiling() {
        let input = OrganismFitnessInput {
            displacement: (100f64.powi(2) + 100f64.powi(2)).sqrt(),
            seconds_alive: 10.0,
            ..Default::default()
        };
        let fitness = mobile_fitness(&input, &ctx());
        assert!((fitness - 2.0).abs() < 1e-9);
    }

    #[test]
    fn tree_fitness_weighs_peak_energy_over_final_energy() {
        let input = OrganismFitnessInput {
            seconds_alive: 10.0,
            biomass: 0.2,
            ..Default::default()
        };
        let shed_late = tree_fitness(&input, &ctx(), 1.0);
        let never_peaked = tree_fitness(&input, &ctx(), 0.2);
        assert!(shed_late > never_peaked);
    }
}

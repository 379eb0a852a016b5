use super::Simulation;
use crate::config::UpdateMode;
use crate::potential::calculate_potential;
use crate::step_decision::{accept_step, clamp_to_boundaries};

impl Simulation {
    pub(super) fn step_adaptation_phase(&mut self, k: usize) {
        let config = &self.config;
        let cone = &mut self.growth_cones[k];
        cone.calculate_adaptation(
            config.adaptation_mu,
            config.adaptation_lambda,
            config.adaptation_history,
        );
        cone.apply_adaptation();
        self.refresh_footprint(k);
    }

    /// Propose, evaluate and decide one move of cone `k`. Returns whether it was taken.
    pub(super) fn step_walk_phase(&mut self, k: usize, step: usize) -> bool {
        let displacement = self.proposer.propose(&mut self.rng);
        let cone = &self.growth_cones[k];
        let candidate =
            clamp_to_boundaries(cone.position, displacement, &self.substrate, cone.size);
        let new_potential = calculate_potential(
            &self.substrate,
            &self.footprints,
            &cone.probe(k, candidate),
            step,
            &self.config,
        );
        let accepted = accept_step(
            &mut self.rng,
            self.config.force,
            cone.potential,
            new_potential,
            self.config.sigma,
        );

        let cone = &mut self.growth_cones[k];
        cone.proposed_position = candidate;
        if accepted {
            cone.take_step(new_potential);
            self.refresh_footprint(k);
        }
        accepted
    }

    /// Publish cone `k`'s state to later fiber-fiber queries of this step.
    /// Synchronous runs defer this to the end of the step.
    fn refresh_footprint(&mut self, k: usize) {
        if self.config.update_mode == UpdateMode::Sequential {
            self.footprints[k] = self.growth_cones[k].footprint();
        }
    }

    pub(super) fn refresh_all_footprints(&mut self) {
        for (footprint, cone) in self.footprints.iter_mut().zip(&self.growth_cones) {
            *footprint = cone.footprint();
        }
    }
}

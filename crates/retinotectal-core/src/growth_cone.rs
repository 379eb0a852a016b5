use crate::adaptation::{adapt, adaptation_coefficient, reset_force};
use crate::constants::KNOCK_IN_SIGNAL_PRODUCT;
use crate::history::{History, HistoryEntry};
use crate::potential::{Footprint, Probe};

/// Integer grid coordinate `[x, y]`: `x` indexes columns, `y` rows.
pub type Position = [i32; 2];

/// Simulated axon tip walking on the substrate.
#[derive(Clone, Debug)]
pub struct GrowthCone {
    /// Rank along the source tissue axis.
    pub id: u32,
    /// Disk radius in cells.
    pub size: i32,
    pub start_position: Position,
    pub position: Position,
    /// Last proposed position, committed only when the step is accepted.
    pub proposed_position: Position,
    pub ligand_start: f64,
    pub receptor_start: f64,
    pub ligand: f64,
    pub receptor: f64,
    pub potential: f64,
    pub adaptation_coefficient: f64,
    pub reset_force_ligand: f64,
    pub reset_force_receptor: f64,
    /// Frozen cones are skipped entirely by the simulation loop.
    pub frozen: bool,
    pub marked: bool,
    history: History,
}

impl GrowthCone {
    pub fn new(id: u32, position: Position, size: i32, ligand: f64, receptor: f64) -> Self {
        let mut cone = Self {
            id,
            size,
            start_position: position,
            position,
            proposed_position: position,
            ligand_start: ligand,
            receptor_start: receptor,
            ligand,
            receptor,
            potential: 0.0,
            adaptation_coefficient: 1.0,
            reset_force_ligand: 0.0,
            reset_force_receptor: 0.0,
            frozen: false,
            marked: false,
            history: History::default(),
        };
        cone.history.record(cone.snapshot());
        cone
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn marked(mut self, marked: bool) -> Self {
        self.marked = marked;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            position: self.position,
            ligand: self.ligand,
            receptor: self.receptor,
        }
    }

    /// Inputs for evaluating this cone at `position`.
    pub fn probe(&self, index: usize, position: Position) -> Probe {
        Probe {
            index,
            position,
            size: self.size,
            ligand: self.ligand,
            receptor: self.receptor,
        }
    }

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            potential: self.potential,
            adaptation_coefficient: self.adaptation_coefficient,
            position: self.position,
            ligand: self.ligand,
            receptor: self.receptor,
            reset_force_ligand: self.reset_force_ligand,
            reset_force_receptor: self.reset_force_receptor,
        }
    }

    /// Set the potential evaluated before the first step; the seed history
    /// entry is updated to match.
    pub fn seed_potential(&mut self, potential: f64) {
        self.potential = potential;
        self.history.replace_seed_potential(potential);
    }

    /// Commit the proposed position with its potential and record the new state.
    pub fn take_step(&mut self, potential: f64) {
        self.position = self.proposed_position;
        self.potential = potential;
        self.history.record(self.snapshot());
    }

    /// Update the adaptation coefficient and reset forces from the last
    /// `window` recorded potentials. Nothing changes until the history is
    /// that long.
    pub fn calculate_adaptation(&mut self, mu: f64, lambda: f64, window: usize) {
        let Some(recent) = self.history.recent_potentials(window) else {
            return;
        };
        self.adaptation_coefficient = adaptation_coefficient(recent, mu);
        self.reset_force_ligand = reset_force(self.ligand_start, self.ligand, lambda);
        self.reset_force_receptor = reset_force(self.receptor_start, self.receptor, lambda);
    }

    pub fn apply_adaptation(&mut self) {
        self.ligand = adapt(
            self.ligand,
            self.adaptation_coefficient,
            self.reset_force_ligand,
        );
        self.receptor = adapt(
            self.receptor,
            self.adaptation_coefficient,
            self.reset_force_receptor,
        );
    }

    /// Raise the receptor level by `gain` while keeping the ligand-receptor
    /// product fixed, and mark the cone.
    pub fn knock_in(&mut self, gain: f64) {
        self.receptor += gain;
        if self.receptor > 0.0 {
            self.ligand = KNOCK_IN_SIGNAL_PRODUCT / self.receptor;
        }
        self.marked = true;
    }
}

impl std::fmt::Display for GrowthCone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id {} at {:?} (start {:?}): ligand {:.4}, receptor {:.4}, potential {:.4}, \
             adaptation {:.4}, reset forces {:.4}/{:.4}",
            self.id,
            self.position,
            self.start_position,
            self.ligand,
            self.receptor,
            self.potential,
            self.adaptation_coefficient,
            self.reset_force_ligand,
            self.reset_force_receptor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone() -> GrowthCone {
        GrowthCone::new(4, [3, 7], 3, 0.6, 0.4)
    }

    #[test]
    fn new_cone_has_one_seed_entry() {
        let c = cone();
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.history().position(), &[[3, 7]]);
        assert_eq!(c.history().ligand(), &[0.6]);
        assert_eq!(c.adaptation_coefficient, 1.0);
        assert!(!c.frozen && !c.marked);
    }

    #[test]
    fn builders_set_flags() {
        let c = cone().frozen(true).marked(true);
        assert!(c.frozen);
        assert!(c.marked);
    }

    #[test]
    fn take_step_commits_proposal() {
        let mut c = cone();
        c.seed_potential(0.3);
        c.proposed_position = [4, 8];
        c.take_step(0.2);
        assert_eq!(c.position, [4, 8]);
        assert_eq!(c.potential, 0.2);
        assert_eq!(c.history().potential(), &[0.3, 0.2]);
        assert_eq!(c.history().position(), &[[3, 7], [4, 8]]);
        assert_eq!(c.history().reset_force_receptor().len(), 2);
    }

    #[test]
    fn adaptation_waits_for_full_window() {
        let mut c = cone();
        c.calculate_adaptation(0.5, 0.1, 3);
        assert_eq!(c.adaptation_coefficient, 1.0);
        assert_eq!(c.reset_force_ligand, 0.0);

        for potential in [0.5, 0.5] {
            c.proposed_position = c.position;
            c.take_step(potential);
        }
        c.calculate_adaptation(0.5, 0.1, 3);
        assert!(c.adaptation_coefficient > 1.0);
    }

    #[test]
    fn adaptation_desensitizes_then_resets() {
        let mut c = cone();
        for _ in 0..3 {
            c.take_step(1.0);
        }
        c.calculate_adaptation(0.1, 0.5, 3);
        c.apply_adaptation();
        assert!(c.ligand > 0.6);
        assert!(c.receptor > 0.4);
        // the spring now pulls back toward the baseline
        c.calculate_adaptation(0.1, 0.5, 3);
        assert!(c.reset_force_ligand < 0.0);
        assert!(c.reset_force_receptor < 0.0);
        // adaptation alone never records history
        assert_eq!(c.history().len(), 4);
    }

    #[test]
    fn knock_in_keeps_signal_product() {
        let mut c = cone();
        c.knock_in(1.2);
        assert!((c.receptor - 1.6).abs() < 1e-12);
        assert!((c.ligand * c.receptor - KNOCK_IN_SIGNAL_PRODUCT).abs() < 1e-12);
        assert!(c.marked);
    }

    #[test]
    fn knock_in_to_zero_receptor_leaves_ligand() {
        let mut c = cone();
        c.knock_in(-0.4);
        assert_eq!(c.ligand, 0.6);
    }
}

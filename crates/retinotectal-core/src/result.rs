use crate::growth_cone::{GrowthCone, Position};
use crate::substrate::Substrate;
use serde::Serialize;
use std::time::Duration;

/// Final state of a finished run. Read-only.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    substrate: Substrate,
    growth_cones: Vec<GrowthCone>,
    steps: usize,
    accepted_steps: usize,
    elapsed: Duration,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GrowthConeSummary {
    pub id: u32,
    pub start_position: Position,
    pub final_position: Position,
    pub potential: f64,
    pub ligand: f64,
    pub receptor: f64,
    /// Accepted steps, not counting the seed entry.
    pub accepted_steps: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProjectionSummary {
    pub substrate_type: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub steps: usize,
    pub accepted_steps: usize,
    pub elapsed_ms: u64,
    pub growth_cones: Vec<GrowthConeSummary>,
}

impl SimulationResult {
    pub(crate) fn new(
        substrate: Substrate,
        growth_cones: Vec<GrowthCone>,
        steps: usize,
        accepted_steps: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            substrate,
            growth_cones,
            steps,
            accepted_steps,
            elapsed,
        }
    }

    pub fn substrate(&self) -> &Substrate {
        &self.substrate
    }

    pub fn growth_cones(&self) -> &[GrowthCone] {
        &self.growth_cones
    }

    pub fn growth_cone(&self, id: u32) -> Option<&GrowthCone> {
        self.growth_cones.iter().find(|c| c.id == id)
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn accepted_steps(&self) -> usize {
        self.accepted_steps
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Allocated substrate size as `(rows, cols)`.
    pub fn frame(&self) -> (usize, usize) {
        (self.substrate.rows(), self.substrate.cols())
    }

    /// `(final x, id)` per cone.
    pub fn projection_by_id(&self) -> Vec<(i32, f64)> {
        self.project(|c| c.id as f64)
    }

    /// `(final x, starting y)` per cone.
    pub fn projection_by_start_position(&self) -> Vec<(i32, f64)> {
        self.project(|c| c.start_position[1] as f64)
    }

    /// `(final x, id / 2)` per cone.
    pub fn projection_halved(&self) -> Vec<(i32, f64)> {
        self.project(|c| c.id as f64 / 2.0)
    }

    pub fn final_positions(&self) -> Vec<Position> {
        self.growth_cones.iter().map(|c| c.position).collect()
    }

    fn project(&self, axis: impl Fn(&GrowthCone) -> f64) -> Vec<(i32, f64)> {
        self.growth_cones
            .iter()
            .map(|c| (c.position[0], axis(c)))
            .collect()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let (rows, cols) = self.frame();
        ProjectionSummary {
            substrate_type: self.substrate.pattern().substrate_type().as_str(),
            rows,
            cols,
            steps: self.steps,
            accepted_steps: self.accepted_steps,
            elapsed_ms: self.elapsed.as_millis() as u64,
            growth_cones: self
                .growth_cones
                .iter()
                .map(|c| GrowthConeSummary {
                    id: c.id,
                    start_position: c.start_position,
                    final_position: c.position,
                    potential: c.potential,
                    ligand: c.ligand,
                    receptor: c.receptor,
                    accepted_steps: c.history().len().saturating_sub(1),
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (x, id): (Vec<i32>, Vec<f64>) = self.projection_by_id().into_iter().unzip();
        writeln!(f, "final x: {x:?}")?;
        write!(f, "id:      {id:?}")
    }
}

use crate::config::{SimConfig, SimConfigError, UpdateMode};
use crate::constants::MAX_GROWTH_CONES;
use crate::growth_cone::{GrowthCone, Position};
use crate::potential::{calculate_potential, Footprint};
use crate::result::SimulationResult;
use crate::rng::create_rng;
use crate::step_decision::StepProposer;
use crate::substrate::Substrate;
use rand_chacha::ChaCha12Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use std::{error::Error, fmt};
use tracing::{debug, info};

/// Per-step counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Cones that drew a proposal this step.
    pub proposed: usize,
    pub accepted: usize,
    /// Frozen cones, plus marked cones when `skip_marked` is set.
    pub skipped: usize,
    pub total_us: u64,
}

pub struct Simulation {
    substrate: Substrate,
    growth_cones: Vec<GrowthCone>,
    config: SimConfig,
    proposer: StepProposer,
    rng: ChaCha12Rng,
    /// What fiber-fiber queries read; see [`UpdateMode`] for when entries refresh.
    footprints: Vec<Footprint>,
    step_index: usize,
    accepted_steps: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(SimConfigError),
    NoGrowthCones,
    TooManyGrowthCones { max: usize, actual: usize },
    InvalidGrowthConeSize { id: u32, size: i32 },
    GrowthConeOutsideSubstrate { id: u32, position: Position },
    DuplicateGrowthConeId { id: u32 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "{}", e),
            SimulationError::NoGrowthCones => write!(f, "at least one growth cone is required"),
            SimulationError::TooManyGrowthCones { max, actual } => {
                write!(f, "growth cones ({actual}) exceed supported maximum ({max})")
            }
            SimulationError::InvalidGrowthConeSize { id, size } => {
                write!(f, "growth cone {id} has non-positive size {size}")
            }
            SimulationError::GrowthConeOutsideSubstrate { id, position } => write!(
                f,
                "growth cone {id} at {position:?} does not fit inside the substrate border"
            ),
            SimulationError::DuplicateGrowthConeId { id } => {
                write!(f, "growth cone id {id} is used more than once")
            }
        }
    }
}

impl From<SimConfigError> for SimulationError {
    fn from(err: SimConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl Simulation {
    /// Validate inputs and evaluate every cone's starting potential.
    pub fn new(
        substrate: Substrate,
        growth_cones: Vec<GrowthCone>,
        config: SimConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if growth_cones.is_empty() {
            return Err(SimulationError::NoGrowthCones);
        }
        if growth_cones.len() > MAX_GROWTH_CONES {
            return Err(SimulationError::TooManyGrowthCones {
                max: MAX_GROWTH_CONES,
                actual: growth_cones.len(),
            });
        }
        let mut ids = HashSet::with_capacity(growth_cones.len());
        for cone in &growth_cones {
            Self::check_placement(cone, &substrate)?;
            if !ids.insert(cone.id) {
                return Err(SimulationError::DuplicateGrowthConeId { id: cone.id });
            }
        }

        let proposer = StepProposer::new(config.x_step_p, config.y_step_p, config.step_size)?;
        let footprints = growth_cones.iter().map(GrowthCone::footprint).collect();
        let mut simulation = Self {
            substrate,
            growth_cones,
            rng: create_rng(config.seed),
            config,
            proposer,
            footprints,
            step_index: 0,
            accepted_steps: 0,
        };
        simulation.seed_potentials();
        Ok(simulation)
    }

    fn check_placement(cone: &GrowthCone, substrate: &Substrate) -> Result<(), SimulationError> {
        if cone.size <= 0 {
            return Err(SimulationError::InvalidGrowthConeSize {
                id: cone.id,
                size: cone.size,
            });
        }
        let fits = |v: i32, extent: usize| {
            let extent = extent as i64;
            let (v, size) = (v as i64, cone.size as i64);
            v >= size && v <= extent - 1 - size
        };
        let [x, y] = cone.position;
        if !fits(x, substrate.cols()) || !fits(y, substrate.rows()) {
            return Err(SimulationError::GrowthConeOutsideSubstrate {
                id: cone.id,
                position: cone.position,
            });
        }
        Ok(())
    }

    fn seed_potentials(&mut self) {
        for k in 0..self.growth_cones.len() {
            let cone = &self.growth_cones[k];
            let potential = calculate_potential(
                &self.substrate,
                &self.footprints,
                &cone.probe(k, cone.position),
                0,
                &self.config,
            );
            self.growth_cones[k].seed_potential(potential);
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn substrate(&self) -> &Substrate {
        &self.substrate
    }

    pub fn growth_cones(&self) -> &[GrowthCone] {
        &self.growth_cones
    }

    /// Number of steps already taken.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn accepted_steps(&self) -> usize {
        self.accepted_steps
    }

    /// Advance every cone by one propose/evaluate/decide cycle.
    pub fn step(&mut self) -> StepStats {
        let total_start = Instant::now();
        let step = self.step_index;
        let mut stats = StepStats::default();

        for k in 0..self.growth_cones.len() {
            if self.growth_cones[k].frozen {
                stats.skipped += 1;
                continue;
            }
            if self.config.adaptation_enabled {
                self.step_adaptation_phase(k);
            }
            if self.growth_cones[k].marked && self.config.skip_marked {
                stats.skipped += 1;
                continue;
            }
            stats.proposed += 1;
            if self.step_walk_phase(k, step) {
                stats.accepted += 1;
            }
        }
        if self.config.update_mode == UpdateMode::Synchronous {
            self.refresh_all_footprints();
        }

        self.step_index += 1;
        self.accepted_steps += stats.accepted;
        stats.total_us = total_start.elapsed().as_micros() as u64;
        stats
    }

    /// Run the remaining steps and hand back the final state.
    pub fn run(self) -> SimulationResult {
        self.run_inner(None)
    }

    /// Like [`Simulation::run`], publishing percent complete into `progress`.
    pub fn run_with_progress(self, progress: &AtomicU8) -> SimulationResult {
        self.run_inner(Some(progress))
    }

    fn run_inner(mut self, progress: Option<&AtomicU8>) -> SimulationResult {
        let started = Instant::now();
        let num_steps = self.config.num_steps;
        let interval = self.config.progress_interval_steps.max(1);
        info!(
            steps = num_steps,
            growth_cones = self.growth_cones.len(),
            substrate = self.substrate.pattern().substrate_type().as_str(),
            "simulation started"
        );

        while self.step_index < num_steps {
            if self.step_index.is_multiple_of(interval) {
                let percent = (self.step_index * 100 / num_steps) as u8;
                debug!(step = self.step_index, percent, "simulation progress");
                if let Some(progress) = progress {
                    progress.store(percent, Ordering::Relaxed);
                }
            }
            self.step();
        }
        if let Some(progress) = progress {
            progress.store(100, Ordering::Relaxed);
        }

        let elapsed = started.elapsed();
        info!(
            steps = self.step_index,
            accepted = self.accepted_steps,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation finished"
        );
        SimulationResult::new(
            self.substrate,
            self.growth_cones,
            self.step_index,
            self.accepted_steps,
            elapsed,
        )
    }
}

mod phases;
#[cfg(test)]
mod tests;

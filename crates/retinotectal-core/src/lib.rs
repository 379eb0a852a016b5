pub mod adaptation;
pub mod config;
pub mod constants;
pub mod factory;
pub mod growth_cone;
pub mod history;
pub mod potential;
pub mod result;
pub mod rng;
pub mod simulation;
pub mod step_decision;
pub mod substrate;

pub use config::{ExperimentConfig, SimConfig, SimConfigError, SubstrateType, UpdateMode};
pub use factory::build_simulation;
pub use growth_cone::{GrowthCone, Position};
pub use result::{ProjectionSummary, SimulationResult};
pub use simulation::{Simulation, SimulationError, StepStats};
pub use substrate::{Substrate, SubstratePattern};

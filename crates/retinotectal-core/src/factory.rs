//! Builds substrates, growth cone populations and simulations from
//! [`ExperimentConfig`].

use crate::config::{ExperimentConfig, GrowthConeConfig, KnockInConfig, SimConfigError, SubstrateConfig};
use crate::growth_cone::GrowthCone;
use crate::simulation::{Simulation, SimulationError};
use crate::substrate::{linspace, Substrate};

pub fn build_substrate(config: &SubstrateConfig, offset: usize) -> Result<Substrate, SimConfigError> {
    Substrate::from_config(config, offset)
}

/// `count` cones lined up along the left border, evenly spread over the
/// logical rows.
///
/// Receptor levels rise and ligand levels fall with the id, each following a
/// power curve between its configured bounds.
pub fn initialize_growth_cones(
    cones: &GrowthConeConfig,
    substrate: &SubstrateConfig,
) -> Result<Vec<GrowthCone>, SimConfigError> {
    cones.validate()?;
    let n = cones.count;
    let size = cones.size;
    let receptors = linspace(0.0, 1.0, n).into_iter().map(|t| {
        cones.receptor_min + t.powf(cones.receptor_steepness) * (cones.receptor_max - cones.receptor_min)
    });
    let ligands = linspace(1.0, 0.0, n).into_iter().map(|t| {
        cones.ligand_min + t.powf(cones.ligand_steepness) * (cones.ligand_max - cones.ligand_min)
    });
    let rows = linspace(size as f64, (substrate.rows as i64 - 1 + size as i64) as f64, n);

    Ok(receptors
        .zip(ligands)
        .zip(rows)
        .enumerate()
        .map(|(id, ((receptor, ligand), y))| {
            GrowthCone::new(id as u32, [size, y.floor() as i32], size, ligand, receptor)
        })
        .collect())
}

pub fn apply_knock_in(growth_cones: &mut [GrowthCone], knock_in: &KnockInConfig) {
    for cone in growth_cones
        .iter_mut()
        .filter(|c| knock_in.cone_ids.contains(&c.id))
    {
        cone.knock_in(knock_in.receptor_gain);
    }
}

pub fn build_simulation(config: &ExperimentConfig) -> Result<Simulation, SimulationError> {
    config.validate()?;
    let substrate = build_substrate(&config.substrate, config.growth_cones.size as usize)?;
    let mut growth_cones = initialize_growth_cones(&config.growth_cones, &config.substrate)?;
    if let Some(knock_in) = &config.knock_in {
        apply_knock_in(&mut growth_cones, knock_in);
    }
    Simulation::new(substrate, growth_cones, config.simulation.clone())
}

//! Guidance potential of a growth cone at a candidate position.
//!
//! Everything here is a pure function of its arguments: the substrate, the
//! footprints of the population and the probing cone's own signal levels.

use crate::adaptation::round_fixed;
use crate::config::SimConfig;
use crate::constants::{FF_COEF_EXPONENT_FLOOR, SIGNAL_FLOOR};
use crate::growth_cone::Position;
use crate::substrate::Substrate;
use std::f64::consts::PI;

/// What other growth cones see of a cone during fiber-fiber interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub position: Position,
    pub ligand: f64,
    pub receptor: f64,
}

/// Independent on/off switches for each term of the potential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalGates {
    pub forward: bool,
    pub reverse: bool,
    pub fiber_fiber: bool,
    pub fiber_target: bool,
    pub cis: bool,
}

impl SignalGates {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            forward: config.forward_sig,
            reverse: config.reverse_sig,
            fiber_fiber: config.ff_inter,
            fiber_target: config.ft_inter,
            cis: config.cis_inter,
        }
    }
}

/// Cone-side inputs of a potential evaluation.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    /// Index of the probing cone in the footprint slice; that entry is skipped.
    pub index: usize,
    pub position: Position,
    pub size: i32,
    pub ligand: f64,
    pub receptor: f64,
}

pub fn euclidean_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
}

fn as_point(position: Position) -> [f64; 2] {
    [position[0] as f64, position[1] as f64]
}

/// Overlap area of two disks of equal `radius` whose centers are `distance` apart.
pub fn intersection_area(distance: f64, radius: f64) -> f64 {
    if distance == 0.0 {
        return PI * radius * radius;
    }
    if distance >= 2.0 * radius {
        return 0.0;
    }
    let sector = radius * radius * (distance / (2.0 * radius)).acos();
    let triangle = 0.5 * distance * (4.0 * radius * radius - distance * distance).sqrt();
    2.0 * (sector - triangle)
}

/// Grid window around a position, clipped to the substrate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl BoundingBox {
    pub fn around(position: Position, size: i32, substrate: &Substrate) -> Self {
        let clip = |v: i64, upper: usize| v.clamp(0, upper as i64) as usize;
        let (x, y, size) = (position[0] as i64, position[1] as i64, size as i64);
        let max_col = substrate.cols().saturating_sub(1);
        let max_row = substrate.rows().saturating_sub(1);
        Self {
            x_min: clip(x - size, max_col),
            x_max: clip(x + size, max_col),
            y_min: clip(y - size, max_row),
            y_max: clip(y + size, max_row),
        }
    }

    /// Geometric center as `(row, col)`.
    fn center(&self) -> [f64; 2] {
        [
            (self.y_min + self.y_max) as f64 / 2.0,
            (self.x_min + self.x_max) as f64 / 2.0,
        ]
    }
}

/// Ligand and receptor summed over the substrate cells under the cone's disk.
///
/// Disk membership is measured from the center of the clipped bounding box
/// and the upper box edges are exclusive, so the sampled disk sits half a
/// cell up-left of the position and shrinks where the box is clipped.
pub fn ft_interaction(substrate: &Substrate, position: Position, size: i32) -> (f64, f64) {
    let bounds = BoundingBox::around(position, size, substrate);
    let center = bounds.center();
    let radius = bounds.y_max.abs_diff(bounds.y_min) as f64 / 2.0;

    let mut ligands = 0.0;
    let mut receptors = 0.0;
    for row in bounds.y_min..bounds.y_max {
        for col in bounds.x_min..bounds.x_max {
            if euclidean_distance(center, [row as f64, col as f64]) > radius {
                continue;
            }
            ligands += substrate.ligand(row, col);
            receptors += substrate.receptor(row, col);
        }
    }
    (ligands, receptors)
}

/// Overlap-weighted ligand and receptor of every other cone within reach.
pub fn ff_interaction(footprints: &[Footprint], probe: &Probe) -> (f64, f64) {
    let center = as_point(probe.position);
    let radius = probe.size as f64;
    footprints
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != probe.index)
        .fold((0.0, 0.0), |(ligands, receptors), (_, other)| {
            let d = euclidean_distance(as_point(other.position), center);
            if d >= radius * 2.0 {
                return (ligands, receptors);
            }
            let area = intersection_area(d, radius);
            (ligands + area * other.ligand, receptors + area * other.receptor)
        })
}

/// Gain of the fiber-fiber terms at `step`, ramping from ~0 toward `height`.
pub fn ff_coef(step: usize, num_steps: usize, steepness: f64, shift: f64, height: f64) -> f64 {
    let ratio = step as f64 / num_steps.max(1) as f64;
    let exponent = (ratio * shift).powf(steepness).max(FF_COEF_EXPONENT_FLOOR);
    height * (1.0 - (-exponent).exp())
}

/// Non-negative guidance potential for `probe` at `step`.
pub fn calculate_potential(
    substrate: &Substrate,
    footprints: &[Footprint],
    probe: &Probe,
    step: usize,
    config: &SimConfig,
) -> f64 {
    let gates = SignalGates::from_config(config);

    let (ft_ligands, ft_receptors) = if gates.fiber_target {
        ft_interaction(substrate, probe.position, probe.size)
    } else {
        (0.0, 0.0)
    };
    let (ff_ligands, ff_receptors, coef) = if gates.fiber_fiber {
        let (l, r) = ff_interaction(footprints, probe);
        let coef = ff_coef(
            step,
            config.num_steps,
            config.sigmoid_steepness,
            config.sigmoid_shift,
            config.sigmoid_height,
        );
        (l, r, coef)
    } else {
        (0.0, 0.0, 0.0)
    };
    let (cis_ligand, cis_receptor) = if gates.cis {
        (probe.ligand, probe.receptor)
    } else {
        (0.0, 0.0)
    };

    let forward = if gates.forward {
        round_fixed(probe.receptor * (ft_ligands + cis_ligand + coef * ff_ligands))
    } else {
        0.0
    };
    let reverse = if gates.reverse {
        round_fixed(probe.ligand * (ft_receptors + cis_receptor + coef * ff_receptors))
    } else {
        0.0
    };
    signal_asymmetry(forward, reverse)
}

/// `|ln(reverse) − ln(forward)|` with zero signals floored; 0 when both are zero.
pub fn signal_asymmetry(forward: f64, reverse: f64) -> f64 {
    if forward == 0.0 && reverse == 0.0 {
        return 0.0;
    }
    let floor = |v: f64| if v == 0.0 { SIGNAL_FLOOR } else { v };
    (floor(reverse).ln() - floor(forward).ln()).abs()
}

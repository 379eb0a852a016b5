use crate::config::SimConfigError;
use crate::growth_cone::Position;
use crate::substrate::Substrate;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::f64::consts::PI;

const DIRECTIONS: [i32; 3] = [-1, 0, 1];

/// Weighted categorical draw of a move on each axis.
///
/// Weights are relative: the x axis uses `[1 − p, 1 − p, p]` for `[−1, 0, +1]`
/// and the y axis `[p, 1 − p, p]`.
#[derive(Clone, Debug)]
pub struct StepProposer {
    x: WeightedIndex<f64>,
    y: WeightedIndex<f64>,
    step_size: i32,
}

impl StepProposer {
    pub fn new(x_step_p: f64, y_step_p: f64, step_size: i32) -> Result<Self, SimConfigError> {
        let x = WeightedIndex::new([1.0 - x_step_p, 1.0 - x_step_p, x_step_p])
            .map_err(|_| SimConfigError::InvalidXStepProbability)?;
        let y = WeightedIndex::new([y_step_p, 1.0 - y_step_p, y_step_p])
            .map_err(|_| SimConfigError::InvalidYStepProbability)?;
        Ok(Self { x, y, step_size })
    }

    /// Displacement `(dx, dy)`, each a multiple of the step size.
    pub fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, i32) {
        (
            DIRECTIONS[self.x.sample(rng)] * self.step_size,
            DIRECTIONS[self.y.sample(rng)] * self.step_size,
        )
    }
}

/// Keep the cone's disk clear of the substrate border on all four sides.
pub fn clamp_to_boundaries(
    position: Position,
    displacement: (i32, i32),
    substrate: &Substrate,
    size: i32,
) -> Position {
    let max_x = (substrate.cols() as i32 - 1 - size).max(size);
    let max_y = (substrate.rows() as i32 - 1 - size).max(size);
    [
        position[0].saturating_add(displacement.0).clamp(size, max_x),
        position[1].saturating_add(displacement.1).clamp(size, max_y),
    ]
}

/// Zero-centered normal density.
pub fn probabilistic_density(potential: f64, sigma: f64) -> f64 {
    (-potential * potential / (2.0 * sigma * sigma)).exp() / ((2.0 * PI).sqrt() * sigma)
}

/// Threshold the uniform draw must exceed for a step to be taken.
pub fn step_probability(old_density: f64, new_density: f64) -> f64 {
    let total = old_density + new_density;
    if total == 0.0 {
        0.5
    } else {
        old_density / total
    }
}

/// Accept when `force` is set, otherwise iff a uniform draw exceeds the threshold.
pub fn accept_step<R: Rng + ?Sized>(
    rng: &mut R,
    force: bool,
    old_potential: f64,
    new_potential: f64,
    sigma: f64,
) -> bool {
    if force {
        return true;
    }
    let threshold = step_probability(
        probabilistic_density(old_potential, sigma),
        probabilistic_density(new_potential, sigma),
    );
    rng.random::<f64>() > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use crate::substrate::SubstratePattern;

    fn substrate() -> Substrate {
        Substrate::new(10, 20, 3, SubstratePattern::linear_gradients(0.01, 0.99)).unwrap()
    }

    #[test]
    fn clamp_keeps_disk_inside_grid() {
        let s = substrate();
        assert_eq!(clamp_to_boundaries([3, 3], (-5, -5), &s, 3), [3, 3]);
        assert_eq!(clamp_to_boundaries([22, 12], (4, 4), &s, 3), [22, 12]);
        assert_eq!(clamp_to_boundaries([10, 8], (1, -1), &s, 3), [11, 7]);
    }

    #[test]
    fn huge_displacements_pin_to_the_border() {
        let s = substrate();
        assert_eq!(clamp_to_boundaries([10, 8], (i32::MAX, i32::MIN), &s, 3), [22, 3]);
        assert_eq!(clamp_to_boundaries([10, 8], (i32::MIN, i32::MAX), &s, 3), [3, 12]);

        let proposer = StepProposer::new(1.0, 1.0, i32::MAX).unwrap();
        let mut rng = create_rng(11);
        for _ in 0..50 {
            let next = clamp_to_boundaries([10, 8], proposer.propose(&mut rng), &s, 3);
            assert!((3..=22).contains(&next[0]) && (3..=12).contains(&next[1]));
        }
    }

    #[test]
    fn density_peaks_at_zero() {
        let sigma = 0.12;
        let peak = probabilistic_density(0.0, sigma);
        assert!((peak - 1.0 / ((2.0 * PI).sqrt() * sigma)).abs() < 1e-12);
        assert!(probabilistic_density(0.3, sigma) < peak);
        assert_eq!(probabilistic_density(0.3, sigma), probabilistic_density(-0.3, sigma));
    }

    #[test]
    fn vanishing_densities_default_to_even_odds() {
        assert_eq!(step_probability(0.0, 0.0), 0.5);
        assert_eq!(step_probability(1.0, 3.0), 0.25);
    }

    #[test]
    fn forced_steps_always_accept() {
        let mut rng = create_rng(1);
        for _ in 0..100 {
            assert!(accept_step(&mut rng, true, 0.0, 100.0, 0.12));
        }
    }

    #[test]
    fn lower_new_potential_is_accepted_more_often() {
        // threshold = old / (old + new): a high-density proposal lowers it
        let mut rng = create_rng(7);
        let trials = 2_000;
        let worse = (0..trials)
            .filter(|_| accept_step(&mut rng, false, 0.0, 0.2, 0.12))
            .count();
        let better = (0..trials)
            .filter(|_| accept_step(&mut rng, false, 0.2, 0.0, 0.12))
            .count();
        assert!(better > worse);
    }

    #[test]
    fn proposals_follow_relative_weights() {
        let proposer = StepProposer::new(0.9, 0.0, 2).unwrap();
        let mut rng = create_rng(3);
        let mut forward = 0;
        for _ in 0..1_000 {
            let (dx, dy) = proposer.propose(&mut rng);
            assert!([-2, 0, 2].contains(&dx));
            assert_eq!(dy, 0);
            if dx == 2 {
                forward += 1;
            }
        }
        // weights 0.1 : 0.1 : 0.9
        assert!(forward > 700, "forward moves: {forward}");
    }

    #[test]
    fn invalid_weights_are_rejected() {
        assert!(StepProposer::new(0.5, 0.0, 1).is_ok());
        assert_eq!(
            StepProposer::new(f64::NAN, 0.5, 1).unwrap_err(),
            SimConfigError::InvalidXStepProbability
        );
    }
}

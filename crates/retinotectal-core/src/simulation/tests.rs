use super::*;
use crate::substrate::SubstratePattern;

fn make_substrate(rows: usize, cols: usize, offset: usize) -> Substrate {
    Substrate::new(rows, cols, offset, SubstratePattern::linear_gradients(0.01, 0.99)).unwrap()
}

fn make_cones(count: usize, size: i32, rows: usize) -> Vec<GrowthCone> {
    (0..count)
        .map(|i| {
            let y = size + (i * (rows - 1) / count.max(1)) as i32;
            let t = i as f64 / count as f64;
            GrowthCone::new(i as u32, [size, y], size, 1.0 - t * 0.9, 0.1 + t * 0.9)
        })
        .collect()
}

fn make_simulation(count: usize, config: SimConfig) -> Simulation {
    Simulation::new(make_substrate(20, 30, 3), make_cones(count, 3, 20), config).unwrap()
}

fn small_config(num_steps: usize) -> SimConfig {
    SimConfig {
        num_steps,
        adaptation_history: 5,
        ..SimConfig::default()
    }
}

fn assert_lockstep(cone: &GrowthCone) {
    let h = cone.history();
    let n = h.len();
    assert_eq!(h.adaptation_coefficient().len(), n);
    assert_eq!(h.position().len(), n);
    assert_eq!(h.ligand().len(), n);
    assert_eq!(h.receptor().len(), n);
    assert_eq!(h.reset_force_ligand().len(), n);
    assert_eq!(h.reset_force_receptor().len(), n);
}

#[test]
fn construction_seeds_potentials_into_history() {
    let sim = make_simulation(4, small_config(10));
    for cone in sim.growth_cones() {
        assert_eq!(cone.history().len(), 1);
        assert_eq!(cone.history().potential()[0], cone.potential);
        assert!(cone.potential.is_finite() && cone.potential >= 0.0);
    }
    assert_eq!(sim.step_index(), 0);
}

#[test]
fn history_grows_only_on_accepted_steps() {
    let sim = make_simulation(5, small_config(200));
    let result = sim.run();
    let mut accepted = 0;
    for cone in result.growth_cones() {
        assert_lockstep(cone);
        accepted += cone.history().len() - 1;
    }
    assert_eq!(accepted, result.accepted_steps());
    assert_eq!(result.steps(), 200);
}

#[test]
fn forced_run_accepts_every_proposal() {
    let config = SimConfig {
        force: true,
        adaptation_enabled: false,
        ..small_config(50)
    };
    let result = make_simulation(3, config).run();
    assert_eq!(result.accepted_steps(), 150);
    for cone in result.growth_cones() {
        assert_eq!(cone.history().len(), 51);
        assert_lockstep(cone);
    }
}

#[test]
fn frozen_cones_never_change() {
    let mut cones = make_cones(3, 3, 20);
    cones[1] = cones[1].clone().frozen(true);
    let config = SimConfig {
        force: true,
        ..small_config(100)
    };
    let mut sim = Simulation::new(make_substrate(20, 30, 3), cones, config).unwrap();
    let before = sim.growth_cones()[1].clone();
    for _ in 0..100 {
        let stats = sim.step();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.proposed, 2);
    }
    let after = &sim.growth_cones()[1];
    assert_eq!(after.position, before.position);
    assert_eq!(after.history().len(), before.history().len());
    assert_eq!(after.ligand, before.ligand);
}

#[test]
fn skipped_marked_cones_adapt_but_stay_put() {
    let mut cones = make_cones(2, 3, 20);
    cones[0] = cones[0].clone().marked(true);
    let config = SimConfig {
        force: true,
        skip_marked: true,
        adaptation_enabled: true,
        adaptation_mu: 0.5,
        adaptation_history: 1,
        ..small_config(20)
    };
    let mut sim = Simulation::new(make_substrate(20, 30, 3), cones, config).unwrap();
    let start = sim.growth_cones()[0].clone();
    assert!(start.potential > 0.0);
    let stats = sim.step();
    assert_eq!(stats.skipped, 1);
    let marked = &sim.growth_cones()[0];
    assert_eq!(marked.position, start.position);
    assert_eq!(marked.history().len(), 1);
    assert!(marked.adaptation_coefficient > 1.0);
    assert_ne!(marked.receptor, start.receptor);
}

#[test]
fn marked_cones_move_unless_skipped() {
    let mut cones = make_cones(2, 3, 20);
    cones[0] = cones[0].clone().marked(true);
    let config = SimConfig {
        force: true,
        x_step_p: 1.0,
        ..small_config(5)
    };
    let mut sim = Simulation::new(make_substrate(20, 30, 3), cones, config).unwrap();
    let stats = sim.step();
    assert_eq!(stats.proposed, 2);
    assert_eq!(sim.growth_cones()[0].position[0], 4);
}

#[test]
fn positions_respect_border() {
    let config = SimConfig {
        force: true,
        step_size: 3,
        ..small_config(300)
    };
    let sim = make_simulation(6, config);
    let (rows, cols) = (sim.substrate().rows() as i32, sim.substrate().cols() as i32);
    let result = sim.run();
    for cone in result.growth_cones() {
        for &[x, y] in cone.history().position() {
            assert!((3..=cols - 4).contains(&x), "x = {x}");
            assert!((3..=rows - 4).contains(&y), "y = {y}");
        }
    }
}

#[test]
fn identical_seeds_reproduce_runs() {
    let a = make_simulation(5, small_config(150)).run();
    let b = make_simulation(5, small_config(150)).run();
    assert_eq!(a.final_positions(), b.final_positions());
    assert_eq!(a.accepted_steps(), b.accepted_steps());

    let c = make_simulation(
        5,
        SimConfig {
            seed: 7,
            ..small_config(150)
        },
    )
    .run();
    let histories = |r: &SimulationResult| {
        r.growth_cones()
            .iter()
            .map(|c| c.history().position().to_vec())
            .collect::<Vec<_>>()
    };
    assert_ne!(histories(&a), histories(&c));
}

#[test]
fn sequential_mode_publishes_moves_immediately() {
    let config = SimConfig {
        force: true,
        x_step_p: 1.0,
        ..small_config(5)
    };
    let mut sim = make_simulation(2, config);
    assert!(sim.step_walk_phase(0, 0));
    assert_eq!(sim.footprints[0].position, sim.growth_cones[0].position);
    assert_eq!(sim.footprints[0].position[0], 4);
}

#[test]
fn synchronous_mode_defers_moves_to_end_of_step() {
    let config = SimConfig {
        force: true,
        x_step_p: 1.0,
        update_mode: UpdateMode::Synchronous,
        ..small_config(5)
    };
    let mut sim = make_simulation(2, config);
    assert!(sim.step_walk_phase(0, 0));
    assert_eq!(sim.growth_cones[0].position[0], 4);
    assert_eq!(sim.footprints[0].position[0], 3);

    sim.step();
    for (footprint, cone) in sim.footprints.iter().zip(sim.growth_cones()) {
        assert_eq!(footprint.position, cone.position);
    }
}

#[test]
fn progress_counter_reaches_completion() {
    let progress = AtomicU8::new(0);
    let config = SimConfig {
        progress_interval_steps: 10,
        ..small_config(40)
    };
    let result = make_simulation(2, config).run_with_progress(&progress);
    assert_eq!(progress.load(Ordering::Relaxed), 100);
    assert_eq!(result.steps(), 40);
}

#[test]
fn step_reports_counts() {
    let mut sim = make_simulation(4, small_config(10));
    let stats = sim.step();
    assert_eq!(stats.proposed + stats.skipped, 4);
    assert!(stats.accepted <= stats.proposed);
    assert_eq!(sim.step_index(), 1);
    assert_eq!(sim.accepted_steps(), stats.accepted);
}

#[test]
fn new_rejects_empty_population() {
    assert_eq!(
        Simulation::new(make_substrate(10, 10, 3), Vec::new(), SimConfig::default()).err(),
        Some(SimulationError::NoGrowthCones)
    );
}

#[test]
fn new_rejects_duplicate_ids() {
    let cones = vec![
        GrowthCone::new(1, [3, 3], 3, 0.5, 0.5),
        GrowthCone::new(1, [3, 6], 3, 0.5, 0.5),
    ];
    assert_eq!(
        Simulation::new(make_substrate(10, 10, 3), cones, SimConfig::default()).err(),
        Some(SimulationError::DuplicateGrowthConeId { id: 1 })
    );
}

#[test]
fn new_rejects_cone_overlapping_border() {
    let cones = vec![GrowthCone::new(2, [2, 5], 3, 0.5, 0.5)];
    assert_eq!(
        Simulation::new(make_substrate(10, 10, 3), cones, SimConfig::default()).err(),
        Some(SimulationError::GrowthConeOutsideSubstrate {
            id: 2,
            position: [2, 5]
        })
    );
}

#[test]
fn new_rejects_non_positive_size() {
    let cones = vec![GrowthCone::new(0, [3, 3], 0, 0.5, 0.5)];
    assert!(matches!(
        Simulation::new(make_substrate(10, 10, 3), cones, SimConfig::default()),
        Err(SimulationError::InvalidGrowthConeSize { id: 0, size: 0 })
    ));
}

#[test]
fn new_returns_config_errors() {
    let config = SimConfig {
        sigma: 0.0,
        ..SimConfig::default()
    };
    let err = Simulation::new(make_substrate(10, 10, 3), make_cones(1, 3, 10), config)
        .err()
        .unwrap();
    assert_eq!(err, SimulationError::Config(SimConfigError::InvalidSigma));
    assert!(std::error::Error::source(&err).is_some());
}

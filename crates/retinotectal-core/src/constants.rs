/// Largest accepted substrate dimension (cells, per axis, before the border).
pub const MAX_SUBSTRATE_DIM: usize = 4096;

/// Largest growth cone population a single run accepts.
/// Fiber-fiber interaction is O(n²) per step.
pub const MAX_GROWTH_CONES: usize = 10_000;

/// Substituted for an exactly-zero forward or reverse signal before taking its logarithm.
pub const SIGNAL_FLOOR: f64 = 1e-4;

/// Lower clip applied to the sigmoid ramp exponent so `exp(-x)` never sees zero.
pub const FF_COEF_EXPONENT_FLOOR: f64 = 1e-10;

/// Decimal digits kept by adapted ligand/receptor levels and the adaptation coefficient.
pub const ADAPTATION_DECIMALS: usize = 6;

/// Product of ligand and receptor levels kept constant by a knock-in mutation.
pub const KNOCK_IN_SIGNAL_PRODUCT: f64 = 0.35;

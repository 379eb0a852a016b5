use crate::substrate::SubstratePattern;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How fiber-fiber reads interleave with commits inside one global step.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Cones are visited in list order and later cones see earlier commits (Gauss-Seidel).
    #[default]
    Sequential,
    /// Every cone reads the footprints frozen at the start of the step (Jacobi).
    Synchronous,
}

/// One of the two signal channels carried by substrate cells and growth cones.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Ligand,
    Receptor,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubstrateType {
    ContinuousGradients,
    Wedges,
    Stripe,
    Gap,
    GapInv,
}

impl SubstrateType {
    pub const ALL: [SubstrateType; 5] = [
        SubstrateType::ContinuousGradients,
        SubstrateType::Wedges,
        SubstrateType::Stripe,
        SubstrateType::Gap,
        SubstrateType::GapInv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SubstrateType::ContinuousGradients => "continuous_gradients",
            SubstrateType::Wedges => "wedges",
            SubstrateType::Stripe => "stripe",
            SubstrateType::Gap => "gap",
            SubstrateType::GapInv => "gap_inv",
        }
    }
}

impl FromStr for SubstrateType {
    type Err = SimConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| SimConfigError::UnknownSubstrateType {
                name: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for step proposals and acceptance draws.
    pub seed: u64,
    /// Number of global iterations; every unfrozen cone gets one proposal per iteration.
    pub num_steps: usize,
    /// Cells moved per axis by an accepted proposal.
    pub step_size: i32,
    /// Relative weight of a +x move; -x and 0 both get `1 - x_step_p`.
    pub x_step_p: f64,
    /// Relative weight of both ±y moves; 0 gets `1 - y_step_p`.
    pub y_step_p: f64,
    /// Exponent of the fiber-fiber activation ramp.
    pub sigmoid_steepness: f64,
    /// Time scaling of the ramp; large values activate fiber-fiber interaction immediately.
    pub sigmoid_shift: f64,
    /// Plateau of the ramp.
    pub sigmoid_height: f64,
    /// Standard deviation of the zero-centered density used by the acceptance rule.
    pub sigma: f64,
    /// Accept every proposal without the probability test.
    pub force: bool,
    /// Gate for the forward (receptor x ligand exposure) signal.
    pub forward_sig: bool,
    /// Gate for the reverse (ligand x receptor exposure) signal.
    pub reverse_sig: bool,
    /// Gate for growth cone to growth cone overlap signals.
    pub ff_inter: bool,
    /// Gate for substrate exposure signals.
    pub ft_inter: bool,
    /// Gate for the cone's own ligand/receptor term.
    pub cis_inter: bool,
    pub adaptation_enabled: bool,
    /// Gain on the recency-weighted potential mean (μ).
    pub adaptation_mu: f64,
    /// Spring constant pulling signal levels back toward baseline (λ).
    pub adaptation_lambda: f64,
    /// Trailing window of accepted potentials feeding the adaptation coefficient.
    pub adaptation_history: usize,
    pub update_mode: UpdateMode,
    /// Marked cones still adapt but never propose a move.
    pub skip_marked: bool,
    /// Step interval between progress counter updates and progress log lines.
    pub progress_interval_steps: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_steps: 5000,
            step_size: 1,
            x_step_p: 0.55,
            y_step_p: 0.50,
            sigmoid_steepness: 4.0,
            sigmoid_shift: 3.0,
            sigmoid_height: 1.0,
            sigma: 0.12,
            force: false,
            forward_sig: true,
            reverse_sig: true,
            ff_inter: true,
            ft_inter: true,
            cis_inter: true,
            adaptation_enabled: true,
            adaptation_mu: 0.01,
            adaptation_lambda: 0.0045,
            adaptation_history: 50,
            update_mode: UpdateMode::Sequential,
            skip_marked: false,
            progress_interval_steps: 250,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubstrateConfig {
    /// Logical row count; the allocated grid adds the growth cone size on both sides.
    pub rows: usize,
    /// Logical column count; the allocated grid adds the growth cone size on both sides.
    pub cols: usize,
    pub pattern: SubstratePattern,
}

impl Default for SubstrateConfig {
    fn default() -> Self {
        Self::preset(SubstrateType::ContinuousGradients)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrowthConeConfig {
    pub count: usize,
    /// Radius in cells. Also used as the substrate border width.
    pub size: i32,
    pub receptor_min: f64,
    pub receptor_max: f64,
    pub receptor_steepness: f64,
    pub ligand_min: f64,
    pub ligand_max: f64,
    pub ligand_steepness: f64,
}

impl Default for GrowthConeConfig {
    fn default() -> Self {
        Self {
            count: 15,
            size: 3,
            receptor_min: 0.01,
            receptor_max: 2.99,
            receptor_steepness: 1.5,
            ligand_min: 0.01,
            ligand_max: 2.99,
            ligand_steepness: 1.5,
        }
    }
}

/// Receptor knock-in applied to selected cones before the run starts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnockInConfig {
    pub cone_ids: Vec<u32>,
    pub receptor_gain: f64,
}

impl Default for KnockInConfig {
    fn default() -> Self {
        Self {
            cone_ids: Vec::new(),
            receptor_gain: 1.2,
        }
    }
}

/// Everything needed to build a substrate, a population, and a simulation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub simulation: SimConfig,
    pub substrate: SubstrateConfig,
    pub growth_cones: GrowthConeConfig,
    pub knock_in: Option<KnockInConfig>,
}

impl SubstrateConfig {
    pub fn preset(kind: SubstrateType) -> Self {
        let (rows, cols, pattern) = match kind {
            SubstrateType::ContinuousGradients => (
                100,
                100,
                SubstratePattern::linear_gradients(0.01, 1.0),
            ),
            SubstrateType::Wedges => (
                96,
                96,
                SubstratePattern::Wedges {
                    narrow_edge: 1,
                    wide_edge: 12,
                },
            ),
            SubstrateType::Stripe => (
                150,
                150,
                SubstratePattern::Stripe {
                    stripe_width: 12,
                    forward: true,
                    reverse: true,
                    concentration: 1.0,
                },
            ),
            SubstrateType::Gap => (
                96,
                96,
                SubstratePattern::Gap {
                    begin: 0.5,
                    end: 0.1,
                    first_block: SignalKind::Ligand,
                    second_block: SignalKind::Receptor,
                },
            ),
            SubstrateType::GapInv => (46, 166, SubstratePattern::GapInv { begin: 0.4, end: 0.3 }),
        };
        Self {
            rows,
            cols,
            pattern,
        }
    }
}

impl ExperimentConfig {
    /// Reference experiment for each substrate type.
    pub fn preset(kind: SubstrateType) -> Self {
        let base = SimConfig::default();
        let cones = GrowthConeConfig::default();
        let (simulation, growth_cones) = match kind {
            SubstrateType::ContinuousGradients => (base, cones),
            SubstrateType::Wedges | SubstrateType::Stripe => (
                SimConfig {
                    num_steps: 8000,
                    adaptation_enabled: false,
                    ..base
                },
                GrowthConeConfig {
                    count: 10,
                    size: 10,
                    ..cones
                },
            ),
            SubstrateType::Gap | SubstrateType::GapInv => (
                SimConfig {
                    num_steps: 8000,
                    step_size: 2,
                    ..base
                },
                GrowthConeConfig {
                    count: 5,
                    size: 5,
                    ..cones
                },
            ),
        };
        Self {
            simulation,
            substrate: SubstrateConfig::preset(kind),
            growth_cones,
            knock_in: None,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidNumSteps => "num_steps must be greater than 0";
    TooManySteps { max: usize, actual: usize } => "num_steps ({actual}) exceeds supported maximum ({max})";
    InvalidStepSize => "step_size must be non-negative";
    InvalidXStepProbability => "x_step_p must be finite and within [0,1]";
    InvalidYStepProbability => "y_step_p must be finite and within [0,1]";
    InvalidSigmoidSteepness => "sigmoid_steepness must be finite and non-negative";
    InvalidSigmoidShift => "sigmoid_shift must be finite and non-negative";
    InvalidSigmoidHeight => "sigmoid_height must be finite and non-negative";
    InvalidSigma => "sigma must be positive and finite";
    InvalidAdaptationMu => "adaptation_mu must be finite and non-negative";
    InvalidAdaptationLambda => "adaptation_lambda must be finite and non-negative";
    InvalidAdaptationHistory => "adaptation_history must be positive when adaptation is enabled";
    InvalidProgressInterval => "progress_interval_steps must be positive";
    InvalidSubstrateDimensions => "substrate rows and cols must be greater than 0";
    SubstrateTooLarge { max: usize, actual: usize } => "substrate dimension ({actual}) exceeds supported maximum ({max})";
    InvalidGradientSignal => "continuous gradient ligand/receptor bounds must be finite, non-negative, and ordered";
    InvalidGradientSteepness => "continuous gradient steepness must be finite and positive";
    InvalidWedgeEdges => "wide_edge must be positive";
    InvalidStripeWidth => "stripe_width must be positive";
    InvalidStripeConcentration => "concentration must be finite and non-negative";
    InvalidGapFractions => "gap begin/end must be finite, within [0,1], and sum to at most 1";
    UnknownSubstrateType { name: String } => "unknown substrate type: {name}";
    InvalidGrowthConeCount => "growth cone count must be greater than 0";
    TooManyGrowthCones { max: usize, actual: usize } => "Too many growth cones: {} > max {}", actual, max;
    InvalidGrowthConeSize => "growth cone size must be greater than 0";
    InvalidGrowthConeSignalRange => "growth cone ligand/receptor bounds must be finite, non-negative, and ordered";
    InvalidGrowthConeSteepness => "growth cone gradient steepness must be finite and positive";
    InvalidKnockInGain => "knock_in receptor_gain must be finite";
    UnknownKnockInCone { id: u32 } => "knock_in references unknown growth cone id {id}";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_STEPS: usize = 10_000_000;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_steps()?;
        self.validate_walk()?;
        self.validate_sigmoid()?;
        self.validate_adaptation()?;
        Ok(())
    }

    fn validate_steps(&self) -> Result<(), SimConfigError> {
        if self.num_steps == 0 {
            return Err(SimConfigError::InvalidNumSteps);
        }
        if self.num_steps > Self::MAX_STEPS {
            return Err(SimConfigError::TooManySteps {
                max: Self::MAX_STEPS,
                actual: self.num_steps,
            });
        }
        if self.progress_interval_steps == 0 {
            return Err(SimConfigError::InvalidProgressInterval);
        }
        Ok(())
    }

    fn validate_walk(&self) -> Result<(), SimConfigError> {
        if self.step_size < 0 {
            return Err(SimConfigError::InvalidStepSize);
        }
        if !(self.x_step_p.is_finite() && (0.0..=1.0).contains(&self.x_step_p)) {
            return Err(SimConfigError::InvalidXStepProbability);
        }
        if !(self.y_step_p.is_finite() && (0.0..=1.0).contains(&self.y_step_p)) {
            return Err(SimConfigError::InvalidYStepProbability);
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(SimConfigError::InvalidSigma);
        }
        Ok(())
    }

    fn validate_sigmoid(&self) -> Result<(), SimConfigError> {
        if !(self.sigmoid_steepness.is_finite() && self.sigmoid_steepness >= 0.0) {
            return Err(SimConfigError::InvalidSigmoidSteepness);
        }
        if !(self.sigmoid_shift.is_finite() && self.sigmoid_shift >= 0.0) {
            return Err(SimConfigError::InvalidSigmoidShift);
        }
        if !(self.sigmoid_height.is_finite() && self.sigmoid_height >= 0.0) {
            return Err(SimConfigError::InvalidSigmoidHeight);
        }
        Ok(())
    }

    fn validate_adaptation(&self) -> Result<(), SimConfigError> {
        if !(self.adaptation_mu.is_finite() && self.adaptation_mu >= 0.0) {
            return Err(SimConfigError::InvalidAdaptationMu);
        }
        if !(self.adaptation_lambda.is_finite() && self.adaptation_lambda >= 0.0) {
            return Err(SimConfigError::InvalidAdaptationLambda);
        }
        if self.adaptation_enabled && self.adaptation_history == 0 {
            return Err(SimConfigError::InvalidAdaptationHistory);
        }
        Ok(())
    }
}

impl SubstrateConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(SimConfigError::InvalidSubstrateDimensions);
        }
        let largest = self.rows.max(self.cols);
        if largest > crate::constants::MAX_SUBSTRATE_DIM {
            return Err(SimConfigError::SubstrateTooLarge {
                max: crate::constants::MAX_SUBSTRATE_DIM,
                actual: largest,
            });
        }
        self.pattern.validate()
    }
}

impl GrowthConeConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.count == 0 {
            return Err(SimConfigError::InvalidGrowthConeCount);
        }
        if self.count > crate::constants::MAX_GROWTH_CONES {
            return Err(SimConfigError::TooManyGrowthCones {
                max: crate::constants::MAX_GROWTH_CONES,
                actual: self.count,
            });
        }
        if self.size <= 0 {
            return Err(SimConfigError::InvalidGrowthConeSize);
        }
        let bounds_ok = |min: f64, max: f64| {
            min.is_finite() && max.is_finite() && min >= 0.0 && min <= max
        };
        if !(bounds_ok(self.receptor_min, self.receptor_max)
            && bounds_ok(self.ligand_min, self.ligand_max))
        {
            return Err(SimConfigError::InvalidGrowthConeSignalRange);
        }
        if !(self.receptor_steepness.is_finite()
            && self.receptor_steepness > 0.0
            && self.ligand_steepness.is_finite()
            && self.ligand_steepness > 0.0)
        {
            return Err(SimConfigError::InvalidGrowthConeSteepness);
        }
        Ok(())
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.simulation.validate()?;
        self.substrate.validate()?;
        self.growth_cones.validate()?;
        if let Some(knock_in) = &self.knock_in {
            if !knock_in.receptor_gain.is_finite() {
                return Err(SimConfigError::InvalidKnockInGain);
            }
            if let Some(&id) = knock_in
                .cone_ids
                .iter()
                .find(|&&id| id as usize >= self.growth_cones.count)
            {
                return Err(SimConfigError::UnknownKnockInCone { id });
            }
        }
        Ok(())
    }
}

//! 2D target tissue holding a ligand and a receptor concentration per cell.
//!
//! The grid is allocated with a border of `offset` cells on every side (the
//! growth cone radius) so disk queries around any clamped position stay
//! inside the array. Cells are stored row-major; `row` is the y axis and
//! `col` the x axis.

use crate::config::{SignalKind, SimConfigError, SubstrateConfig, SubstrateType};
use serde::{Deserialize, Serialize};

fn default_gradient_min() -> f64 {
    0.01
}

fn default_gradient_max() -> f64 {
    1.0
}

fn default_gradient_steepness() -> f64 {
    1.0
}

fn default_narrow_edge() -> usize {
    1
}

fn default_wide_edge() -> usize {
    12
}

fn default_stripe_width() -> usize {
    12
}

fn default_true() -> bool {
    true
}

fn default_concentration() -> f64 {
    1.0
}

fn default_gap_begin() -> f64 {
    0.4
}

fn default_gap_end() -> f64 {
    0.2
}

fn default_first_block() -> SignalKind {
    SignalKind::Ligand
}

fn default_second_block() -> SignalKind {
    SignalKind::Receptor
}

/// Fill pattern selected by `substrate_type`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "substrate_type", rename_all = "snake_case")]
pub enum SubstratePattern {
    /// Ligand rises from `ligand_min` to `ligand_max` along x and receptor
    /// falls from `receptor_max` to `receptor_min`. Each ramp follows
    /// `min + t^steepness * (max - min)` with `t` spaced evenly over `[0, 1]`.
    ContinuousGradients {
        #[serde(default = "default_gradient_min")]
        receptor_min: f64,
        #[serde(default = "default_gradient_min")]
        ligand_min: f64,
        #[serde(default = "default_gradient_max")]
        receptor_max: f64,
        #[serde(default = "default_gradient_max")]
        ligand_max: f64,
        #[serde(default = "default_gradient_steepness")]
        receptor_steepness: f64,
        #[serde(default = "default_gradient_steepness")]
        ligand_steepness: f64,
    },
    /// Row-periodic receptor triangles on a ligand background.
    Wedges {
        #[serde(default = "default_narrow_edge")]
        narrow_edge: usize,
        #[serde(default = "default_wide_edge")]
        wide_edge: usize,
    },
    /// Alternating row bands: even bands ligand, odd bands receptor.
    Stripe {
        #[serde(default = "default_stripe_width")]
        stripe_width: usize,
        #[serde(default = "default_true")]
        forward: bool,
        #[serde(default = "default_true")]
        reverse: bool,
        #[serde(default = "default_concentration")]
        concentration: f64,
    },
    /// Signal block, empty gap, signal block along x.
    Gap {
        #[serde(default = "default_gap_begin")]
        begin: f64,
        #[serde(default = "default_gap_end")]
        end: f64,
        #[serde(default = "default_first_block")]
        first_block: SignalKind,
        #[serde(default = "default_second_block")]
        second_block: SignalKind,
    },
    /// Only the gap carries receptor; both outer blocks stay empty.
    GapInv {
        #[serde(default = "default_gap_begin")]
        begin: f64,
        #[serde(default = "default_gap_end")]
        end: f64,
    },
}

impl SubstratePattern {
    /// Linear continuous gradient with the same bounds for both channels.
    pub fn linear_gradients(min: f64, max: f64) -> Self {
        SubstratePattern::ContinuousGradients {
            receptor_min: min,
            ligand_min: min,
            receptor_max: max,
            ligand_max: max,
            receptor_steepness: 1.0,
            ligand_steepness: 1.0,
        }
    }

    pub fn substrate_type(&self) -> SubstrateType {
        match self {
            SubstratePattern::ContinuousGradients { .. } => SubstrateType::ContinuousGradients,
            SubstratePattern::Wedges { .. } => SubstrateType::Wedges,
            SubstratePattern::Stripe { .. } => SubstrateType::Stripe,
            SubstratePattern::Gap { .. } => SubstrateType::Gap,
            SubstratePattern::GapInv { .. } => SubstrateType::GapInv,
        }
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        match *self {
            SubstratePattern::ContinuousGradients {
                receptor_min,
                ligand_min,
                receptor_max,
                ligand_max,
                receptor_steepness,
                ligand_steepness,
            } => {
                let bounds_ok = |min: f64, max: f64| {
                    min.is_finite() && max.is_finite() && min >= 0.0 && min <= max
                };
                if !bounds_ok(receptor_min, receptor_max) || !bounds_ok(ligand_min, ligand_max) {
                    return Err(SimConfigError::InvalidGradientSignal);
                }
                let steepness_ok = |v: f64| v.is_finite() && v > 0.0;
                if !(steepness_ok(receptor_steepness) && steepness_ok(ligand_steepness)) {
                    return Err(SimConfigError::InvalidGradientSteepness);
                }
            }
            SubstratePattern::Wedges { wide_edge, .. } => {
                if wide_edge == 0 {
                    return Err(SimConfigError::InvalidWedgeEdges);
                }
            }
            SubstratePattern::Stripe {
                stripe_width,
                concentration,
                ..
            } => {
                if stripe_width == 0 {
                    return Err(SimConfigError::InvalidStripeWidth);
                }
                if !(concentration.is_finite() && concentration >= 0.0) {
                    return Err(SimConfigError::InvalidStripeConcentration);
                }
            }
            SubstratePattern::Gap { begin, end, .. } | SubstratePattern::GapInv { begin, end } => {
                let fraction_ok = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
                if !(fraction_ok(begin) && fraction_ok(end) && begin + end <= 1.0) {
                    return Err(SimConfigError::InvalidGapFractions);
                }
            }
        }
        Ok(())
    }

    fn fill(&self, grid: &mut Substrate) {
        match *self {
            SubstratePattern::ContinuousGradients {
                receptor_min,
                ligand_min,
                receptor_max,
                ligand_max,
                receptor_steepness,
                ligand_steepness,
            } => grid.fill_continuous(
                Ramp::new(ligand_min, ligand_max, ligand_steepness),
                Ramp::new(receptor_min, receptor_max, receptor_steepness),
            ),
            SubstratePattern::Wedges {
                narrow_edge,
                wide_edge,
            } => grid.fill_wedges(narrow_edge, wide_edge),
            SubstratePattern::Stripe {
                stripe_width,
                forward,
                reverse,
                concentration,
            } => grid.fill_stripes(stripe_width, forward, reverse, concentration),
            SubstratePattern::Gap {
                begin,
                end,
                first_block,
                second_block,
            } => grid.fill_gap(begin, end, first_block, second_block),
            SubstratePattern::GapInv { begin, end } => grid.fill_inverted_gap(begin, end),
        }
    }
}

/// `n` evenly spaced samples from `start` to `end`, both included.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Power-curve profile between two signal levels.
#[derive(Clone, Copy, Debug)]
struct Ramp {
    min: f64,
    max: f64,
    steepness: f64,
}

impl Ramp {
    fn new(min: f64, max: f64, steepness: f64) -> Self {
        Self { min, max, steepness }
    }

    /// Samples at `t` running from `from` to `to` in `n` even steps.
    fn sample(&self, from: f64, to: f64, n: usize) -> Vec<f64> {
        linspace(from, to, n)
            .into_iter()
            .map(|t| self.min + t.powf(self.steepness) * (self.max - self.min))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct Substrate {
    rows: usize,
    cols: usize,
    offset: usize,
    pattern: SubstratePattern,
    ligands: Vec<f64>,
    receptors: Vec<f64>,
}

impl Substrate {
    /// Allocate a `(rows + 2·offset) × (cols + 2·offset)` grid and fill it once.
    pub fn new(
        rows: usize,
        cols: usize,
        offset: usize,
        pattern: SubstratePattern,
    ) -> Result<Self, SimConfigError> {
        SubstrateConfig {
            rows,
            cols,
            pattern: pattern.clone(),
        }
        .validate()?;
        let total_rows = rows + offset * 2;
        let total_cols = cols + offset * 2;
        let mut substrate = Self {
            rows: total_rows,
            cols: total_cols,
            offset,
            pattern: pattern.clone(),
            ligands: vec![0.0; total_rows * total_cols],
            receptors: vec![0.0; total_rows * total_cols],
        };
        pattern.fill(&mut substrate);
        Ok(substrate)
    }

    pub fn from_config(config: &SubstrateConfig, offset: usize) -> Result<Self, SimConfigError> {
        Self::new(config.rows, config.cols, offset, config.pattern.clone())
    }

    /// Allocated row count, border included.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Allocated column count, border included.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pattern(&self) -> &SubstratePattern {
        &self.pattern
    }

    pub fn ligand(&self, row: usize, col: usize) -> f64 {
        self.ligands[row * self.cols + col]
    }

    pub fn receptor(&self, row: usize, col: usize) -> f64 {
        self.receptors[row * self.cols + col]
    }

    /// Row-major ligand channel.
    pub fn ligands(&self) -> &[f64] {
        &self.ligands
    }

    /// Row-major receptor channel.
    pub fn receptors(&self) -> &[f64] {
        &self.receptors
    }

    fn set(&mut self, row: usize, col: usize, ligand: f64, receptor: f64) {
        let idx = row * self.cols + col;
        self.ligands[idx] = ligand;
        self.receptors[idx] = receptor;
    }

    fn set_col(&mut self, col: usize, ligand: f64, receptor: f64) {
        for row in 0..self.rows {
            self.set(row, col, ligand, receptor);
        }
    }

    fn set_row(&mut self, row: usize, ligand: f64, receptor: f64) {
        for col in 0..self.cols {
            self.set(row, col, ligand, receptor);
        }
    }

    fn fill_continuous(&mut self, ligand: Ramp, receptor: Ramp) {
        let inner = self.cols - 2 * self.offset;
        let ligand_ramp = ligand.sample(0.0, 1.0, inner);
        let receptor_ramp = receptor.sample(1.0, 0.0, inner);

        // border columns repeat the nearest ramp value
        let low_cap = (
            ligand_ramp.first().copied().unwrap_or(ligand.min),
            receptor_ramp.first().copied().unwrap_or(receptor.max),
        );
        let high_cap = (
            ligand_ramp.last().copied().unwrap_or(ligand.max),
            receptor_ramp.last().copied().unwrap_or(receptor.min),
        );

        for col in 0..self.cols {
            let (ligand, receptor) = if col < self.offset {
                low_cap
            } else if col >= self.offset + inner {
                high_cap
            } else {
                let i = col - self.offset;
                (ligand_ramp[i], receptor_ramp[i])
            };
            self.set_col(col, ligand, receptor);
        }
    }

    fn fill_wedges(&mut self, narrow_edge: usize, wide_edge: usize) {
        let (rows, cols) = (self.rows, self.cols);
        self.ligands.fill(1.0);
        self.receptors.fill(0.0);

        let period = wide_edge + narrow_edge;
        let num_wedges = rows / period;
        let ratio = (cols as f64 / wide_edge as f64) * 2.0;
        let half = wide_edge / 2;

        let fill_row = |grid: &mut Self, row: usize, until: usize| {
            if row >= rows {
                return;
            }
            for col in 0..until.min(cols) {
                grid.set(row, col, 0.0, 1.0);
            }
        };

        for n in 0..num_wedges {
            let upper_start = n * period + 1;
            let mut upper_end = upper_start + half;
            for row in upper_start..upper_end {
                let until = ((row - upper_start + 1) as f64 * ratio) as usize;
                fill_row(self, row, until);
            }

            if narrow_edge > 1 {
                for row in upper_end..upper_end + narrow_edge - 1 {
                    fill_row(self, row, cols);
                }
                upper_end += narrow_edge - 1;
            }

            let lower_start = upper_end - 1;
            let lower_end = lower_start + half;
            for row in lower_start..=lower_end {
                let until = ((lower_end - row + 1) as f64 * ratio) as usize;
                fill_row(self, row, until);
            }
        }
    }

    fn fill_stripes(&mut self, width: usize, forward: bool, reverse: bool, concentration: f64) {
        for row in 0..self.rows {
            let (ligand, receptor) = match ((row / width) % 2 == 0, forward, reverse) {
                (true, true, _) => (concentration, 0.0),
                (false, _, true) => (0.0, concentration),
                _ => (0.0, 0.0),
            };
            self.set_row(row, ligand, receptor);
        }
    }

    /// Column indices where the first block ends and the last block begins.
    fn gap_parts(&self, begin: f64, end: f64) -> (usize, usize) {
        let first = ((self.cols as f64 * begin) as usize).min(self.cols);
        let second = (first + (self.cols as f64 * end) as usize).min(self.cols);
        (first, second)
    }

    fn fill_gap(&mut self, begin: f64, end: f64, first_block: SignalKind, second_block: SignalKind) {
        let (first, second) = self.gap_parts(begin, end);
        let block = |kind: SignalKind| match kind {
            SignalKind::Ligand => (1.0, 0.0),
            SignalKind::Receptor => (0.0, 1.0),
        };
        for col in 0..self.cols {
            let (ligand, receptor) = if col < first {
                block(first_block)
            } else if col < second {
                (0.0, 0.0)
            } else {
                block(second_block)
            };
            self.set_col(col, ligand, receptor);
        }
    }

    fn fill_inverted_gap(&mut self, begin: f64, end: f64) {
        let (first, second) = self.gap_parts(begin, end);
        for col in first..second {
            self.set_col(col, 0.0, 1.0);
        }
    }
}

impl std::fmt::Display for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (title, channel) in [("Ligands", &self.ligands), ("Receptors", &self.receptors)] {
            writeln!(f, "{title}:")?;
            for row in channel.chunks(self.cols) {
                let cells: Vec<String> = row.iter().map(|v| format!("{v:.2}")).collect();
                writeln!(f, "{}", cells.join(" "))?;
            }
        }
        Ok(())
    }
}

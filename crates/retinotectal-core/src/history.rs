use crate::growth_cone::Position;

/// One snapshot of the mutable growth cone state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistoryEntry {
    pub potential: f64,
    pub adaptation_coefficient: f64,
    pub position: Position,
    pub ligand: f64,
    pub receptor: f64,
    pub reset_force_ligand: f64,
    pub reset_force_receptor: f64,
}

/// Append-only time series of a growth cone, one channel per field.
///
/// Channels only grow through [`History::record`], which pushes to all of
/// them at once, so every channel always has the same length.
#[derive(Clone, Debug, Default)]
pub struct History {
    potential: Vec<f64>,
    adaptation_coefficient: Vec<f64>,
    position: Vec<Position>,
    ligand: Vec<f64>,
    receptor: Vec<f64>,
    reset_force_ligand: Vec<f64>,
    reset_force_receptor: Vec<f64>,
}

impl History {
    pub fn record(&mut self, entry: HistoryEntry) {
        self.potential.push(entry.potential);
        self.adaptation_coefficient.push(entry.adaptation_coefficient);
        self.position.push(entry.position);
        self.ligand.push(entry.ligand);
        self.receptor.push(entry.receptor);
        self.reset_force_ligand.push(entry.reset_force_ligand);
        self.reset_force_receptor.push(entry.reset_force_receptor);
    }

    /// Overwrite the potential of the seed entry. No-op on an empty history.
    pub(crate) fn replace_seed_potential(&mut self, potential: f64) {
        if let Some(first) = self.potential.first_mut() {
            *first = potential;
        }
    }

    pub fn len(&self) -> usize {
        self.potential.len()
    }

    pub fn is_empty(&self) -> bool {
        self.potential.is_empty()
    }

    pub fn potential(&self) -> &[f64] {
        &self.potential
    }

    pub fn adaptation_coefficient(&self) -> &[f64] {
        &self.adaptation_coefficient
    }

    pub fn position(&self) -> &[Position] {
        &self.position
    }

    pub fn ligand(&self) -> &[f64] {
        &self.ligand
    }

    pub fn receptor(&self) -> &[f64] {
        &self.receptor
    }

    pub fn reset_force_ligand(&self) -> &[f64] {
        &self.reset_force_ligand
    }

    pub fn reset_force_receptor(&self) -> &[f64] {
        &self.reset_force_receptor
    }

    /// The `window` most recent potentials, oldest first, or `None` while
    /// fewer than `window` entries exist.
    pub fn recent_potentials(&self, window: usize) -> Option<&[f64]> {
        if window == 0 || self.potential.len() < window {
            return None;
        }
        Some(&self.potential[self.potential.len() - window..])
    }

    pub fn entry(&self, index: usize) -> Option<HistoryEntry> {
        Some(HistoryEntry {
            potential: *self.potential.get(index)?,
            adaptation_coefficient: self.adaptation_coefficient[index],
            position: self.position[index],
            ligand: self.ligand[index],
            receptor: self.receptor[index],
            reset_force_ligand: self.reset_force_ligand[index],
            reset_force_receptor: self.reset_force_receptor[index],
        })
    }

    pub fn last(&self) -> Option<HistoryEntry> {
        self.len().checked_sub(1).and_then(|i| self.entry(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(potential: f64, x: i32) -> HistoryEntry {
        HistoryEntry {
            potential,
            adaptation_coefficient: 1.0,
            position: [x, 0],
            ligand: 0.5,
            receptor: 0.5,
            reset_force_ligand: 0.0,
            reset_force_receptor: 0.0,
        }
    }

    #[test]
    fn record_advances_every_channel() {
        let mut history = History::default();
        assert!(history.is_empty());
        for i in 0..4 {
            history.record(entry(i as f64, i));
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.adaptation_coefficient().len(), 4);
        assert_eq!(history.position().len(), 4);
        assert_eq!(history.ligand().len(), 4);
        assert_eq!(history.receptor().len(), 4);
        assert_eq!(history.reset_force_ligand().len(), 4);
        assert_eq!(history.reset_force_receptor().len(), 4);
        assert_eq!(history.last().unwrap().position, [3, 0]);
    }

    #[test]
    fn recent_potentials_requires_full_window() {
        let mut history = History::default();
        history.record(entry(1.0, 0));
        history.record(entry(2.0, 0));
        assert!(history.recent_potentials(3).is_none());
        history.record(entry(3.0, 0));
        history.record(entry(4.0, 0));
        assert_eq!(history.recent_potentials(3).unwrap(), &[2.0, 3.0, 4.0]);
        assert!(history.recent_potentials(0).is_none());
    }

    #[test]
    fn seed_potential_replacement_touches_only_first_entry() {
        let mut history = History::default();
        history.replace_seed_potential(9.0);
        assert!(history.is_empty());
        history.record(entry(0.0, 0));
        history.record(entry(1.0, 0));
        history.replace_seed_potential(9.0);
        assert_eq!(history.potential(), &[9.0, 1.0]);
    }
}

//! Helpers for collecting statistics.

use std::collections::*;
use std::fmt;

use itertools::*;

use crate::branch::*;

/// Aggregate result of scoring a predictor over a trace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationResult {
    /// Number of scored branches
    pub total: u64,

    /// Number of scored branches that were mispredicted
    pub mispredicted: u64,
}
impl SimulationResult {
    /// Score a single prediction.
    pub fn record(&mut self, prediction: Outcome, outcome: Outcome) {
        self.total += 1;
        if prediction != outcome {
            self.mispredicted += 1;
        }
    }

    /// Number of correct predictions.
    pub fn correct(&self) -> u64 { self.total - self.mispredicted }

    /// Misprediction rate as a percentage. An empty result has a rate of 0.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * (self.mispredicted as f64 / self.total as f64)
    }
}

/// Summary lines in the format consumed by the experiment scripts. The
/// final field is the misprediction rate, e.g. `misprediction rate:\t12.34%`.
impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "branches:\t\t{}", self.total)?;
        writeln!(f, "incorrect:\t\t{}", self.mispredicted)?;
        writeln!(f, "misprediction rate:\t{:.2}%", self.rate())
    }
}

/// Container for per-branch statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Number of times this branch was taken.
    pub taken: usize,
}
impl BranchData {
    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 { 0.0 } else { self.hits as f64 / self.occ as f64 }
    }

    /// Return the number of mispredictions for this branch.
    pub fn misses(&self) -> usize { self.occ - self.hits }

    pub fn is_always_taken(&self) -> bool { self.taken == self.occ }
    pub fn is_never_taken(&self) -> bool { self.taken == 0 }
}

/// Per-branch statistics, indexed by program counter value.
#[derive(Clone, Debug, Default)]
pub struct BranchStats {
    pub data: BTreeMap<usize, BranchData>,
}
impl BranchStats {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Update per-branch statistics.
    pub fn update(&mut self, record: &BranchRecord, prediction: Outcome) {
        let data = self.get_mut(record.pc);
        data.occ += 1;
        if prediction == record.outcome { data.hits += 1; }
        if record.is_taken() { data.taken += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: usize) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: usize) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of branches that are always taken
    pub fn num_always_taken(&self) -> usize {
        self.data.values().filter(|d| d.is_always_taken()).count()
    }

    /// Returns the number of branches that are never taken
    pub fn num_never_taken(&self) -> usize {
        self.data.values().filter(|d| d.is_never_taken()).count()
    }

    /// Return the `n` branches with the most mispredictions (ties are
    /// broken by program counter value).
    pub fn get_worst_branches(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data.iter()
            .sorted_by(|x, y| {
                y.1.misses().cmp(&x.1.misses()).then(x.0.cmp(y.0))
            })
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

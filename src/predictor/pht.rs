//! Implementations of a pattern history table (PHT).

use crate::predictor::*;

/// A table of [SaturatingCounter] with `1 << index_bits` entries.
///
/// The input is an arbitrary value (usually some mix of program counter
/// and history bits) which is masked into the range of the table.
#[derive(Clone, Debug)]
pub struct PatternHistoryTable {
    /// Saturating counter configuration
    cfg: SaturatingCounterConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,
}
impl PatternHistoryTable {
    pub fn new(index_bits: usize, cfg: SaturatingCounterConfig) -> Self {
        Self {
            cfg,
            data: vec![cfg.build(); 1 << index_bits],
        }
    }

    /// Return every counter to its initial state.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|c| c.reset());
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        self.cfg.storage_bits() * self.data.len()
    }
}

impl PredictorTable for PatternHistoryTable {
    type Input = usize;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, input: usize) -> usize {
        input & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx & self.index_mask()]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

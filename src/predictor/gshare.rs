//! Implementation of the "gshare" global-history predictor.

use crate::history::*;
use crate::predictor::*;
use crate::Outcome;

/// A single [PatternHistoryTable] indexed by the program counter XOR'ed with
/// global history.
///
/// See "Combining Branch Predictors" (McFarling, 1993).
#[derive(Clone, Debug)]
pub struct GSharePredictor {
    /// Number of global history bits (and index bits)
    history_bits: usize,

    /// Global history register
    ghr: HistoryRegister,

    /// Table of 2-bit counters
    pht: PatternHistoryTable,
}
impl GSharePredictor {
    pub fn new(history_bits: usize) -> Self {
        Self {
            history_bits,
            ghr: HistoryRegister::new(history_bits),
            pht: PatternHistoryTable::new(
                history_bits,
                SaturatingCounterConfig::TWO_BIT
            ),
        }
    }

    pub fn history_bits(&self) -> usize { self.history_bits }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// Form a PHT index from the program counter and global history.
    fn index(&self, pc: usize) -> usize {
        self.pht.get_index(pc ^ self.ghr.value())
    }
}

impl BranchPredictor for GSharePredictor {
    fn name(&self) -> &'static str { "GSharePredictor" }

    fn predict(&self, pc: usize) -> Outcome {
        self.pht.get_entry(self.index(pc)).predict()
    }

    fn update(&mut self, pc: usize, outcome: Outcome) {
        // The index must be formed with the same history used to predict.
        let idx = self.index(pc);
        self.pht.get_entry_mut(idx).update(outcome);
        self.ghr.push(outcome);
    }

    fn reset(&mut self) {
        self.ghr.reset();
        self.pht.reset();
    }

    fn storage_bits(&self) -> usize {
        self.pht.storage_bits() + self.ghr.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(p: &mut GSharePredictor, pc: usize, outcomes: &[Outcome]) -> Vec<bool> {
        outcomes.iter().map(|o| {
            let hit = p.predict(pc) == *o;
            p.update(pc, *o);
            hit
        }).collect()
    }

    #[test]
    fn learns_constant_branch() {
        let mut p = GSharePredictor::new(4);
        let hits = run(&mut p, 0x400, &[Outcome::N; 64]);
        // Once history fills with zeros, one counter sees every update.
        assert!(hits[8..].iter().all(|h| *h));
    }

    #[test]
    fn zero_history_is_a_single_counter() {
        let mut p = GSharePredictor::new(0);
        assert_eq!(p.storage_bits(), 2);
        run(&mut p, 0x10, &[Outcome::N, Outcome::N]);
        // The update from one address is visible at every other address.
        assert_eq!(p.predict(0x9999), Outcome::N);
    }

    #[test]
    fn history_shifts_after_update() {
        let mut p = GSharePredictor::new(2);
        p.update(0, Outcome::T);
        p.update(0, Outcome::N);
        assert_eq!(p.ghr().value(), 0b10);
        p.reset();
        assert_eq!(p.ghr().value(), 0);
    }
}

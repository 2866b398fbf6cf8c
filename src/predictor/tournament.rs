//! Implementation of a tournament (global/local hybrid) predictor.

use crate::history::*;
use crate::predictor::*;
use crate::Outcome;

/// Identifies the sub-predictor whose vote was used for a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TournamentProvider {
    Global,
    Local,
}

/// Container for the votes made by each component of a
/// [TournamentPredictor] for a single branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TournamentPrediction {
    /// Vote from the global component
    pub global: Outcome,

    /// Vote from the local component
    pub local: Outcome,

    /// The component selected by the choice table
    pub provider: TournamentProvider,
}
impl TournamentPrediction {
    /// The final predicted outcome.
    pub fn outcome(&self) -> Outcome {
        match self.provider {
            TournamentProvider::Global => self.global,
            TournamentProvider::Local => self.local,
        }
    }
}

/// A hybrid of a global-history predictor and a local-history predictor,
/// where a table of choice counters learns which one to trust.
///
/// See "The Alpha 21264 Microprocessor" (Kessler, 1999).
///
/// - The global PHT and the choice table are indexed by global history.
/// - The local history table is indexed by the low bits of the program
///   counter, and the selected local history indexes the local PHT.
#[derive(Clone, Debug)]
pub struct TournamentPredictor {
    /// Global history register
    ghr: HistoryRegister,

    /// Global PHT (2-bit counters)
    global: PatternHistoryTable,

    /// Per-branch local history registers
    lht: LocalHistoryTable,

    /// Local PHT (3-bit counters)
    local: PatternHistoryTable,

    /// Choice counters; a high counter favors the global component
    choice: PatternHistoryTable,
}
impl TournamentPredictor {
    pub fn new(global_bits: usize, local_bits: usize, index_bits: usize)
        -> Self
    {
        Self {
            ghr: HistoryRegister::new(global_bits),
            global: PatternHistoryTable::new(
                global_bits, SaturatingCounterConfig::TWO_BIT
            ),
            lht: LocalHistoryTable::new(index_bits, local_bits),
            local: PatternHistoryTable::new(
                local_bits, SaturatingCounterConfig::THREE_BIT
            ),
            choice: PatternHistoryTable::new(
                global_bits, SaturatingCounterConfig::TWO_BIT
            ),
        }
    }

    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// Returns the local history associated with `pc`.
    pub fn local_history(&self, pc: usize) -> usize {
        self.lht.history(self.lht.get_index(pc))
    }

    /// Returns the component currently favored for the present global
    /// history.
    pub fn preferred(&self) -> TournamentProvider {
        if self.choice.get_entry(self.ghr.value()).is_high() {
            TournamentProvider::Global
        } else {
            TournamentProvider::Local
        }
    }

    /// Collect votes from both components and the choice table.
    pub fn lookup(&self, pc: usize) -> TournamentPrediction {
        let ghist = self.ghr.value();
        let lhist = self.local_history(pc);
        TournamentPrediction {
            global: self.global.get_entry(ghist).predict(),
            local: self.local.get_entry(lhist).predict(),
            provider: self.preferred(),
        }
    }

    /// Move the choice counter for the current global history toward the
    /// component that was uniquely correct. Nothing changes when both (or
    /// neither) component was correct.
    fn train_choice(&mut self, global_correct: bool, local_correct: bool) {
        let ctr = self.choice.get_entry_mut(self.ghr.value());
        match (global_correct, local_correct) {
            (true, false) => ctr.inc(),
            (false, true) => ctr.dec(),
            _ => {},
        }
    }
}

impl BranchPredictor for TournamentPredictor {
    fn name(&self) -> &'static str { "TournamentPredictor" }

    fn predict(&self, pc: usize) -> Outcome {
        self.lookup(pc).outcome()
    }

    fn update(&mut self, pc: usize, outcome: Outcome) {
        let votes = self.lookup(pc);
        self.train_choice(votes.global == outcome, votes.local == outcome);

        // Both components are trained regardless of which one was used.
        let ghist = self.ghr.value();
        self.global.get_entry_mut(ghist).update(outcome);

        let lidx = self.lht.get_index(pc);
        let lhist = self.lht.history(lidx);
        self.local.get_entry_mut(lhist).update(outcome);

        self.lht.push(lidx, outcome);
        self.ghr.push(outcome);
    }

    fn reset(&mut self) {
        self.ghr.reset();
        self.global.reset();
        self.lht.reset();
        self.local.reset();
        self.choice.reset();
    }

    fn storage_bits(&self) -> usize {
        self.ghr.len()
            + self.global.storage_bits()
            + self.lht.storage_bits()
            + self.local.storage_bits()
            + self.choice.storage_bits()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn choice_moves_toward_local() {
        let mut p = TournamentPredictor::new(4, 4, 4);
        assert_eq!(p.preferred(), TournamentProvider::Global);
        for _ in 0..4 {
            p.train_choice(false, true);
        }
        assert_eq!(p.preferred(), TournamentProvider::Local);
        assert_eq!(p.choice.get_entry(0).value(), 0);

        // Agreement in correctness leaves the counter alone
        p.train_choice(true, true);
        p.train_choice(false, false);
        assert_eq!(p.choice.get_entry(0).value(), 0);

        p.train_choice(true, false);
        p.train_choice(true, false);
        assert_eq!(p.preferred(), TournamentProvider::Global);
    }

    #[test]
    fn choice_converges_to_local_for_alternating_branch() {
        // With no global history, the global component is a single
        // counter and cannot follow an alternating branch. The local
        // component can.
        let mut p = TournamentPredictor::new(0, 2, 4);
        let pc = 0x84;
        let mut misses = Vec::new();
        for i in 0..200 {
            let outcome = if i % 2 == 0 { Outcome::T } else { Outcome::N };
            misses.push(p.predict(pc) != outcome);
            p.update(pc, outcome);
        }
        assert_eq!(p.preferred(), TournamentProvider::Local);
        assert!(misses[100..].iter().all(|m| !m));
    }

    #[test]
    fn both_components_train() {
        let mut p = TournamentPredictor::new(2, 2, 2);
        p.update(0x1, Outcome::N);
        p.update(0x1, Outcome::N);
        assert_eq!(p.ghr().value(), 0);
        assert_eq!(p.local_history(0x1), 0);
        // The global counter for history '00' saw two not-taken updates
        assert_eq!(p.global.get_entry(0).value(), 0);
        // The local counter for history '00' saw two not-taken updates
        assert_eq!(p.local.get_entry(0).value(), 2);
        // Other local histories are untouched
        assert_eq!(p.local_history(0x2), 0);
    }

    #[test]
    fn storage_accounting() {
        let p = TournamentPredictor::new(9, 10, 10);
        let expected = 9 + (512 * 2) + (1024 * 10) + (1024 * 3) + (512 * 2);
        assert_eq!(p.storage_bits(), expected);
    }
}

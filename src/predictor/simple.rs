//! Simple predictors without any learned state.

use crate::Outcome;
use crate::predictor::BranchPredictor;

/// A simple predictor with no state: always predict 'taken'.
#[derive(Clone, Copy, Debug, Default)]
pub struct TakenPredictor;
impl BranchPredictor for TakenPredictor {
    fn name(&self) -> &'static str { "TakenPredictor" }
    fn predict(&self, _pc: usize) -> Outcome { Outcome::T }
    fn update(&mut self, _pc: usize, _outcome: Outcome) {}
    fn reset(&mut self) {}
    fn storage_bits(&self) -> usize { 0 }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn always_taken() {
        let mut p = TakenPredictor;
        p.update(0x40, Outcome::N);
        assert_eq!(p.predict(0x40), Outcome::T);
    }
}

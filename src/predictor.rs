//! Implementations of different branch predictors.

pub mod table;
pub mod simple;
pub mod counter;
pub mod pht;
pub mod gshare;
pub mod tournament;
pub mod perceptron;

pub use table::*;
pub use simple::*;
pub use counter::*;
pub use pht::*;
pub use gshare::*;
pub use tournament::*;
pub use perceptron::*;

use crate::Outcome;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// Interface to a conditional branch predictor driven by a trace.
///
/// For every branch, [BranchPredictor::predict] is called first and
/// [BranchPredictor::update] is called afterwards with the resolved outcome
/// of the *same* branch. Implementations may rely on this ordering.
pub trait BranchPredictor {
    fn name(&self) -> &'static str;

    /// Predict the direction of the conditional branch at `pc`.
    fn predict(&self, pc: usize) -> Outcome;

    /// Train the predictor with the resolved outcome of the branch at `pc`.
    fn update(&mut self, pc: usize, outcome: Outcome);

    /// Return the predictor to its initial state.
    fn reset(&mut self);

    /// Get the [approximate] number of storage bits.
    fn storage_bits(&self) -> usize;
}

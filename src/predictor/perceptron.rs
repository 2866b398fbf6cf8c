//! Implementation of a perceptron predictor.

use crate::history::*;
use crate::predictor::*;
use crate::Outcome;

/// Perceptron [with integer weights].
///
/// Weights are 8-bit and saturate at the bounds of an [i8]. The output is
/// accumulated in an [i32], so the dot product itself never saturates.
///
/// See the following papers:
///
/// - "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001)
/// - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Perceptron {
    pub weights: Vec<i8>,
    pub bias: i8,
}
impl Perceptron {
    pub fn new(len: usize) -> Self {
        Self { weights: vec![0; len], bias: 0 }
    }

    /// Reset the state.
    pub fn reset(&mut self) {
        self.bias = 0;
        self.weights.fill(0);
    }

    /// Return a reference to the list of weights.
    pub fn weights(&self) -> &[i8] {
        &self.weights
    }

    /// Given some history, compute the output value.
    /// The predicted outcome is determined by the sign of the output.
    pub fn output(&self, ghr: &HistoryRegister) -> (i32, Outcome) {
        let dot: i32 = ghr.signed_bits().zip(self.weights.iter())
            .map(|(x, w)| x * (*w as i32))
            .sum();
        let res = dot + self.bias as i32;
        let out = if res >= 0 { Outcome::T } else { Outcome::N };
        (res, out)
    }

    /// Given some outcome, adjust the weights.
    ///
    /// Training occurs after a misprediction, or when the magnitude of the
    /// output is not above `theta`.
    pub fn train(&mut self, ghr: &HistoryRegister, outcome: Outcome, theta: i32) {
        let (output, prediction) = self.output(ghr);
        let miss = prediction != outcome;
        let below_threshold = output.abs() <= theta;
        if !(miss || below_threshold) {
            return;
        }

        // When a bit in the history matches the outcome, increment the
        // corresponding weight. Otherwise, decrement the corresponding weight.
        let t = outcome.to_signed() as i8;
        self.bias = self.bias.saturating_add(t);
        for (w, x) in self.weights.iter_mut().zip(ghr.signed_bits()) {
            *w = w.saturating_add(t * x as i8);
        }
    }
}

/// The default function used to select a perceptron: fold the upper bits
/// of the program counter onto the lower bits.
pub fn perceptron_index_xor_fold(_p: &PerceptronPredictor, pc: usize) -> usize {
    pc ^ (pc >> 16)
}

/// A table of [Perceptron]s which all share one global history register.
#[derive(Clone, Debug)]
pub struct PerceptronPredictor {
    /// Global history register
    ghr: HistoryRegister,

    /// Table of perceptrons
    table: Vec<Perceptron>,

    /// Training threshold
    theta: i32,

    /// Hash from a program counter value to a perceptron. The result is
    /// reduced modulo the number of perceptrons.
    index_fn: PcIndexFn<Self>,
}
impl PerceptronPredictor {
    pub fn new(history_bits: usize, num_perceptrons: usize, theta: u32) -> Self {
        assert!(num_perceptrons > 0);
        Self {
            ghr: HistoryRegister::new(history_bits),
            table: vec![Perceptron::new(history_bits); num_perceptrons],
            theta: theta.min(i32::MAX as u32) as i32,
            index_fn: perceptron_index_xor_fold,
        }
    }

    /// Replace the function used to select a perceptron.
    pub fn with_index_fn(mut self, index_fn: PcIndexFn<Self>) -> Self {
        self.index_fn = index_fn;
        self
    }

    pub fn theta(&self) -> i32 { self.theta }
    pub fn history_bits(&self) -> usize { self.ghr.len() }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// Return the index of the perceptron associated with `pc`.
    pub fn get_index(&self, pc: usize) -> usize {
        (self.index_fn)(self, pc) % self.table.len()
    }

    /// Return the perceptron associated with `pc`.
    pub fn perceptron(&self, pc: usize) -> &Perceptron {
        &self.table[self.get_index(pc)]
    }

    /// Return the raw output of the perceptron associated with `pc`.
    pub fn output(&self, pc: usize) -> i32 {
        self.perceptron(pc).output(&self.ghr).0
    }

    /// Bits per weight: enough to represent `theta`, plus a sign bit.
    fn weight_bits(&self) -> usize {
        (self.theta.max(1) as u32).ilog2() as usize + 2
    }
}

impl BranchPredictor for PerceptronPredictor {
    fn name(&self) -> &'static str { "PerceptronPredictor" }

    fn predict(&self, pc: usize) -> Outcome {
        self.perceptron(pc).output(&self.ghr).1
    }

    fn update(&mut self, pc: usize, outcome: Outcome) {
        let idx = self.get_index(pc);
        self.table[idx].train(&self.ghr, outcome, self.theta);
        self.ghr.push(outcome);
    }

    fn reset(&mut self) {
        self.ghr.reset();
        self.table.iter_mut().for_each(|p| p.reset());
    }

    fn storage_bits(&self) -> usize {
        let per_perceptron = (self.history_bits() + 1) * self.weight_bits();
        per_perceptron * self.table.len() + self.ghr.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pattern(len: usize, period: &[Outcome]) -> Vec<Outcome> {
        period.iter().copied().cycle().take(len).collect()
    }

    #[test]
    fn learns_period_four_pattern() {
        use Outcome::*;
        let mut p = PerceptronPredictor::new(2, 1, 1);
        let mut misses = Vec::new();
        for outcome in pattern(64, &[T, T, N, N]) {
            misses.push(p.predict(0x1000) != outcome);
            p.update(0x1000, outcome);
        }
        assert!(misses[12..].iter().all(|m| !m));
        assert_eq!(misses.iter().filter(|m| **m).count(), 1);
        // The weight on the second-newest history bit carries the pattern
        assert!(p.perceptron(0).weights()[1] < 0);
    }

    #[test]
    fn training_stops_above_threshold() {
        let mut p = PerceptronPredictor::new(4, 1, 2);
        for _ in 0..100 {
            p.update(0, Outcome::T);
        }
        // All history bits are 'taken' after warming up, and the output
        // only grows until it clears the threshold.
        let out = p.output(0);
        assert!(out > p.theta());
        assert!(out <= p.theta() + 5 + 1);
    }

    #[test]
    fn weights_saturate() {
        let mut perceptron = Perceptron::new(1);
        let mut ghr = HistoryRegister::new(1);
        ghr.push(Outcome::T);
        for _ in 0..1000 {
            perceptron.train(&ghr, Outcome::T, i32::MAX);
        }
        assert_eq!(perceptron.bias, i8::MAX);
        assert_eq!(perceptron.weights()[0], i8::MAX);
        assert_eq!(perceptron.output(&ghr).0, 254);
    }

    #[test]
    fn custom_index_fn() {
        fn low_bits(_p: &PerceptronPredictor, pc: usize) -> usize { pc }
        let p = PerceptronPredictor::new(4, 3, 10).with_index_fn(low_bits);
        assert_eq!(p.get_index(7), 1);
        let q = PerceptronPredictor::new(4, 3, 10);
        assert_eq!(q.get_index(0x1_0000), 2);
    }

    #[test]
    fn zero_history_uses_bias_only() {
        let mut p = PerceptronPredictor::new(0, 4, 14);
        p.update(0x10, Outcome::N);
        assert_eq!(p.predict(0x10), Outcome::N);
        assert_eq!(p.predict(0x11), Outcome::T);
    }
}

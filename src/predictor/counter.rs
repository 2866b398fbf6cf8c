//! Implementation of a saturating counter.

use crate::Outcome;
use crate::predictor::StatefulPredictor;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    /// Width of the counter in bits
    pub bits: u8,

    /// Initial value of the counter
    pub init: u8,
}
impl SaturatingCounterConfig {
    /// A 2-bit counter starting in the "weakly taken" state.
    pub const TWO_BIT: Self = Self { bits: 2, init: 2 };

    /// A 3-bit counter starting in the "weakly taken" state.
    pub const THREE_BIT: Self = Self { bits: 3, init: 4 };

    /// The largest value the counter can hold.
    pub fn max(&self) -> u8 {
        ((1u16 << self.bits) - 1) as u8
    }

    /// Counter values greater than or equal to this predict 'taken'.
    pub fn threshold(&self) -> u8 {
        1 << (self.bits - 1)
    }

    pub fn storage_bits(&self) -> usize {
        self.bits as usize
    }

    pub fn build(self) -> SaturatingCounter {
        assert!((1..=8).contains(&self.bits), "invalid counter width");
        assert!(self.init <= self.max(), "initial value out of range");
        SaturatingCounter {
            cfg: self,
            ctr: self.init,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
///
/// The counter clamps at zero and at its maximum value; it never wraps.
#[derive(Clone, Copy, Debug)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    ctr: u8,
}
impl SaturatingCounter {
    /// Move the counter toward the maximum value.
    pub fn inc(&mut self) {
        if self.ctr < self.cfg.max() {
            self.ctr += 1;
        }
    }

    /// Move the counter toward zero.
    pub fn dec(&mut self) {
        self.ctr = self.ctr.saturating_sub(1);
    }

    /// Return the raw counter value.
    pub fn value(&self) -> u8 { self.ctr }

    /// Returns 'true' if the counter is in the upper half of its range.
    pub fn is_high(&self) -> bool {
        self.ctr >= self.cfg.threshold()
    }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }
    fn predict(&self) -> Outcome { Outcome::from(self.is_high()) }
    fn reset(&mut self) {
        self.ctr = self.cfg.init;
    }
    fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_bit_saturates() {
        let mut ctr = SaturatingCounterConfig::TWO_BIT.build();
        assert_eq!(ctr.predict(), Outcome::T);
        for _ in 0..10 { ctr.update(Outcome::T); }
        assert_eq!(ctr.value(), 3);
        ctr.update(Outcome::N);
        assert_eq!(ctr.predict(), Outcome::T);
        ctr.update(Outcome::N);
        assert_eq!(ctr.predict(), Outcome::N);
        for _ in 0..10 { ctr.update(Outcome::N); }
        assert_eq!(ctr.value(), 0);
        ctr.reset();
        assert_eq!(ctr.value(), 2);
    }

    #[test]
    fn three_bit_threshold() {
        let cfg = SaturatingCounterConfig::THREE_BIT;
        assert_eq!(cfg.max(), 7);
        assert_eq!(cfg.threshold(), 4);
        let mut ctr = cfg.build();
        ctr.dec();
        assert_eq!(ctr.predict(), Outcome::N);
    }

    #[test]
    fn eight_bit_counter() {
        let cfg = SaturatingCounterConfig { bits: 8, init: 255 };
        let mut ctr = cfg.build();
        ctr.inc();
        assert_eq!(ctr.value(), 255);
    }
}

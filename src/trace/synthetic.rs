//! Generating synthetic traces from per-branch outcome patterns.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::branch::*;

/// A pre-determined pattern of outcomes associated with a conditional branch.
#[derive(Clone, Debug, PartialEq)]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary repeating pattern of outcomes.
    Pattern(Vec<Outcome>),

    /// A branch which is taken with some probability.
    Random { p_taken: f64 },
}
impl BranchPattern {
    /// Given some counter, generate a branch outcome.
    fn outcome(&self, ctr: usize, rng: &mut StdRng) -> Outcome {
        match *self {
            Self::AlwaysTaken => Outcome::T,
            Self::NeverTaken => Outcome::N,
            Self::TakenPeriodic(p) => {
                if ctr % p == (p - 1) { Outcome::T } else { Outcome::N }
            },
            Self::NotTakenPeriodic(p) => {
                if ctr % p == (p - 1) { Outcome::N } else { Outcome::T }
            },
            Self::Pattern(ref pat) => pat[ctr % pat.len()],
            Self::Random { p_taken } => {
                Outcome::from(rng.gen_bool(p_taken.clamp(0.0, 1.0)))
            },
        }
    }
}

/// Builds a trace by visiting a list of branches in round-robin order.
#[derive(Debug)]
pub struct SyntheticTrace {
    /// Branch addresses and their patterns
    branches: Vec<(usize, BranchPattern)>,

    /// Number of times each branch has been visited
    ctr: Vec<usize>,

    rng: StdRng,
}
impl SyntheticTrace {
    /// Create an empty generator. The seed only affects
    /// [BranchPattern::Random] branches.
    pub fn new(seed: u64) -> Self {
        Self {
            branches: Vec::new(),
            ctr: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Add a branch at `pc` following some pattern.
    pub fn branch(mut self, pc: usize, pat: BranchPattern) -> Self {
        match pat {
            BranchPattern::TakenPeriodic(p) |
            BranchPattern::NotTakenPeriodic(p) => assert!(p > 0),
            BranchPattern::Pattern(ref p) => assert!(!p.is_empty()),
            _ => {},
        }
        self.branches.push((pc, pat));
        self.ctr.push(0);
        self
    }

    /// Generate the next `len` records.
    pub fn generate(&mut self, len: usize) -> Vec<BranchRecord> {
        let mut res = Vec::with_capacity(len);
        if self.branches.is_empty() {
            return res;
        }
        for i in 0..len {
            let cur = i % self.branches.len();
            let (pc, pat) = &self.branches[cur];
            let outcome = pat.outcome(self.ctr[cur], &mut self.rng);
            self.ctr[cur] += 1;
            res.push(BranchRecord { pc: *pc, outcome });
        }
        res
    }
}

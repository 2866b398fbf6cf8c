//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// Convert into the bipolar encoding used by perceptron predictors
    /// (taken is +1, not-taken is -1).
    pub fn to_signed(self) -> i32 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }

    /// The digit used for this outcome in a text trace.
    pub fn as_digit(self) -> char {
        match self {
            Self::T => '1',
            Self::N => '0',
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        match x {
            Outcome::T => true,
            Outcome::N => false,
        }
    }
}

/// A record of branch execution.
///
/// One of these is decoded from each line of a trace, scored, and then
/// dropped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: usize,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    pub fn new(pc: usize, outcome: Outcome) -> Self {
        Self { pc, outcome }
    }

    /// Returns 'true' if the branch was taken.
    pub fn is_taken(&self) -> bool {
        self.outcome == Outcome::T
    }
}

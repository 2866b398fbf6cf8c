//! History registers.

use bitvec::prelude::*;
use crate::Outcome;

/// A fixed-width shift register recording the most recent branch outcomes.
///
/// Bit 0 is always the newest outcome. Shifting a new outcome in discards
/// the oldest bit, so the register never holds more than `len` bits.
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: Printed oldest-first, so the rightmost character is bit 0 (the
// newest outcome).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl std::fmt::Debug for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "HistoryRegister({}b: {})", self.len, self)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Clear all bits in the register.
    pub fn reset(&mut self) {
        self.data.fill(false);
    }

    /// Shift an outcome into the register.
    /// The newest outcome becomes bit 0, and the oldest bit is discarded.
    pub fn push(&mut self, outcome: Outcome) {
        shift_in(&mut self.data, outcome);
    }

    /// Return the history bit at `idx` (0 is the newest outcome).
    pub fn bit(&self, idx: usize) -> bool {
        self.data[idx]
    }

    /// Return the low bits of the register as an integer.
    ///
    /// Registers wider than a [usize] only contribute their newest
    /// `usize::BITS` bits.
    pub fn value(&self) -> usize {
        load_low_bits(&self.data)
    }

    /// Iterate over the history bits in the bipolar encoding used by
    /// perceptrons (+1 for taken, -1 for not-taken), newest first.
    pub fn signed_bits(&self) -> impl Iterator<Item = i32> + '_ {
        self.data.iter().by_vals().map(|b| if b { 1 } else { -1 })
    }
}

/// Shift an outcome into bit 0 of `bits`, discarding the highest bit.
fn shift_in(bits: &mut BitSlice<usize, Lsb0>, outcome: Outcome) {
    if bits.is_empty() {
        return;
    }
    // The oldest bit wraps around to index 0 and is overwritten.
    bits.rotate_right(1);
    bits.set(0, outcome.into());
}

/// The low `usize::BITS` bits of `bits` as an integer.
fn load_low_bits(bits: &BitSlice<usize, Lsb0>) -> usize {
    let width = bits.len().min(usize::BITS as usize);
    if width == 0 {
        return 0;
    }
    bits[..width].load_le::<usize>()
}

/// A table of per-branch local histories indexed by the program counter.
///
/// All entries share a single bit vector: entry `i` occupies bits
/// `i * history_bits..(i + 1) * history_bits`, and the lowest bit of each
/// entry is its newest outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalHistoryTable {
    data: BitVec<usize, Lsb0>,

    /// Number of entries (a power of two)
    size: usize,

    /// Width of each entry
    history_bits: usize,
}
impl LocalHistoryTable {
    /// Create a table with `1 << index_bits` entries of `history_bits`
    /// bits each.
    pub fn new(index_bits: usize, history_bits: usize) -> Self {
        let size = 1 << index_bits;
        Self {
            data: bitvec![usize, Lsb0; 0; size * history_bits],
            size,
            history_bits,
        }
    }

    pub fn size(&self) -> usize { self.size }

    /// Return the index of the entry associated with `pc`.
    pub fn get_index(&self, pc: usize) -> usize {
        pc & (self.size - 1)
    }

    fn entry(&self, idx: usize) -> &BitSlice<usize, Lsb0> {
        let start = (idx & (self.size - 1)) * self.history_bits;
        &self.data[start..start + self.history_bits]
    }

    fn entry_mut(&mut self, idx: usize) -> &mut BitSlice<usize, Lsb0> {
        let start = (idx & (self.size - 1)) * self.history_bits;
        &mut self.data[start..start + self.history_bits]
    }

    /// Return the history in entry `idx` as an integer.
    pub fn history(&self, idx: usize) -> usize {
        load_low_bits(self.entry(idx))
    }

    /// Shift an outcome into entry `idx`.
    pub fn push(&mut self, idx: usize, outcome: Outcome) {
        shift_in(self.entry_mut(idx), outcome);
    }

    pub fn reset(&mut self) {
        self.data.fill(false);
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        self.size * self.history_bits
    }
}

//! Block-wide bloom aggregate.
//!
//! Per-transaction execution produces a 256-byte bloom over its log topics;
//! the settlement pass ORs them into a single block-level aggregate. The
//! engine never interprets the bits, it only accumulates and compares them,
//! so the hashing scheme stays with the executor collaborator.

/// 2048-bit bloom filter, OR-accumulated across a block.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bloom(pub [u8; Bloom::BYTES]);

impl Bloom {
    pub const BYTES: usize = 256;

    pub const fn zero() -> Self {
        Self([0u8; Self::BYTES])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// OR another bloom into this one.
    pub fn accrue(&mut self, other: &Bloom) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    /// True if every bit set in `other` is also set in `self`.
    pub fn covers(&self, other: &Bloom) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a & b == *b)
    }
}

impl Default for Bloom {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Debug for Bloom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Full 256 bytes are noise in test output; show the set-bit count.
        let bits: u32 = self.0.iter().map(|b| b.count_ones()).sum();
        write!(f, "Bloom({bits} bits set)")
    }
}

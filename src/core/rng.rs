//! RNG module - seedable deterministic randomness
//!
//! Every random decision in a room (piece draws, power-up weighting, garbage
//! hole positions, row shuffles) flows through one seeded LCG owned by that
//! room, so a fixed seed reproduces an exact game. Constants from Numerical
//! Recipes.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Fair coin flip
    pub fn coin_flip(&mut self) -> bool {
        self.next_range(2) == 1
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Draw a piece kind uniformly
    pub fn random_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize]
    }

    /// Current internal state, usable to reproduce the remaining sequence
    pub fn state(&self) -> u32 {
        self.state
    }
}

//! Deterministic tile draw order.
//!
//! Every participant builds the deck from the same shared seed, so all of
//! them draw the identical sequence without exchanging anything beyond the
//! seed itself.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// The draw order over catalog indices.
///
/// Entry 0 of the catalog is the starting tile and is always drawn first;
/// the remainder is shuffled by the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    order: Vec<usize>,
    next: usize,
    seed: u64,
}

impl Deck {
    /// Build a deck over `len` catalog entries from a shared seed
    pub fn new(len: usize, seed: u64) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        if len > 1 {
            let mut rng = StdRng::seed_from_u64(seed);
            order[1..].shuffle(&mut rng);
        }
        Self {
            order,
            next: 0,
            seed,
        }
    }

    /// Build a deck dealing exactly `order`, front to back. Used when peers
    /// agree on an explicit deal instead of a seed, and for scripted games.
    pub fn from_order(order: Vec<usize>) -> Self {
        Self {
            order,
            next: 0,
            seed: 0,
        }
    }

    /// The seed this deck was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The catalog index of the next tile to be drawn, if any
    pub fn peek(&self) -> Option<usize> {
        self.order.get(self.next).copied()
    }

    /// Draw the next tile
    pub fn draw(&mut self) -> Option<usize> {
        let tile = self.peek()?;
        self.next += 1;
        Some(tile)
    }

    /// Tiles left to draw
    pub fn remaining(&self) -> usize {
        self.order.len() - self.next
    }

    /// Whether every tile has been drawn
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

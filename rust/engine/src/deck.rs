use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// A 52-card deck with a deterministic, seedable Fisher-Yates shuffle.
///
/// Production callers should use [`Deck::new_seeded_from_os_rng`] so that
/// every hand is seeded from a cryptographic source; tests and replay use
/// [`Deck::new_with_seed`] to reproduce an exact shuffle.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
    seed: u64,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        Self {
            cards: full_deck(),
            position: 0,
            rng,
            seed,
        }
    }

    /// Draws a fresh seed from the operating system's CSPRNG. This is the
    /// seed that gets persisted alongside the hand record so the shuffle can
    /// be replayed later even though it wasn't chosen by the caller.
    pub fn new_seeded_from_os_rng() -> Self {
        let seed = OsRng.next_u64();
        Self::new_with_seed(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        if self.position >= self.cards.len() {
            None
        } else {
            let c = self.cards[self.position];
            self.position += 1;
            Some(c)
        }
    }

    pub fn burn_card(&mut self) {
        let _ = self.deal_card();
    }

    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.position = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

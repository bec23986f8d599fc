use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// 32-byte seed that fully determines a shuffle.
///
/// Normally produced by [`crate::commit_reveal::combine_secrets`]; any peer
/// holding the same seed reproduces the same deck.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DeckSeed([u8; 32]);

impl DeckSeed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Convenience for tests and single-host play where no commit-reveal
    /// round is run.
    pub fn from_u64(x: u64) -> Self {
        let mut b = [0u8; 32];
        b[..8].copy_from_slice(&x.to_le_bytes());
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for DeckSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeckSeed({})", self.to_hex())
    }
}

impl From<DeckSeed> for String {
    fn from(seed: DeckSeed) -> Self {
        seed.to_hex()
    }
}

impl TryFrom<String> for DeckSeed {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut b = [0u8; 32];
        hex::decode_to_slice(value, &mut b)?;
        Ok(Self(b))
    }
}

/// Fisher-Yates driven by `SHA-256(seed || counter)`.
///
/// Walks `i` from the last index down to 1. The swap partner is the first
/// four digest bytes (big-endian) modulo `i + 1`, and `counter` (4 bytes,
/// little-endian) advances once per swap. Output is bit-identical on every
/// implementation that follows these rules.
pub fn shuffle(cards: &[Card], seed: &DeckSeed) -> Vec<Card> {
    let mut shuffled = cards.to_vec();
    let mut counter: u32 = 0;
    for i in (1..shuffled.len()).rev() {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update(counter.to_le_bytes());
        let digest = hasher.finalize();
        counter = counter.wrapping_add(1);
        let r = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let j = (r as usize) % (i + 1);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Remaining cards of one hand, consumed from the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Unshuffled deck in canonical order.
    pub fn new() -> Self {
        Self { cards: full_deck() }
    }

    pub fn shuffled(seed: &DeckSeed) -> Self {
        Self {
            cards: shuffle(&full_deck(), seed),
        }
    }

    /// Removes and returns the first `n` cards. Leaves the deck untouched
    /// when fewer than `n` remain.
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        if n > self.cards.len() {
            return Err(GameError::InsufficientCards {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn deal_card(&mut self) -> Result<Card, GameError> {
        let mut drawn = self.draw(1)?;
        // draw(1) returned exactly one card
        Ok(drawn.remove(0))
    }

    pub fn burn_card(&mut self) -> Result<(), GameError> {
        self.draw(1).map(|_| ())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

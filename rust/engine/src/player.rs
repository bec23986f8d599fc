use std::fmt;

use crate::cards::Card;
use serde::{Deserialize, Serialize};

/// Chip amounts. Integer only; every settlement conserves the total.
pub type Chips = u64;

/// Opaque participant identifier assigned by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Represents a player action during a betting round.
/// Actions can involve betting amounts or no-cost moves like check/fold.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (no bet, only valid if no bet to call)
    Check,
    /// Call the current bet
    Call,
    /// Open the betting with the specified amount
    Bet(Chips),
    /// Raise the current bet by the specified amount
    Raise(Chips),
    /// Commit all remaining chips
    AllIn,
}

/// A participant seated at the table, with per-hand flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    id: ParticipantId,
    stack: Chips,
    // private until showdown, see `Table::visible_hole_cards`
    #[serde(skip)]
    hole: Vec<Card>,
    folded: bool,
    in_hand: bool,
}

impl Seat {
    pub fn new(id: ParticipantId, stack: Chips) -> Self {
        Self {
            id,
            stack,
            hole: Vec::with_capacity(2),
            folded: false,
            in_hand: false,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub(crate) fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    /// Dealt into the current hand.
    pub fn is_in_hand(&self) -> bool {
        self.in_hand
    }
    /// Dealt in and not folded.
    pub fn is_contending(&self) -> bool {
        self.in_hand && !self.folded
    }
    /// Contending and still able to put chips in.
    pub fn can_act(&self) -> bool {
        self.is_contending() && self.stack > 0
    }

    pub(crate) fn begin_hand(&mut self) {
        self.hole.clear();
        self.folded = false;
        self.in_hand = self.stack > 0;
    }

    pub(crate) fn end_hand(&mut self) {
        self.hole.clear();
        self.folded = false;
        self.in_hand = false;
    }

    pub(crate) fn give_card(&mut self, c: Card) {
        self.hole.push(c);
    }

    pub(crate) fn fold(&mut self) {
        self.folded = true;
    }

    pub(crate) fn add_chips(&mut self, amount: Chips) {
        self.stack = self.stack.saturating_add(amount);
    }

    /// Removes up to `amount` from the stack, returning what was taken.
    pub(crate) fn take_chips(&mut self, amount: Chips) -> Chips {
        let taken = amount.min(self.stack);
        self.stack -= taken;
        taken
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Represents one of the four suits in a standard 52-card deck.
/// Suits carry no strength; the ordering only fixes the canonical deck order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

impl Suit {
    pub fn index(self) -> usize {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    fn from_char(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'c' | '♣' => Some(Suit::Clubs),
            'd' | '♦' => Some(Suit::Diamonds),
            'h' | '♥' => Some(Suit::Hearts),
            's' | '♠' => Some(Suit::Spades),
            _ => None,
        }
    }
}

/// Represents the rank (face value) of a playing card from Two through Ace.
/// The discriminant is the rank's numeric value used by the evaluator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    /// Rank 2
    Two = 2,
    /// Rank 3
    Three,
    /// Rank 4
    Four,
    /// Rank 5
    Five,
    /// Rank 6
    Six,
    /// Rank 7
    Seven,
    /// Rank 8
    Eight,
    /// Rank 9
    Nine,
    /// Rank 10
    Ten,
    /// Jack (11)
    Jack,
    /// Queen (12)
    Queen,
    /// King (13)
    King,
    /// Ace (14)
    Ace,
}

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn as_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    fn from_text(s: &str) -> Option<Rank> {
        if s == "10" {
            return Some(Rank::Ten);
        }
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        all_ranks()
            .into_iter()
            .find(|r| r.as_char() == c.to_ascii_uppercase())
    }
}

/// A single playing card. Immutable value type, equal by (rank, suit).
///
/// Cards travel over the wire in two-character notation such as `"Ah"`
/// or `"Tc"`.
///
/// ```
/// use poker_core::cards::{Card, Rank, Suit};
///
/// let card: Card = "Ah".parse().unwrap();
/// assert_eq!(card, Card::new(Rank::Ace, Suit::Hearts));
/// assert_eq!(card.to_string(), "Ah");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card {
    /// The suit of the card (Clubs, Diamonds, Hearts, or Spades)
    pub suit: Suit,
    /// The rank of the card (Two through Ace)
    pub rank: Rank,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { suit, rank }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.as_char(), self.suit.as_char())
    }
}

impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidCard { text: s.to_string() };
        let trimmed = s.trim();
        let suit_char = trimmed.chars().last().ok_or_else(invalid)?;
        let suit = Suit::from_char(suit_char).ok_or_else(invalid)?;
        let rank_text = &trimmed[..trimmed.len() - suit_char.len_utf8()];
        let rank = Rank::from_text(rank_text).ok_or_else(invalid)?;
        Ok(Card { suit, rank })
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

impl TryFrom<String> for Card {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parses whitespace-separated card notation, e.g. `"Ah Kd 7c"`.
pub fn parse_cards(text: &str) -> Result<Vec<Card>, GameError> {
    text.split_whitespace().map(str::parse).collect()
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

/// The 52 cards in canonical order: suit by suit (clubs first), Two..Ace
/// within each suit. Every peer must build exactly this sequence before
/// shuffling.
pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &s in &all_suits() {
        for &r in &all_ranks() {
            v.push(Card { suit: s, rank: r });
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_parses_ten_both_ways() {
        let a: Card = "Tc".parse().unwrap();
        let b: Card = "10c".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rank, Rank::Ten);
    }

    #[test]
    fn notation_rejects_garbage() {
        assert!("Xh".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
        assert!("Az".parse::<Card>().is_err());
    }

    #[test]
    fn suit_symbols_are_accepted() {
        let card: Card = "K♠".parse().unwrap();
        assert_eq!(card, Card::new(Rank::King, Suit::Spades));
    }

    #[test]
    fn serializes_as_notation() {
        let card = Card::new(Rank::Queen, Suit::Diamonds);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"Qd\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn canonical_order_starts_with_two_of_clubs() {
        let deck = full_deck();
        assert_eq!(deck[0], Card::new(Rank::Two, Suit::Clubs));
        assert_eq!(deck[12], Card::new(Rank::Ace, Suit::Clubs));
        assert_eq!(deck[51], Card::new(Rank::Ace, Suit::Spades));
    }
}

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    HighCard = 0,
    #[serde(rename = "pair")]
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::HighCard => "high-card",
            Category::OnePair => "pair",
            Category::TwoPair => "two-pair",
            Category::ThreeOfAKind => "three-of-a-kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full-house",
            Category::FourOfAKind => "four-of-a-kind",
            Category::StraightFlush => "straight-flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which a five-card hand is matched against the categories.
/// The first category whose pattern matches wins; a straight flush must be
/// tested before quads and a flush before a straight.
pub const CATEGORY_PRECEDENCE: [Category; 9] = [
    Category::StraightFlush,
    Category::FourOfAKind,
    Category::FullHouse,
    Category::Flush,
    Category::Straight,
    Category::ThreeOfAKind,
    Category::TwoPair,
    Category::OnePair,
    Category::HighCard,
];

/// Evaluated strength of the best five cards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub category: Category,
    /// Rank values (2..=14) compared left to right after the category.
    pub tiebreakers: Vec<u8>,
    /// `category << 20` followed by up to five 4-bit tiebreakers. Larger is
    /// stronger; equal scores are true ties.
    pub score: u32,
    pub best_five: [Card; 5],
}

/// Evaluates two hole cards plus up to five community cards.
///
/// ```
/// use poker_core::cards::parse_cards;
/// use poker_core::hand::{evaluate_hand, Category};
///
/// let hole = parse_cards("As Ks").unwrap();
/// let board = parse_cards("Qs Js Ts 2h 3c").unwrap();
/// let result = evaluate_hand(&hole, &board).unwrap();
/// assert_eq!(result.category, Category::StraightFlush);
/// ```
pub fn evaluate_hand(hole: &[Card], board: &[Card]) -> Result<HandResult, GameError> {
    let mut cards = Vec::with_capacity(hole.len() + board.len());
    cards.extend_from_slice(hole);
    cards.extend_from_slice(board);
    evaluate_cards(&cards)
}

/// Best five-card result over every 5-card subset of 5..=7 cards.
pub fn evaluate_cards(cards: &[Card]) -> Result<HandResult, GameError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(GameError::InvalidCardCount { count: cards.len() });
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for &c in cards {
        if !seen.insert(c) {
            return Err(GameError::DuplicateCard { card: c });
        }
    }

    let mut best: Option<HandResult> = None;
    for idx in five_card_subsets(cards.len()) {
        let five = idx.map(|i| cards[i]);
        let result = evaluate_five(&five);
        if best.as_ref().map_or(true, |b| result.score > b.score) {
            best = Some(result);
        }
    }
    best.ok_or(GameError::InvalidCardCount { count: cards.len() })
}

pub fn compare_hands(a: &HandResult, b: &HandResult) -> Ordering {
    a.score.cmp(&b.score)
}

/// Rank/suit frequency table of exactly five cards, built once per
/// evaluation.
struct Frequencies {
    /// (count, rank) sorted by count then rank, both descending.
    groups: Vec<(u8, u8)>,
    flush: bool,
    straight_high: Option<u8>,
}

impl Frequencies {
    fn of(cards: &[Card; 5]) -> Self {
        let mut rank_counts = [0u8; 15]; // 2..14 used
        let mut suit_counts = [0u8; 4];
        for c in cards {
            rank_counts[c.rank.value() as usize] += 1;
            suit_counts[c.suit.index()] += 1;
        }
        let mut groups: Vec<(u8, u8)> = (2..=14u8)
            .rev()
            .filter(|&r| rank_counts[r as usize] > 0)
            .map(|r| (rank_counts[r as usize], r))
            .collect();
        groups.sort_by(|a, b| b.cmp(a));

        let straight_high = if groups.len() == 5 {
            let high = groups[0].1;
            let low = groups[4].1;
            if high - low == 4 {
                Some(high)
            } else if high == 14 && groups[1].1 == 5 {
                // wheel: A-2-3-4-5 plays as a five-high straight
                Some(5)
            } else {
                None
            }
        } else {
            None
        };

        Self {
            groups,
            flush: suit_counts.contains(&5),
            straight_high,
        }
    }

    fn shape(&self) -> Vec<u8> {
        self.groups.iter().map(|&(count, _)| count).collect()
    }

    fn ranks(&self) -> Vec<u8> {
        self.groups.iter().map(|&(_, rank)| rank).collect()
    }

    fn matches(&self, category: Category) -> bool {
        let shape = self.shape();
        match category {
            Category::StraightFlush => self.flush && self.straight_high.is_some(),
            Category::FourOfAKind => shape == [4, 1],
            Category::FullHouse => shape == [3, 2],
            Category::Flush => self.flush,
            Category::Straight => self.straight_high.is_some(),
            Category::ThreeOfAKind => shape == [3, 1, 1],
            Category::TwoPair => shape == [2, 2, 1],
            Category::OnePair => shape == [2, 1, 1, 1],
            Category::HighCard => true,
        }
    }

    fn tiebreakers(&self, category: Category) -> Vec<u8> {
        match category {
            Category::StraightFlush | Category::Straight => {
                self.straight_high.into_iter().collect()
            }
            // Grouped ranks already read quad/trip/pair first, then kickers
            // high to low.
            _ => self.ranks(),
        }
    }
}

pub fn evaluate_five(cards: &[Card; 5]) -> HandResult {
    let freq = Frequencies::of(cards);
    let category = CATEGORY_PRECEDENCE
        .into_iter()
        .find(|&c| freq.matches(c))
        .unwrap_or(Category::HighCard);
    let tiebreakers = freq.tiebreakers(category);
    let score = encode_score(category, &tiebreakers);

    let mut best_five = *cards;
    best_five.sort_by(|a, b| b.rank.cmp(&a.rank).then(b.suit.cmp(&a.suit)));
    HandResult {
        category,
        tiebreakers,
        score,
        best_five,
    }
}

fn encode_score(category: Category, tiebreakers: &[u8]) -> u32 {
    let mut score = (category as u32) << 20;
    for (i, &t) in tiebreakers.iter().take(5).enumerate() {
        score |= (t as u32 & 0xF) << (16 - 4 * i as u32);
    }
    score
}

fn five_card_subsets(n: usize) -> Vec<[usize; 5]> {
    let mut out = Vec::new();
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        out.push([a, b, c, d, e]);
                    }
                }
            }
        }
    }
    out
}

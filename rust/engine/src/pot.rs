use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::{Chips, ParticipantId};

/// Chips a participant has put in over the whole hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    pub participant_id: ParticipantId,
    pub amount: Chips,
}

impl BetRecord {
    pub fn new(participant_id: impl Into<ParticipantId>, amount: Chips) -> Self {
        Self {
            participant_id: participant_id.into(),
            amount,
        }
    }
}

/// One main or side pot and the participants who may win it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<ParticipantId>,
}

/// Splits hand contributions into pots, smallest level first.
///
/// Each distinct contribution level forms one layer. A layer is paid by
/// everyone who reached it, and only they are eligible for it, so
/// eligibility can only shrink from one pot to the next. Equal
/// contributions share a layer rather than producing empty pots.
///
/// ```
/// use poker_core::pot::{calculate_side_pots, BetRecord};
///
/// let pots = calculate_side_pots(&[
///     BetRecord::new("a", 100),
///     BetRecord::new("b", 200),
///     BetRecord::new("c", 300),
/// ]);
/// let amounts: Vec<u64> = pots.iter().map(|p| p.amount).collect();
/// assert_eq!(amounts, vec![300, 200, 100]);
/// assert_eq!(pots[2].eligible.len(), 1);
/// ```
pub fn calculate_side_pots(bets: &[BetRecord]) -> Vec<Pot> {
    let contributors: Vec<&BetRecord> = bets.iter().filter(|b| b.amount > 0).collect();
    let levels: BTreeSet<Chips> = contributors.iter().map(|b| b.amount).collect();

    let mut pots = Vec::with_capacity(levels.len());
    let mut previous: Chips = 0;
    for level in levels {
        let eligible: Vec<ParticipantId> = contributors
            .iter()
            .filter(|b| b.amount >= level)
            .map(|b| b.participant_id.clone())
            .collect();
        pots.push(Pot {
            amount: (level - previous) * eligible.len() as Chips,
            eligible,
        });
        previous = level;
    }
    pots
}

pub fn total_contributed(bets: &[BetRecord]) -> Chips {
    bets.iter().map(|b| b.amount).sum()
}

/// House fee applied when a hand settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RakePolicy {
    pub bps: u32,
    pub cap: Option<Chips>,
}

impl RakePolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn amount_for(&self, total: Chips) -> Chips {
        let raw = ((total as u128 * self.bps as u128) / 10_000) as Chips;
        match self.cap {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }
}

/// Chips credited to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub participant_id: ParticipantId,
    pub amount: Chips,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotAward {
    pub pot_index: usize,
    /// Amount distributed after rake and roll-overs.
    pub amount: Chips,
    pub winners: Vec<ParticipantId>,
    pub shares: Vec<Share>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub pots: Vec<Pot>,
    pub awards: Vec<PotAward>,
    pub rake: Chips,
}

impl Settlement {
    pub fn won_by(&self, id: &ParticipantId) -> Chips {
        self.awards
            .iter()
            .flat_map(|a| a.shares.iter())
            .filter(|s| &s.participant_id == id)
            .map(|s| s.amount)
            .sum()
    }
}

/// Awards every pot to its best-scoring contenders.
///
/// `scores` holds the showdown score of each participant still contending;
/// folded participants are absent and can never win. A pot whose eligible
/// set has no contender rolls into the closest smaller pot that has one
/// (or, failing that, the next larger). Rake is taken smallest pot first.
/// Split pots go out evenly and the odd chips are handed one at a time to
/// winners in `seat_order`.
pub fn award_pots(
    pots: &[Pot],
    scores: &BTreeMap<ParticipantId, u32>,
    seat_order: &[ParticipantId],
    rake: RakePolicy,
) -> Result<Settlement, GameError> {
    let contenders: Vec<Vec<&ParticipantId>> = pots
        .iter()
        .map(|p| p.eligible.iter().filter(|id| scores.contains_key(*id)).collect())
        .collect();
    if !contenders.iter().any(|c| !c.is_empty()) {
        return Err(GameError::MissingParticipant);
    }

    let mut amounts: Vec<Chips> = pots.iter().map(|p| p.amount).collect();
    for i in 0..pots.len() {
        if contenders[i].is_empty() {
            let target = (0..i)
                .rev()
                .find(|&j| !contenders[j].is_empty())
                .or_else(|| (i + 1..pots.len()).find(|&j| !contenders[j].is_empty()));
            if let Some(j) = target {
                amounts[j] += amounts[i];
                amounts[i] = 0;
            }
        }
    }

    let total: Chips = amounts.iter().sum();
    let rake_total = rake.amount_for(total);
    let mut rake_left = rake_total;
    for amount in amounts.iter_mut() {
        let taken = rake_left.min(*amount);
        *amount -= taken;
        rake_left -= taken;
    }

    let seat_pos = |id: &ParticipantId| {
        seat_order
            .iter()
            .position(|s| s == id)
            .unwrap_or(seat_order.len())
    };

    let mut awards = Vec::new();
    for (i, amount) in amounts.into_iter().enumerate() {
        if contenders[i].is_empty() || amount == 0 {
            continue;
        }
        let best = contenders[i]
            .iter()
            .map(|id| scores[*id])
            .max()
            .unwrap_or_default();
        let mut winners: Vec<ParticipantId> = contenders[i]
            .iter()
            .filter(|id| scores[**id] == best)
            .map(|id| (*id).clone())
            .collect();
        winners.sort_by(|a, b| seat_pos(a).cmp(&seat_pos(b)).then(a.cmp(b)));

        let n = winners.len() as Chips;
        let base = amount / n;
        let odd = amount % n;
        let shares = winners
            .iter()
            .enumerate()
            .map(|(k, id)| Share {
                participant_id: id.clone(),
                amount: base + if (k as Chips) < odd { 1 } else { 0 },
            })
            .collect();
        awards.push(PotAward {
            pot_index: i,
            amount,
            winners,
            shares,
        });
    }

    Ok(Settlement {
        pots: pots.to_vec(),
        awards,
        rake: rake_total,
    })
}

/// Net result of a hand for one participant, for the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipDelta {
    pub participant_id: ParticipantId,
    /// Chips won minus chips committed.
    pub delta: i64,
}

pub fn chip_deltas(bets: &[BetRecord], settlement: &Settlement) -> Vec<ChipDelta> {
    bets.iter()
        .map(|b| ChipDelta {
            participant_id: b.participant_id.clone(),
            delta: settlement.won_by(&b.participant_id) as i64 - b.amount as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s)
    }

    #[test]
    fn zero_contributions_are_ignored() {
        let pots = calculate_side_pots(&[BetRecord::new("a", 0), BetRecord::new("b", 0)]);
        assert!(pots.is_empty());
    }

    #[test]
    fn equal_levels_make_one_pot() {
        let pots = calculate_side_pots(&[
            BetRecord::new("a", 100),
            BetRecord::new("b", 100),
            BetRecord::new("c", 250),
        ]);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[1].amount, 150);
        assert_eq!(pots[1].eligible, vec![id("c")]);
    }

    #[test]
    fn odd_chip_goes_to_first_seat_in_order() {
        let pots = vec![Pot {
            amount: 101,
            eligible: vec![id("a"), id("b")],
        }];
        let scores = BTreeMap::from([(id("a"), 7), (id("b"), 7)]);
        let s = award_pots(&pots, &scores, &[id("b"), id("a")], RakePolicy::none()).unwrap();
        assert_eq!(s.won_by(&id("b")), 51);
        assert_eq!(s.won_by(&id("a")), 50);
    }

    #[test]
    fn folded_only_pot_rolls_down() {
        let pots = vec![
            Pot {
                amount: 300,
                eligible: vec![id("a"), id("b"), id("c")],
            },
            Pot {
                amount: 100,
                eligible: vec![id("c")],
            },
        ];
        // c folded
        let scores = BTreeMap::from([(id("a"), 10), (id("b"), 20)]);
        let s = award_pots(&pots, &scores, &[], RakePolicy::none()).unwrap();
        assert_eq!(s.won_by(&id("b")), 400);
    }

    #[test]
    fn rake_is_capped() {
        let rake = RakePolicy {
            bps: 500,
            cap: Some(30),
        };
        assert_eq!(rake.amount_for(400), 20);
        assert_eq!(rake.amount_for(10_000), 30);
    }

    #[test]
    fn no_contender_at_all_is_an_error() {
        let pots = vec![Pot {
            amount: 10,
            eligible: vec![id("a")],
        }];
        assert!(award_pots(&pots, &BTreeMap::new(), &[], RakePolicy::none()).is_err());
    }
}

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::cards::Card;
use crate::config::{ConfigError, TableConfig};
use crate::deck::{Deck, DeckSeed};
use crate::errors::GameError;
use crate::hand::evaluate_hand;
use crate::history::{ActionRecord, HandRecord, ShowdownInfo, ShownHand, Street};
use crate::messages::TableView;
use crate::phase::{self, HandEvent, HandPhase};
use crate::player::{Chips, ParticipantId, PlayerAction, Seat};
use crate::pot::{
    award_pots, calculate_side_pots, chip_deltas, BetRecord, ChipDelta, Pot, RakePolicy,
    Settlement,
};
use crate::rules::{validate_action, ValidatedAction};
use crate::turn::{self, TurnEvent, TurnState};

/// Cards dealt on one street during an action, in dealing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealtStreet {
    pub phase: HandPhase,
    pub cards: Vec<Card>,
}

/// What happened as a consequence of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Phase after the action and any streets it triggered.
    pub phase: HandPhase,
    /// Streets dealt because betting closed, possibly several on an all-in runout.
    pub dealt: Vec<DealtStreet>,
    pub next_to_act: Option<ParticipantId>,
}

#[derive(Debug, Clone)]
struct HandState {
    deck: Deck,
    board: Vec<Card>,
    /// Indexed like `Table::seats`.
    bets: Vec<BetRecord>,
    street_bets: Vec<Chips>,
    acted: Vec<bool>,
    high_bet: Chips,
    min_raise: Chips,
    showdown: bool,
    settlement: Option<Settlement>,
    record: HandRecord,
}

/// One table: seats, button and the hand in progress.
///
/// Every mutating call either applies completely or returns an error and
/// leaves the table untouched.
///
/// # Examples
///
/// ```
/// use poker_core::config::TableConfig;
/// use poker_core::deck::DeckSeed;
/// use poker_core::phase::HandPhase;
/// use poker_core::player::PlayerAction;
/// use poker_core::table::Table;
///
/// let mut table = Table::new(TableConfig::default()).unwrap();
/// table.join("alice".into(), 5_000).unwrap();
/// table.join("bob".into(), 5_000).unwrap();
/// table.seats_ready().unwrap();
/// table.start_hand(DeckSeed::from_u64(7)).unwrap();
///
/// // heads-up: the button (alice) posts the small blind and acts first
/// assert_eq!(table.active_participant().map(|p| p.as_str()), Some("alice"));
/// let out = table.act(&"alice".into(), PlayerAction::Fold).unwrap();
/// assert_eq!(out.phase, HandPhase::Payout);
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    config: TableConfig,
    phase: HandPhase,
    seats: Vec<Seat>,
    button: usize,
    hand_number: u64,
    turn: TurnState,
    hand: Option<HandState>,
    last_record: Option<HandRecord>,
}

impl Table {
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: HandPhase::Waiting,
            seats: Vec::new(),
            button: 0,
            hand_number: 0,
            turn: TurnState::new(),
            hand: None,
            last_record: None,
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn join(&mut self, id: ParticipantId, buy_in: Chips) -> Result<(), GameError> {
        let next = phase::transition(self.phase, HandEvent::PlayerJoined)?;
        if self.seats.iter().any(|s| s.id() == &id) {
            return Err(GameError::DuplicateParticipant { participant: id });
        }
        if self.seats.len() >= self.config.seat_max {
            return Err(GameError::TableFull {
                seat_max: self.config.seat_max,
            });
        }
        if buy_in < self.config.buy_in_min || buy_in > self.config.buy_in_max {
            return Err(GameError::InvalidBuyIn {
                amount: buy_in,
                min: self.config.buy_in_min,
                max: self.config.buy_in_max,
            });
        }
        info!(participant = %id, buy_in, "seated");
        self.seats.push(Seat::new(id, buy_in));
        self.phase = next;
        Ok(())
    }

    pub fn seats_ready(&mut self) -> Result<(), GameError> {
        let next = phase::transition(self.phase, HandEvent::SeatsReady)?;
        if self.seats.len() < 2 {
            return Err(GameError::NotEnoughPlayers {
                count: self.seats.len(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Removes a participant between hands and returns the stack they leave with.
    pub fn leave(&mut self, id: &ParticipantId) -> Result<Chips, GameError> {
        if self.phase.is_street() || self.phase.is_revealed() {
            return Err(GameError::InvalidTransition {
                from: self.phase.as_str(),
                event: "LEAVE",
            });
        }
        let idx = self.seat_index(id)?;
        let seat = self.seats.remove(idx);
        if idx < self.button {
            self.button -= 1;
        }
        if self.button >= self.seats.len() {
            self.button = 0;
        }
        info!(participant = %id, stack = seat.stack(), "left table");
        Ok(seat.stack())
    }

    pub fn start_hand(&mut self, seed: DeckSeed) -> Result<ActionOutcome, GameError> {
        let mut next = self.clone();
        let outcome = next.begin_hand(seed)?;
        *self = next;
        Ok(outcome)
    }

    pub fn act(
        &mut self,
        id: &ParticipantId,
        action: PlayerAction,
    ) -> Result<ActionOutcome, GameError> {
        let mut next = self.clone();
        let outcome = next.apply_action(id, action)?;
        *self = next;
        Ok(outcome)
    }

    /// Evaluates every contender and awards the pots.
    pub fn resolve_showdown(&mut self) -> Result<Settlement, GameError> {
        let mut next = self.clone();
        let settlement = next.settle_showdown()?;
        *self = next;
        Ok(settlement)
    }

    /// Credits the awarded chips and returns each participant's net result.
    pub fn complete_payout(&mut self) -> Result<Vec<ChipDelta>, GameError> {
        let next_phase = phase::transition(self.phase, HandEvent::PayoutComplete)?;
        let hand = self.hand.as_mut().ok_or(GameError::InvalidTransition {
            from: self.phase.as_str(),
            event: HandEvent::PayoutComplete.as_str(),
        })?;
        let settlement = hand.settlement.clone().ok_or(GameError::InvalidTransition {
            from: self.phase.as_str(),
            event: HandEvent::PayoutComplete.as_str(),
        })?;
        for award in &settlement.awards {
            for share in &award.shares {
                if let Some(seat) = self.seats.iter_mut().find(|s| s.id() == &share.participant_id)
                {
                    seat.add_chips(share.amount);
                }
            }
        }
        let bets: Vec<BetRecord> = in_hand_bets(&self.seats, &hand.bets);
        let deltas = chip_deltas(&bets, &settlement);
        hand.record.deltas = deltas.clone();
        self.phase = next_phase;
        info!(hand = self.hand_number, rake = settlement.rake, "payout complete");
        Ok(deltas)
    }

    /// Moves the button to the next seat with chips and clears the hand.
    pub fn rotate_dealer(&mut self) -> Result<(), GameError> {
        let next_phase = phase::transition(self.phase, HandEvent::DealerRotated)?;
        if let Some(hand) = self.hand.take() {
            self.last_record = Some(hand.record);
        }
        for seat in &mut self.seats {
            seat.end_hand();
        }
        if let Some(b) = self.next_seat(self.button, |s| s.stack() > 0) {
            self.button = b;
        }
        self.turn = TurnState::new();
        self.phase = next_phase;
        debug!(button = self.button, "dealer rotated");
        Ok(())
    }

    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn active_participant(&self) -> Option<&ParticipantId> {
        self.turn.active()
    }

    pub fn button(&self) -> Option<&ParticipantId> {
        self.seats.get(self.button).map(|s| s.id())
    }

    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, id: &ParticipantId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id() == id)
    }

    pub fn board(&self) -> &[Card] {
        self.hand.as_ref().map(|h| h.board.as_slice()).unwrap_or(&[])
    }

    /// Contributions of everyone dealt into the current hand.
    pub fn bet_records(&self) -> Vec<BetRecord> {
        self.hand
            .as_ref()
            .map(|h| in_hand_bets(&self.seats, &h.bets))
            .unwrap_or_default()
    }

    pub fn pot_total(&self) -> Chips {
        self.bet_records().iter().map(|b| b.amount).sum()
    }

    /// Side pots as they would be built from the contributions so far.
    pub fn pots(&self) -> Vec<Pot> {
        calculate_side_pots(&self.bet_records())
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.hand.as_ref().and_then(|h| h.settlement.as_ref())
    }

    /// Hole cards of `target` as `viewer` may see them.
    pub fn visible_hole_cards(
        &self,
        viewer: &ParticipantId,
        target: &ParticipantId,
    ) -> Option<&[Card]> {
        let seat = self.seat(target)?;
        if seat.hole_cards().is_empty() {
            return None;
        }
        // an uncontested winner never shows
        let revealed = self.phase.is_revealed() && self.hand.as_ref().is_some_and(|h| h.showdown);
        if viewer == target || (revealed && seat.is_contending()) {
            Some(seat.hole_cards())
        } else {
            None
        }
    }

    /// Record of the hand in progress, or of the last finished hand.
    pub fn hand_record(&self) -> Option<&HandRecord> {
        self.hand
            .as_ref()
            .map(|h| &h.record)
            .or(self.last_record.as_ref())
    }

    pub fn view(&self) -> TableView {
        TableView {
            phase: self.phase,
            turn_phase: self.turn.phase(),
            active_participant: self.turn.active().cloned(),
            pot_total: self.pot_total(),
            pots: self.pots(),
            board: self.board().to_vec(),
        }
    }

    fn seat_index(&self, id: &ParticipantId) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|s| s.id() == id)
            .ok_or_else(|| GameError::UnknownParticipant {
                participant: id.clone(),
            })
    }

    /// First seat clockwise after `from` (wrapping round to `from` itself) matching `pred`.
    fn next_seat(&self, from: usize, pred: impl Fn(&Seat) -> bool) -> Option<usize> {
        let n = self.seats.len();
        (1..=n).map(|k| (from + k) % n).find(|&i| pred(&self.seats[i]))
    }

    /// Seat ids clockwise starting left of the button.
    fn seat_order(&self) -> Vec<ParticipantId> {
        let n = self.seats.len();
        (1..=n)
            .map(|k| self.seats[(self.button + k) % n].id().clone())
            .collect()
    }

    fn rake_policy(&self) -> RakePolicy {
        RakePolicy {
            bps: self.config.rake_bps,
            cap: self.config.rake_cap,
        }
    }

    fn begin_hand(&mut self, seed: DeckSeed) -> Result<ActionOutcome, GameError> {
        let next_phase = phase::transition(self.phase, HandEvent::StartHand)?;
        let funded = self.seats.iter().filter(|s| s.stack() > 0).count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers { count: funded });
        }
        if self.seats[self.button].stack() == 0 {
            if let Some(b) = self.next_seat(self.button, |s| s.stack() > 0) {
                self.button = b;
            }
        }
        for seat in &mut self.seats {
            seat.begin_hand();
        }
        self.hand_number += 1;

        let n = self.seats.len();
        let in_hand = |s: &Seat| s.is_in_hand();
        let (sb, bb) = if funded == 2 {
            let other = self.next_seat(self.button, in_hand).unwrap_or(self.button);
            (self.button, other)
        } else {
            let sb = self.next_seat(self.button, in_hand).unwrap_or(self.button);
            let bb = self.next_seat(sb, in_hand).unwrap_or(sb);
            (sb, bb)
        };

        let mut record = HandRecord::new(self.hand_number);
        record.seed = Some(seed.to_hex());
        record.button = Some(self.seats[self.button].id().clone());

        let mut hand = HandState {
            deck: Deck::shuffled(&seed),
            board: Vec::with_capacity(5),
            bets: self
                .seats
                .iter()
                .map(|s| BetRecord::new(s.id().clone(), 0))
                .collect(),
            street_bets: vec![0; n],
            acted: vec![false; n],
            high_bet: 0,
            min_raise: self.config.big_blind,
            showdown: false,
            settlement: None,
            record,
        };

        for (idx, blind) in [(sb, self.config.small_blind), (bb, self.config.big_blind)] {
            let posted = self.seats[idx].take_chips(blind);
            hand.bets[idx].amount += posted;
            hand.street_bets[idx] += posted;
            hand.high_bet = hand.high_bet.max(hand.street_bets[idx]);
        }

        let order: Vec<usize> = (1..=n)
            .map(|k| (self.button + k) % n)
            .filter(|&i| self.seats[i].is_in_hand())
            .collect();
        for _ in 0..2 {
            for &i in &order {
                let card = hand.deck.deal_card()?;
                self.seats[i].give_card(card);
            }
        }

        info!(
            hand = self.hand_number,
            seed = %seed.to_hex(),
            button = %self.seats[self.button].id(),
            players = funded,
            "hand started"
        );
        self.hand = Some(hand);
        self.phase = next_phase;
        self.turn = TurnState::new();
        self.progress(bb)
    }

    fn apply_action(
        &mut self,
        id: &ParticipantId,
        action: PlayerAction,
    ) -> Result<ActionOutcome, GameError> {
        let street = Street::from_phase(self.phase).ok_or(GameError::InvalidTransition {
                from: self.phase.as_str(),
                event: "ACTION",
            })?;
        let idx = self.seat_index(id)?;
        let expected = self
            .turn
            .active()
            .cloned()
            .ok_or(GameError::ActionNotAllowed {
                phase: self.turn.phase().as_str(),
            })?;
        if &expected != id {
            return Err(GameError::NotPlayersTurn {
                expected,
                actual: id.clone(),
            });
        }
        if self.seats[idx].is_folded() {
            return Err(GameError::PlayerAlreadyFolded);
        }
        self.turn = turn::transition(&self.turn, TurnEvent::SubmitAction)?;

        let mut hand = self.hand.take().ok_or(GameError::ActionNotAllowed {
            phase: self.turn.phase().as_str(),
        })?;
        let seat = &mut self.seats[idx];
        let to_call = hand.high_bet.saturating_sub(hand.street_bets[idx]);
        let validated = validate_action(
            seat.stack(),
            to_call,
            hand.high_bet,
            hand.min_raise,
            action.clone(),
        )?;
        let chips = validated.chips_in(to_call);
        // a short all-in raise only lets players who already acted call or fold
        if hand.acted[idx] && chips > to_call {
            return Err(GameError::BettingNotReopened);
        }

        let put = seat.take_chips(chips);
        if validated == ValidatedAction::Fold {
            seat.fold();
        }
        hand.bets[idx].amount += put;
        hand.street_bets[idx] += put;
        let total = hand.street_bets[idx];
        if total > hand.high_bet {
            let raise = total - hand.high_bet;
            if raise >= hand.min_raise {
                hand.min_raise = raise;
                hand.acted.iter_mut().for_each(|a| *a = false);
            }
            hand.high_bet = total;
        }
        hand.acted[idx] = true;
        hand.record.actions.push(ActionRecord {
            participant_id: id.clone(),
            street,
            action,
            chips: put,
        });
        debug!(participant = %id, action = ?validated, chips = put, "action applied");

        self.hand = Some(hand);
        self.progress(idx)
    }

    /// Requests the next action, or closes the round and deals on until
    /// someone can act or the hand reaches showdown.
    fn progress(&mut self, last: usize) -> Result<ActionOutcome, GameError> {
        let mut hand = self.hand.take().ok_or(GameError::InvalidTransition {
            from: self.phase.as_str(),
            event: HandEvent::RoundComplete.as_str(),
        })?;
        let mut dealt = Vec::new();

        let contending: Vec<usize> = (0..self.seats.len())
            .filter(|&i| self.seats[i].is_contending())
            .collect();
        if let &[winner] = contending.as_slice() {
            self.phase = phase::transition(self.phase, HandEvent::UncontestedWin)?;
            self.turn = turn::transition(&self.turn, TurnEvent::Advance)?;
            let rake = if hand.board.is_empty() {
                RakePolicy::none()
            } else {
                self.rake_policy()
            };
            let pots = calculate_side_pots(&in_hand_bets(&self.seats, &hand.bets));
            let scores = BTreeMap::from([(self.seats[winner].id().clone(), 0)]);
            let settlement = award_pots(&pots, &scores, &self.seat_order(), rake)?;
            hand.record.pots = settlement.pots.clone();
            hand.record.rake = settlement.rake;
            info!(
                hand = self.hand_number,
                winner = %self.seats[winner].id(),
                "uncontested win"
            );
            hand.settlement = Some(settlement);
            self.hand = Some(hand);
            return Ok(ActionOutcome {
                phase: self.phase,
                dealt,
                next_to_act: None,
            });
        }

        let mut from = last;
        loop {
            if let Some(next) = self.next_to_act(&hand, from) {
                let id = self.seats[next].id().clone();
                self.turn =
                    turn::transition(&self.turn, TurnEvent::RequestAction(Some(id.clone())))?;
                self.hand = Some(hand);
                return Ok(ActionOutcome {
                    phase: self.phase,
                    dealt,
                    next_to_act: Some(id),
                });
            }

            self.turn = turn::transition(&self.turn, TurnEvent::Advance)?;
            self.phase = phase::transition(self.phase, HandEvent::RoundComplete)?;
            if self.phase == HandPhase::Showdown {
                hand.showdown = true;
                info!(hand = self.hand_number, "showdown");
                self.hand = Some(hand);
                return Ok(ActionOutcome {
                    phase: self.phase,
                    dealt,
                    next_to_act: None,
                });
            }

            let count = if self.phase == HandPhase::Flop { 3 } else { 1 };
            hand.deck.burn_card()?;
            let cards = hand.deck.draw(count)?;
            hand.board.extend_from_slice(&cards);
            hand.record.board = hand.board.clone();
            hand.street_bets.iter_mut().for_each(|b| *b = 0);
            hand.acted.iter_mut().for_each(|a| *a = false);
            hand.high_bet = 0;
            hand.min_raise = self.config.big_blind;
            info!(
                hand = self.hand_number,
                street = self.phase.as_str(),
                board = ?hand.board.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
                "street dealt"
            );
            dealt.push(DealtStreet {
                phase: self.phase,
                cards,
            });
            from = self.button;
        }
    }

    /// Next seat after `from` that still owes an action this round.
    fn next_to_act(&self, hand: &HandState, from: usize) -> Option<usize> {
        let able = self.seats.iter().filter(|s| s.can_act()).count();
        let n = self.seats.len();
        (1..=n).map(|k| (from + k) % n).find(|&i| {
            let matched = hand.street_bets[i] >= hand.high_bet;
            // a lone player with chips behind has nobody left to bet against
            self.seats[i].can_act() && (!hand.acted[i] || !matched) && !(able == 1 && matched)
        })
    }

    fn settle_showdown(&mut self) -> Result<Settlement, GameError> {
        let next_phase = phase::transition(self.phase, HandEvent::ShowdownResolved)?;
        let mut hand = self.hand.take().ok_or(GameError::InvalidTransition {
            from: self.phase.as_str(),
            event: HandEvent::ShowdownResolved.as_str(),
        })?;

        let mut scores = BTreeMap::new();
        let mut shown = Vec::new();
        for seat in self.seats.iter().filter(|s| s.is_contending()) {
            let result = evaluate_hand(seat.hole_cards(), &hand.board)?;
            debug!(
                participant = %seat.id(),
                category = %result.category,
                score = result.score,
                "hand evaluated"
            );
            scores.insert(seat.id().clone(), result.score);
            shown.push(ShownHand {
                participant_id: seat.id().clone(),
                hole: seat.hole_cards().to_vec(),
                category: result.category,
                score: result.score,
            });
        }

        let pots = calculate_side_pots(&in_hand_bets(&self.seats, &hand.bets));
        let settlement = award_pots(&pots, &scores, &self.seat_order(), self.rake_policy())?;
        let mut winners: Vec<ParticipantId> = Vec::new();
        for id in settlement.awards.iter().flat_map(|a| a.winners.iter()) {
            if !winners.contains(id) {
                winners.push(id.clone());
            }
        }
        info!(
            hand = self.hand_number,
            winners = ?winners.iter().map(|w| w.as_str()).collect::<Vec<_>>(),
            rake = settlement.rake,
            "showdown resolved"
        );
        hand.record.pots = settlement.pots.clone();
        hand.record.rake = settlement.rake;
        hand.record.showdown = Some(ShowdownInfo {
            winners,
            hands: shown,
        });
        hand.settlement = Some(settlement.clone());
        self.hand = Some(hand);
        self.phase = next_phase;
        Ok(settlement)
    }
}

fn in_hand_bets(seats: &[Seat], bets: &[BetRecord]) -> Vec<BetRecord> {
    seats
        .iter()
        .zip(bets)
        .filter(|(s, _)| s.is_in_hand())
        .map(|(_, b)| b.clone())
        .collect()
}

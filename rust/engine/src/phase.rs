use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Table/hand progression. Exactly one phase is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandPhase {
    Waiting,
    Seating,
    HandStart,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Payout,
    RotateDealer,
}

impl HandPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            HandPhase::Waiting => "waiting",
            HandPhase::Seating => "seating",
            HandPhase::HandStart => "handStart",
            HandPhase::Preflop => "preflop",
            HandPhase::Flop => "flop",
            HandPhase::Turn => "turn",
            HandPhase::River => "river",
            HandPhase::Showdown => "showdown",
            HandPhase::Payout => "payout",
            HandPhase::RotateDealer => "rotateDealer",
        }
    }

    /// Phases with an open betting round.
    pub fn is_street(self) -> bool {
        matches!(
            self,
            HandPhase::Preflop | HandPhase::Flop | HandPhase::Turn | HandPhase::River
        )
    }

    /// Hole cards of live players may be shown from here on.
    pub fn is_revealed(self) -> bool {
        matches!(
            self,
            HandPhase::Showdown | HandPhase::Payout | HandPhase::RotateDealer
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandEvent {
    PlayerJoined,
    SeatsReady,
    StartHand,
    RoundComplete,
    /// Everyone but one participant folded.
    UncontestedWin,
    ShowdownResolved,
    PayoutComplete,
    DealerRotated,
}

impl HandEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HandEvent::PlayerJoined => "PLAYER_JOINED",
            HandEvent::SeatsReady => "SEATS_READY",
            HandEvent::StartHand => "START_HAND",
            HandEvent::RoundComplete => "ROUND_COMPLETE",
            HandEvent::UncontestedWin => "UNCONTESTED_WIN",
            HandEvent::ShowdownResolved => "SHOWDOWN_RESOLVED",
            HandEvent::PayoutComplete => "PAYOUT_COMPLETE",
            HandEvent::DealerRotated => "DEALER_ROTATED",
        }
    }
}

/// Pure transition function of the hand state machine.
///
/// Progression is strictly forward; `RotateDealer -> HandStart` is the only
/// way back and starts the next hand. Joins are accepted only before the
/// first hand.
///
/// ```
/// use poker_core::phase::{transition, HandEvent, HandPhase};
///
/// let p = transition(HandPhase::Waiting, HandEvent::PlayerJoined).unwrap();
/// assert_eq!(p, HandPhase::Seating);
/// assert!(transition(HandPhase::Waiting, HandEvent::RoundComplete).is_err());
/// ```
pub fn transition(phase: HandPhase, event: HandEvent) -> Result<HandPhase, GameError> {
    use HandEvent as E;
    use HandPhase as P;
    let next = match (phase, event) {
        (P::Waiting | P::Seating, E::PlayerJoined) => P::Seating,
        (P::Seating, E::SeatsReady) => P::HandStart,
        (P::HandStart, E::StartHand) => P::Preflop,
        (P::Preflop, E::RoundComplete) => P::Flop,
        (P::Flop, E::RoundComplete) => P::Turn,
        (P::Turn, E::RoundComplete) => P::River,
        (P::River, E::RoundComplete) => P::Showdown,
        (P::Preflop | P::Flop | P::Turn | P::River, E::UncontestedWin) => P::Payout,
        (P::Showdown, E::ShowdownResolved) => P::Payout,
        (P::Payout, E::PayoutComplete) => P::RotateDealer,
        (P::RotateDealer, E::DealerRotated) => P::HandStart,
        _ => {
            return Err(GameError::InvalidTransition {
                from: phase.as_str(),
                event: event.as_str(),
            })
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [HandPhase; 10] = [
        HandPhase::Waiting,
        HandPhase::Seating,
        HandPhase::HandStart,
        HandPhase::Preflop,
        HandPhase::Flop,
        HandPhase::Turn,
        HandPhase::River,
        HandPhase::Showdown,
        HandPhase::Payout,
        HandPhase::RotateDealer,
    ];

    #[test]
    fn streets_and_revealed_phases_are_disjoint() {
        let streets: Vec<HandPhase> = ALL_PHASES.into_iter().filter(|p| p.is_street()).collect();
        assert_eq!(
            streets,
            vec![HandPhase::Preflop, HandPhase::Flop, HandPhase::Turn, HandPhase::River]
        );
        let revealed: Vec<HandPhase> =
            ALL_PHASES.into_iter().filter(|p| p.is_revealed()).collect();
        assert_eq!(
            revealed,
            vec![HandPhase::Showdown, HandPhase::Payout, HandPhase::RotateDealer]
        );
    }

    #[test]
    fn joins_only_before_play() {
        for p in ALL_PHASES {
            let ok = transition(p, HandEvent::PlayerJoined).is_ok();
            assert_eq!(ok, matches!(p, HandPhase::Waiting | HandPhase::Seating), "{:?}", p);
        }
    }

    #[test]
    fn round_complete_walks_the_streets() {
        let mut p = HandPhase::Preflop;
        let mut seen = vec![p];
        while p != HandPhase::Showdown {
            p = transition(p, HandEvent::RoundComplete).unwrap();
            seen.push(p);
        }
        assert_eq!(
            seen,
            vec![
                HandPhase::Preflop,
                HandPhase::Flop,
                HandPhase::Turn,
                HandPhase::River,
                HandPhase::Showdown
            ]
        );
        assert!(transition(HandPhase::Showdown, HandEvent::RoundComplete).is_err());
    }

    #[test]
    fn rotate_dealer_starts_next_hand() {
        assert_eq!(
            transition(HandPhase::RotateDealer, HandEvent::DealerRotated),
            Ok(HandPhase::HandStart)
        );
    }

    #[test]
    fn error_names_phase_and_event() {
        let err = transition(HandPhase::Payout, HandEvent::StartHand).unwrap_err();
        assert_eq!(
            err,
            GameError::InvalidTransition {
                from: "payout",
                event: "START_HAND"
            }
        );
    }
}

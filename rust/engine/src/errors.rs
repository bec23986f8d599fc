use thiserror::Error;

use crate::cards::Card;
use crate::player::ParticipantId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Event {event} is not valid in phase {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
    #[error("Cannot draw {requested} cards, only {remaining} remain")]
    InsufficientCards { requested: usize, remaining: usize },
    #[error("Revealed secret of {participant} does not match its commitment")]
    CommitmentMismatch { participant: ParticipantId },
    #[error("Reveal deadline passed, missing: {missing:?}")]
    RevealTimeout { missing: Vec<ParticipantId> },
    #[error("Commit deadline passed, missing: {missing:?}")]
    CommitTimeout { missing: Vec<ParticipantId> },
    #[error("{participant} already committed to a different secret")]
    DuplicateCommitment { participant: ParticipantId },
    #[error("Unknown participant {participant}")]
    UnknownParticipant { participant: ParticipantId },
    #[error("Secret must be 32 bytes of hex")]
    InvalidSecret,
    #[error("Action not allowed while turn is {phase}")]
    ActionNotAllowed { phase: &'static str },
    #[error("Participant id required")]
    MissingParticipant,
    #[error("Hand evaluation needs 5 to 7 cards, got {count}")]
    InvalidCardCount { count: usize },
    #[error("Card {card} appears more than once")]
    DuplicateCard { card: Card },
    #[error("Invalid card notation: {text}")]
    InvalidCard { text: String },
    #[error("Invalid bet amount: {amount}, minimum: {minimum}")]
    InvalidBetAmount { amount: u64, minimum: u64 },
    #[error("Insufficient chips for action")]
    InsufficientChips,
    #[error("It's not {actual}'s turn (expected {expected})")]
    NotPlayersTurn {
        expected: ParticipantId,
        actual: ParticipantId,
    },
    #[error("Betting was not reopened, only call or fold")]
    BettingNotReopened,
    #[error("Player already folded")]
    PlayerAlreadyFolded,
    #[error("Table is full ({seat_max} seats)")]
    TableFull { seat_max: usize },
    #[error("{participant} is already seated")]
    DuplicateParticipant { participant: ParticipantId },
    #[error("Buy-in {amount} outside allowed range {min}..={max}")]
    InvalidBuyIn { amount: u64, min: u64, max: u64 },
    #[error("Need at least 2 players with chips, have {count}")]
    NotEnoughPlayers { count: usize },
}

//! JSON messages exchanged with the session/transport layer.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::commit_reveal::Commitment;
use crate::errors::GameError;
use crate::phase::HandPhase;
use crate::player::{Chips, ParticipantId, PlayerAction};
use crate::pot::Pot;
use crate::turn::TurnPhase;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMessage {
    pub participant_id: ParticipantId,
    pub commitment: Commitment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealMessage {
    pub participant_id: ParticipantId,
    /// Hex-encoded secret.
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub participant_id: ParticipantId,
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Chips>,
}

impl ActionMessage {
    pub fn to_action(&self) -> Result<PlayerAction, GameError> {
        let amount = || {
            self.amount
                .ok_or(GameError::InvalidBetAmount { amount: 0, minimum: 1 })
        };
        Ok(match self.action_type {
            ActionType::Fold => PlayerAction::Fold,
            ActionType::Check => PlayerAction::Check,
            ActionType::Call => PlayerAction::Call,
            ActionType::Bet => PlayerAction::Bet(amount()?),
            ActionType::Raise => PlayerAction::Raise(amount()?),
            ActionType::AllIn => PlayerAction::AllIn,
        })
    }
}

/// Snapshot of public table state for broadcast to viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub phase: HandPhase,
    pub turn_phase: TurnPhase,
    pub active_participant: Option<ParticipantId>,
    pub pot_total: Chips,
    pub pots: Vec<Pot>,
    pub board: Vec<Card>,
}

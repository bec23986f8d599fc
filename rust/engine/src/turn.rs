use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::ParticipantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnPhase {
    #[default]
    Idle,
    Awaiting,
    ActionTaken,
}

impl TurnPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnPhase::Idle => "idle",
            TurnPhase::Awaiting => "awaiting",
            TurnPhase::ActionTaken => "action-taken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    RequestAction(Option<ParticipantId>),
    SubmitAction,
    Advance,
}

/// Whose action is expected within the current betting round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnState {
    phase: TurnPhase,
    active: Option<ParticipantId>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn active(&self) -> Option<&ParticipantId> {
        self.active.as_ref()
    }
}

/// Pure transition function of the turn state machine.
pub fn transition(state: &TurnState, event: TurnEvent) -> Result<TurnState, GameError> {
    match event {
        TurnEvent::RequestAction(id) => {
            let id = id.ok_or(GameError::MissingParticipant)?;
            if state.phase == TurnPhase::Awaiting {
                return Err(GameError::ActionNotAllowed {
                    phase: state.phase.as_str(),
                });
            }
            Ok(TurnState {
                phase: TurnPhase::Awaiting,
                active: Some(id),
            })
        }
        TurnEvent::SubmitAction => {
            if state.phase != TurnPhase::Awaiting {
                return Err(GameError::ActionNotAllowed {
                    phase: state.phase.as_str(),
                });
            }
            Ok(TurnState {
                phase: TurnPhase::ActionTaken,
                active: state.active.clone(),
            })
        }
        TurnEvent::Advance => Ok(TurnState::default()),
    }
}

use crate::errors::GameError;
use crate::player::{Chips, PlayerAction as A};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips needed to match the high bet.
    Call(Chips),
    /// Opening bet size.
    Bet(Chips),
    /// Raise size on top of the call.
    Raise(Chips),
    /// Entire remaining stack.
    AllIn(Chips),
}

impl ValidatedAction {
    /// Chips this action moves from the stack into the pot.
    pub fn chips_in(&self, to_call: Chips) -> Chips {
        match *self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call(n) | ValidatedAction::Bet(n) | ValidatedAction::AllIn(n) => n,
            ValidatedAction::Raise(by) => to_call.saturating_add(by),
        }
    }
}

/// Validates a player action according to betting rules and stack size.
///
/// Converts a [`crate::player::PlayerAction`] into a [`ValidatedAction`], enforcing
/// no-limit betting rules, minimum bet/raise sizes, and all-in logic when the
/// player doesn't have enough chips.
///
/// # Arguments
///
/// * `stack` - Player's remaining chip stack
/// * `to_call` - Amount needed to match the current high bet
/// * `high_bet` - Highest street contribution so far (0 when nobody has bet)
/// * `min_raise` - Minimum bet or raise size (the last full bet/raise, at least the big blind)
/// * `action` - The action the player wishes to perform
///
/// # Errors
///
/// - [`GameError::InsufficientChips`] - Check when facing a bet, or any chip action with an empty stack
/// - [`GameError::InvalidBetAmount`] - Bet/raise below minimum, a bet into an existing bet,
///   or a raise with nothing to raise
///
/// # Examples
///
/// ```
/// use poker_core::rules::{validate_action, ValidatedAction};
/// use poker_core::player::PlayerAction;
///
/// // Valid call with sufficient stack
/// let result = validate_action(1000, 50, 100, 100, PlayerAction::Call);
/// assert!(matches!(result, Ok(ValidatedAction::Call(50))));
///
/// // All-in when stack is insufficient for full raise
/// let result = validate_action(80, 50, 100, 100, PlayerAction::Raise(100));
/// assert!(matches!(result, Ok(ValidatedAction::AllIn(80))));
/// ```
pub fn validate_action(
    stack: Chips,
    to_call: Chips,
    high_bet: Chips,
    min_raise: Chips,
    action: A,
) -> Result<ValidatedAction, GameError> {
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::InsufficientChips)
            }
        }
        A::Call => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else if stack <= to_call {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        A::Bet(amount) => {
            if high_bet > 0 || amount == 0 {
                return Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise.max(1),
                });
            }
            if stack == 0 {
                Err(GameError::InsufficientChips)
            } else if amount >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < min_raise {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise,
                })
            } else {
                Ok(ValidatedAction::Bet(amount))
            }
        }
        A::Raise(amount) => {
            if high_bet == 0 {
                return Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise,
                });
            }
            if stack == 0 {
                return Err(GameError::InsufficientChips);
            }
            // an amount too large to add to the call exceeds any stack
            let total = amount.checked_add(to_call).unwrap_or(Chips::MAX);
            if total >= stack {
                Ok(ValidatedAction::AllIn(stack))
            } else if amount < min_raise {
                Err(GameError::InvalidBetAmount {
                    amount,
                    minimum: min_raise,
                })
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
        A::AllIn => {
            if stack == 0 {
                Err(GameError::InsufficientChips)
            } else {
                Ok(ValidatedAction::AllIn(stack))
            }
        }
    }
}

use poker_core::errors::GameError;
use poker_core::player::PlayerAction as A;
use poker_core::rules::{validate_action, ValidatedAction};

#[test]
fn bet_zero_is_invalid() {
    let err = validate_action(
        10_000,
        /*to_call*/ 0,
        /*high_bet*/ 0,
        /*min_raise*/ 100,
        A::Bet(0),
    )
    .unwrap_err();
    match err {
        GameError::InvalidBetAmount { .. } => {}
        _ => panic!("expected InvalidBetAmount"),
    }
}

#[test]
fn bet_over_stack_becomes_allin() {
    let va = validate_action(50, 0, 0, 100, A::Bet(100)).unwrap();
    assert_eq!(va, ValidatedAction::AllIn(50));
}

#[test]
fn call_with_insufficient_stack_is_allin_call() {
    let va = validate_action(60, 100, 100, 100, A::Call).unwrap();
    assert_eq!(va, ValidatedAction::AllIn(60));
}

#[test]
fn short_raise_becomes_allin_without_error() {
    // to_call=100, min_raise=100, stack=130, Raise(50) -> AllIn(130)
    let va = validate_action(130, 100, 100, 100, A::Raise(50)).unwrap();
    assert_eq!(va, ValidatedAction::AllIn(130));
}

#[test]
fn huge_raise_is_capped_at_stack() {
    let va = validate_action(1_000, 50, 100, 100, A::Raise(u64::MAX)).unwrap();
    assert_eq!(va, ValidatedAction::AllIn(1_000));
    assert_eq!(ValidatedAction::Raise(u64::MAX).chips_in(50), u64::MAX);
}

#[test]
fn raise_below_minimum_is_rejected() {
    let err = validate_action(5_000, 50, 100, 100, A::Raise(50)).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidBetAmount {
            amount: 50,
            minimum: 100
        }
    );
}

#[test]
fn check_facing_a_bet_is_rejected() {
    let err = validate_action(5_000, 100, 100, 100, A::Check).unwrap_err();
    assert_eq!(err, GameError::InsufficientChips);
}

#[test]
fn call_with_nothing_to_call_is_a_check() {
    let va = validate_action(5_000, 0, 100, 100, A::Call).unwrap();
    assert_eq!(va, ValidatedAction::Check);
}

#[test]
fn bet_into_existing_bet_is_rejected() {
    assert!(validate_action(5_000, 100, 100, 100, A::Bet(300)).is_err());
}

#[test]
fn raise_puts_in_call_plus_raise() {
    let va = validate_action(5_000, 50, 100, 100, A::Raise(200)).unwrap();
    assert_eq!(va, ValidatedAction::Raise(200));
    assert_eq!(va.chips_in(50), 250);
}

#[test]
fn all_in_with_empty_stack_fails() {
    assert_eq!(
        validate_action(0, 0, 0, 100, A::AllIn).unwrap_err(),
        GameError::InsufficientChips
    );
}

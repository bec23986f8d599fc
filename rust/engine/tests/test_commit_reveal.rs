use chrono::{DateTime, Duration, Utc};
use poker_core::commit_reveal::{
    combine_secrets, verify_commitment, AbortReason, CommitRevealSession, Commitment,
    SeedContribution, Secret, SessionPhase,
};
use poker_core::config::ProtocolTimeouts;
use poker_core::errors::GameError;
use poker_core::player::ParticipantId;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_760_000_000, 0).unwrap()
}

fn peers(n: usize, seed: u64) -> Vec<(ParticipantId, SeedContribution)> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            (
                ParticipantId::new(format!("p{}", i)),
                SeedContribution::generate(&mut rng),
            )
        })
        .collect()
}

fn session(peers: &[(ParticipantId, SeedContribution)]) -> CommitRevealSession {
    CommitRevealSession::new(
        peers.iter().map(|(id, _)| id.clone()),
        ProtocolTimeouts::default(),
        t0(),
    )
    .unwrap()
}

fn commit_all(s: &mut CommitRevealSession, peers: &[(ParticipantId, SeedContribution)]) {
    for (id, c) in peers {
        s.receive_commitment(id, *c.commitment(), t0()).unwrap();
    }
}

#[test]
fn honest_pairs_verify_and_single_bit_flips_fail() {
    for (_, c) in peers(4, 1) {
        assert!(verify_commitment(c.secret(), c.commitment()));

        let mut bytes = *c.secret().as_bytes();
        bytes[0] ^= 0x01;
        assert!(!verify_commitment(&Secret::from_bytes(bytes), c.commitment()));

        let mut bytes = *c.commitment().as_bytes();
        bytes[31] ^= 0x80;
        assert!(!verify_commitment(c.secret(), &Commitment::from_bytes(bytes)));
    }
}

#[test]
fn known_commitment_vector() {
    let secret = Secret::from_bytes([1; 32]);
    assert_eq!(
        Commitment::for_secret(&secret).to_hex(),
        "72cd6e8422c407fb6d098690f1130b7ded7ec2f7f5e1d30bd9d521f015363793"
    );
}

#[test]
fn combined_seed_matches_known_vector() {
    let seed = combine_secrets(&[Secret::from_bytes([2; 32]), Secret::from_bytes([1; 32])]).unwrap();
    assert_eq!(
        seed.to_hex(),
        "c926c0eed8fab9483284be06fe46928f667ce7a10c9cdba994c3e4ec8d7886a4"
    );
}

#[test]
fn seed_is_independent_of_reveal_order() {
    let peers = peers(3, 2);

    let mut forward = session(&peers);
    commit_all(&mut forward, &peers);
    for (id, c) in &peers {
        forward.receive_reveal(id, c.secret().clone(), t0()).unwrap();
    }

    let mut backward = session(&peers);
    commit_all(&mut backward, &peers);
    for (id, c) in peers.iter().rev() {
        backward
            .receive_reveal_message(&c.reveal_message(id), t0())
            .unwrap();
    }

    let expected: Vec<Secret> = peers.iter().map(|(_, c)| c.secret().clone()).collect();
    let seed = combine_secrets(&expected).unwrap();
    assert_eq!(forward.deck_seed(), Some(seed));
    assert_eq!(backward.deck_seed(), Some(seed));
}

#[test]
fn reveal_before_all_commitments_is_rejected() {
    let peers = peers(2, 3);
    let mut s = session(&peers);
    let (id, c) = &peers[0];
    s.receive_commitment(id, *c.commitment(), t0()).unwrap();
    let err = s.receive_reveal(id, c.secret().clone(), t0()).unwrap_err();
    assert!(matches!(err, GameError::InvalidTransition { .. }));
    assert_eq!(*s.phase(), SessionPhase::Committing);
}

#[test]
fn mismatched_reveal_aborts_and_discards_material() {
    let peers = peers(2, 4);
    let mut s = session(&peers);
    commit_all(&mut s, &peers);
    let (id, _) = &peers[0];
    let err = s
        .receive_reveal(id, Secret::from_bytes([9; 32]), t0())
        .unwrap_err();
    assert_eq!(
        err,
        GameError::CommitmentMismatch {
            participant: id.clone()
        }
    );
    assert_eq!(
        *s.phase(),
        SessionPhase::Aborted(AbortReason::CommitmentMismatch(id.clone()))
    );
    assert!(s.participant_state(id).is_none());
    assert!(s.deck_seed().is_none());

    // further messages cannot revive the attempt
    let (id1, c1) = &peers[1];
    assert!(s.receive_reveal(id1, c1.secret().clone(), t0()).is_err());
}

#[test]
fn commit_timeout_lists_missing_participants() {
    let peers = peers(3, 5);
    let mut s = session(&peers);
    let (id, c) = &peers[0];
    s.receive_commitment(id, *c.commitment(), t0()).unwrap();

    let late = t0() + Duration::milliseconds(10_001);
    let err = s.check_deadline(late).unwrap_err();
    assert_eq!(
        err,
        GameError::CommitTimeout {
            missing: vec![peers[1].0.clone(), peers[2].0.clone()]
        }
    );
    assert_eq!(*s.phase(), SessionPhase::Aborted(AbortReason::CommitTimeout));
}

#[test]
fn reveal_timeout_fires_after_commit_phase() {
    let peers = peers(2, 6);
    let mut s = session(&peers);
    commit_all(&mut s, &peers);
    let (id, c) = &peers[0];
    s.receive_reveal(id, c.secret().clone(), t0()).unwrap();

    let late = t0() + Duration::milliseconds(10_001);
    let (id1, c1) = &peers[1];
    let err = s.receive_reveal(id1, c1.secret().clone(), late).unwrap_err();
    assert_eq!(
        err,
        GameError::RevealTimeout {
            missing: vec![id1.clone()]
        }
    );
    assert_eq!(*s.phase(), SessionPhase::Aborted(AbortReason::RevealTimeout));
}

#[test]
fn unknown_and_conflicting_commitments() {
    let peers = peers(2, 7);
    let mut s = session(&peers);
    let stranger = ParticipantId::new("mallory");
    let err = s
        .receive_commitment(&stranger, *peers[0].1.commitment(), t0())
        .unwrap_err();
    assert!(matches!(err, GameError::UnknownParticipant { .. }));

    let (id, c) = &peers[0];
    s.receive_commitment(id, *c.commitment(), t0()).unwrap();
    // identical resend is accepted
    s.receive_commitment(id, *c.commitment(), t0()).unwrap();
    let err = s
        .receive_commitment(id, *peers[1].1.commitment(), t0())
        .unwrap_err();
    assert_eq!(
        err,
        GameError::DuplicateCommitment {
            participant: id.clone()
        }
    );
    assert!(matches!(s.phase(), SessionPhase::Aborted(_)));
}

#[test]
fn conflicting_commitment_while_revealing_aborts() {
    let peers = peers(2, 9);
    let mut s = session(&peers);
    commit_all(&mut s, &peers);
    assert_eq!(*s.phase(), SessionPhase::Revealing);

    let (id, c) = &peers[0];
    // the accepted commitment may still be resent
    s.receive_commitment(id, *c.commitment(), t0()).unwrap();
    let err = s
        .receive_commitment(id, *peers[1].1.commitment(), t0())
        .unwrap_err();
    assert_eq!(
        err,
        GameError::DuplicateCommitment {
            participant: id.clone()
        }
    );
    assert_eq!(
        *s.phase(),
        SessionPhase::Aborted(AbortReason::DuplicateCommitment(id.clone()))
    );
    assert!(s.participant_state(id).is_none());
}

#[test]
fn messages_round_trip_through_json() {
    let peers = peers(1, 8);
    let (id, c) = &peers[0];
    let json = serde_json::to_string(&c.commit_message(id)).unwrap();
    assert!(json.contains("\"participantId\":\"p0\""));
    assert!(json.contains(&c.commitment().to_hex()));
}

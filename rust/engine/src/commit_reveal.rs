//! Commit-reveal agreement on a shuffle seed.
//!
//! Every participant picks a private [`Secret`] and broadcasts only its
//! [`Commitment`] (`SHA-256(secret)`). When all expected commitments are in,
//! participants reveal their secrets; each peer verifies every reveal
//! against the earlier commitment and derives the same [`DeckSeed`] with
//! [`combine_secrets`]. Since nobody sees another secret before committing,
//! no participant can pick a secret as a function of the others.
//!
//! A [`CommitRevealSession`] covers exactly one attempt for one hand. It is
//! driven by message arrival and by the caller's timer through
//! [`CommitRevealSession::check_deadline`]; it performs no I/O. Any fairness
//! violation aborts the attempt and discards every commitment and secret;
//! a retry needs a new session and fresh secrets.
//!
//! ```
//! use chrono::Utc;
//! use poker_core::commit_reveal::{CommitRevealSession, SeedContribution, SessionPhase};
//! use poker_core::config::ProtocolTimeouts;
//! use poker_core::player::ParticipantId;
//!
//! let now = Utc::now();
//! let ids = [ParticipantId::new("alice"), ParticipantId::new("bob")];
//! let mut session = CommitRevealSession::new(ids.clone(), ProtocolTimeouts::default(), now).unwrap();
//!
//! let mut rng = rand::rng();
//! let contributions: Vec<_> = ids.iter().map(|_| SeedContribution::generate(&mut rng)).collect();
//! for (id, c) in ids.iter().zip(&contributions) {
//!     session.receive_commitment(id, *c.commitment(), now).unwrap();
//! }
//! for (id, c) in ids.iter().zip(&contributions) {
//!     session.receive_reveal(id, c.secret().clone(), now).unwrap();
//! }
//! assert!(matches!(session.phase(), SessionPhase::Complete(_)));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::ProtocolTimeouts;
use crate::deck::DeckSeed;
use crate::errors::GameError;
use crate::messages::{CommitMessage, RevealMessage};
use crate::player::ParticipantId;

pub const SECRET_LEN: usize = 32;

const SEED_DOMAIN: &[u8] = b"poker-core/deck-seed/v1";

/// A participant's private seed contribution.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(text: &str) -> Result<Self, GameError> {
        let mut bytes = [0u8; SECRET_LEN];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| GameError::InvalidSecret)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

// Secrets must not leak through logs before the reveal phase.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// `SHA-256(secret)`, published before any reveal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn for_secret(secret: &Secret) -> Self {
        Self(Sha256::digest(secret.as_bytes()).into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(text: &str) -> Result<Self, GameError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| GameError::InvalidSecret)?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Commitment {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Commitment::from_hex(&value)
    }
}

pub fn verify_commitment(secret: &Secret, commitment: &Commitment) -> bool {
    Commitment::for_secret(secret) == *commitment
}

/// Mixes all revealed secrets into one seed.
///
/// Secrets are sorted bytewise first, so the result does not depend on the
/// order in which reveals arrived. Each secret is then folded in as
/// `acc = SHA-256(domain || acc || secret)`, starting from zero bytes.
pub fn combine_secrets(secrets: &[Secret]) -> Result<DeckSeed, GameError> {
    if secrets.is_empty() {
        return Err(GameError::MissingParticipant);
    }
    let mut sorted: Vec<&Secret> = secrets.iter().collect();
    sorted.sort();
    let acc = sorted.into_iter().fold([0u8; 32], |acc, secret| {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(acc);
        hasher.update(secret.as_bytes());
        hasher.finalize().into()
    });
    Ok(DeckSeed::from_bytes(acc))
}

/// The local participant's secret bundled with its commitment.
#[derive(Debug, Clone)]
pub struct SeedContribution {
    secret: Secret,
    commitment: Commitment,
}

impl SeedContribution {
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::from_secret(Secret::generate(rng))
    }

    pub fn from_secret(secret: Secret) -> Self {
        let commitment = Commitment::for_secret(&secret);
        Self { secret, commitment }
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn commit_message(&self, participant_id: &ParticipantId) -> CommitMessage {
        CommitMessage {
            participant_id: participant_id.clone(),
            commitment: self.commitment,
        }
    }

    pub fn reveal_message(&self, participant_id: &ParticipantId) -> RevealMessage {
        RevealMessage {
            participant_id: participant_id.clone(),
            secret: self.secret.to_hex(),
        }
    }
}

/// Per-participant progress: idle -> committed -> revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantState {
    Idle,
    Committed(Commitment),
    Revealed(Commitment, Secret),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    CommitTimeout,
    RevealTimeout,
    CommitmentMismatch(ParticipantId),
    DuplicateCommitment(ParticipantId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Committing,
    Revealing,
    Complete(DeckSeed),
    Aborted(AbortReason),
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Committing => "committing",
            SessionPhase::Revealing => "revealing",
            SessionPhase::Complete(_) => "complete",
            SessionPhase::Aborted(_) => "aborted",
        }
    }
}

/// One seed-agreement attempt for one hand.
#[derive(Debug)]
pub struct CommitRevealSession {
    participants: BTreeMap<ParticipantId, ParticipantState>,
    timeouts: ProtocolTimeouts,
    deadline: DateTime<Utc>,
    phase: SessionPhase,
}

impl CommitRevealSession {
    pub fn new(
        expected: impl IntoIterator<Item = ParticipantId>,
        timeouts: ProtocolTimeouts,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let expected: BTreeSet<ParticipantId> = expected.into_iter().collect();
        if expected.is_empty() {
            return Err(GameError::MissingParticipant);
        }
        debug!(participants = expected.len(), "commit-reveal session opened");
        Ok(Self {
            participants: expected
                .into_iter()
                .map(|id| (id, ParticipantState::Idle))
                .collect(),
            deadline: now + Duration::milliseconds(timeouts.commit_timeout_ms as i64),
            timeouts,
            phase: SessionPhase::Committing,
        })
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// `None` for ids outside the expected set, and for everyone once the
    /// session has aborted.
    pub fn participant_state(&self, id: &ParticipantId) -> Option<&ParticipantState> {
        self.participants.get(id)
    }

    pub fn deck_seed(&self) -> Option<DeckSeed> {
        match self.phase {
            SessionPhase::Complete(seed) => Some(seed),
            _ => None,
        }
    }

    /// Participants the current phase is still waiting on.
    pub fn missing(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|(_, state)| match self.phase {
                SessionPhase::Committing => matches!(state, ParticipantState::Idle),
                SessionPhase::Revealing => !matches!(state, ParticipantState::Revealed(..)),
                _ => false,
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Aborts the attempt when the current phase's deadline has passed.
    pub fn check_deadline(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        if now <= self.deadline {
            return Ok(());
        }
        match self.phase {
            SessionPhase::Committing => {
                let missing = self.missing();
                self.abort(AbortReason::CommitTimeout);
                Err(GameError::CommitTimeout { missing })
            }
            SessionPhase::Revealing => {
                let missing = self.missing();
                self.abort(AbortReason::RevealTimeout);
                Err(GameError::RevealTimeout { missing })
            }
            _ => Ok(()),
        }
    }

    /// Records one participant's commitment.
    ///
    /// Resending the accepted commitment is a no-op in either open phase.
    /// A different commitment from someone who already committed aborts the
    /// attempt with [`GameError::DuplicateCommitment`], whether it arrives
    /// while committing or while revealing.
    pub fn receive_commitment(
        &mut self,
        id: &ParticipantId,
        commitment: Commitment,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.check_deadline(now)?;
        self.ensure_open("commit")?;
        let state = self.known(id)?.clone();
        match state {
            ParticipantState::Committed(existing) | ParticipantState::Revealed(existing, _)
                if existing == commitment =>
            {
                return Ok(())
            }
            ParticipantState::Committed(_) | ParticipantState::Revealed(..) => {
                let participant = id.clone();
                warn!(%participant, "second commitment rejected, aborting seed attempt");
                self.abort(AbortReason::DuplicateCommitment(participant.clone()));
                return Err(GameError::DuplicateCommitment { participant });
            }
            ParticipantState::Idle => {}
        }
        self.participants
            .insert(id.clone(), ParticipantState::Committed(commitment));
        debug!(participant = %id, "commitment received");

        if self
            .participants
            .values()
            .all(|s| matches!(s, ParticipantState::Committed(_)))
        {
            self.phase = SessionPhase::Revealing;
            self.deadline = now + Duration::milliseconds(self.timeouts.reveal_timeout_ms as i64);
            info!("all commitments received, requesting reveals");
        }
        Ok(())
    }

    /// Accepts a hex-encoded reveal straight from the wire.
    pub fn receive_reveal_message(
        &mut self,
        message: &RevealMessage,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        let secret = Secret::from_hex(&message.secret)?;
        self.receive_reveal(&message.participant_id, secret, now)
    }

    pub fn receive_reveal(
        &mut self,
        id: &ParticipantId,
        secret: Secret,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.check_deadline(now)?;
        self.ensure_open("reveal")?;
        let state = self.known(id)?.clone();
        if let ParticipantState::Revealed(_, existing) = &state {
            if *existing == secret {
                return Ok(());
            }
        }
        if self.phase != SessionPhase::Revealing {
            return Err(self.invalid("reveal"));
        }
        let commitment = match state {
            ParticipantState::Committed(c) => c,
            ParticipantState::Revealed(c, _) => c,
            ParticipantState::Idle => return Err(self.invalid("reveal")),
        };
        if !verify_commitment(&secret, &commitment) {
            let participant = id.clone();
            warn!(%participant, "reveal does not match commitment, aborting seed attempt");
            self.abort(AbortReason::CommitmentMismatch(participant.clone()));
            return Err(GameError::CommitmentMismatch { participant });
        }
        self.participants
            .insert(id.clone(), ParticipantState::Revealed(commitment, secret));
        debug!(participant = %id, "reveal verified");

        let secrets: Option<Vec<Secret>> = self
            .participants
            .values()
            .map(|s| match s {
                ParticipantState::Revealed(_, secret) => Some(secret.clone()),
                _ => None,
            })
            .collect();
        if let Some(secrets) = secrets {
            let seed = combine_secrets(&secrets)?;
            info!(seed = %seed.to_hex(), "deck seed agreed");
            self.phase = SessionPhase::Complete(seed);
        }
        Ok(())
    }

    fn ensure_open(&self, event: &'static str) -> Result<(), GameError> {
        match self.phase {
            SessionPhase::Committing | SessionPhase::Revealing => Ok(()),
            _ => Err(self.invalid(event)),
        }
    }

    fn known(&self, id: &ParticipantId) -> Result<&ParticipantState, GameError> {
        self.participants
            .get(id)
            .ok_or_else(|| GameError::UnknownParticipant {
                participant: id.clone(),
            })
    }

    fn invalid(&self, event: &'static str) -> GameError {
        GameError::InvalidTransition {
            from: self.phase.as_str(),
            event,
        }
    }

    fn abort(&mut self, reason: AbortReason) {
        self.participants.clear();
        self.phase = SessionPhase::Aborted(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(fill: u8) -> Secret {
        Secret::from_bytes([fill; SECRET_LEN])
    }

    #[test]
    fn combining_nothing_fails() {
        assert_eq!(combine_secrets(&[]), Err(GameError::MissingParticipant));
    }

    #[test]
    fn single_secret_still_mixed() {
        let seed = combine_secrets(&[secret(7)]).unwrap();
        assert_ne!(seed.as_bytes(), secret(7).as_bytes());
    }

    #[test]
    fn secret_debug_is_redacted() {
        let s = secret(0xab);
        assert_eq!(format!("{:?}", s), "Secret(..)");
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert_eq!(Secret::from_hex("zz"), Err(GameError::InvalidSecret));
        assert_eq!(Secret::from_hex("abcd"), Err(GameError::InvalidSecret));
        assert!(Commitment::from_hex(&"00".repeat(31)).is_err());
    }

    #[test]
    fn uncommitted_session_needs_participants() {
        let err = CommitRevealSession::new(Vec::new(), ProtocolTimeouts::default(), Utc::now())
            .unwrap_err();
        assert_eq!(err, GameError::MissingParticipant);
    }
}

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::Category;
use crate::phase::HandPhase;
use crate::player::{ParticipantId, PlayerAction};
use crate::pot::{ChipDelta, Pot};

/// Represents a betting street in Texas Hold'em poker.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Street {
    /// Before flop (hole cards dealt)
    Preflop,
    /// After flop (3 community cards)
    Flop,
    /// After turn (4th community card)
    Turn,
    /// After river (5th community card)
    River,
}

impl Street {
    /// `None` outside the betting streets.
    pub fn from_phase(phase: HandPhase) -> Option<Street> {
        if !phase.is_street() {
            return None;
        }
        Some(match phase {
            HandPhase::Preflop => Street::Preflop,
            HandPhase::Flop => Street::Flop,
            HandPhase::Turn => Street::Turn,
            _ => Street::River,
        })
    }
}

/// Records a single player action during a hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub participant_id: ParticipantId,
    pub street: Street,
    pub action: PlayerAction,
    /// Chips moved into the pot by this action.
    pub chips: u64,
}

/// A contender's evaluated hand at showdown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShownHand {
    pub participant_id: ParticipantId,
    pub hole: Vec<Card>,
    pub category: Category,
    pub score: u32,
}

/// Information about the showdown phase when hands are revealed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    /// Participants who won at least one pot
    pub winners: Vec<ParticipantId>,
    #[serde(default)]
    pub hands: Vec<ShownHand>,
}

/// Complete record of a poker hand including all actions, board cards, and outcome.
/// Serialized to JSONL format for hand history storage and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Identifier assigned by [`HandLogger`] (format: YYYYMMDD-NNNNNN)
    #[serde(default)]
    pub hand_id: Option<String>,
    /// Sequence number of the hand at its table
    pub hand_number: u64,
    /// Hex of the deck seed (enables deterministic replay)
    pub seed: Option<String>,
    pub button: Option<ParticipantId>,
    /// Chronological list of all player actions
    pub actions: Vec<ActionRecord>,
    /// Community cards on the board (up to 5 cards)
    pub board: Vec<Card>,
    #[serde(default)]
    pub pots: Vec<Pot>,
    #[serde(default)]
    pub rake: u64,
    #[serde(default)]
    pub deltas: Vec<ChipDelta>,
    /// Timestamp when the hand was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Showdown information if hand went to showdown
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
}

impl HandRecord {
    pub fn new(hand_number: u64) -> Self {
        Self {
            hand_id: None,
            hand_number,
            seed: None,
            button: None,
            actions: Vec::new(),
            board: Vec::new(),
            pots: Vec::new(),
            rake: 0,
            deltas: Vec::new(),
            ts: None,
            showdown: None,
        }
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Appends [`HandRecord`]s to a JSONL file, one record per LF-terminated line.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger that only assigns ids, for tests.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    /// Writes one line, filling in `hand_id` and `ts` when missing.
    /// Returns the record as written.
    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<HandRecord> {
        let mut rec = record.clone();
        if rec.hand_id.is_none() {
            rec.hand_id = Some(self.next_id());
        }
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        tracing::debug!(hand_id = rec.hand_id.as_deref().unwrap_or_default(), "hand record written");
        Ok(rec)
    }
}

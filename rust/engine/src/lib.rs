//! # poker-core: Deterministic Hold'em Engine Core
//!
//! Rules and randomness for a multi-party Texas Hold'em table where no single
//! party controls the shuffle. Participants commit to secrets, reveal them,
//! and the combined seed drives a reproducible deck.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and text notation
//! - [`deck`] - Hash-driven deterministic shuffle and dealing
//! - [`commit_reveal`] - Commit-reveal protocol that produces the deck seed
//! - [`hand`] - Best-five evaluation and score comparison
//! - [`pot`] - Side pot allocation, awards, rake and chip deltas
//! - [`phase`] - Hand lifecycle state machine
//! - [`turn`] - Per-round turn state machine
//! - [`rules`] - Betting validation
//! - [`player`] - Participants, seats and actions
//! - [`table`] - Table orchestration of a full hand
//! - [`config`] - Table configuration (TOML file and environment)
//! - [`messages`] - Wire messages and table snapshots
//! - [`history`] - HandRecord serialization (JSONL)
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use poker_core::cards::parse_cards;
//! use poker_core::hand::{evaluate_hand, Category};
//!
//! let hole = parse_cards("Ah Kh").unwrap();
//! let board = parse_cards("Qh Jh Th 2c 3d").unwrap();
//! let result = evaluate_hand(&hole, &board).unwrap();
//! assert_eq!(result.category, Category::StraightFlush);
//! ```
//!
//! ## Deterministic Dealing
//!
//! ```rust
//! use poker_core::commit_reveal::{combine_secrets, Secret};
//! use poker_core::deck::Deck;
//!
//! let secrets = [Secret::from_bytes([1; 32]), Secret::from_bytes([2; 32])];
//! let seed = combine_secrets(&secrets).unwrap();
//! // Same seed, same order
//! assert_eq!(Deck::shuffled(&seed).cards(), Deck::shuffled(&seed).cards());
//! ```

pub mod cards;
pub mod commit_reveal;
pub mod config;
pub mod deck;
pub mod errors;
pub mod hand;
pub mod history;
pub mod messages;
pub mod phase;
pub mod player;
pub mod pot;
pub mod rules;
pub mod table;
pub mod turn;

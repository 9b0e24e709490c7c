//! # hanabi-engine
//!
//! A rules engine for a cooperative hidden-information card game, built for
//! reinforcement-learning agents.
//!
//! ## Design Principles
//!
//! 1. **Configurable**: players, colors, ranks, hand size, token limits and
//!    deck composition all come from `GameConfig`.
//!
//! 2. **Deterministic**: one seed fixes the whole deal. Replaying the same
//!    moves from the same seed gives the same game.
//!
//! 3. **Atomic moves**: a rejected move leaves the state untouched.
//!
//! 4. **Hidden information by construction**: agents only ever receive an
//!    `Observation`, which never contains their own cards.
//!
//! ## Architecture
//!
//! - **Persistent data structures**: history is an `im::Vector`, so cloning a
//!   state for search or rollouts is cheap.
//!
//! - **Chance as an explicit phase**: the deal is a sequence of chance events;
//!   agents only act once every hand is full.
//!
//! ## Modules
//!
//! - `core`: configuration, players, moves, state, errors, RNG
//! - `cards`: cards, knowledge, hands, deck
//! - `rules`: legality and the state transitions
//! - `observation`: per-player views and the quantities derived from them
//! - `encoding`: move uids and fixed-size observation vectors
//! - `env`: many games stepped in parallel
//! - `persist`: versioned binary snapshots

pub mod cards;
pub mod core;
pub mod encoding;
pub mod env;
pub mod observation;
pub mod persist;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    EndOfGame, GameConfig, GameConfigBuilder, GameRng, GameState, HanabiError, HistoryItem, Move,
    MoveOutcome, Phase, PlayerId, PlayerMap, Result,
};

pub use crate::cards::{Card, CardKnowledge, Color, Deck, Hand, Rank};

pub use crate::rules::{check_move, is_legal, legal_moves, new_game};

pub use crate::observation::{observe, CardCounts, Observation, ObservedHand, ObservedSlot};

pub use crate::encoding::{CommonEncoder, EncodedObservation, MoveSpace, ObservationEncoder};

pub use crate::env::{BatchEnv, EncodedBatch, StepResult};

pub use crate::persist::{deserialize, serialize, Snapshot, SnapshotKind};

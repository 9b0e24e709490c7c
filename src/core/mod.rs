//! Core engine types: players, RNG, configuration, moves, state, errors.

pub mod action;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{HistoryItem, Move, MoveOutcome};
pub use config::{GameConfig, GameConfigBuilder, MAX_HAND_SIZE, MAX_TOKENS, PLAYER_RANGE};
pub use error::{HanabiError, Result};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use state::{EndOfGame, GameState, Phase};

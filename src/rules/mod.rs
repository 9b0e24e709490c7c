//! Game rules.
//!
//! - `legality`: the one predicate deciding whether a move may be made
//! - `engine`: chance events and player moves as `GameState` transitions
//!
//! Both the transition functions and the observation layer ask
//! `check_move`; nothing else encodes legality.

pub mod engine;
pub mod legality;

pub use engine::new_game;
pub use legality::{check_move, is_legal, legal_moves};

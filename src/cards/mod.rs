//! Cards, the deck, per-slot knowledge and hands.
//!
//! - `Card`: immutable color/rank pair
//! - `Deck`: seeded draw pile built from the configured composition
//! - `CardKnowledge`: what a player can deduce about a hidden card
//! - `Hand`: ordered slots pairing a card with its knowledge

pub mod card;
pub mod deck;
pub mod hand;
pub mod knowledge;

pub use card::{Card, Color, Rank, MAX_COLORS, MAX_RANKS};
pub use deck::Deck;
pub use hand::{Hand, HandSlot, RevealResult, SlotIndices};
pub use knowledge::{CardKnowledge, ValueKnowledge};

//! The draw pile.
//!
//! A deck is built from the configured composition and permuted once with
//! the configured seed. Draws take from the top (end of the vector), so the
//! remaining order is part of the state and a persisted game resumes with
//! exactly the same future draws.

use serde::{Deserialize, Serialize};

use super::card::Card;
use crate::core::{GameConfig, GameRng};

/// Remaining cards, top of the deck last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the full multiset of cards for a configuration, unshuffled.
    ///
    /// Color-major, lowest rank first.
    #[must_use]
    pub fn ordered(config: &GameConfig) -> Self {
        let mut cards = Vec::with_capacity(config.deck_size());
        for color in config.colors() {
            for rank in config.ranks() {
                let copies = config.card_count(Card::new(color, rank));
                cards.extend(std::iter::repeat(Card::new(color, rank)).take(copies as usize));
            }
        }
        Self { cards }
    }

    /// Build and permute the deck with the configuration's seed.
    #[must_use]
    pub fn shuffled(config: &GameConfig) -> Self {
        let mut deck = Self::ordered(config);
        GameRng::new(config.random_seed()).shuffle(&mut deck.cards);
        deck
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Take the topmost copy of `card`, wherever it sits.
    pub fn take(&mut self, card: Card) -> Option<Card> {
        let pos = self.cards.iter().rposition(|&c| c == card)?;
        Some(self.cards.remove(pos))
    }

    /// The card the next draw would return.
    #[must_use]
    pub fn peek(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, bottom first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

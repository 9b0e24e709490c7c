//! A player's hand: ordered slots of (card, knowledge).
//!
//! Removing a slot shifts the slots after it down by one; new cards are
//! appended at the end. Slots before a removed one keep their index.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::{Card, Color, Rank};
use super::knowledge::CardKnowledge;

/// Slot indices of one hand, in ascending order.
pub type SlotIndices = SmallVec<[u8; 5]>;

/// One card in hand, paired with its holder's knowledge about it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandSlot {
    pub card: Card,
    pub knowledge: CardKnowledge,
}

/// Slots touched by a reveal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealResult {
    /// Slots whose card has the revealed value.
    pub matched: SlotIndices,
    /// Matched slots whose attribute had not been hinted before.
    pub newly_revealed: SlotIndices,
}

/// Ordered hand of slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hand {
    slots: SmallVec<[HandSlot; 5]>,
}

impl Hand {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a card with the given knowledge.
    pub fn add_card(&mut self, card: Card, knowledge: CardKnowledge) {
        self.slots.push(HandSlot { card, knowledge });
    }

    /// Remove and return the slot at `index`.
    pub fn remove(&mut self, index: usize) -> Option<HandSlot> {
        (index < self.slots.len()).then(|| self.slots.remove(index))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HandSlot> {
        self.slots.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[HandSlot] {
        &self.slots
    }

    /// Actual cards, in slot order.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.slots.iter().map(|s| s.card)
    }

    /// Knowledge entries, in slot order.
    pub fn knowledge(&self) -> impl Iterator<Item = &CardKnowledge> + '_ {
        self.slots.iter().map(|s| &s.knowledge)
    }

    #[must_use]
    pub fn has_color(&self, color: Color) -> bool {
        self.slots.iter().any(|s| s.card.color == color)
    }

    #[must_use]
    pub fn has_rank(&self, rank: Rank) -> bool {
        self.slots.iter().any(|s| s.card.rank == rank)
    }

    /// Apply a color hint to every slot.
    ///
    /// Matching slots are fixed to `color`; all others have it removed.
    pub fn reveal_color(&mut self, color: Color) -> RevealResult {
        self.reveal(
            |card| card.color == color,
            |k| k.color_hinted(),
            |k| k.apply_is_color_hint(color),
            |k| k.apply_is_not_color_hint(color),
        )
    }

    /// Apply a rank hint to every slot.
    pub fn reveal_rank(&mut self, rank: Rank) -> RevealResult {
        self.reveal(
            |card| card.rank == rank,
            |k| k.rank_hinted(),
            |k| k.apply_is_rank_hint(rank),
            |k| k.apply_is_not_rank_hint(rank),
        )
    }

    fn reveal(
        &mut self,
        matches: impl Fn(&Card) -> bool,
        already_hinted: impl Fn(&CardKnowledge) -> bool,
        positive: impl Fn(&mut CardKnowledge),
        negative: impl Fn(&mut CardKnowledge),
    ) -> RevealResult {
        let mut result = RevealResult::default();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if matches(&slot.card) {
                if !already_hinted(&slot.knowledge) {
                    result.newly_revealed.push(i as u8);
                }
                result.matched.push(i as u8);
                positive(&mut slot.knowledge);
            } else {
                negative(&mut slot.knowledge);
            }
        }
        result
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for slot in &self.slots {
            writeln!(f, "{} || {}", slot.card, slot.knowledge)?;
        }
        Ok(())
    }
}

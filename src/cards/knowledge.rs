//! Per-slot belief about a hidden card.
//!
//! `CardKnowledge` tracks what the holder of a card can deduce about it from
//! hints alone: which colors and ranks are still possible, and whether each
//! attribute was directly revealed. It never looks at the actual card.
//!
//! Both possible-value sets only ever shrink. A hint that matches a slot
//! collapses the attribute to one value; a hint that does not match removes
//! that value. Since the engine only applies hints consistent with the real
//! card, the sets never become empty.

use serde::{Deserialize, Serialize};

use super::card::{Card, Color, Rank};

/// Knowledge about one attribute (color or rank) of a card.
///
/// Values are 0-based indices stored as a bitmask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueKnowledge {
    range: u8,
    plausible: u8,
    hinted: Option<u8>,
}

impl ValueKnowledge {
    /// Fully open knowledge over `range` values.
    #[must_use]
    pub fn new(range: usize) -> Self {
        debug_assert!((1..=8).contains(&range));
        Self {
            range: range as u8,
            plausible: ((1u16 << range) - 1) as u8,
            hinted: None,
        }
    }

    /// Number of values this attribute can take in the game.
    #[must_use]
    pub fn range(&self) -> usize {
        self.range as usize
    }

    /// Whether the value was directly revealed by a hint.
    #[must_use]
    pub fn is_hinted(&self) -> bool {
        self.hinted.is_some()
    }

    /// The directly revealed value, if any.
    #[must_use]
    pub fn hinted_value(&self) -> Option<usize> {
        self.hinted.map(usize::from)
    }

    /// Whether `value` is still possible.
    #[must_use]
    pub fn is_plausible(&self, value: usize) -> bool {
        value < self.range() && self.plausible & (1 << value) != 0
    }

    /// Number of values still possible.
    #[must_use]
    pub fn plausible_count(&self) -> usize {
        self.plausible.count_ones() as usize
    }

    /// Iterate the still-possible values.
    pub fn plausible_values(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.range()).filter(move |&v| self.is_plausible(v))
    }

    /// The value, if it is known either by a direct hint or by elimination.
    #[must_use]
    pub fn known_value(&self) -> Option<usize> {
        match self.plausible_count() {
            1 => Some(self.plausible.trailing_zeros() as usize),
            _ => None,
        }
    }

    /// Whether the plausible set is a subset of `other`'s.
    #[must_use]
    pub fn is_narrower_or_equal(&self, other: &Self) -> bool {
        self.plausible & !other.plausible == 0
    }

    /// Record that the card has `value`.
    pub fn apply_is_value_hint(&mut self, value: usize) {
        debug_assert!(self.is_plausible(value), "hint contradicts knowledge");
        self.plausible = 1 << value;
        self.hinted = Some(value as u8);
    }

    /// Record that the card does not have `value`.
    pub fn apply_is_not_value_hint(&mut self, value: usize) {
        debug_assert!(value < self.range());
        self.plausible &= !(1 << value);
        debug_assert!(self.plausible != 0, "negative hint emptied knowledge");
    }

    /// Structural sanity check used after deserialization.
    #[must_use]
    pub(crate) fn is_consistent(&self) -> bool {
        if !(1..=8).contains(&self.range) {
            return false;
        }
        let full = ((1u16 << self.range) - 1) as u8;
        self.plausible != 0
            && self.plausible & !full == 0
            && self
                .hinted
                .map_or(true, |v| v < self.range && self.plausible == 1 << v)
    }
}

/// Knowledge about the color and rank of one hand slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardKnowledge {
    color: ValueKnowledge,
    rank: ValueKnowledge,
}

impl CardKnowledge {
    /// Fully open knowledge for a freshly drawn card.
    #[must_use]
    pub fn new(num_colors: usize, num_ranks: usize) -> Self {
        Self {
            color: ValueKnowledge::new(num_colors),
            rank: ValueKnowledge::new(num_ranks),
        }
    }

    /// Color knowledge.
    #[must_use]
    pub fn color(&self) -> &ValueKnowledge {
        &self.color
    }

    /// Rank knowledge.
    #[must_use]
    pub fn rank(&self) -> &ValueKnowledge {
        &self.rank
    }

    #[must_use]
    pub fn color_hinted(&self) -> bool {
        self.color.is_hinted()
    }

    #[must_use]
    pub fn rank_hinted(&self) -> bool {
        self.rank.is_hinted()
    }

    /// Directly revealed color.
    #[must_use]
    pub fn hinted_color(&self) -> Option<Color> {
        self.color.hinted_value().and_then(Color::from_index)
    }

    /// Directly revealed rank.
    #[must_use]
    pub fn hinted_rank(&self) -> Option<Rank> {
        self.rank.hinted_value().map(Rank::from_index)
    }

    #[must_use]
    pub fn color_plausible(&self, color: Color) -> bool {
        self.color.is_plausible(color.index())
    }

    #[must_use]
    pub fn rank_plausible(&self, rank: Rank) -> bool {
        rank.value() >= 1 && self.rank.is_plausible(rank.index())
    }

    /// Still-possible colors.
    pub fn plausible_colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.color.plausible_values().filter_map(Color::from_index)
    }

    /// Still-possible ranks.
    pub fn plausible_ranks(&self) -> impl Iterator<Item = Rank> + '_ {
        self.rank.plausible_values().map(Rank::from_index)
    }

    /// Whether `card` is consistent with this knowledge.
    #[must_use]
    pub fn is_plausible(&self, card: Card) -> bool {
        self.color_plausible(card.color) && self.rank_plausible(card.rank)
    }

    /// Whether both possible sets are subsets of `earlier`'s.
    #[must_use]
    pub fn is_narrower_or_equal(&self, earlier: &Self) -> bool {
        self.color.is_narrower_or_equal(&earlier.color) && self.rank.is_narrower_or_equal(&earlier.rank)
    }

    pub fn apply_is_color_hint(&mut self, color: Color) {
        self.color.apply_is_value_hint(color.index());
    }

    pub fn apply_is_not_color_hint(&mut self, color: Color) {
        self.color.apply_is_not_value_hint(color.index());
    }

    pub fn apply_is_rank_hint(&mut self, rank: Rank) {
        self.rank.apply_is_value_hint(rank.index());
    }

    pub fn apply_is_not_rank_hint(&mut self, rank: Rank) {
        self.rank.apply_is_not_value_hint(rank.index());
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.color.is_consistent() && self.rank.is_consistent()
    }
}

impl std::fmt::Display for CardKnowledge {
    /// `XY|RYGWB12345`: hinted color and rank (`X` if unhinted), then the
    /// plausible colors and ranks.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.hinted_color() {
            Some(color) => write!(f, "{}", color)?,
            None => write!(f, "X")?,
        }
        match self.hinted_rank() {
            Some(rank) => write!(f, "{}", rank)?,
            None => write!(f, "X")?,
        }
        write!(f, "|")?;
        for color in self.plausible_colors() {
            write!(f, "{}", color)?;
        }
        for rank in self.plausible_ranks() {
            write!(f, "{}", rank)?;
        }
        Ok(())
    }
}

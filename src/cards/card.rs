//! Card identity: a color and a rank.
//!
//! Cards with equal color and rank are interchangeable. Ranks are 1-based;
//! a firework height of 0 means nothing has been played in that color.

use serde::{Deserialize, Serialize};

/// Maximum number of colors a game can use.
pub const MAX_COLORS: usize = 5;

/// Maximum number of ranks a game can use.
pub const MAX_RANKS: usize = 5;

/// Card color. A game with `C` colors uses the first `C` variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
    Green,
    White,
    Blue,
}

impl Color {
    /// All colors in index order.
    pub const ALL: [Color; MAX_COLORS] = [
        Color::Red,
        Color::Yellow,
        Color::Green,
        Color::White,
        Color::Blue,
    ];

    /// 0-based color index.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Color for a 0-based index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The first `num_colors` colors.
    pub fn first(num_colors: usize) -> impl Iterator<Item = Color> {
        Self::ALL.into_iter().take(num_colors)
    }

    /// Single-letter abbreviation used in text dumps.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Yellow => 'Y',
            Color::Green => 'G',
            Color::White => 'W',
            Color::Blue => 'B',
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Card rank, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u8);

impl Rank {
    /// Create a rank. Callers validate it against the game's rank count.
    #[must_use]
    pub const fn new(rank: u8) -> Self {
        Self(rank)
    }

    /// 0-based index of this rank.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// Rank for a 0-based index.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u8 + 1)
    }

    /// Raw 1-based value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The first `num_ranks` ranks, lowest first.
    pub fn first(num_ranks: usize) -> impl Iterator<Item = Rank> {
        (1..=num_ranks as u8).map(Rank)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Color,
    pub rank: Rank,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub const fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }

    /// Color-major index in `0..num_colors * num_ranks`.
    #[must_use]
    pub fn index(self, num_ranks: usize) -> usize {
        self.color.index() * num_ranks + self.rank.index()
    }

    /// Whether this card exists in a game of the given dimensions.
    #[must_use]
    pub fn fits(self, num_colors: usize, num_ranks: usize) -> bool {
        self.color.index() < num_colors && self.rank.0 >= 1 && self.rank.index() < num_ranks
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.color, self.rank)
    }
}

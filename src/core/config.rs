//! Game configuration.
//!
//! A `GameConfig` is validated once, at construction, and is immutable
//! afterwards. Engine constructors take it by value or reference; there is
//! no process-wide configuration.
//!
//! Build one with `GameConfigBuilder`:
//!
//! ```
//! use hanabi_engine::core::GameConfigBuilder;
//!
//! let config = GameConfigBuilder::new()
//!     .num_players(3)
//!     .random_seed(7)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.hand_size(), 5);
//! assert_eq!(config.deck_size(), 50);
//! ```
//!
//! or from string parameters with `GameConfig::from_params`.

use serde::{Deserialize, Serialize};

use super::error::{HanabiError, Result};
use crate::cards::{Card, Color, Rank, MAX_COLORS, MAX_RANKS};

/// Supported player counts.
pub const PLAYER_RANGE: std::ops::RangeInclusive<usize> = 2..=5;

/// Upper bound for either token pool.
pub const MAX_TOKENS: u8 = 64;

/// Largest hand; slot indices are stored as `u8`.
pub const MAX_HAND_SIZE: usize = u8::MAX as usize;

/// Validated, immutable game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameConfigBuilder", into = "GameConfigBuilder")]
pub struct GameConfig {
    num_players: usize,
    num_colors: usize,
    num_ranks: usize,
    hand_size: usize,
    max_hint_tokens: u8,
    max_life_tokens: u8,
    /// Copies of each card per color, indexed by rank index.
    deck_composition: Vec<u8>,
    random_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            num_colors: MAX_COLORS,
            num_ranks: MAX_RANKS,
            hand_size: 5,
            max_hint_tokens: 8,
            max_life_tokens: 3,
            deck_composition: default_composition(MAX_RANKS),
            random_seed: 0,
        }
    }
}

impl GameConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> GameConfigBuilder {
        GameConfigBuilder::new()
    }

    /// Parse a configuration from string key/value parameters.
    ///
    /// Recognized keys: `num_players` (`players`), `num_colors` (`colors`),
    /// `num_ranks` (`ranks`), `hand_size`, `max_hint_tokens`
    /// (`max_information_tokens`), `max_life_tokens`, `deck_composition`
    /// (comma-separated counts per rank), `random_seed` (`seed`).
    /// Missing keys take their defaults; unknown keys are rejected.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = GameConfigBuilder::new();

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            builder = match key {
                "num_players" | "players" => builder.num_players(parse_param(key, value)?),
                "num_colors" | "colors" => builder.num_colors(parse_param(key, value)?),
                "num_ranks" | "ranks" => builder.num_ranks(parse_param(key, value)?),
                "hand_size" => builder.hand_size(parse_param(key, value)?),
                "max_hint_tokens" | "max_information_tokens" => {
                    builder.max_hint_tokens(parse_param(key, value)?)
                }
                "max_life_tokens" => builder.max_life_tokens(parse_param(key, value)?),
                "deck_composition" => {
                    let counts = value
                        .split(',')
                        .map(|part| parse_param(key, part.trim()))
                        .collect::<Result<Vec<u8>>>()?;
                    builder.deck_composition(counts)
                }
                "random_seed" | "seed" => builder.random_seed(parse_param(key, value)?),
                other => {
                    return Err(HanabiError::invalid_config(format!(
                        "unknown parameter '{}'",
                        other
                    )))
                }
            };
        }

        builder.build()
    }

    /// Number of players.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Number of colors in play.
    #[must_use]
    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    /// Number of ranks per color.
    #[must_use]
    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    /// Cards held by each player after dealing.
    #[must_use]
    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    /// Hint token cap.
    #[must_use]
    pub fn max_hint_tokens(&self) -> u8 {
        self.max_hint_tokens
    }

    /// Life token cap (and starting value).
    #[must_use]
    pub fn max_life_tokens(&self) -> u8 {
        self.max_life_tokens
    }

    /// Copies of each card per color, lowest rank first.
    #[must_use]
    pub fn deck_composition(&self) -> &[u8] {
        &self.deck_composition
    }

    /// Seed for the deck permutation.
    #[must_use]
    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    /// Colors in play.
    pub fn colors(&self) -> impl Iterator<Item = Color> {
        Color::first(self.num_colors)
    }

    /// Ranks in play, lowest first.
    pub fn ranks(&self) -> impl Iterator<Item = Rank> {
        Rank::first(self.num_ranks)
    }

    /// Highest rank.
    #[must_use]
    pub fn max_rank(&self) -> Rank {
        Rank::from_index(self.num_ranks - 1)
    }

    /// Total cards in a fresh deck.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.num_colors * self.deck_composition.iter().map(|&c| c as usize).sum::<usize>()
    }

    /// Perfect score.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        (self.num_colors * self.num_ranks) as u32
    }

    /// Copies of `card` in a fresh deck (0 if the card is not in play).
    #[must_use]
    pub fn card_count(&self, card: Card) -> u8 {
        if self.contains(card) {
            self.deck_composition[card.rank.index()]
        } else {
            0
        }
    }

    /// Whether `card` exists in this game.
    #[must_use]
    pub fn contains(&self, card: Card) -> bool {
        card.fits(self.num_colors, self.num_ranks)
    }

    /// Same configuration with a different seed.
    #[must_use]
    pub fn with_seed(&self, random_seed: u64) -> Self {
        Self {
            random_seed,
            ..self.clone()
        }
    }
}

/// Builder for `GameConfig`. Unset values take their documented defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfigBuilder {
    num_players: usize,
    num_colors: usize,
    num_ranks: usize,
    hand_size: Option<usize>,
    max_hint_tokens: u8,
    max_life_tokens: u8,
    deck_composition: Option<Vec<u8>>,
    random_seed: u64,
}

impl Default for GameConfigBuilder {
    fn default() -> Self {
        let defaults = GameConfig::default();
        Self {
            num_players: defaults.num_players,
            num_colors: defaults.num_colors,
            num_ranks: defaults.num_ranks,
            hand_size: None,
            max_hint_tokens: defaults.max_hint_tokens,
            max_life_tokens: defaults.max_life_tokens,
            deck_composition: None,
            random_seed: defaults.random_seed,
        }
    }
}

impl GameConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn num_players(mut self, count: usize) -> Self {
        self.num_players = count;
        self
    }

    #[must_use]
    pub fn num_colors(mut self, count: usize) -> Self {
        self.num_colors = count;
        self
    }

    #[must_use]
    pub fn num_ranks(mut self, count: usize) -> Self {
        self.num_ranks = count;
        self
    }

    /// Override the hand size (default: 5 below four players, else 4).
    #[must_use]
    pub fn hand_size(mut self, size: usize) -> Self {
        self.hand_size = Some(size);
        self
    }

    #[must_use]
    pub fn max_hint_tokens(mut self, max: u8) -> Self {
        self.max_hint_tokens = max;
        self
    }

    #[must_use]
    pub fn max_life_tokens(mut self, max: u8) -> Self {
        self.max_life_tokens = max;
        self
    }

    /// Copies per color of each rank, lowest rank first.
    #[must_use]
    pub fn deck_composition(mut self, counts: Vec<u8>) -> Self {
        self.deck_composition = Some(counts);
        self
    }

    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<GameConfig> {
        if !PLAYER_RANGE.contains(&self.num_players) {
            return Err(HanabiError::invalid_config(format!(
                "num_players {} outside {:?}",
                self.num_players, PLAYER_RANGE
            )));
        }
        if !(1..=MAX_COLORS).contains(&self.num_colors) {
            return Err(HanabiError::invalid_config(format!(
                "num_colors {} outside 1..={}",
                self.num_colors, MAX_COLORS
            )));
        }
        if !(1..=MAX_RANKS).contains(&self.num_ranks) {
            return Err(HanabiError::invalid_config(format!(
                "num_ranks {} outside 1..={}",
                self.num_ranks, MAX_RANKS
            )));
        }
        for (name, value) in [
            ("max_hint_tokens", self.max_hint_tokens),
            ("max_life_tokens", self.max_life_tokens),
        ] {
            if !(1..=MAX_TOKENS).contains(&value) {
                return Err(HanabiError::invalid_config(format!(
                    "{} {} outside 1..={}",
                    name, value, MAX_TOKENS
                )));
            }
        }

        let deck_composition = self
            .deck_composition
            .unwrap_or_else(|| default_composition(self.num_ranks));
        if deck_composition.len() != self.num_ranks {
            return Err(HanabiError::invalid_config(format!(
                "deck_composition has {} entries, expected one per rank ({})",
                deck_composition.len(),
                self.num_ranks
            )));
        }
        if deck_composition.contains(&0) {
            return Err(HanabiError::invalid_config(
                "deck_composition needs at least one copy of every rank",
            ));
        }

        let hand_size = self
            .hand_size
            .unwrap_or(if self.num_players < 4 { 5 } else { 4 });
        let config = GameConfig {
            num_players: self.num_players,
            num_colors: self.num_colors,
            num_ranks: self.num_ranks,
            hand_size,
            max_hint_tokens: self.max_hint_tokens,
            max_life_tokens: self.max_life_tokens,
            deck_composition,
            random_seed: self.random_seed,
        };

        let max_hand = (config.deck_size() / config.num_players).min(MAX_HAND_SIZE);
        if hand_size == 0 || hand_size > max_hand {
            return Err(HanabiError::invalid_config(format!(
                "hand_size {} outside 1..={} for a {}-card deck and {} players",
                hand_size,
                max_hand,
                config.deck_size(),
                config.num_players
            )));
        }

        Ok(config)
    }
}

impl TryFrom<GameConfigBuilder> for GameConfig {
    type Error = HanabiError;

    fn try_from(builder: GameConfigBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<GameConfig> for GameConfigBuilder {
    fn from(config: GameConfig) -> Self {
        Self {
            num_players: config.num_players,
            num_colors: config.num_colors,
            num_ranks: config.num_ranks,
            hand_size: Some(config.hand_size),
            max_hint_tokens: config.max_hint_tokens,
            max_life_tokens: config.max_life_tokens,
            deck_composition: Some(config.deck_composition),
            random_seed: config.random_seed,
        }
    }
}

// 3 of the lowest rank, 1 of the highest, 2 of everything between.
fn default_composition(num_ranks: usize) -> Vec<u8> {
    (0..num_ranks)
        .map(|i| match i {
            0 => 3,
            i if i + 1 == num_ranks => 1,
            _ => 2,
        })
        .collect()
}

fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        HanabiError::invalid_config(format!("cannot parse '{}' for parameter '{}'", value, key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfigBuilder::new().build().unwrap();

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.deck_composition(), &[3, 2, 2, 2, 1]);
        assert_eq!(config.deck_size(), 50);
        assert_eq!(config.max_score(), 25);
        assert_eq!(config.max_rank(), Rank::new(5));
    }

    #[test]
    fn test_hand_size_default_by_players() {
        for (players, expected) in [(2, 5), (3, 5), (4, 4), (5, 4)] {
            let config = GameConfigBuilder::new().num_players(players).build().unwrap();
            assert_eq!(config.hand_size(), expected);
        }
    }

    #[test]
    fn test_default_composition_small() {
        assert_eq!(default_composition(1), vec![3]);
        assert_eq!(default_composition(2), vec![3, 1]);
        assert_eq!(default_composition(4), vec![3, 2, 2, 1]);
    }

    #[test]
    fn test_invalid_players() {
        for players in [0, 1, 6] {
            let result = GameConfigBuilder::new().num_players(players).build();
            assert!(matches!(result, Err(HanabiError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_hand_size() {
        // 1 color x 1 rank x 3 copies = 3 cards; 2 players get at most 1 each.
        let result = GameConfigBuilder::new()
            .num_colors(1)
            .num_ranks(1)
            .hand_size(2)
            .build();
        assert!(matches!(result, Err(HanabiError::InvalidConfig(_))));

        let ok = GameConfigBuilder::new()
            .num_colors(1)
            .num_ranks(1)
            .hand_size(1)
            .build();
        assert!(ok.is_ok());

        let zero = GameConfigBuilder::new().hand_size(0).build();
        assert!(zero.is_err());
    }

    #[test]
    fn test_hand_size_fits_slot_indices() {
        // 6375 cards would allow 3187 per hand without the slot bound.
        let huge_deck = || GameConfigBuilder::new().deck_composition(vec![255; 5]);

        let largest = huge_deck().hand_size(MAX_HAND_SIZE).build().unwrap();
        assert_eq!(largest.hand_size(), 255);

        for hand_size in [MAX_HAND_SIZE + 1, 300] {
            let result = huge_deck().hand_size(hand_size).build();
            assert!(matches!(result, Err(HanabiError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_invalid_tokens_and_composition() {
        assert!(GameConfigBuilder::new().max_hint_tokens(0).build().is_err());
        assert!(GameConfigBuilder::new().max_life_tokens(65).build().is_err());
        assert!(GameConfigBuilder::new().deck_composition(vec![3, 2]).build().is_err());
        assert!(GameConfigBuilder::new()
            .deck_composition(vec![3, 2, 0, 2, 1])
            .build()
            .is_err());
        assert!(GameConfigBuilder::new().num_colors(6).build().is_err());
        assert!(GameConfigBuilder::new().num_ranks(0).build().is_err());
    }

    #[test]
    fn test_from_params() {
        let config = GameConfig::from_params([
            ("players", "4"),
            ("colors", "3"),
            ("ranks", "4"),
            ("max_information_tokens", "6"),
            ("max_life_tokens", "2"),
            ("deck_composition", "3, 2, 2, 1"),
            ("seed", "99"),
        ])
        .unwrap();

        assert_eq!(config.num_players(), 4);
        assert_eq!(config.num_colors(), 3);
        assert_eq!(config.num_ranks(), 4);
        assert_eq!(config.hand_size(), 4);
        assert_eq!(config.max_hint_tokens(), 6);
        assert_eq!(config.max_life_tokens(), 2);
        assert_eq!(config.deck_size(), 24);
        assert_eq!(config.random_seed(), 99);
    }

    #[test]
    fn test_from_params_rejects_bad_input() {
        assert!(matches!(
            GameConfig::from_params([("observation_type", "1")]),
            Err(HanabiError::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::from_params([("players", "two")]),
            Err(HanabiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_card_count() {
        let config = GameConfig::default();
        assert_eq!(config.card_count(Card::new(Color::Red, Rank::new(1))), 3);
        assert_eq!(config.card_count(Card::new(Color::Blue, Rank::new(5))), 1);

        let small = GameConfigBuilder::new().num_colors(2).build().unwrap();
        assert_eq!(small.card_count(Card::new(Color::Blue, Rank::new(1))), 0);
    }

    #[test]
    fn test_serde_revalidates() {
        let config = GameConfigBuilder::new().num_players(3).random_seed(5).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);

        let tampered = json.replace("\"num_players\":3", "\"num_players\":9");
        assert!(serde_json::from_str::<GameConfig>(&tampered).is_err());
    }
}

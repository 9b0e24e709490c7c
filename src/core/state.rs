//! Authoritative game state.
//!
//! `GameState` holds everything, including the hidden cards: the deck, every
//! hand, fireworks, discard pile, token pools, the phase and the move
//! history. Agents never read it directly; they get an `Observation`.
//!
//! The phase is explicit:
//!
//! - `Dealing`: chance events are pending, no player may move
//! - `PlayerTurn(p)`: player `p` must move
//! - `GameOver(reason)`: terminal, score is fixed
//!
//! Transitions live in `rules::engine`.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::HistoryItem;
use super::config::GameConfig;
use super::error::{HanabiError, Result};
use super::player::{PlayerId, PlayerMap};
use crate::cards::{Card, Color, Deck, Hand};

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndOfGame {
    /// The last life token was lost. Score is 0.
    OutOfLifeTokens,
    /// The deck ran out and every player took their final turn.
    OutOfCards,
    /// Every firework reached the top rank.
    CompletedFireworks,
}

/// State-machine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Awaiting chance events to fill the starting hands.
    Dealing,
    /// The given player must move.
    PlayerTurn(PlayerId),
    /// Terminal.
    GameOver(EndOfGame),
}

/// Full game state including hidden information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) deck: Deck,
    pub(crate) hands: PlayerMap<Hand>,
    /// Top rank per color index, 0 when empty.
    pub(crate) fireworks: Vec<u8>,
    pub(crate) discard_pile: Vec<Card>,
    pub(crate) hint_tokens: u8,
    pub(crate) life_tokens: u8,
    pub(crate) phase: Phase,
    /// Moves left once the deck is exhausted.
    pub(crate) turns_to_play: Option<u8>,
    pub(crate) history: Vector<HistoryItem>,
}

impl GameState {
    /// Fresh state in the `Dealing` phase with a seeded deck.
    pub(crate) fn initial(config: GameConfig) -> Self {
        let player_count = config.num_players();
        Self {
            deck: Deck::shuffled(&config),
            hands: PlayerMap::with_default(player_count),
            fireworks: vec![0; config.num_colors()],
            discard_pile: Vec::new(),
            hint_tokens: config.max_hint_tokens(),
            life_tokens: config.max_life_tokens(),
            phase: Phase::Dealing,
            turns_to_play: None,
            history: Vector::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.num_players()
    }

    // === Cards ===

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    /// All hands in seating order.
    #[must_use]
    pub fn hands(&self) -> &PlayerMap<Hand> {
        &self.hands
    }

    /// One player's hand.
    pub fn hand(&self, player: PlayerId) -> Result<&Hand> {
        self.hands.get(player).ok_or(HanabiError::IndexOutOfRange {
            what: "player",
            index: player.index(),
            len: self.player_count(),
        })
    }

    /// Top rank per color index (0 = empty).
    #[must_use]
    pub fn fireworks(&self) -> &[u8] {
        &self.fireworks
    }

    /// Top rank of one color's firework.
    #[must_use]
    pub fn firework(&self, color: Color) -> u8 {
        self.fireworks.get(color.index()).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// Whether `card` would extend its firework right now.
    #[must_use]
    pub fn card_playable_on_fireworks(&self, card: Card) -> bool {
        self.config.contains(card) && card.rank.value() == self.firework(card.color) + 1
    }

    // === Tokens ===

    #[must_use]
    pub fn hint_tokens(&self) -> u8 {
        self.hint_tokens
    }

    #[must_use]
    pub fn life_tokens(&self) -> u8 {
        self.life_tokens
    }

    // === Progression ===

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The player to move, or `None` while dealing or after the game.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::PlayerTurn(player) => Some(player),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_dealing(&self) -> bool {
        self.phase == Phase::Dealing
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    #[must_use]
    pub fn end_of_game(&self) -> Option<EndOfGame> {
        match self.phase {
            Phase::GameOver(reason) => Some(reason),
            _ => None,
        }
    }

    /// Final-round moves left after the deck ran out.
    #[must_use]
    pub fn turns_to_play(&self) -> Option<u8> {
        self.turns_to_play
    }

    /// Sum of firework heights, or 0 once the life tokens are gone.
    #[must_use]
    pub fn score(&self) -> u32 {
        if self.life_tokens == 0 {
            0
        } else {
            self.fireworks.iter().map(|&r| u32::from(r)).sum()
        }
    }

    /// Applied moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<HistoryItem> {
        &self.history
    }

    #[must_use]
    pub fn last_history_item(&self) -> Option<&HistoryItem> {
        self.history.last()
    }

    /// Human-readable dump for logging. Not a stable format.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    // === Validation ===

    /// Check structural invariants of a state that did not come from the
    /// engine's own transitions (e.g. decoded bytes).
    pub(crate) fn validate(&self) -> Result<()> {
        let config = &self.config;
        let fail = |msg: String| Err(HanabiError::deserialization(msg));

        if self.hands.player_count() != config.num_players() {
            return fail(format!(
                "{} hands for {} players",
                self.hands.player_count(),
                config.num_players()
            ));
        }
        if self.fireworks.len() != config.num_colors() {
            return fail(format!("{} fireworks for {} colors", self.fireworks.len(), config.num_colors()));
        }
        if self.fireworks.iter().any(|&r| r as usize > config.num_ranks()) {
            return fail("firework above top rank".to_string());
        }
        if self.hint_tokens > config.max_hint_tokens() || self.life_tokens > config.max_life_tokens() {
            return fail("token count above maximum".to_string());
        }

        for (player, hand) in self.hands.iter() {
            if hand.len() > config.hand_size() {
                return fail(format!("{} holds {} cards", player, hand.len()));
            }
            for slot in hand.slots() {
                let k = &slot.knowledge;
                if !k.is_consistent()
                    || k.color().range() != config.num_colors()
                    || k.rank().range() != config.num_ranks()
                {
                    return fail(format!("{} has malformed card knowledge", player));
                }
                if !config.contains(slot.card) || !k.is_plausible(slot.card) {
                    return fail(format!("{} holds a card its knowledge excludes", player));
                }
            }
        }

        // Every card of the composition is in exactly one place.
        let num_ranks = config.num_ranks();
        let mut counts = vec![0usize; config.num_colors() * num_ranks];
        let located = self
            .deck
            .cards()
            .iter()
            .chain(self.discard_pile.iter())
            .copied()
            .chain(self.hands.values().flat_map(|h| h.cards()));
        for card in located {
            if !config.contains(card) {
                return fail(format!("card {} not in this game", card));
            }
            counts[card.index(num_ranks)] += 1;
        }
        for color in config.colors() {
            for rank in config.ranks() {
                let card = Card::new(color, rank);
                let played = usize::from(rank.value() <= self.firework(color));
                if counts[card.index(num_ranks)] + played != config.card_count(card) as usize {
                    return fail(format!("card count mismatch for {}", card));
                }
            }
        }

        match self.phase {
            Phase::Dealing if !self.history.is_empty() => {
                return fail("history recorded while dealing".to_string());
            }
            Phase::PlayerTurn(player) if self.hands.get(player).map_or(true, Hand::is_empty) => {
                return fail(format!("{} to move without cards", player));
            }
            _ => {}
        }

        Ok(())
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Life tokens: {}", self.life_tokens)?;
        writeln!(f, "Info tokens: {}", self.hint_tokens)?;
        write!(f, "Fireworks:")?;
        for color in self.config.colors() {
            write!(f, " {}{}", color, self.firework(color))?;
        }
        writeln!(f)?;
        writeln!(f, "Hands:")?;
        for (player, hand) in self.hands.iter() {
            if player.index() > 0 {
                writeln!(f, "-----")?;
            }
            if self.current_player() == Some(player) {
                writeln!(f, "Cur player")?;
            }
            write!(f, "{}", hand)?;
        }
        writeln!(f, "Deck size: {}", self.deck.len())?;
        write!(f, "Discards:")?;
        for card in &self.discard_pile {
            write!(f, " {}", card)?;
        }
        writeln!(f)?;
        match self.phase {
            Phase::Dealing => writeln!(f, "Phase: dealing"),
            Phase::PlayerTurn(player) => writeln!(f, "Phase: {} to move", player),
            Phase::GameOver(reason) => writeln!(f, "Phase: game over ({:?}), score {}", reason, self.score()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKnowledge, Rank};
    use crate::core::GameConfigBuilder;

    #[test]
    fn test_initial_state() {
        let config = GameConfigBuilder::new().num_players(3).build().unwrap();
        let state = GameState::initial(config);

        assert_eq!(state.player_count(), 3);
        assert_eq!(state.phase(), Phase::Dealing);
        assert_eq!(state.current_player(), None);
        assert_eq!(state.deck_size(), 50);
        assert_eq!(state.hint_tokens(), 8);
        assert_eq!(state.life_tokens(), 3);
        assert_eq!(state.fireworks(), &[0, 0, 0, 0, 0]);
        assert_eq!(state.score(), 0);
        assert!(state.history().is_empty());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_score_zero_without_lives() {
        let mut state = GameState::initial(GameConfig::default());
        state.fireworks = vec![2, 1, 0, 0, 0];
        assert_eq!(state.score(), 3);

        state.life_tokens = 0;
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_card_playable() {
        let mut state = GameState::initial(GameConfig::default());
        state.fireworks[Color::Red.index()] = 2;

        assert!(state.card_playable_on_fireworks(Card::new(Color::Red, Rank::new(3))));
        assert!(!state.card_playable_on_fireworks(Card::new(Color::Red, Rank::new(2))));
        assert!(state.card_playable_on_fireworks(Card::new(Color::Blue, Rank::new(1))));
    }

    #[test]
    fn test_validate_detects_lost_card() {
        let mut state = GameState::initial(GameConfig::default());
        state.deck.draw();
        assert!(matches!(state.validate(), Err(HanabiError::Deserialization(_))));
    }

    #[test]
    fn test_validate_detects_knowledge_mismatch() {
        let mut state = GameState::initial(GameConfig::default());
        let card = state.deck.draw().unwrap();
        let mut knowledge = CardKnowledge::new(5, 5);
        let other = Color::ALL.into_iter().find(|&c| c != card.color).unwrap();
        knowledge.apply_is_color_hint(other);
        state.hands[PlayerId::new(0)].add_card(card, knowledge);

        assert!(state.validate().is_err());
    }

    #[test]
    fn test_text_dump() {
        let state = GameState::initial(GameConfig::default());
        let text = state.to_text();
        assert!(text.starts_with("Life tokens: 3\nInfo tokens: 8\nFireworks: R0 Y0 G0 W0 B0\n"));
        assert!(text.contains("Deck size: 50"));
        assert!(text.contains("Phase: dealing"));
    }
}

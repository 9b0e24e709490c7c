//! State-machine transitions.
//!
//! - `new_game`: seeded deck, empty hands, `Dealing`
//! - `apply_chance_event`: deal exactly one card; the last one starts play
//! - `apply_move`: validate, then commit a full player turn
//!
//! A rejected call leaves the state untouched: every check runs before the
//! first mutation.

use log::{debug, trace};

use super::legality::{check_move, legal_moves};
use crate::cards::{Card, CardKnowledge, Deck};
use crate::core::{
    EndOfGame, GameConfig, GameState, HanabiError, HistoryItem, Move, MoveOutcome, Phase, PlayerId,
    Result,
};

/// Create a game in the `Dealing` phase.
#[must_use]
pub fn new_game(config: GameConfig) -> GameState {
    debug!(
        "new game: {} players, {} colors x {} ranks, seed {}",
        config.num_players(),
        config.num_colors(),
        config.num_ranks(),
        config.random_seed()
    );
    GameState::initial(config)
}

impl GameState {
    /// Create a game in the `Dealing` phase.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        new_game(config)
    }

    /// Create a game and deal every starting hand.
    #[must_use]
    pub fn new_dealt(config: GameConfig) -> Self {
        let mut state = new_game(config);
        state.deal_all();
        state
    }

    /// Deal one card to the next player needing one.
    ///
    /// Hands fill round-robin in seating order. Once every hand holds
    /// `hand_size` cards, player 0 is to move. Fails with `InvalidMove`
    /// outside the `Dealing` phase.
    pub fn apply_chance_event(&mut self) -> Result<Card> {
        self.deal_with(Deck::draw)
    }

    /// Deal a chosen card as the next chance event.
    ///
    /// One copy of `card` is taken out of the deck; `InvalidMove` if none is
    /// left there.
    pub fn deal_specific(&mut self, card: Card) -> Result<Card> {
        self.deal_with(|deck| deck.take(card))
    }

    /// Apply chance events until a player is to move.
    ///
    /// Returns the number of cards dealt.
    pub fn deal_all(&mut self) -> usize {
        let mut dealt = 0;
        while self.apply_chance_event().is_ok() {
            dealt += 1;
        }
        dealt
    }

    /// Apply a move for the current player.
    ///
    /// On success the move, its consequences, any replacement draw and the
    /// turn advance are committed together, and the appended history item is
    /// returned. On failure nothing changes.
    pub fn apply_move(&mut self, mv: Move) -> Result<HistoryItem> {
        let player = self
            .current_player()
            .ok_or_else(|| match self.phase {
                Phase::Dealing => HanabiError::invalid_move("cards are still being dealt"),
                _ => HanabiError::invalid_move("the game is over"),
            })?;
        check_move(self, player, &mv)?;

        let countdown_running = self.turns_to_play.is_some();
        let outcome = match mv {
            Move::Play { card_index } => {
                let card = self.take_card(player, card_index)?;
                let outcome = self.play_card(card);
                self.draw_replacement(player);
                outcome
            }
            Move::Discard { card_index } => {
                let card = self.take_card(player, card_index)?;
                self.discard_pile.push(card);
                let hint_regained = self.regain_hint();
                self.draw_replacement(player);
                MoveOutcome::Discarded { card, hint_regained }
            }
            Move::RevealColor { target_player, color } => {
                self.hint_tokens -= 1;
                let result = self.hands[target_player].reveal_color(color);
                MoveOutcome::Revealed {
                    matched: result.matched,
                    newly_revealed: result.newly_revealed,
                }
            }
            Move::RevealRank { target_player, rank } => {
                self.hint_tokens -= 1;
                let result = self.hands[target_player].reveal_rank(rank);
                MoveOutcome::Revealed {
                    matched: result.matched,
                    newly_revealed: result.newly_revealed,
                }
            }
        };

        if countdown_running {
            self.turns_to_play = self.turns_to_play.map(|t| t.saturating_sub(1));
        }

        let item = HistoryItem::new(player, mv, outcome);
        self.history.push_back(item.clone());
        self.advance(player);

        debug!(
            "{} made {}; hints {}, lives {}, deck {}",
            player,
            mv,
            self.hint_tokens,
            self.life_tokens,
            self.deck.len()
        );
        if let Phase::GameOver(reason) = self.phase {
            debug!("game over ({:?}), score {}", reason, self.score());
        }

        Ok(item)
    }

    /// Every legal move for `player` (empty unless it is their turn).
    pub fn legal_moves(&self, player: PlayerId) -> Result<Vec<Move>> {
        legal_moves(self, player)
    }

    /// Whether the current player may make `mv`.
    #[must_use]
    pub fn move_is_legal(&self, mv: &Move) -> bool {
        self.current_player()
            .is_some_and(|player| check_move(self, player, mv).is_ok())
    }

    // === Internal transitions ===

    fn deal_with(&mut self, pick: impl FnOnce(&mut Deck) -> Option<Card>) -> Result<Card> {
        if self.phase != Phase::Dealing {
            return Err(HanabiError::invalid_move("no chance event pending"));
        }

        let hand_size = self.config.hand_size();
        let target = self
            .hands
            .iter()
            .filter(|(_, hand)| hand.len() < hand_size)
            .min_by_key(|(player, hand)| (hand.len(), *player))
            .map(|(player, _)| player)
            .ok_or_else(|| HanabiError::invalid_move("all hands are already full"))?;
        let card = pick(&mut self.deck)
            .ok_or_else(|| HanabiError::invalid_move("card not available in the deck"))?;

        let knowledge = self.open_knowledge();
        self.hands[target].add_card(card, knowledge);
        trace!("dealt {} to {}", card, target);

        if self.deck.is_empty() {
            self.turns_to_play = Some(self.player_count() as u8);
        }
        if self.hands.values().all(|hand| hand.len() == hand_size) {
            self.phase = Phase::PlayerTurn(PlayerId::new(0));
            debug!("dealing complete, {} cards left in deck", self.deck.len());
        }

        Ok(card)
    }

    fn open_knowledge(&self) -> CardKnowledge {
        CardKnowledge::new(self.config.num_colors(), self.config.num_ranks())
    }

    fn take_card(&mut self, player: PlayerId, card_index: usize) -> Result<Card> {
        self.hands[player]
            .remove(card_index)
            .map(|slot| slot.card)
            .ok_or(HanabiError::IndexOutOfRange {
                what: "card",
                index: card_index,
                len: self.hands[player].len(),
            })
    }

    fn play_card(&mut self, card: Card) -> MoveOutcome {
        if self.card_playable_on_fireworks(card) {
            self.fireworks[card.color.index()] = card.rank.value();
            let hint_regained = card.rank == self.config.max_rank() && self.regain_hint();
            MoveOutcome::Played { card, scored: true, hint_regained }
        } else {
            self.discard_pile.push(card);
            self.life_tokens = self.life_tokens.saturating_sub(1);
            MoveOutcome::Played { card, scored: false, hint_regained: false }
        }
    }

    fn regain_hint(&mut self) -> bool {
        if self.hint_tokens < self.config.max_hint_tokens() {
            self.hint_tokens += 1;
            true
        } else {
            false
        }
    }

    fn draw_replacement(&mut self, player: PlayerId) {
        let Some(card) = self.deck.draw() else {
            return;
        };
        let knowledge = self.open_knowledge();
        self.hands[player].add_card(card, knowledge);
        trace!("{} drew a replacement", player);

        if self.deck.is_empty() && self.turns_to_play.is_none() {
            self.turns_to_play = Some(self.player_count() as u8);
            debug!("deck exhausted, {} turns left", self.player_count());
        }
    }

    fn advance(&mut self, player: PlayerId) {
        let max_rank = self.config.max_rank().value();

        self.phase = if self.life_tokens == 0 {
            Phase::GameOver(EndOfGame::OutOfLifeTokens)
        } else if self.fireworks.iter().all(|&top| top == max_rank) {
            Phase::GameOver(EndOfGame::CompletedFireworks)
        } else if self.turns_to_play == Some(0) {
            Phase::GameOver(EndOfGame::OutOfCards)
        } else {
            let player_count = self.player_count();
            (1..=player_count)
                .map(|offset| player.plus_offset(offset, player_count))
                .find(|&next| !self.hands[next].is_empty())
                .map_or(Phase::GameOver(EndOfGame::OutOfCards), Phase::PlayerTurn)
        };
    }
}

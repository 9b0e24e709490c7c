//! Per-player observations.
//!
//! `observe` is the only path from a `GameState` to something an agent may
//! see. The observer's own cards are replaced by their knowledge; every
//! other hand is shown in full. The result is a deep copy: later changes to
//! the source state never reach it.
//!
//! Hands are stored relative to the observer, own hand first, then the
//! players to the observer's left in seating order.

pub mod analysis;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardKnowledge, Color, Hand};
use crate::core::{
    EndOfGame, GameConfig, GameState, HanabiError, HistoryItem, Move, Phase, PlayerId, Result,
};
use crate::rules::legal_moves;

pub use analysis::CardCounts;

/// One hand slot as seen by the observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedSlot {
    /// The card, or `None` for the observer's own slots.
    pub card: Option<Card>,
    pub knowledge: CardKnowledge,
}

/// One player's hand as seen by the observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservedHand {
    pub player: PlayerId,
    pub slots: Vec<ObservedSlot>,
}

impl ObservedHand {
    fn project(player: PlayerId, hand: &Hand, hidden: bool) -> Self {
        let slots = hand
            .slots()
            .iter()
            .map(|slot| ObservedSlot {
                card: if hidden { None } else { Some(slot.card) },
                knowledge: slot.knowledge,
            })
            .collect();
        Self { player, slots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Visible cards (empty for the observer's own hand).
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.slots.iter().filter_map(|slot| slot.card)
    }

    pub fn knowledge(&self) -> impl Iterator<Item = &CardKnowledge> + '_ {
        self.slots.iter().map(|slot| &slot.knowledge)
    }
}

/// Immutable view of a game from one seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    observer: PlayerId,
    config: GameConfig,
    phase: Phase,
    hands: Vec<ObservedHand>,
    fireworks: Vec<u8>,
    discard_pile: Vec<Card>,
    deck_size: usize,
    hint_tokens: u8,
    life_tokens: u8,
    legal_moves: Vec<Move>,
    last_moves: Vec<HistoryItem>,
}

/// Build `player`'s view of `state`.
///
/// Fails with `IndexOutOfRange` for a seat that is not at the table.
pub fn observe(state: &GameState, player: PlayerId) -> Result<Observation> {
    let player_count = state.player_count();
    let observer = PlayerId::checked(player.index(), player_count)?;

    let hands = (0..player_count)
        .map(|offset| {
            let seat = observer.plus_offset(offset, player_count);
            state
                .hand(seat)
                .map(|hand| ObservedHand::project(seat, hand, offset == 0))
        })
        .collect::<Result<Vec<_>>>()?;

    let legal_moves = legal_moves(state, observer)?;

    // Everything since (and including) the observer's own last move.
    let mut last_moves = Vec::new();
    for item in state.history().iter().rev() {
        last_moves.push(item.clone());
        if item.player == observer {
            break;
        }
    }

    Ok(Observation {
        observer,
        config: state.config().clone(),
        phase: state.phase(),
        hands,
        fireworks: state.fireworks().to_vec(),
        discard_pile: state.discard_pile().to_vec(),
        deck_size: state.deck_size(),
        hint_tokens: state.hint_tokens(),
        life_tokens: state.life_tokens(),
        legal_moves,
        last_moves,
    })
}

impl GameState {
    /// `player`'s view of this state. See [`observe`].
    pub fn observe(&self, player: PlayerId) -> Result<Observation> {
        observe(self, player)
    }
}

impl Observation {
    /// The seat this view belongs to.
    #[must_use]
    pub fn observer(&self) -> PlayerId {
        self.observer
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.num_players()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::PlayerTurn(player) => Some(player),
            _ => None,
        }
    }

    /// Seats from the observer to the current player, if a player is to move.
    #[must_use]
    pub fn current_player_offset(&self) -> Option<usize> {
        self.current_player()
            .map(|player| player.offset_from(self.observer, self.player_count()))
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

    // === Hands ===

    /// All hands, own hand first, then clockwise.
    #[must_use]
    pub fn hands(&self) -> &[ObservedHand] {
        &self.hands
    }

    /// The observer's own hand: knowledge only.
    #[must_use]
    pub fn own_hand(&self) -> &ObservedHand {
        &self.hands[0]
    }

    /// A hand by absolute seat.
    pub fn hand(&self, player: PlayerId) -> Result<&ObservedHand> {
        let player_count = self.player_count();
        let seat = PlayerId::checked(player.index(), player_count)?;
        Ok(&self.hands[seat.offset_from(self.observer, player_count)])
    }

    // === Public state ===

    #[must_use]
    pub fn fireworks(&self) -> &[u8] {
        &self.fireworks
    }

    #[must_use]
    pub fn firework(&self, color: Color) -> u8 {
        self.fireworks.get(color.index()).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    #[must_use]
    pub fn hint_tokens(&self) -> u8 {
        self.hint_tokens
    }

    #[must_use]
    pub fn life_tokens(&self) -> u8 {
        self.life_tokens
    }

    /// The observer's own legal moves (empty unless it is their turn).
    #[must_use]
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    /// Moves since the observer's own last move, most recent first.
    #[must_use]
    pub fn last_moves(&self) -> &[HistoryItem] {
        &self.last_moves
    }

    /// The most recent move, if any.
    #[must_use]
    pub fn last_move(&self) -> Option<&HistoryItem> {
        self.last_moves.first()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        if self.life_tokens == 0 {
            0
        } else {
            self.fireworks.iter().map(|&r| u32::from(r)).sum()
        }
    }

    #[must_use]
    pub fn card_playable_on_fireworks(&self, card: Card) -> bool {
        self.config.contains(card) && card.rank.value() == self.firework(card.color) + 1
    }

    /// Human-readable dump for logging. Not a stable format.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    // === Validation ===

    /// Structural checks for decoded observations.
    pub(crate) fn validate(&self) -> Result<()> {
        let config = &self.config;
        let player_count = config.num_players();
        let fail = |msg: &str| Err(HanabiError::deserialization(msg));

        if self.observer.index() >= player_count || self.hands.len() != player_count {
            return fail("observer or hand count does not match the table");
        }
        if self.fireworks.len() != config.num_colors()
            || self.fireworks.iter().any(|&r| r as usize > config.num_ranks())
        {
            return fail("malformed fireworks");
        }
        if self.hint_tokens > config.max_hint_tokens() || self.life_tokens > config.max_life_tokens() {
            return fail("token count above maximum");
        }
        if self.deck_size > config.deck_size() || self.discard_pile.iter().any(|&c| !config.contains(c)) {
            return fail("malformed deck or discard pile");
        }

        for (offset, hand) in self.hands.iter().enumerate() {
            if hand.player != self.observer.plus_offset(offset, player_count) {
                return fail("hands out of seating order");
            }
            if hand.len() > config.hand_size() {
                return fail("hand larger than hand size");
            }
            for slot in &hand.slots {
                let k = &slot.knowledge;
                if !k.is_consistent()
                    || k.color().range() != config.num_colors()
                    || k.rank().range() != config.num_ranks()
                {
                    return fail("malformed card knowledge");
                }
                match (offset, slot.card) {
                    (0, Some(_)) => return fail("own card exposed"),
                    (0, None) => {}
                    (_, None) => return fail("other player's card missing"),
                    (_, Some(card)) if !config.contains(card) || !k.is_plausible(card) => {
                        return fail("visible card contradicts its knowledge")
                    }
                    (_, Some(_)) => {}
                }
            }
        }

        if let Phase::PlayerTurn(player) = self.phase {
            if player.index() >= player_count {
                return fail("current player not at the table");
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Life tokens: {}", self.life_tokens)?;
        writeln!(f, "Info tokens: {}", self.hint_tokens)?;
        write!(f, "Fireworks:")?;
        for color in self.config.colors() {
            write!(f, " {}{}", color, self.firework(color))?;
        }
        writeln!(f)?;
        writeln!(f, "Hands:")?;
        let current = self.current_player_offset();
        for (offset, hand) in self.hands.iter().enumerate() {
            if offset > 0 {
                writeln!(f, "-----")?;
            }
            if current == Some(offset) {
                writeln!(f, "Cur player")?;
            }
            for slot in &hand.slots {
                match slot.card {
                    Some(card) => writeln!(f, "{} || {}", card, slot.knowledge)?,
                    None => writeln!(f, "XX || {}", slot.knowledge)?,
                }
            }
        }
        writeln!(f, "Deck size: {}", self.deck_size)?;
        write!(f, "Discards:")?;
        for card in &self.discard_pile {
            write!(f, " {}", card)?;
        }
        writeln!(f)
    }
}

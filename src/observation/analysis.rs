//! Derived quantities an agent can compute from its own view.
//!
//! Everything here uses only what the observer can see: fireworks, the
//! discard pile, other players' hands and the observer's own knowledge.

use serde::{Deserialize, Serialize};

use super::Observation;
use crate::cards::{Card, CardKnowledge};
use crate::core::{GameConfig, HanabiError, Result};

/// Copies of each card the observer cannot see, color-major.
///
/// Starts from the full composition and removes played cards, the discard
/// pile and every visible hand. What is left is in the deck or in the
/// observer's own hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCounts {
    num_ranks: usize,
    counts: Vec<u8>,
}

impl CardCounts {
    /// Full composition of a fresh deck.
    #[must_use]
    pub fn full(config: &GameConfig) -> Self {
        let counts = config
            .colors()
            .flat_map(|color| config.ranks().map(move |rank| Card::new(color, rank)))
            .map(|card| config.card_count(card))
            .collect();
        Self { num_ranks: config.num_ranks(), counts }
    }

    /// Copies of `card` (0 for cards outside the game).
    #[must_use]
    pub fn get(&self, card: Card) -> u8 {
        self.slot(card).map_or(0, |index| self.counts[index])
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    /// Raw counts, indexed by `Card::index`.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.counts
    }

    fn slot(&self, card: Card) -> Option<usize> {
        let in_range = card.rank.value() >= 1 && card.rank.index() < self.num_ranks;
        let index = card.index(self.num_ranks);
        (in_range && index < self.counts.len()).then_some(index)
    }

    fn remove(&mut self, card: Card) {
        if let Some(index) = self.slot(card) {
            self.counts[index] = self.counts[index].saturating_sub(1);
        }
    }

    /// Weight of the cards `knowledge` still allows.
    fn plausible_total(&self, knowledge: &CardKnowledge, mut keep: impl FnMut(Card) -> bool) -> usize {
        knowledge
            .plausible_colors()
            .flat_map(|color| knowledge.plausible_ranks().map(move |rank| Card::new(color, rank)))
            .filter(|&card| keep(card))
            .map(|card| self.get(card) as usize)
            .sum()
    }
}

impl Observation {
    /// Cards the observer cannot see.
    #[must_use]
    pub fn card_counts(&self) -> CardCounts {
        let config = self.config();
        let mut counts = CardCounts::full(config);

        for color in config.colors() {
            for rank in config.ranks().take(self.firework(color) as usize) {
                counts.remove(Card::new(color, rank));
            }
        }
        for &card in self.discard_pile() {
            counts.remove(card);
        }
        for hand in &self.hands()[1..] {
            for card in hand.cards() {
                counts.remove(card);
            }
        }
        counts
    }

    /// Chance that each own slot is playable right now.
    ///
    /// Weighted by the unseen copies of every card the slot's knowledge
    /// allows. A slot with no remaining candidates scores 0.
    #[must_use]
    pub fn playable_probabilities(&self) -> Vec<f64> {
        let counts = self.card_counts();
        self.own_hand()
            .knowledge()
            .map(|knowledge| {
                let total = counts.plausible_total(knowledge, |_| true);
                if total == 0 {
                    return 0.0;
                }
                let playable =
                    counts.plausible_total(knowledge, |card| self.card_playable_on_fireworks(card));
                playable as f64 / total as f64
            })
            .collect()
    }

    /// Playable probability of one own slot.
    pub fn playable_probability(&self, slot: usize) -> Result<f64> {
        let len = self.own_hand().len();
        self.playable_probabilities()
            .get(slot)
            .copied()
            .ok_or(HanabiError::IndexOutOfRange { what: "card", index: slot, len })
    }

    /// Highest score still reachable given what has been discarded.
    ///
    /// A color stops at the first missing rank whose every copy is in the
    /// discard pile.
    #[must_use]
    pub fn max_achievable_score(&self) -> u32 {
        let config = self.config();
        let mut max_score = config.max_score();

        for color in config.colors() {
            let lost = config
                .ranks()
                .skip(self.firework(color) as usize)
                .find(|&rank| {
                    let card = Card::new(color, rank);
                    let discarded = self.discard_pile().iter().filter(|&&c| c == card).count();
                    discarded == config.card_count(card) as usize
                });
            if let Some(rank) = lost {
                max_score -= (config.num_ranks() - rank.index()) as u32;
            }
        }
        max_score
    }

    /// Whether `hand` could be the observer's actual hand.
    ///
    /// Each card must be allowed by its slot's knowledge and the hand as a
    /// whole must not need more copies of a card than are unseen.
    #[must_use]
    pub fn hand_possible(&self, hand: &[Card]) -> bool {
        let own = self.own_hand();
        if hand.len() != own.len() {
            return false;
        }
        if !hand.iter().zip(own.knowledge()).all(|(&card, k)| k.is_plausible(card)) {
            return false;
        }

        let mut counts = self.card_counts();
        hand.iter().all(|&card| {
            let available = counts.get(card) > 0;
            counts.remove(card);
            available
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Color, Rank};
    use crate::core::{GameConfigBuilder, GameState, Move, PlayerId};

    fn card(color: Color, rank: u8) -> Card {
        Card::new(color, Rank::new(rank))
    }

    fn stacked(hands: &[&[Card]]) -> GameState {
        let mut state = GameState::new(GameConfig::default());
        for slot in 0..5 {
            for hand in hands {
                state.deal_specific(hand[slot]).unwrap();
            }
        }
        state
    }

    fn sample() -> GameState {
        stacked(&[
            &[
                card(Color::Red, 1),
                card(Color::Red, 1),
                card(Color::Green, 2),
                card(Color::White, 3),
                card(Color::Blue, 5),
            ],
            &[
                card(Color::Red, 1),
                card(Color::Yellow, 1),
                card(Color::Blue, 4),
                card(Color::Yellow, 2),
                card(Color::White, 1),
            ],
        ])
    }

    #[test]
    fn test_card_counts_exclude_visible() {
        let state = sample();
        let obs = state.observe(PlayerId::new(0)).unwrap();
        let counts = obs.card_counts();

        // Player 1 holds one of the three red ones.
        assert_eq!(counts.get(card(Color::Red, 1)), 2);
        assert_eq!(counts.get(card(Color::Yellow, 1)), 2);
        assert_eq!(counts.get(card(Color::Blue, 5)), 1);
        assert_eq!(counts.total(), 50 - 5);
    }

    #[test]
    fn test_card_counts_after_play() {
        let mut state = sample();
        state.apply_move(Move::Play { card_index: 0 }).unwrap();
        let obs = state.observe(PlayerId::new(1)).unwrap();
        let counts = obs.card_counts();

        // One red one played, one in player 1's own (unseen) hand.
        let visible_red_ones = obs.hands()[1]
            .cards()
            .filter(|&c| c == card(Color::Red, 1))
            .count() as u8;
        assert_eq!(counts.get(card(Color::Red, 1)), 2 - visible_red_ones);
    }

    #[test]
    fn test_playable_probability_with_hint() {
        let mut state = sample();
        // Player 0 reveals player 1's ones; then player 1 looks at its hand.
        state
            .apply_move(Move::RevealRank { target_player: PlayerId::new(1), rank: Rank::new(1) })
            .unwrap();
        let obs = state.observe(PlayerId::new(1)).unwrap();
        let probs = obs.playable_probabilities();

        assert_eq!(probs.len(), 5);
        // Every one is playable on empty fireworks.
        assert_eq!(probs[0], 1.0);
        assert_eq!(probs[1], 1.0);
        assert_eq!(probs[4], 1.0);
        assert!(probs[2] < 1.0 && probs[2] >= 0.0);
        assert_eq!(obs.playable_probability(0).unwrap(), 1.0);
        assert!(obs.playable_probability(5).is_err());
    }

    #[test]
    fn test_max_achievable_score() {
        let mut state = sample();
        let obs = state.observe(PlayerId::new(0)).unwrap();
        assert_eq!(obs.max_achievable_score(), 25);

        // Player 0 misplays its only Blue 5: blue tops out at 4.
        state.apply_move(Move::Play { card_index: 4 }).unwrap();
        let obs = state.observe(PlayerId::new(0)).unwrap();
        assert_eq!(obs.max_achievable_score(), 24);
    }

    #[test]
    fn test_max_score_lost_low_rank() {
        let config = GameConfigBuilder::new()
            .num_colors(1)
            .num_ranks(3)
            .deck_composition(vec![1, 1, 1])
            .hand_size(1)
            .build()
            .unwrap();
        let mut state = GameState::new(config);
        state.deal_specific(card(Color::Red, 2)).unwrap();
        state.deal_specific(card(Color::Red, 3)).unwrap();
        state.apply_move(Move::Play { card_index: 0 }).unwrap();

        let obs = state.observe(PlayerId::new(1)).unwrap();
        // The only red two is gone: nothing above red one can be played.
        assert_eq!(obs.max_achievable_score(), 1);
    }

    #[test]
    fn test_hand_possible() {
        let mut state = sample();
        state
            .apply_move(Move::RevealColor { target_player: PlayerId::new(1), color: Color::Yellow })
            .unwrap();
        let obs = state.observe(PlayerId::new(1)).unwrap();

        let actual: Vec<Card> = state.hand(PlayerId::new(1)).unwrap().cards().collect();
        assert!(obs.hand_possible(&actual));

        // Slot 1 is known yellow.
        let mut wrong_color = actual.clone();
        wrong_color[1] = card(Color::Green, 1);
        assert!(!obs.hand_possible(&wrong_color));

        // Only one Blue 5 exists and player 0 holds it.
        let mut too_many = actual.clone();
        too_many[2] = card(Color::Blue, 5);
        assert!(!obs.hand_possible(&too_many));

        assert!(!obs.hand_possible(&actual[..4]));
    }
}

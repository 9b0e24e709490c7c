//! Observation encoding for learning agents.
//!
//! Turns an `Observation` into a flat integer vector of fixed length for a
//! given configuration.

use serde::{Deserialize, Serialize};

use super::moves::MoveSpace;
use crate::cards::Card;
use crate::core::{GameConfig, HanabiError, Result};
use crate::observation::{CardCounts, Observation};

/// Encoded observation as a flat vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedObservation {
    /// Flattened data (row-major order).
    pub data: Vec<i32>,

    /// Shape of the data.
    pub shape: Vec<usize>,
}

impl EncodedObservation {
    pub fn new(data: Vec<i32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "Data length must match shape product"
        );
        Self { data, shape }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<i32> {
        self.data.get(index).copied()
    }
}

/// Encodes observations into flat vectors.
///
/// Each encoder defines:
/// - How to turn an observation into data
/// - The shape of that data
/// - The size of the matching action space
pub trait ObservationEncoder: Send + Sync {
    /// Encode an observation. Fails with `InvalidConfig` if the observation
    /// belongs to a different configuration.
    fn encode(&self, obs: &Observation) -> Result<EncodedObservation>;

    /// Shape of every encoding.
    fn output_shape(&self) -> Vec<usize>;

    /// Number of move uids.
    fn action_space_size(&self) -> usize;

    fn player_count(&self) -> usize;

    /// Mask over the action space, 1 for the observer's own legal moves.
    fn legal_move_mask(&self, obs: &Observation) -> Result<Vec<i32>>;
}

/// The standard encoding, in four sections:
///
/// 1. Card knowledge: for every player (observer first) and hand slot,
///    `C*R` counts of the copies neither played nor discarded, zeroed where
///    the slot's knowledge rules the card out. Empty slots stay zero.
/// 2. Hands: one-hot `C*R` per slot for every other player, padded to the
///    hand size, then one bit per player whose hand is short.
/// 3. Discards: `C*R` counts.
/// 4. Board: firework heights per color, then life tokens, then hint tokens.
#[derive(Clone, Debug)]
pub struct CommonEncoder {
    config: GameConfig,
    moves: MoveSpace,
}

impl CommonEncoder {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self { config: config.clone(), moves: MoveSpace::new(config) }
    }

    #[must_use]
    pub fn move_space(&self) -> &MoveSpace {
        &self.moves
    }

    fn card_length(&self) -> usize {
        self.config.num_colors() * self.config.num_ranks()
    }

    fn knowledge_length(&self) -> usize {
        self.config.num_players() * self.config.hand_size() * self.card_length()
    }

    fn hands_length(&self) -> usize {
        let players = self.config.num_players();
        (players - 1) * self.config.hand_size() * self.card_length() + players
    }

    fn board_length(&self) -> usize {
        self.config.num_colors() + 2
    }

    /// Total length of an encoding.
    #[must_use]
    pub fn flat_length(&self) -> usize {
        self.knowledge_length() + self.hands_length() + self.card_length() + self.board_length()
    }

    fn check_config(&self, obs: &Observation) -> Result<()> {
        if obs.config() == &self.config {
            Ok(())
        } else {
            Err(HanabiError::invalid_config(
                "observation was built for a different configuration",
            ))
        }
    }

    /// Composition minus fireworks and discards.
    fn board_counts(&self, obs: &Observation) -> Vec<i32> {
        let config = &self.config;
        let num_ranks = config.num_ranks();
        let mut counts: Vec<i32> = CardCounts::full(config)
            .as_slice()
            .iter()
            .map(|&c| i32::from(c))
            .collect();

        for color in config.colors() {
            for rank in config.ranks().take(obs.firework(color) as usize) {
                counts[Card::new(color, rank).index(num_ranks)] -= 1;
            }
        }
        for card in obs.discard_pile() {
            counts[card.index(num_ranks)] -= 1;
        }
        counts
    }

    fn encode_knowledge(&self, obs: &Observation, out: &mut [i32]) -> usize {
        let card_length = self.card_length();
        let num_ranks = self.config.num_ranks();
        let board = self.board_counts(obs);

        let mut offset = 0;
        for hand in obs.hands() {
            for slot in 0..self.config.hand_size() {
                if let Some(observed) = hand.slots.get(slot) {
                    let k = &observed.knowledge;
                    for color in self.config.colors() {
                        for rank in self.config.ranks() {
                            let card = Card::new(color, rank);
                            let index = card.index(num_ranks);
                            if k.is_plausible(card) {
                                out[offset + index] = board[index];
                            }
                        }
                    }
                }
                offset += card_length;
            }
        }
        offset
    }

    fn encode_hands(&self, obs: &Observation, out: &mut [i32]) -> usize {
        let card_length = self.card_length();
        let num_ranks = self.config.num_ranks();
        let hand_size = self.config.hand_size();

        let mut offset = 0;
        for hand in &obs.hands()[1..] {
            for (slot, card) in hand.cards().enumerate() {
                out[offset + slot * card_length + card.index(num_ranks)] = 1;
            }
            offset += hand_size * card_length;
        }
        for (player, hand) in obs.hands().iter().enumerate() {
            if hand.len() < hand_size {
                out[offset + player] = 1;
            }
        }
        offset + obs.hands().len()
    }

    fn encode_discards(&self, obs: &Observation, out: &mut [i32]) -> usize {
        let num_ranks = self.config.num_ranks();
        for card in obs.discard_pile() {
            out[card.index(num_ranks)] += 1;
        }
        self.card_length()
    }

    fn encode_board(&self, obs: &Observation, out: &mut [i32]) -> usize {
        let mut offset = 0;
        for &height in obs.fireworks() {
            out[offset] = i32::from(height);
            offset += 1;
        }
        out[offset] = i32::from(obs.life_tokens());
        out[offset + 1] = i32::from(obs.hint_tokens());
        offset + 2
    }
}

impl ObservationEncoder for CommonEncoder {
    fn encode(&self, obs: &Observation) -> Result<EncodedObservation> {
        self.check_config(obs)?;

        let length = self.flat_length();
        let mut data = vec![0; length];
        let mut offset = 0;
        offset += self.encode_knowledge(obs, &mut data[offset..]);
        offset += self.encode_hands(obs, &mut data[offset..]);
        offset += self.encode_discards(obs, &mut data[offset..]);
        offset += self.encode_board(obs, &mut data[offset..]);
        debug_assert_eq!(offset, length);

        Ok(EncodedObservation::new(data, vec![length]))
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.flat_length()]
    }

    fn action_space_size(&self) -> usize {
        self.moves.max_moves()
    }

    fn player_count(&self) -> usize {
        self.config.num_players()
    }

    fn legal_move_mask(&self, obs: &Observation) -> Result<Vec<i32>> {
        self.check_config(obs)?;
        self.moves.mask(obs.legal_moves(), obs.observer())
    }
}

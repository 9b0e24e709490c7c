//! Moves and move history.
//!
//! A `Move` is what a player asks to do; it carries no legality of its own
//! and is checked against a `GameState` when applied. A `HistoryItem` is an
//! applied move together with its public consequences.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::cards::{Card, Color, Rank, SlotIndices};

/// A player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Play the card in slot `card_index` onto the fireworks.
    Play { card_index: usize },
    /// Discard the card in slot `card_index` to regain a hint token.
    Discard { card_index: usize },
    /// Tell `target_player` which of their cards are `color`.
    RevealColor { target_player: PlayerId, color: Color },
    /// Tell `target_player` which of their cards are `rank`.
    RevealRank { target_player: PlayerId, rank: Rank },
}

impl Move {
    /// Slot index for play/discard moves.
    #[must_use]
    pub fn card_index(&self) -> Option<usize> {
        match *self {
            Move::Play { card_index } | Move::Discard { card_index } => Some(card_index),
            _ => None,
        }
    }

    /// Hinted player for reveal moves.
    #[must_use]
    pub fn target_player(&self) -> Option<PlayerId> {
        match *self {
            Move::RevealColor { target_player, .. } | Move::RevealRank { target_player, .. } => {
                Some(target_player)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_reveal(&self) -> bool {
        self.target_player().is_some()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Play { card_index } => write!(f, "(Play {})", card_index),
            Move::Discard { card_index } => write!(f, "(Discard {})", card_index),
            Move::RevealColor { target_player, color } => {
                write!(f, "(Reveal player {} color {})", target_player.0, color)
            }
            Move::RevealRank { target_player, rank } => {
                write!(f, "(Reveal player {} rank {})", target_player.0, rank)
            }
        }
    }
}

/// Public consequences of an applied move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    Played {
        card: Card,
        /// The card extended its firework.
        scored: bool,
        /// Completing a firework gave back a hint token.
        hint_regained: bool,
    },
    Discarded {
        card: Card,
        hint_regained: bool,
    },
    Revealed {
        /// Target slots matching the revealed value.
        matched: SlotIndices,
        /// Matched slots that had not been hinted that attribute before.
        newly_revealed: SlotIndices,
    },
}

/// One applied move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryItem {
    /// The player who moved.
    pub player: PlayerId,

    /// The move made.
    pub mv: Move,

    /// What happened.
    pub outcome: MoveOutcome,
}

impl HistoryItem {
    #[must_use]
    pub fn new(player: PlayerId, mv: Move, outcome: MoveOutcome) -> Self {
        Self { player, mv, outcome }
    }

    /// Slot indices matched by a reveal (empty for play/discard).
    #[must_use]
    pub fn matched_slots(&self) -> &[u8] {
        match &self.outcome {
            MoveOutcome::Revealed { matched, .. } => matched.as_slice(),
            _ => &[],
        }
    }

    /// The card played or discarded, if any.
    #[must_use]
    pub fn card(&self) -> Option<Card> {
        match self.outcome {
            MoveOutcome::Played { card, .. } | MoveOutcome::Discarded { card, .. } => Some(card),
            MoveOutcome::Revealed { .. } => None,
        }
    }
}

impl std::fmt::Display for HistoryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} {}", self.player, self.mv)?;
        match &self.outcome {
            MoveOutcome::Played { card, scored, hint_regained } => {
                write!(f, " {}", card)?;
                if *scored {
                    write!(f, " scored")?;
                }
                if *hint_regained {
                    write!(f, " add_hint")?;
                }
            }
            MoveOutcome::Discarded { card, hint_regained } => {
                write!(f, " {}", card)?;
                if *hint_regained {
                    write!(f, " add_hint")?;
                }
            }
            MoveOutcome::Revealed { matched, .. } => {
                write!(f, " slots {:?}", matched.as_slice())?;
            }
        }
        write!(f, ">")
    }
}

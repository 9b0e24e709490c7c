//! Dense move indexing.
//!
//! Every move a player could ever make maps to a uid in `0..max_moves`,
//! relative to the acting player:
//!
//! | range | move |
//! |---|---|
//! | `0..H` | discard slot `i` |
//! | `H..2H` | play slot `i` |
//! | next `(P-1)*C` | reveal color `c` to the player `o` seats away |
//! | next `(P-1)*R` | reveal rank `r` to the player `o` seats away |

use serde::{Deserialize, Serialize};

use crate::cards::{Color, Rank};
use crate::core::{GameConfig, HanabiError, Move, PlayerId, Result};

/// The move-uid space of one configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSpace {
    num_players: usize,
    hand_size: usize,
    num_colors: usize,
    num_ranks: usize,
}

impl MoveSpace {
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            num_players: config.num_players(),
            hand_size: config.hand_size(),
            num_colors: config.num_colors(),
            num_ranks: config.num_ranks(),
        }
    }

    /// Number of distinct uids.
    #[must_use]
    pub fn max_moves(&self) -> usize {
        2 * self.hand_size + (self.num_players - 1) * (self.num_colors + self.num_ranks)
    }

    fn color_base(&self) -> usize {
        2 * self.hand_size
    }

    fn rank_base(&self) -> usize {
        self.color_base() + (self.num_players - 1) * self.num_colors
    }

    /// Uid of `mv` made by `actor`.
    ///
    /// Moves that can never be legal in this configuration (slot past the
    /// hand size, self-targeted reveal, color or rank not in play) have no
    /// uid and fail with `IndexOutOfRange`.
    pub fn uid(&self, mv: &Move, actor: PlayerId) -> Result<usize> {
        let out_of_range = |what, index, len| HanabiError::IndexOutOfRange { what, index, len };
        let target_offset = |target: PlayerId| -> Result<usize> {
            let target = PlayerId::checked(target.index(), self.num_players)?;
            match target.offset_from(actor, self.num_players) {
                0 => Err(out_of_range("target offset", 0, self.num_players)),
                offset => Ok(offset - 1),
            }
        };

        match *mv {
            Move::Discard { card_index } | Move::Play { card_index }
                if card_index >= self.hand_size =>
            {
                Err(out_of_range("card", card_index, self.hand_size))
            }
            Move::Discard { card_index } => Ok(card_index),
            Move::Play { card_index } => Ok(self.hand_size + card_index),
            Move::RevealColor { target_player, color } => {
                if color.index() >= self.num_colors {
                    return Err(out_of_range("color", color.index(), self.num_colors));
                }
                let offset = target_offset(target_player)?;
                Ok(self.color_base() + offset * self.num_colors + color.index())
            }
            Move::RevealRank { target_player, rank } => {
                if rank.value() == 0 || rank.index() >= self.num_ranks {
                    return Err(out_of_range("rank", rank.value() as usize, self.num_ranks));
                }
                let offset = target_offset(target_player)?;
                Ok(self.rank_base() + offset * self.num_ranks + rank.index())
            }
        }
    }

    /// The move with `uid` when `actor` makes it.
    pub fn get_move(&self, uid: usize, actor: PlayerId) -> Result<Move> {
        let max = self.max_moves();
        if uid >= max {
            return Err(HanabiError::IndexOutOfRange { what: "move uid", index: uid, len: max });
        }

        let target = |offset: usize| actor.plus_offset(offset + 1, self.num_players);
        let mv = if uid < self.hand_size {
            Move::Discard { card_index: uid }
        } else if uid < self.color_base() {
            Move::Play { card_index: uid - self.hand_size }
        } else if uid < self.rank_base() {
            let rel = uid - self.color_base();
            Move::RevealColor {
                target_player: target(rel / self.num_colors),
                color: Color::ALL[rel % self.num_colors],
            }
        } else {
            let rel = uid - self.rank_base();
            Move::RevealRank {
                target_player: target(rel / self.num_ranks),
                rank: Rank::from_index(rel % self.num_ranks),
            }
        };
        Ok(mv)
    }

    /// 0/1 mask over uids, 1 where `moves` (made by `actor`) contains the move.
    pub fn mask(&self, moves: &[Move], actor: PlayerId) -> Result<Vec<i32>> {
        let mut mask = vec![0; self.max_moves()];
        for mv in moves {
            mask[self.uid(mv, actor)?] = 1;
        }
        Ok(mask)
    }
}

//! Move legality.
//!
//! `check_move` is the single legality predicate. `apply_move`, the legal
//! move enumeration and observations all go through it.

use crate::cards::{Color, Rank};
use crate::core::{GameState, HanabiError, Move, Phase, PlayerId, Result};

/// Check whether `player` may make `mv` in `state`.
///
/// Returns the reason as `InvalidMove` when not.
pub fn check_move(state: &GameState, player: PlayerId, mv: &Move) -> Result<()> {
    match state.phase() {
        Phase::Dealing => return Err(HanabiError::invalid_move("cards are still being dealt")),
        Phase::GameOver(_) => return Err(HanabiError::invalid_move("the game is over")),
        Phase::PlayerTurn(current) if current != player => {
            return Err(HanabiError::invalid_move(format!(
                "it is {}'s turn, not {}'s",
                current, player
            )))
        }
        Phase::PlayerTurn(_) => {}
    }

    let config = state.config();
    let hand_len = state.hand(player)?.len();

    match *mv {
        Move::Play { card_index } => check_card_index(card_index, hand_len),
        Move::Discard { card_index } => {
            check_card_index(card_index, hand_len)?;
            if state.hint_tokens() >= config.max_hint_tokens() {
                return Err(HanabiError::invalid_move(
                    "cannot discard while hint tokens are at maximum",
                ));
            }
            Ok(())
        }
        Move::RevealColor { target_player, color } => {
            check_reveal_target(state, player, target_player)?;
            if color.index() >= config.num_colors() {
                return Err(HanabiError::invalid_move(format!("color {} not in play", color)));
            }
            if !state.hand(target_player)?.has_color(color) {
                return Err(HanabiError::invalid_move(format!(
                    "{} holds no {} card",
                    target_player, color
                )));
            }
            Ok(())
        }
        Move::RevealRank { target_player, rank } => {
            check_reveal_target(state, player, target_player)?;
            if rank.value() == 0 || rank.index() >= config.num_ranks() {
                return Err(HanabiError::invalid_move(format!("rank {} not in play", rank)));
            }
            if !state.hand(target_player)?.has_rank(rank) {
                return Err(HanabiError::invalid_move(format!(
                    "{} holds no card of rank {}",
                    target_player, rank
                )));
            }
            Ok(())
        }
    }
}

/// Whether `player` may make `mv` in `state`.
#[must_use]
pub fn is_legal(state: &GameState, player: PlayerId, mv: &Move) -> bool {
    check_move(state, player, mv).is_ok()
}

/// Every legal move for `player`.
///
/// Empty unless `player` is the one to move. Ordered: discards, plays,
/// color reveals, rank reveals (reveals by seat distance from `player`).
pub fn legal_moves(state: &GameState, player: PlayerId) -> Result<Vec<Move>> {
    let player_count = state.player_count();
    PlayerId::checked(player.index(), player_count)?;

    if state.current_player() != Some(player) {
        return Ok(Vec::new());
    }

    let config = state.config();
    let hand_len = state.hand(player)?.len();

    let discards = (0..hand_len).map(|card_index| Move::Discard { card_index });
    let plays = (0..hand_len).map(|card_index| Move::Play { card_index });
    let targets = || (1..player_count).map(move |offset| player.plus_offset(offset, player_count));
    let colors = targets().flat_map(|target_player| {
        Color::first(config.num_colors()).map(move |color| Move::RevealColor { target_player, color })
    });
    let ranks = targets().flat_map(|target_player| {
        Rank::first(config.num_ranks()).map(move |rank| Move::RevealRank { target_player, rank })
    });

    Ok(discards
        .chain(plays)
        .chain(colors)
        .chain(ranks)
        .filter(|mv| is_legal(state, player, mv))
        .collect())
}

fn check_card_index(card_index: usize, hand_len: usize) -> Result<()> {
    if card_index < hand_len {
        Ok(())
    } else {
        Err(HanabiError::invalid_move(format!(
            "card index {} outside hand of {}",
            card_index, hand_len
        )))
    }
}

fn check_reveal_target(state: &GameState, player: PlayerId, target: PlayerId) -> Result<()> {
    if state.hint_tokens() == 0 {
        return Err(HanabiError::invalid_move("no hint tokens left"));
    }
    if target.index() >= state.player_count() {
        return Err(HanabiError::invalid_move(format!("no such player {}", target.0)));
    }
    if target == player {
        return Err(HanabiError::invalid_move("cannot hint yourself"));
    }
    Ok(())
}

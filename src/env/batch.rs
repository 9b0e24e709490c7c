//! Many independent games stepped together.
//!
//! Each game gets its own seed, drawn from a stream seeded by the
//! configuration's `random_seed`, so a batch is reproducible as a whole.
//! Games share nothing; steps and encodings run in parallel with rayon.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{EndOfGame, GameConfig, GameRng, GameState, HanabiError, Move, PlayerId, Result};
use crate::encoding::{CommonEncoder, MoveSpace, ObservationEncoder};
use crate::observation::Observation;

/// What happened to one game in a batch step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The move was applied.
    Applied,
    /// The move was rejected; the game is unchanged.
    Rejected(HanabiError),
    /// The game was already over; nothing was applied.
    Finished,
}

impl StepResult {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, StepResult::Applied)
    }
}

/// Encoded observations and legal-move masks for a whole batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBatch {
    /// Concatenated encodings, `games x observation_length`.
    pub observations: Vec<i32>,
    pub observation_shape: [usize; 2],
    /// Concatenated legal-move masks, `games x max_moves`.
    pub legal_moves: Vec<i32>,
    pub legal_moves_shape: [usize; 2],
    pub scores: Vec<u32>,
    pub done: Vec<bool>,
}

/// A batch of games sharing one configuration.
#[derive(Clone, Debug)]
pub struct BatchEnv {
    config: GameConfig,
    encoder: CommonEncoder,
    seeds: GameRng,
    states: Vec<GameState>,
}

impl BatchEnv {
    /// Create `num_games` dealt games.
    pub fn new(config: GameConfig, num_games: usize) -> Result<Self> {
        if num_games == 0 {
            return Err(HanabiError::invalid_config("a batch needs at least one game"));
        }

        let mut seeds = GameRng::new(config.random_seed());
        let states = (0..num_games)
            .map(|_| GameState::new_dealt(config.with_seed(seeds.next_seed())))
            .collect();
        debug!("batch of {} games created", num_games);

        Ok(Self {
            encoder: CommonEncoder::new(&config),
            config,
            seeds,
            states,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn states(&self) -> &[GameState] {
        &self.states
    }

    pub fn state(&self, game: usize) -> Result<&GameState> {
        self.states.get(game).ok_or(HanabiError::IndexOutOfRange {
            what: "game",
            index: game,
            len: self.states.len(),
        })
    }

    #[must_use]
    pub fn move_space(&self) -> &MoveSpace {
        self.encoder.move_space()
    }

    // === Lifecycle ===

    /// Replace every game with a freshly dealt one.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = GameState::new_dealt(self.config.with_seed(self.seeds.next_seed()));
        }
    }

    /// Replace the given games with freshly dealt ones.
    pub fn reset_games(&mut self, games: &[usize]) -> Result<()> {
        let len = self.states.len();
        if let Some(&game) = games.iter().find(|&&game| game >= len) {
            return Err(HanabiError::IndexOutOfRange { what: "game", index: game, len });
        }
        for &game in games {
            self.states[game] = GameState::new_dealt(self.config.with_seed(self.seeds.next_seed()));
        }
        Ok(())
    }

    /// Replace every finished game. Returns how many were replaced.
    pub fn reset_finished(&mut self) -> usize {
        let finished: Vec<usize> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_terminal())
            .map(|(game, _)| game)
            .collect();
        for &game in &finished {
            self.states[game] = GameState::new_dealt(self.config.with_seed(self.seeds.next_seed()));
        }
        finished.len()
    }

    // === Stepping ===

    /// Apply one move per game, each for that game's current player.
    ///
    /// `moves` must have one entry per game. Illegal moves leave their game
    /// unchanged and come back as `Rejected`.
    pub fn step(&mut self, moves: &[Move]) -> Result<Vec<StepResult>> {
        self.check_batch_len(moves.len())?;

        Ok(self
            .states
            .par_iter_mut()
            .zip(moves.par_iter())
            .enumerate()
            .map(|(game, (state, &mv))| apply(game, state, mv))
            .collect())
    }

    /// Like [`step`](Self::step), with moves given as uids relative to each
    /// game's current player.
    pub fn step_uids(&mut self, uids: &[usize]) -> Result<Vec<StepResult>> {
        self.check_batch_len(uids.len())?;
        let space = *self.encoder.move_space();

        Ok(self
            .states
            .par_iter_mut()
            .zip(uids.par_iter())
            .enumerate()
            .map(|(game, (state, &uid))| match state.current_player() {
                None => StepResult::Finished,
                Some(actor) => match space.get_move(uid, actor) {
                    Ok(mv) => apply(game, state, mv),
                    Err(err) => {
                        warn!("game {}: move uid {} rejected: {}", game, uid, err);
                        StepResult::Rejected(err)
                    }
                },
            })
            .collect())
    }

    fn check_batch_len(&self, len: usize) -> Result<()> {
        if len == self.states.len() {
            Ok(())
        } else {
            Err(HanabiError::invalid_move(format!(
                "{} moves for {} games",
                len,
                self.states.len()
            )))
        }
    }

    // === Views ===

    /// Each game seen by the player to move, or, for finished games, by the
    /// player who moved last.
    pub fn observations(&self) -> Result<Vec<Observation>> {
        self.states
            .par_iter()
            .map(|state| state.observe(viewer(state)))
            .collect()
    }

    /// Encoded observations, legal-move masks, scores and statuses.
    pub fn encoded(&self) -> Result<EncodedBatch> {
        let rows = self
            .observations()?
            .par_iter()
            .map(|obs| -> Result<(Vec<i32>, Vec<i32>)> {
                let encoded = self.encoder.encode(obs)?;
                let mask = self.encoder.legal_move_mask(obs)?;
                Ok((encoded.data, mask))
            })
            .collect::<Result<Vec<_>>>()?;

        let games = self.states.len();
        let observation_length = self.encoder.flat_length();
        let max_moves = self.encoder.action_space_size();
        let mut batch = EncodedBatch {
            observations: Vec::with_capacity(games * observation_length),
            observation_shape: [games, observation_length],
            legal_moves: Vec::with_capacity(games * max_moves),
            legal_moves_shape: [games, max_moves],
            scores: self.scores(),
            done: self.states.iter().map(GameState::is_terminal).collect(),
        };
        for (data, mask) in rows {
            batch.observations.extend(data);
            batch.legal_moves.extend(mask);
        }
        Ok(batch)
    }

    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.states.iter().map(GameState::score).collect()
    }

    /// `None` for running games, the end reason for finished ones.
    #[must_use]
    pub fn statuses(&self) -> Vec<Option<EndOfGame>> {
        self.states.iter().map(GameState::end_of_game).collect()
    }
}

fn apply(game: usize, state: &mut GameState, mv: Move) -> StepResult {
    if state.is_terminal() {
        return StepResult::Finished;
    }
    match state.apply_move(mv) {
        Ok(_) => StepResult::Applied,
        Err(err) => {
            warn!("game {}: {} rejected: {}", game, mv, err);
            StepResult::Rejected(err)
        }
    }
}

fn viewer(state: &GameState) -> PlayerId {
    state
        .current_player()
        .or_else(|| state.last_history_item().map(|item| item.player))
        .unwrap_or(PlayerId::new(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfigBuilder;

    fn env(games: usize) -> BatchEnv {
        let config = GameConfigBuilder::new().random_seed(2024).build().unwrap();
        BatchEnv::new(config, games).unwrap()
    }

    #[test]
    fn test_games_are_independently_seeded() {
        let env = env(4);
        assert_eq!(env.len(), 4);
        let seeds: Vec<u64> = env.states().iter().map(|s| s.config().random_seed()).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 4);
        assert!(env.states().iter().all(|s| s.current_player() == Some(PlayerId::new(0))));
    }

    #[test]
    fn test_batches_reproducible() {
        let a = env(3);
        let b = env(3);
        assert_eq!(a.states(), b.states());
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(
            BatchEnv::new(GameConfig::default(), 0),
            Err(HanabiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_step_reports_illegal_moves() {
        let mut env = env(2);
        let before = env.state(1).unwrap().clone();
        // Discarding at full hint tokens is illegal.
        let results = env
            .step(&[Move::Play { card_index: 0 }, Move::Discard { card_index: 0 }])
            .unwrap();

        assert!(results[0].is_applied());
        assert!(matches!(results[1], StepResult::Rejected(HanabiError::InvalidMove(_))));
        assert_eq!(env.state(1).unwrap(), &before);
        assert_eq!(env.state(0).unwrap().history().len(), 1);
    }

    #[test]
    fn test_step_length_mismatch() {
        let mut env = env(2);
        assert!(env.step(&[Move::Play { card_index: 0 }]).is_err());
        assert!(env.step_uids(&[0, 0, 0]).is_err());
    }

    #[test]
    fn test_step_uids() {
        let mut env = env(2);
        // uid 5 is "play slot 0"; uid 0 is "discard slot 0".
        let results = env.step_uids(&[5, 0]).unwrap();
        assert!(results[0].is_applied());
        assert!(!results[1].is_applied());
        assert!(matches!(env.step_uids(&[99, 5]).unwrap()[0], StepResult::Rejected(_)));
    }

    #[test]
    fn test_finished_games_skip_and_reset() {
        let mut env = env(2);
        env.states[0].life_tokens = 1;
        // Keep misplaying in game 0 until it ends.
        while !env.state(0).unwrap().is_terminal() {
            let state = env.state(0).unwrap();
            let player = state.current_player().unwrap();
            let mv = state.legal_moves(player).unwrap()[0];
            env.step(&[mv, Move::Play { card_index: 9 }]).unwrap();
        }

        let results = env.step(&[Move::Play { card_index: 0 }, Move::Play { card_index: 0 }]).unwrap();
        assert_eq!(results[0], StepResult::Finished);
        assert!(env.statuses()[0].is_some());
        assert!(env.statuses()[1].is_none());

        assert_eq!(env.reset_finished(), 1);
        assert!(env.statuses().iter().all(Option::is_none));
        assert!(env.reset_games(&[5]).is_err());
    }

    #[test]
    fn test_encoded_batch() {
        let env = env(3);
        let batch = env.encoded().unwrap();
        let length = CommonEncoder::new(env.config()).flat_length();

        assert_eq!(batch.observation_shape, [3, length]);
        assert_eq!(batch.observations.len(), 3 * length);
        assert_eq!(batch.legal_moves_shape, [3, 20]);
        assert_eq!(batch.legal_moves.len(), 60);
        assert_eq!(batch.scores, vec![0, 0, 0]);
        assert_eq!(batch.done, vec![false, false, false]);
    }

    #[test]
    fn test_reset_changes_games() {
        let mut env = env(2);
        let before = env.states().to_vec();
        env.reset();
        assert_ne!(env.states(), before.as_slice());
    }
}

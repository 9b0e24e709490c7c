//! Versioned binary snapshots.
//!
//! Every snapshot is a bincode envelope:
//!
//! ```text
//! magic "HNBI" | format version | kind | payload (bincode of the value)
//! ```
//!
//! Decoding checks the magic, version and kind, rejects trailing bytes,
//! caps the input size, and runs the value's structural validation before
//! handing it back. Any failure is `HanabiError::Deserialization`; there is
//! no partially decoded result.
//!
//! Bumping `FORMAT_VERSION` is required whenever a persisted type changes
//! shape. Older versions are rejected rather than guessed at.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::{GameConfig, GameState, HanabiError, Result};
use crate::observation::Observation;

/// Leading bytes of every snapshot.
pub const MAGIC: [u8; 4] = *b"HNBI";

/// Current snapshot format.
pub const FORMAT_VERSION: u16 = 1;

/// Upper bound on an encoded snapshot.
pub const MAX_SNAPSHOT_BYTES: u64 = 16 * 1024 * 1024;

/// What a snapshot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    GameState,
    Observation,
    GameConfig,
}

/// A value that can be written as a snapshot.
pub trait Snapshot: Serialize + DeserializeOwned {
    const KIND: SnapshotKind;

    /// Structural checks run on every decoded value.
    fn validate(&self) -> Result<()>;
}

impl Snapshot for GameState {
    const KIND: SnapshotKind = SnapshotKind::GameState;

    fn validate(&self) -> Result<()> {
        GameState::validate(self)
    }
}

impl Snapshot for Observation {
    const KIND: SnapshotKind = SnapshotKind::Observation;

    fn validate(&self) -> Result<()> {
        Observation::validate(self)
    }
}

impl Snapshot for GameConfig {
    const KIND: SnapshotKind = SnapshotKind::GameConfig;

    // Deserialization already goes through the validating builder.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    version: u16,
    kind: SnapshotKind,
    payload: Vec<u8>,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_SNAPSHOT_BYTES)
        .reject_trailing_bytes()
}

/// Encode `value` as a snapshot.
pub fn serialize<T: Snapshot>(value: &T) -> Result<Vec<u8>> {
    let envelope = Envelope {
        magic: MAGIC,
        version: FORMAT_VERSION,
        kind: T::KIND,
        payload: options().serialize(value)?,
    };
    Ok(options().serialize(&envelope)?)
}

/// Decode a snapshot of `T`.
pub fn deserialize<T: Snapshot>(bytes: &[u8]) -> Result<T> {
    let envelope = open(bytes)?;
    if envelope.kind != T::KIND {
        return Err(HanabiError::deserialization(format!(
            "expected a {:?} snapshot, found {:?}",
            T::KIND,
            envelope.kind
        )));
    }

    let value: T = options().deserialize(&envelope.payload)?;
    value.validate()?;
    Ok(value)
}

/// The kind of snapshot in `bytes`, after checking magic and version.
pub fn snapshot_kind(bytes: &[u8]) -> Result<SnapshotKind> {
    open(bytes).map(|envelope| envelope.kind)
}

/// A decoded snapshot of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnySnapshot {
    GameState(Box<GameState>),
    Observation(Box<Observation>),
    GameConfig(GameConfig),
}

/// Decode a snapshot without knowing its kind up front.
pub fn deserialize_any(bytes: &[u8]) -> Result<AnySnapshot> {
    Ok(match snapshot_kind(bytes)? {
        SnapshotKind::GameState => AnySnapshot::GameState(Box::new(deserialize(bytes)?)),
        SnapshotKind::Observation => AnySnapshot::Observation(Box::new(deserialize(bytes)?)),
        SnapshotKind::GameConfig => AnySnapshot::GameConfig(deserialize(bytes)?),
    })
}

fn open(bytes: &[u8]) -> Result<Envelope> {
    if bytes.len() as u64 > MAX_SNAPSHOT_BYTES {
        return Err(HanabiError::deserialization(format!(
            "snapshot of {} bytes exceeds the {} byte limit",
            bytes.len(),
            MAX_SNAPSHOT_BYTES
        )));
    }

    let envelope: Envelope = options().deserialize(bytes)?;
    if envelope.magic != MAGIC {
        return Err(HanabiError::deserialization("not a snapshot (bad magic)"));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(HanabiError::deserialization(format!(
            "unsupported snapshot version {} (expected {})",
            envelope.version, FORMAT_VERSION
        )));
    }
    Ok(envelope)
}

impl GameState {
    /// Encode as a snapshot. See [`serialize`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Decode a snapshot. See [`deserialize`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        deserialize(bytes)
    }
}

impl Observation {
    /// Encode as a snapshot. See [`serialize`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Decode a snapshot. See [`deserialize`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Color, Rank};
    use crate::core::{EndOfGame, GameConfigBuilder, Move, Phase, PlayerId};

    fn mid_game() -> GameState {
        let config = GameConfigBuilder::new().num_players(3).random_seed(8).build().unwrap();
        let mut state = GameState::new_dealt(config);
        for _ in 0..6 {
            let player = state.current_player().unwrap();
            let mv = state.legal_moves(player).unwrap()[0];
            state.apply_move(mv).unwrap();
            if state.is_terminal() {
                break;
            }
        }
        state
    }

    #[test]
    fn test_state_round_trip() {
        let state = mid_game();
        let bytes = serialize(&state).unwrap();
        assert_eq!(&bytes[..4], b"HNBI");
        let back: GameState = deserialize(&bytes).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_dealing_state_round_trip() {
        let mut state = GameState::new(GameConfig::default());
        state.apply_chance_event().unwrap();
        let back = GameState::from_bytes(&state.to_bytes().unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_observation_round_trip() {
        let state = mid_game();
        let obs = state.observe(PlayerId::new(2)).unwrap();
        let back = Observation::from_bytes(&obs.to_bytes().unwrap()).unwrap();
        assert_eq!(back, obs);
    }

    fn red(rank: u8) -> Card {
        Card::new(Color::Red, Rank::new(rank))
    }

    /// The state and every seat's view survive a snapshot unchanged.
    fn assert_round_trips(state: &GameState) {
        let back = GameState::from_bytes(&state.to_bytes().unwrap()).unwrap();
        assert_eq!(&back, state);
        for player in PlayerId::all(state.player_count()) {
            let obs = state.observe(player).unwrap();
            let back = Observation::from_bytes(&obs.to_bytes().unwrap()).unwrap();
            assert_eq!(back, obs);
        }
    }

    #[test]
    fn test_out_of_lives_round_trip() {
        let config = GameConfigBuilder::new().max_life_tokens(1).build().unwrap();
        let mut state = GameState::new(config);
        state.deal_specific(red(2)).unwrap();
        state.deal_all();

        state.apply_move(Move::Play { card_index: 0 }).unwrap();
        assert_eq!(state.phase(), Phase::GameOver(EndOfGame::OutOfLifeTokens));
        assert_eq!(state.life_tokens(), 0);
        assert_round_trips(&state);
    }

    #[test]
    fn test_out_of_cards_round_trip() {
        let config = GameConfigBuilder::new()
            .num_colors(1)
            .num_ranks(3)
            .deck_composition(vec![1, 1, 1])
            .hand_size(1)
            .build()
            .unwrap();
        let mut state = GameState::new(config);
        state.deal_specific(red(1)).unwrap();
        state.deal_specific(red(3)).unwrap();

        state.apply_move(Move::Play { card_index: 0 }).unwrap();
        state
            .apply_move(Move::RevealRank { target_player: PlayerId::new(0), rank: Rank::new(2) })
            .unwrap();
        state.apply_move(Move::Play { card_index: 0 }).unwrap();

        assert_eq!(state.phase(), Phase::GameOver(EndOfGame::OutOfCards));
        assert_eq!(state.deck_size(), 0);
        assert!(state.hand(PlayerId::new(0)).unwrap().is_empty());
        assert_round_trips(&state);
    }

    #[test]
    fn test_completed_fireworks_round_trip() {
        let config = GameConfigBuilder::new()
            .num_colors(1)
            .num_ranks(2)
            .deck_composition(vec![3, 2])
            .hand_size(2)
            .build()
            .unwrap();
        let mut state = GameState::new(config);
        for card in [red(1), red(1), red(2), red(2)] {
            state.deal_specific(card).unwrap();
        }

        state
            .apply_move(Move::RevealRank { target_player: PlayerId::new(1), rank: Rank::new(1) })
            .unwrap();
        state.apply_move(Move::Play { card_index: 0 }).unwrap();
        state.apply_move(Move::Play { card_index: 1 }).unwrap();

        assert_eq!(state.phase(), Phase::GameOver(EndOfGame::CompletedFireworks));
        assert_eq!(state.score(), 2);
        assert_round_trips(&state);
    }

    #[test]
    fn test_no_hint_tokens_round_trip() {
        let mut state = GameState::new_dealt(GameConfig::default());
        for _ in 0..8 {
            let player = state.current_player().unwrap();
            let mv = state.legal_moves(player).unwrap().into_iter().find(Move::is_reveal).unwrap();
            state.apply_move(mv).unwrap();
        }

        assert_eq!(state.hint_tokens(), 0);
        let player = state.current_player().unwrap();
        assert!(!state.legal_moves(player).unwrap().iter().any(Move::is_reveal));
        assert_round_trips(&state);
    }

    #[test]
    fn test_config_round_trip() {
        let config = GameConfigBuilder::new().num_colors(3).random_seed(77).build().unwrap();
        let back: GameConfig = deserialize(&serialize(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let bytes = serialize(&GameConfig::default()).unwrap();
        assert_eq!(snapshot_kind(&bytes).unwrap(), SnapshotKind::GameConfig);
        assert!(matches!(
            deserialize::<GameState>(&bytes),
            Err(HanabiError::Deserialization(_))
        ));
    }

    #[test]
    fn test_bad_magic_and_version() {
        let mut bytes = serialize(&GameConfig::default()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            deserialize::<GameConfig>(&bytes),
            Err(HanabiError::Deserialization(_))
        ));

        let envelope = Envelope {
            magic: MAGIC,
            version: FORMAT_VERSION + 1,
            kind: SnapshotKind::GameConfig,
            payload: options().serialize(&GameConfig::default()).unwrap(),
        };
        let future = options().serialize(&envelope).unwrap();
        assert!(matches!(
            deserialize::<GameConfig>(&future),
            Err(HanabiError::Deserialization(_))
        ));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = serialize(&mid_game()).unwrap();
        for len in [0, 3, 10, bytes.len() / 2, bytes.len() - 1] {
            assert!(deserialize::<GameState>(&bytes[..len]).is_err());
        }

        let mut padded = bytes.clone();
        padded.push(0);
        assert!(deserialize::<GameState>(&padded).is_err());
    }

    #[test]
    fn test_invalid_payload_rejected() {
        let mut state = mid_game();
        state.hint_tokens = 200;
        let bytes = serialize(&state).unwrap();
        assert!(matches!(
            deserialize::<GameState>(&bytes),
            Err(HanabiError::Deserialization(_))
        ));
    }

    #[test]
    fn test_deserialize_any() {
        let state = mid_game();
        let obs = state.observe(PlayerId::new(0)).unwrap();

        match deserialize_any(&serialize(&obs).unwrap()).unwrap() {
            AnySnapshot::Observation(back) => assert_eq!(*back, obs),
            other => panic!("unexpected snapshot {:?}", other),
        }
        match deserialize_any(&serialize(&state).unwrap()).unwrap() {
            AnySnapshot::GameState(back) => assert_eq!(*back, state),
            other => panic!("unexpected snapshot {:?}", other),
        }
    }
}

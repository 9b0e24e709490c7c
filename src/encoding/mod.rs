//! Fixed-size numeric views for learning agents.
//!
//! - **Moves**: `MoveSpace` maps every move to a dense uid relative to the
//!   acting player, and back
//! - **Observations**: `ObservationEncoder` trait and the `CommonEncoder`
//!   implementation
//!
//! ## Usage
//!
//! ```
//! use hanabi_engine::core::{GameConfig, GameState, PlayerId};
//! use hanabi_engine::encoding::{CommonEncoder, ObservationEncoder};
//!
//! let config = GameConfig::default();
//! let state = GameState::new_dealt(config.clone());
//! let encoder = CommonEncoder::new(&config);
//!
//! let obs = state.observe(PlayerId::new(0)).unwrap();
//! let encoded = encoder.encode(&obs).unwrap();
//! assert_eq!(encoded.shape, encoder.output_shape());
//! ```

pub mod encoder;
pub mod moves;

pub use encoder::{CommonEncoder, EncodedObservation, ObservationEncoder};
pub use moves::MoveSpace;

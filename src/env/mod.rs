//! Batched environments for self-play and training loops.

pub mod batch;

pub use batch::{BatchEnv, EncodedBatch, StepResult};

//! Confidence tracking over the live candidate set.
//!
//! This module is composed of:
//! - `state`: the per-game belief store (`BeliefState`, `LiveCandidate`).
//! - `update`: the graded answer model that rescales and prunes confidences.
//! - `config`: tunable multipliers and the elimination threshold.
//! - `telemetry`: informational metrics derived from a belief snapshot.

mod config;
mod state;
mod update;
pub mod telemetry;

pub use config::{AnswerWeights, BeliefConfig, Multiplier};
pub use state::{BeliefState, LiveCandidate};
pub use update::{AnswerModel, UpdateOutcome};

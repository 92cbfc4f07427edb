//! Deterministic self-play harness for the question selector.
//!
//! Simulated players think of every roster candidate in turn and answer the
//! genie's questions according to their profile; each game becomes one JSONL
//! row and the per-player results are summarised in Markdown.

pub mod analytics;
pub mod config;
pub mod logging;
pub mod player;
pub mod runner;

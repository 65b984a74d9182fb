//! Core engine types: RNG and configuration.
//!
//! These are the pieces the host provides or tunes; everything else in the
//! crate is built on top of them.

pub mod config;
pub mod rng;

pub use config::{EngineConfig, UnknownConditionPolicy};
pub use rng::{GameRng, GameRngState};

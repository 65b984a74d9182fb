//! # rust-tcg-effects
//!
//! Turns Japanese Pokémon card text into structured effects and executes
//! them against an immutable game state.
//!
//! ## Design Principles
//!
//! 1. **Effects Are Data**: The parser produces `Effect` values once per
//!    card text. They serialize to JSON and carry no behavior.
//!
//! 2. **Ordered Matching**: Clauses are matched against an ordered list of
//!    rule parsers and the first match wins. Registration order is part of
//!    the contract.
//!
//! 3. **Single Perspective**: The state is seen from one player's side. The
//!    opponent's hand, deck and prizes are counts plus revealed cards.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: `GameState` snapshots clone in O(1) via
//!   `im`, so every handler returns a new state and old ones stay valid.
//!
//! - **Suspendable Execution**: Handlers are async. The only suspension
//!   points are player choices requested through the `ExecutionContext`.
//!
//! - **Deterministic Randomness**: Coin flips, random picks and shuffles
//!   come from a seeded ChaCha RNG and replay exactly.
//!
//! ## Modules
//!
//! - `core`: RNG and engine configuration
//! - `state`: Cards, Pokémon, boards and tracked effects
//! - `effects`: Effect, target, condition and modifier data model
//! - `parser`: Text normalization, clause segmentation and rule parsers
//! - `engine`: Target resolution, conditions, handlers and the executor

pub mod core;
pub mod effects;
pub mod engine;
pub mod parser;
pub mod state;

// Re-export commonly used types
pub use crate::core::{EngineConfig, GameRng, GameRngState, UnknownConditionPolicy};

pub use crate::state::{
    CardInstance, CardKind, DeckInfo, GameState, Hand, PlayerBoard, PokemonState, PrizeInfo,
    Side, Slot, StatusCondition, StatusKind, TrackedEffect, TrackedKind,
};

pub use crate::effects::{
    Comparison, Condition, ConditionKind, Effect, EffectKind, EffectType, Filter, Location,
    LocationType, Modifier, ModifierKind, ModifierScope, PlayerScope, SelectionMode, Target,
    TargetCount, TargetKind, Timing,
};

pub use crate::parser::{parse_effect_text, EffectParser, ParseReport, ParserRegistry, RuleParser};

pub use crate::engine::{
    execute_effect, execute_effects, AutoChooser, ChoiceCallback, ChoiceKind, ChoiceRequest,
    EffectExecutor, ExecutionContext, ExecutionResult, Message, MessageKind, ScriptedChooser,
};

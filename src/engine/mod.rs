//! Effect interpreter.
//!
//! ## Architecture
//!
//! - `context`: host RNG, configuration and choice callbacks
//! - `resolver`: abstract targets to concrete Pokémon and cards
//! - `condition`: guard evaluation with success/failure continuations
//! - `handlers`: one async handler per effect type
//! - `executor`: registry, condition routing and sequential execution
//! - `message`: the human-readable log
//!
//! Every handler takes a `GameState` by value and returns the next one.
//! Snapshots are persistent (`im`), so callers keep old states for free.
//! Handlers suspend only while awaiting a player choice.

pub mod condition;
pub mod context;
pub mod executor;
pub mod handlers;
pub mod message;
pub mod resolver;

pub use condition::{evaluate_condition, evaluate_conditions, ConditionOutcome};
pub use context::{
    sanitize_selection, AutoChooser, ChoiceCallback, ChoiceKind, ChoiceRequest, ExecutionContext,
    ScriptedChooser, Selection,
};
pub use executor::{execute_effect, execute_effects, EffectExecutor, ExecutionResult};
pub use handlers::{standard_handlers, Handler, HandlerOutcome};
pub use message::{Message, MessageKind};
pub use resolver::{
    resolve_target, ResolvedCard, ResolvedPokemon, ResolvedTarget, TargetResolver,
};

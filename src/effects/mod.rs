//! Effect data model shared by the parser and the engine.
//!
//! - `Effect`: a tagged union over `EffectType` with common fields
//! - `Target`: who and where an effect applies, resolved at execution time
//! - `Condition`: a guard with optional success/failure continuations
//! - `Modifier` / `Timing`: adjustments and durations
//!
//! ## Design Philosophy
//!
//! Effects are pure data. The parser produces them once from static card
//! text and they can be cached per card; all behavior lives in the engine.

mod condition;
mod effect;
mod modifier;
mod target;

pub use condition::{Comparison, Condition, ConditionKind};
pub use effect::{
    AbilityUsage, CounterAction, DamageScaling, DeckAction, DeckPlacement, Effect, EffectKind,
    EffectType, EnergyAction, HealUnit, ModifyOperation, PreventionKind, PrizeAction,
    RestrictionKind, RetreatChange, SearchDestination, SelectionMode, SpecialPlayKind,
    TrainerKind,
};
pub use modifier::{Modifier, ModifierKind, ModifierScope, Timing};
pub use target::{
    Filter, Location, LocationType, PlayerScope, Stage, Target, TargetCount, TargetKind,
};

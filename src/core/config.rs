//! Engine configuration.
//!
//! Hosts configure the interpreter once and hand the config to the
//! `ExecutionContext`. Everything has a sensible default so harnesses can
//! use `EngineConfig::default()` directly.

use serde::{Deserialize, Serialize};

/// What the condition evaluator does with a condition kind it does not know.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownConditionPolicy {
    /// Treat the condition as satisfied (forward compatible).
    #[default]
    Pass,
    /// Treat the condition as failed.
    Fail,
}

impl UnknownConditionPolicy {
    /// Outcome to report for an unrecognized condition.
    #[must_use]
    pub const fn passes(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Interpreter configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Policy for condition kinds the evaluator does not implement.
    pub unknown_condition: UnknownConditionPolicy,

    /// Max HP given to a Pokémon put onto the bench from a card that
    /// carries no printed HP.
    pub fallback_max_hp: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown_condition: UnknownConditionPolicy::Pass,
            fallback_max_hp: 60,
        }
    }
}

impl EngineConfig {
    /// Set the unknown condition policy (builder pattern).
    #[must_use]
    pub fn with_unknown_condition(mut self, policy: UnknownConditionPolicy) -> Self {
        self.unknown_condition = policy;
        self
    }

    /// Set the fallback max HP (builder pattern).
    #[must_use]
    pub fn with_fallback_max_hp(mut self, hp: u32) -> Self {
        self.fallback_max_hp = hp;
        self
    }
}

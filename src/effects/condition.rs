//! Conditions: guards with optional success/failure continuations.
//!
//! A condition is control flow, not only a guard. When it passes or fails
//! it may substitute a nested effect sequence (`on_success`/`on_failure`)
//! for the normal execution of the effect it is attached to.

use serde::{Deserialize, Serialize};

use super::effect::Effect;
use super::target::Target;
use crate::state::StatusKind;

/// Condition kinds the evaluator understands, plus an open-ended fallback.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    CoinFlip,
    CardCount,
    PrizeCount,
    BenchCount,
    TurnCount,
    HpRemaining,
    HasEnergy,
    HasDamage,
    Status,
    IsEx,
    IsGx,
    IsV,
    IsBasic,
    NameContains,
    /// Any kind the evaluator does not implement.
    #[serde(untagged)]
    Other(String),
}

/// Integer comparison operators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    /// "Has at least": the default when a comparison is omitted.
    #[default]
    GreaterThanOrEqual,
}

impl Comparison {
    /// Apply the comparison `observed <op> expected`.
    #[must_use]
    pub fn compare(self, observed: i64, expected: i64) -> bool {
        match self {
            Self::Equal => observed == expected,
            Self::NotEqual => observed != expected,
            Self::LessThan => observed < expected,
            Self::GreaterThan => observed > expected,
            Self::LessThanOrEqual => observed <= expected,
            Self::GreaterThanOrEqual => observed >= expected,
        }
    }

    /// Operator symbol for messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

/// A condition attached to an effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    /// Primary operand: coin count for coin flips, threshold for counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Secondary operands: required heads for coin flips.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<Effect>,
    /// Substring for `name-contains`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Specific status for `status` checks; any status when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusKind>,
}

impl Condition {
    /// A bare condition of the given kind.
    #[must_use]
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            value: None,
            values: Vec::new(),
            comparison: None,
            target: None,
            on_success: Vec::new(),
            on_failure: Vec::new(),
            text: None,
            status: None,
        }
    }

    /// Flip `coins` coins, pass on at least `heads` heads.
    #[must_use]
    pub fn coin_flip(coins: u32, heads: u32) -> Self {
        let mut condition = Self::new(ConditionKind::CoinFlip);
        condition.value = Some(i64::from(coins));
        condition.values = vec![i64::from(heads)];
        condition
    }

    /// Flip one coin, pass on tails.
    #[must_use]
    pub fn coin_flip_tails() -> Self {
        Self::coin_flip(1, 0).with_comparison(Comparison::Equal)
    }

    /// Set the threshold (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the comparison (builder pattern).
    #[must_use]
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Set the target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the success continuation (builder pattern).
    #[must_use]
    pub fn on_success(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.on_success = effects.into_iter().collect();
        self
    }

    /// Set the failure continuation (builder pattern).
    #[must_use]
    pub fn on_failure(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.on_failure = effects.into_iter().collect();
        self
    }

    /// Set the substring (builder pattern).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the status kind (builder pattern).
    #[must_use]
    pub fn with_status(mut self, status: StatusKind) -> Self {
        self.status = Some(status);
        self
    }

    /// Comparison in effect, defaulting to ">=".
    #[must_use]
    pub fn comparison_or_default(&self) -> Comparison {
        self.comparison.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comparison_is_at_least() {
        let condition = Condition::new(ConditionKind::BenchCount).with_value(2);
        assert_eq!(condition.comparison_or_default(), Comparison::GreaterThanOrEqual);
        assert!(Comparison::GreaterThanOrEqual.compare(2, 2));
        assert!(!Comparison::GreaterThanOrEqual.compare(1, 2));
    }

    #[test]
    fn test_comparisons() {
        assert!(Comparison::Equal.compare(3, 3));
        assert!(Comparison::NotEqual.compare(3, 4));
        assert!(Comparison::LessThan.compare(1, 2));
        assert!(Comparison::GreaterThan.compare(3, 2));
        assert!(Comparison::LessThanOrEqual.compare(2, 2));
    }

    #[test]
    fn test_unknown_kind_round_trips() {
        let json = r#"{"type":"weather-is-sunny"}"#;
        let condition: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(condition.kind, ConditionKind::Other("weather-is-sunny".into()));

        let known: Condition = serde_json::from_str(r#"{"type":"coin-flip","value":2}"#).unwrap();
        assert_eq!(known.kind, ConditionKind::CoinFlip);
        assert_eq!(known.value, Some(2));
    }
}

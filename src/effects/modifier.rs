//! Modifiers and timing attached to effects.

use serde::{Deserialize, Serialize};

/// How a modifier acts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierKind {
    /// Skip a calculation step.
    Ignore,
    Add,
    Subtract,
    Multiply,
}

/// What a modifier acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierScope {
    /// Weakness, resistance and other effects on the target.
    Effects,
    Weakness,
    Resistance,
    Damage,
    RetreatCost,
}

/// A modifier, usually merged in from a bracketed annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what: Option<ModifierScope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl Modifier {
    /// `ignore` modifier for a scope.
    #[must_use]
    pub const fn ignore(what: ModifierScope) -> Self {
        Self {
            kind: ModifierKind::Ignore,
            what: Some(what),
            value: None,
        }
    }
}

/// When an effect applies, or how long a tracked effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timing {
    /// Right now, once.
    Immediate,
    /// Until the end of the current turn.
    ThisTurn,
    /// During the opponent's next turn.
    OpponentNextTurn,
    /// During the player's own next turn.
    OwnNextTurn,
    /// While the source stays in play.
    WhileInPlay,
    /// Once during each of the player's turns.
    OncePerTurn,
}

impl Timing {
    /// Phrase for messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Immediate => "now",
            Self::ThisTurn => "this turn",
            Self::OpponentNextTurn => "during the opponent's next turn",
            Self::OwnNextTurn => "during your next turn",
            Self::WhileInPlay => "while in play",
            Self::OncePerTurn => "once per turn",
        }
    }
}

//! Human-readable event log entries.

use serde::{Deserialize, Serialize};

use crate::state::Side;

/// Category of a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Damage,
    Knockout,
    Heal,
    Status,
    Draw,
    Discard,
    Search,
    Place,
    Switch,
    Energy,
    Counter,
    Prize,
    Deck,
    Hand,
    Coin,
    Condition,
    Ability,
    Restriction,
    Retreat,
    TrainerBlock,
    Prevention,
    Devolution,
    Copy,
    SpecialPlay,
    /// Resolution misses, clamped counts, unknown types.
    Info,
}

/// One log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// An informational entry.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Info, text)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Sentence subject for a side: "You" / "Opponent".
#[must_use]
pub(crate) const fn subject(side: Side) -> &'static str {
    match side {
        Side::Player => "You",
        Side::Opponent => "Opponent",
    }
}

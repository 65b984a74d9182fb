//! Lasting effects recorded in game state.
//!
//! Passive effects (preventions, restrictions, trainer blocks, ...) do not
//! change the board when they resolve. They are recorded here so that the
//! action-legality layer of the host can consult them later.

use serde::{Deserialize, Serialize};

use super::board::Side;
use crate::effects::{
    PreventionKind, RestrictionKind, RetreatChange, SpecialPlayKind, Timing, TrainerKind,
};

/// What a tracked effect does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TrackedKind {
    Prevention {
        prevention: PreventionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<u32>,
    },
    RetreatModifier {
        change: RetreatChange,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<u32>,
    },
    TrainerBlock {
        blocked: Vec<TrainerKind>,
    },
    Restriction {
        restriction: RestrictionKind,
    },
    /// A once-per-turn ability has been used.
    AbilityUsed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    ExtraPrize {
        amount: u32,
    },
    SpecialPlay {
        play: SpecialPlayKind,
    },
}

/// A lasting effect applying to one side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEffect {
    /// The side the effect applies to.
    pub side: Side,
    pub kind: TrackedKind,
    pub duration: Timing,
    /// Name of the card or Pokémon that created the effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TrackedEffect {
    /// Create a tracked effect with no source.
    #[must_use]
    pub fn new(side: Side, kind: TrackedKind, duration: Timing) -> Self {
        Self {
            side,
            kind,
            duration,
            source: None,
        }
    }

    /// Set the source name (builder pattern).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

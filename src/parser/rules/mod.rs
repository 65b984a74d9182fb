//! The standard rule parsers.
//!
//! Each parser owns the patterns it matches with; they are compiled once
//! when the parser is built. Matching is substring and regex based over
//! normalized clause text.

mod cards;
mod condition;
mod damage;
mod field;
mod passive;
mod status;

pub use cards::{
    BenchPlacementParser, DeckManipulationParser, DiscardParser, DrawParser, HandToDeckParser,
    SearchParser,
};
pub use condition::ConditionCheckParser;
pub use damage::{BenchDamageParser, CountMultiplierDamageParser, DamageModifierParser, DamageParser};
pub use field::{CounterParser, DevolutionParser, EnergyParser, HealParser, SwitchParser};
pub use passive::{
    AbilityParser, CopyParser, MoveRestrictionParser, PreventionParser, PrizeParser,
    RetreatModifierParser, SpecialPlayParser, TrainerBlockParser,
};
pub use status::StatusParser;

use regex_lite::Regex;

use super::text::{capture_u32, pokemon_scope};
use crate::effects::{Condition, Effect, LocationType, PlayerScope, Target, Timing};

/// Words marking a conditional clause.
pub(crate) const CONDITIONAL_MARKERS: [&str; 4] = ["なら", "場合", "とき、", "たび、"];

/// A Pokémon target described by a clause.
///
/// "このポケモン" and "バトルポケモン" name the active spot, "ベンチポケモン"
/// the bench, and any other "ポケモン" the whole field. "全員" selects all,
/// "N匹" selects N.
pub(crate) fn pokemon_target(clause: &str, count: &Regex) -> Target {
    let player = pokemon_scope(clause);
    let location = if clause.contains("このポケモン") || clause.contains("バトルポケモン") {
        LocationType::Active
    } else if clause.contains("ベンチポケモン") {
        LocationType::Bench
    } else if clause.contains("ポケモン") {
        LocationType::Field
    } else {
        LocationType::Active
    };

    let target = Target::pokemon(player, location);
    if clause.contains("全員") || clause.contains("すべてのポケモン") {
        target.with_all()
    } else if let Some(n) = capture_u32(count, clause) {
        target.with_count(n)
    } else if location == LocationType::Active {
        target
    } else {
        target.with_count(1)
    }
}

/// The duration phrase of a clause.
pub(crate) fn timing(clause: &str) -> Option<Timing> {
    if clause.contains("次の相手の番") {
        Some(Timing::OpponentNextTurn)
    } else if clause.contains("次の自分の番") {
        Some(Timing::OwnNextTurn)
    } else if clause.contains("いるかぎり") {
        Some(Timing::WhileInPlay)
    } else if clause.contains("番に1回") {
        Some(Timing::OncePerTurn)
    } else if clause.contains("この番") {
        Some(Timing::ThisTurn)
    } else {
        None
    }
}

/// Default duration of a lasting effect on a side: the opponent's next
/// turn for the opponent, the current turn for the player.
pub(crate) fn lasting_timing(clause: &str, player: PlayerScope) -> Timing {
    timing(clause).unwrap_or(match player {
        PlayerScope::Opponent => Timing::OpponentNextTurn,
        PlayerScope::SelfSide | PlayerScope::Both => Timing::ThisTurn,
    })
}

/// Attach a condition to parsed effects.
///
/// A single effect carries the condition itself. Several effects are
/// gated as a unit: the first carries the condition and the whole
/// sequence becomes its success continuation, so a coin is flipped once.
pub(crate) fn attach_condition(mut effects: Vec<Effect>, condition: Condition) -> Vec<Effect> {
    match effects.len() {
        0 => effects,
        1 => {
            effects[0].conditions.push(condition);
            effects
        }
        _ => {
            let carrier = effects[0].clone();
            vec![carrier.with_condition(condition.on_success(effects))]
        }
    }
}

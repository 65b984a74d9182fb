//! Conditional clauses: "<condition>なら、<effect>".
//!
//! The condition half is matched against a fixed set of checks. The body is
//! split on its sequential connectives, each clause is parsed with the
//! registry, and the condition gates everything they yield at once.

use regex_lite::Regex;

use super::{attach_condition, CONDITIONAL_MARKERS};
use crate::effects::{Comparison, Condition, ConditionKind, Effect, LocationType, Target};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::segmenter::Segmenter;
use crate::parser::text::{comparison_suffix, compile, has_any, pokemon_scope, quoted, scope, statuses};

/// Connectives that end the condition half.
const SPLITTERS: [&str; 6] = ["なら、", "場合、", "とき、", "たび、", "なら", "場合は"];

/// Recognizes conditions and gates the body clause on them.
pub struct ConditionCheckParser {
    coins: Regex,
    bench: Regex,
    prizes: Regex,
    hand: Regex,
    hp: Regex,
    energy: Regex,
    segmenter: Segmenter,
}

impl ConditionCheckParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            coins: compile(r"コインを(\d+)回投げ"),
            bench: compile(r"ベンチポケモンが(\d+)匹"),
            prizes: compile(r"サイドの残り枚数が(\d+)枚"),
            hand: compile(r"手札が(\d+)枚"),
            hp: compile(r"HPが(\d+)"),
            energy: compile(r"エネルギーが(\d+)個"),
            segmenter: Segmenter::new(),
        }
    }

    /// Split a clause at its earliest connective into the condition half
    /// and the body. At equal positions the longer connective wins.
    fn split(clause: &str) -> Option<(&str, &str)> {
        let (at, marker) = SPLITTERS
            .iter()
            .filter_map(|marker| clause.find(marker).map(|at| (at, *marker)))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())))?;
        Some((&clause[..at], clause[at + marker.len()..].trim_start_matches('、')))
    }

    /// A counted check "<regex>(N)<unit><suffix>".
    fn counted(regex: &Regex, text: &str, kind: ConditionKind, unit: &str) -> Option<Condition> {
        let caps = regex.captures(text)?;
        let whole = caps.get(0)?;
        let value: i64 = caps.get(1)?.as_str().parse().ok()?;
        let rest = text[whole.end()..].trim_start_matches(unit);

        let mut condition = Condition::new(kind).with_value(value);
        if let Some(comparison) = comparison_suffix(rest) {
            condition = condition.with_comparison(comparison);
        }
        Some(condition)
    }

    /// Active Pokémon a presence check looks at.
    fn subject(text: &str) -> Target {
        Target::pokemon(pokemon_scope(text), LocationType::Active)
    }

    /// The condition named by the condition half, if recognized.
    fn condition(&self, head: &str) -> Option<Condition> {
        if let Some(caps) = self.coins.captures(head) {
            let coins: u32 = caps[1].parse().ok()?;
            return Some(if head.contains("ウラなら") || head.ends_with("ウラ") {
                Condition::coin_flip_tails()
            } else if head.contains("すべてオモテ") {
                Condition::coin_flip(coins, coins)
            } else {
                Condition::coin_flip(coins, 1)
            });
        }

        if head.contains("ベンチポケモンがいない") {
            return Some(
                Condition::new(ConditionKind::BenchCount)
                    .with_value(0)
                    .with_comparison(Comparison::Equal)
                    .with_target(Target::pokemon(scope(head), LocationType::Bench)),
            );
        }
        if let Some(condition) = Self::counted(&self.bench, head, ConditionKind::BenchCount, "匹") {
            return Some(condition.with_target(Target::pokemon(scope(head), LocationType::Bench)));
        }
        if let Some(condition) = Self::counted(&self.prizes, head, ConditionKind::PrizeCount, "枚") {
            return Some(condition.with_target(Target::cards(scope(head), LocationType::Prize)));
        }
        if let Some(condition) = Self::counted(&self.hand, head, ConditionKind::CardCount, "枚") {
            return Some(condition.with_target(Target::cards(scope(head), LocationType::Hand)));
        }
        if let Some(condition) = Self::counted(&self.hp, head, ConditionKind::HpRemaining, "") {
            return Some(condition.with_target(Self::subject(head)));
        }

        if head.contains("ダメカンがのっていない") {
            return Some(
                Condition::new(ConditionKind::HasDamage)
                    .with_value(0)
                    .with_comparison(Comparison::Equal)
                    .with_target(Self::subject(head)),
            );
        }
        if head.contains("ダメカンがのっている") {
            return Some(Condition::new(ConditionKind::HasDamage).with_target(Self::subject(head)));
        }
        if let Some(condition) = Self::counted(&self.energy, head, ConditionKind::HasEnergy, "") {
            return Some(condition.with_target(Self::subject(head)));
        }
        if head.contains("エネルギーがついていない") {
            return Some(
                Condition::new(ConditionKind::HasEnergy)
                    .with_value(0)
                    .with_comparison(Comparison::Equal)
                    .with_target(Self::subject(head)),
            );
        }
        if head.contains("エネルギーがついている") {
            return Some(Condition::new(ConditionKind::HasEnergy).with_target(Self::subject(head)));
        }

        if head.contains("特殊状態") {
            return Some(Condition::new(ConditionKind::Status).with_target(Self::subject(head)));
        }
        if let Some(status) = statuses(head).first() {
            return Some(
                Condition::new(ConditionKind::Status)
                    .with_status(*status)
                    .with_target(Self::subject(head)),
            );
        }

        if head.contains("最初の番") {
            return Some(
                Condition::new(ConditionKind::TurnCount)
                    .with_value(1)
                    .with_comparison(Comparison::Equal),
            );
        }

        let kind = if head.contains("ex") {
            Some(ConditionKind::IsEx)
        } else if head.contains("GX") {
            Some(ConditionKind::IsGx)
        } else if head.contains("ポケモンV") {
            Some(ConditionKind::IsV)
        } else if head.contains("たねポケモン") {
            Some(ConditionKind::IsBasic)
        } else {
            None
        };
        if let Some(kind) = kind {
            return Some(Condition::new(kind).with_target(Self::subject(head)));
        }

        if let Some(name) = quoted(head) {
            if head.contains("がいる") {
                return Some(
                    Condition::new(ConditionKind::NameContains)
                        .with_text(name)
                        .with_target(Target::pokemon(scope(head), LocationType::Field)),
                );
            }
        }

        None
    }
}

impl Default for ConditionCheckParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for ConditionCheckParser {
    fn name(&self) -> &'static str {
        "condition-check"
    }

    fn can_parse(&self, clause: &str) -> bool {
        if !has_any(clause, &CONDITIONAL_MARKERS) {
            return false;
        }
        Self::split(clause).is_some_and(|(head, _)| self.condition(head).is_some())
    }

    fn parse(&self, clause: &str, registry: &ParserRegistry) -> Vec<Effect> {
        let Some((head, body)) = Self::split(clause) else {
            return Vec::new();
        };
        let Some(condition) = self.condition(head) else {
            return Vec::new();
        };
        if body.is_empty() {
            return Vec::new();
        }

        let effects: Vec<Effect> = self
            .segmenter
            .clauses(body)
            .iter()
            .flat_map(|clause| registry.parse(clause).effects)
            .collect();
        attach_condition(effects, condition)
    }
}

//! Damage matchers: bench damage, count-scaled damage, damage bonuses and
//! the generic "N damage" fallback.

use regex_lite::Regex;

use super::{pokemon_target, timing};
use crate::effects::{DamageScaling, Effect, EffectKind, LocationType, ModifyOperation, Target};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::text::{capture_u32, compile, scope};

/// Damage received, as opposed to dealt, is handled by prevention.
fn is_received(clause: &str) -> bool {
    clause.contains("受け")
}

/// The count a "×N" value is multiplied by.
fn scaling(clause: &str, coins: &Regex) -> Option<DamageScaling> {
    let head = clause.split('×').next().unwrap_or(clause);
    if head.contains("オモテの数") {
        let coins = capture_u32(coins, head).unwrap_or(1);
        Some(DamageScaling::CoinHeads { coins })
    } else if head.contains("ベンチポケモンの数") {
        Some(DamageScaling::BenchPokemon { player: scope(head) })
    } else if head.contains("エネルギーの数") {
        Some(DamageScaling::AttachedEnergy { player: scope(head) })
    } else if head.contains("ダメカンの数") {
        Some(DamageScaling::DamageCounters { player: scope(head) })
    } else if head.contains("手札の枚数") || head.contains("手札の数") {
        Some(DamageScaling::HandSize { player: scope(head) })
    } else {
        None
    }
}

// === Generic damage ===

/// "N damage" to a Pokémon named in the clause.
pub struct DamageParser {
    value: Regex,
    count: Regex,
}

impl DamageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: compile(r"(\d+)ダメージ"),
            count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for DamageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DamageParser {
    fn name(&self) -> &'static str {
        "damage"
    }

    fn can_parse(&self, clause: &str) -> bool {
        self.value.is_match(clause) && !is_received(clause)
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let Some(value) = capture_u32(&self.value, clause) else {
            return Vec::new();
        };
        vec![Effect::damage(value, pokemon_target(clause, &self.count))]
    }
}

// === Bench damage ===

/// Damage to bench Pokémon: "相手のベンチポケモン1匹にも、30ダメージ",
/// "ベンチポケモン全員にも、それぞれ10ダメージ".
pub struct BenchDamageParser {
    value: Regex,
    count: Regex,
}

impl BenchDamageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: compile(r"(\d+)ダメージ"),
            count: compile(r"ベンチポケモン(\d+)匹"),
        }
    }
}

impl Default for BenchDamageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for BenchDamageParser {
    fn name(&self) -> &'static str {
        "bench-damage"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("ベンチポケモン") && self.value.is_match(clause) && !is_received(clause)
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let Some(value) = capture_u32(&self.value, clause) else {
            return Vec::new();
        };

        let target = Target::pokemon(scope(clause), LocationType::Bench);
        let target = if clause.contains("全員") {
            target.with_all()
        } else {
            target.with_count(capture_u32(&self.count, clause).unwrap_or(1))
        };
        vec![Effect::damage(value, target)]
    }
}

// === Count-scaled damage ===

/// "<count>×N damage": the attack's damage scales with something counted
/// at execution time.
pub struct CountMultiplierDamageParser {
    multiplier: Regex,
    coins: Regex,
}

impl CountMultiplierDamageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            multiplier: compile(r"×(\d+)"),
            coins: compile(r"コインを(\d+)回"),
        }
    }
}

impl Default for CountMultiplierDamageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for CountMultiplierDamageParser {
    fn name(&self) -> &'static str {
        "count-multiplier-damage"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains('×') && clause.contains("ダメージ") && !is_received(clause)
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let (Some(multiplier), Some(scaling)) = (
            capture_u32(&self.multiplier, clause),
            scaling(clause, &self.coins),
        ) else {
            return Vec::new();
        };

        vec![
            Effect::new(EffectKind::Damage {
                scaling: Some(scaling),
            })
            .with_value(multiplier)
            .with_target(Target::opponent_active()),
        ]
    }
}

// === Damage modifier ===

/// Bonuses to the attack's own damage: "30ダメージ追加",
/// "ダメカンの数×10ダメージ追加", "与えるダメージは「+30」される".
pub struct DamageModifierParser {
    bonus: Regex,
    signed: Regex,
    multiplier: Regex,
    coins: Regex,
}

impl DamageModifierParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bonus: compile(r"(\d+)ダメージ追加"),
            signed: compile(r"([+-])(\d+)"),
            multiplier: compile(r"×(\d+)"),
            coins: compile(r"コインを(\d+)回"),
        }
    }
}

impl Default for DamageModifierParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DamageModifierParser {
    fn name(&self) -> &'static str {
        "damage-modifier"
    }

    fn can_parse(&self, clause: &str) -> bool {
        if is_received(clause) {
            return false;
        }
        clause.contains("ダメージ追加")
            || (clause.contains("与えるダメージ") && self.signed.is_match(clause))
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let mut operation = ModifyOperation::Add;
        let mut scaled = None;

        let value = if clause.contains('×') {
            scaled = scaling(clause, &self.coins);
            capture_u32(&self.multiplier, clause)
        } else if let Some(value) = capture_u32(&self.bonus, clause) {
            Some(value)
        } else {
            self.signed.captures(clause).and_then(|caps| {
                if &caps[1] == "-" {
                    operation = ModifyOperation::Subtract;
                }
                caps[2].parse().ok()
            })
        };

        let Some(value) = value else {
            return Vec::new();
        };

        let mut effect = Effect::new(EffectKind::DamageModifier {
            operation,
            scaling: scaled,
        })
        .with_value(value)
        .with_target(Target::opponent_active());
        if let Some(timing) = timing(clause) {
            effect = effect.with_timing(timing);
        }
        vec![effect]
    }
}

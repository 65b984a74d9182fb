//! Matchers acting on Pokémon in play: switch, energy, damage counters,
//! heal and devolution.

use regex_lite::Regex;

use super::pokemon_target;
use crate::effects::{
    CounterAction, Effect, EffectKind, EnergyAction, HealUnit, Location, LocationType,
    PlayerScope, SelectionMode, Target,
};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::text::{capture_u32, compile, energy_type, has_any, pokemon_scope};
use crate::state::Side;

// === Switch ===

/// "このポケモンをベンチポケモンと入れ替える",
/// "相手のバトルポケモンを相手のベンチポケモンと入れ替える".
pub struct SwitchParser;

impl SwitchParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SwitchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for SwitchParser {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("入れ替え") && clause.contains("ベンチ")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let player = if clause.contains("相手のバトルポケモン") {
            PlayerScope::Opponent
        } else {
            PlayerScope::SelfSide
        };
        let chooser = if clause.contains("相手が選ぶ") {
            Side::Opponent
        } else {
            Side::Player
        };
        vec![Effect::new(EffectKind::Switch { chooser })
            .with_target(Target::pokemon(player, LocationType::Active))]
    }
}

// === Energy ===

/// Attaching, discarding and moving energy.
pub struct EnergyParser {
    count: Regex,
    mon_count: Regex,
}

impl EnergyParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: compile(r"エネルギーを(\d+)(?:個|枚)"),
            mon_count: compile(r"(\d+)匹"),
        }
    }

    /// Who receives attached energy.
    fn recipient(&self, text: &str) -> Target {
        let target = if text.contains("ベンチポケモン") {
            Target::pokemon(PlayerScope::SelfSide, LocationType::Bench)
        } else if text.contains("このポケモン") || text.contains("バトルポケモン") {
            return Target::self_active();
        } else {
            Target::pokemon(PlayerScope::SelfSide, LocationType::Field)
        };
        if text.contains("全員") {
            target.with_all()
        } else {
            target.with_count(capture_u32(&self.mon_count, text).unwrap_or(1))
        }
    }
}

impl Default for EnergyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for EnergyParser {
    fn name(&self) -> &'static str {
        "energy"
    }

    fn can_parse(&self, clause: &str) -> bool {
        if !clause.contains("エネルギー") || clause.contains("にげる") {
            return false;
        }
        clause.contains("つける")
            || clause.contains("つけかえる")
            || (clause.contains("ついている") && clause.contains("トラッシュ"))
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let energy = energy_type(clause).map(str::to_string);
        let all = clause.contains("すべて");
        let count = capture_u32(&self.count, clause).unwrap_or(1);

        let (action, source, targets) = if clause.contains("つけかえる") {
            // "<from>についているエネルギーを…、<to>につけかえる"
            let (from, to) = clause.split_once("ついている").unwrap_or(("", clause));
            let from = if from.contains("このポケモン") || from.is_empty() {
                Target::self_active()
            } else {
                pokemon_target(from, &self.mon_count)
            };
            (EnergyAction::Move, None, vec![from, self.recipient(to)])
        } else if clause.contains("つける") {
            let zone = if clause.contains("トラッシュから") {
                LocationType::Discard
            } else if clause.contains("山札から") {
                LocationType::Deck
            } else {
                LocationType::Hand
            };
            let mut source = Location::new(zone);
            if clause.contains("山札を切る") {
                source = source.shuffled();
            }
            let to = clause.rsplit_once('、').map_or(clause, |(_, to)| to);
            (EnergyAction::Attach, Some(source), vec![self.recipient(to)])
        } else {
            let holder = clause.split("ついている").next().unwrap_or(clause);
            let target = Target::pokemon(pokemon_scope(holder), LocationType::Active);
            (EnergyAction::Discard, None, vec![target])
        };

        let mut effect = Effect::new(EffectKind::Energy {
            action,
            energy_type: energy,
            source,
        });
        effect.targets = targets;
        if all {
            effect = effect.with_selection(SelectionMode::All);
        } else {
            effect = effect.with_value(count);
        }
        if clause.contains("まで") {
            effect = effect.up_to();
        }
        vec![effect]
    }
}

// === Damage counters ===

/// "相手のポケモン1匹にダメカンを2個のせる", "ダメカンを3個とる",
/// "…にのっているダメカンを1個、相手のポケモンにのせかえる".
pub struct CounterParser {
    counters: Regex,
    mon_count: Regex,
}

impl CounterParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: compile(r"ダメカン(?:を)?(\d+)個"),
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for CounterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for CounterParser {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("ダメカン") && has_any(clause, &["のせる", "とる", "取る", "のせかえる"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let Some(counters) = capture_u32(&self.counters, clause) else {
            return Vec::new();
        };

        let (action, targets) = if clause.contains("のせかえる") {
            let (from, to) = clause.split_once("のっている").unwrap_or((clause, clause));
            (
                CounterAction::Move,
                vec![pokemon_target(from, &self.mon_count), pokemon_target(to, &self.mon_count)],
            )
        } else if clause.contains("のせる") {
            (CounterAction::Place, vec![pokemon_target(clause, &self.mon_count)])
        } else {
            (CounterAction::Remove, vec![pokemon_target(clause, &self.mon_count)])
        };

        let mut effect = Effect::new(EffectKind::Counter { action }).with_value(counters);
        effect.targets = targets;
        vec![effect]
    }
}

// === Heal ===

/// "このポケモンのHPを30回復する", "HPをすべて回復する",
/// "特殊状態を回復する".
pub struct HealParser {
    amount: Regex,
    counters: Regex,
    mon_count: Regex,
}

impl HealParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            amount: compile(r"(\d+)回復"),
            counters: compile(r"ダメカン(\d+)個ぶん"),
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for HealParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for HealParser {
    fn name(&self) -> &'static str {
        "heal"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("回復")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let cure_status = clause.contains("特殊状態");
        let all = clause.contains("HPをすべて回復") || clause.contains("すべてのダメージ");

        let (unit, value) = match capture_u32(&self.counters, clause) {
            Some(n) => (HealUnit::DamageCounters, Some(n)),
            None => (HealUnit::Hp, capture_u32(&self.amount, clause)),
        };
        if value.is_none() && !all && !cure_status {
            return Vec::new();
        }

        let mut effect = Effect::new(EffectKind::Heal {
            unit,
            all,
            cure_status,
        })
        .with_target(pokemon_target(clause, &self.mon_count));
        if let Some(value) = value {
            effect = effect.with_value(value);
        }
        vec![effect]
    }
}

// === Devolution ===

/// "相手の進化ポケモン1匹を退化させる".
pub struct DevolutionParser {
    mon_count: Regex,
}

impl DevolutionParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for DevolutionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DevolutionParser {
    fn name(&self) -> &'static str {
        "devolution"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("退化")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        vec![Effect::new(EffectKind::Devolution)
            .with_value(1)
            .with_target(pokemon_target(clause, &self.mon_count))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::TargetCount;

    fn registry() -> ParserRegistry {
        ParserRegistry::with_default_rules()
    }

    #[test]
    fn test_switch_opponent_active() {
        let effects = SwitchParser::new().parse("相手のバトルポケモンを相手のベンチポケモンと入れ替える", &registry());
        assert_eq!(effects[0].targets[0], Target::opponent_active());
        assert_eq!(effects[0].kind, EffectKind::Switch { chooser: Side::Player });
    }

    #[test]
    fn test_energy_attach_from_discard() {
        let clause = "自分のトラッシュから基本雷エネルギーを2枚選び、ベンチポケモン1匹につける";
        let parser = EnergyParser::new();
        assert!(parser.can_parse(clause));
        let effects = parser.parse(clause, &registry());
        let EffectKind::Energy {
            action,
            energy_type,
            source,
        } = &effects[0].kind
        else {
            panic!("expected energy effect");
        };
        assert_eq!(*action, EnergyAction::Attach);
        assert_eq!(energy_type.as_deref(), Some("Lightning"));
        assert_eq!(source.unwrap().kind, LocationType::Discard);
        assert_eq!(effects[0].value, Some(2));
        assert_eq!(effects[0].targets[0].location.kind, LocationType::Bench);
    }

    #[test]
    fn test_energy_discard_opponent() {
        let effects = EnergyParser::new().parse("相手のバトルポケモンについているエネルギーを1個トラッシュする", &registry());
        assert_eq!(effects[0].targets[0], Target::opponent_active());
        assert!(matches!(
            effects[0].kind,
            EffectKind::Energy {
                action: EnergyAction::Discard,
                ..
            }
        ));
    }

    #[test]
    fn test_counter_place_all() {
        let effects = CounterParser::new().parse("相手のポケモン全員に、それぞれダメカンを2個のせる", &registry());
        assert_eq!(effects[0].value, Some(2));
        assert_eq!(effects[0].targets[0].count, Some(TargetCount::All));
        assert_eq!(effects[0].targets[0].location.kind, LocationType::Field);
    }

    #[test]
    fn test_heal_amount() {
        let effects = HealParser::new().parse("このポケモンのHPを30回復する", &registry());
        assert_eq!(effects[0].value, Some(30));
        assert_eq!(effects[0].targets[0], Target::self_active());
    }

    #[test]
    fn test_heal_status_only() {
        let effects = HealParser::new().parse("このポケモンの特殊状態を回復する", &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::Heal {
                unit: HealUnit::Hp,
                all: false,
                cure_status: true
            }
        );
        assert_eq!(effects[0].value, None);
    }
}

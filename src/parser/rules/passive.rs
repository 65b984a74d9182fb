//! Matchers for lasting and rule-bending effects: abilities, restrictions,
//! retreat changes, trainer blocks, preventions, prizes, copy and special
//! plays.

use regex_lite::Regex;

use super::{lasting_timing, pokemon_target, timing};
use crate::effects::{
    AbilityUsage, Effect, EffectKind, LocationType, PlayerScope, PreventionKind, PrizeAction,
    RestrictionKind, RetreatChange, SpecialPlayKind, Target, Timing,
};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::text::{capture_u32, compile, has_any, pokemon_scope, quoted, scope, trainer_kinds};

// === Ability ===

/// Ability timing text: "自分の番に1回使える", "このポケモンがいるかぎり、…".
///
/// The rest of the clause, if any, is parsed with the registry and takes
/// the ability's timing.
pub struct AbilityParser;

impl AbilityParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for AbilityParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for AbilityParser {
    fn name(&self) -> &'static str {
        "ability"
    }

    fn can_parse(&self, clause: &str) -> bool {
        has_any(clause, &["番に1回", "いるかぎり"])
    }

    fn parse(&self, clause: &str, registry: &ParserRegistry) -> Vec<Effect> {
        let (usage, ability_timing, marker) = if clause.contains("いるかぎり") {
            (AbilityUsage::Passive, Timing::WhileInPlay, "いるかぎり")
        } else {
            (AbilityUsage::OncePerTurn, Timing::OncePerTurn, "番に1回")
        };

        let ability = Effect::new(EffectKind::Ability {
            name: quoted(clause),
            usage,
        })
        .with_timing(ability_timing);

        let rest = clause
            .split_once(marker)
            .map_or("", |(_, rest)| rest)
            .trim_start_matches("使える")
            .trim_matches(|c| c == '、' || c == '。');

        // A passive body lasts while the Pokémon is in play unless it names
        // its own duration.
        let overrides = usage == AbilityUsage::Passive && timing(rest).is_none();
        let mut effects = vec![ability];
        if !rest.is_empty() {
            effects.extend(registry.parse(rest).effects.into_iter().map(|mut effect| {
                if overrides || effect.timing.is_none() {
                    effect.timing = Some(ability_timing);
                }
                effect
            }));
        }
        effects
    }
}

// === Move restriction ===

/// "このポケモンは、次の自分の番、ワザが使えない",
/// "相手のバトルポケモンは、次の相手の番、にげられない".
pub struct MoveRestrictionParser;

impl MoveRestrictionParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MoveRestrictionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for MoveRestrictionParser {
    fn name(&self) -> &'static str {
        "move-restriction"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("にげられない")
            || (clause.contains("ワザ") && has_any(clause, &["使えない", "使うことができない"]))
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let restriction = if clause.contains("にげられない") {
            RestrictionKind::CannotRetreat
        } else if let Some(name) = quoted(clause) {
            RestrictionKind::CannotUseAttack { name }
        } else {
            RestrictionKind::CannotAttack
        };

        let player = pokemon_scope(clause);
        let timing = timing(clause).unwrap_or(match player {
            PlayerScope::SelfSide => Timing::OwnNextTurn,
            PlayerScope::Opponent | PlayerScope::Both => Timing::OpponentNextTurn,
        });

        vec![Effect::new(EffectKind::Restriction { restriction })
            .with_target(Target::pokemon(player, LocationType::Active))
            .with_timing(timing)]
    }
}

// === Retreat modifier ===

/// "にげるためのエネルギーは、1個少なくなる", "…すべてなくなる".
pub struct RetreatModifierParser {
    amount: Regex,
    mon_count: Regex,
}

impl RetreatModifierParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            amount: compile(r"(\d+)個"),
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for RetreatModifierParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for RetreatModifierParser {
    fn name(&self) -> &'static str {
        "retreat-modifier"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("にげる")
            && has_any(clause, &["エネルギー", "コスト"])
            && has_any(clause, &["少なく", "多く", "なくなる"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let amount = capture_u32(&self.amount, clause);
        let change = if clause.contains("多く") {
            RetreatChange::Increase
        } else if clause.contains("少なく") && amount.is_some() {
            RetreatChange::Reduce
        } else {
            RetreatChange::RemoveAll
        };

        let target = pokemon_target(clause, &self.mon_count);
        let timing = lasting_timing(clause, target.player);
        let mut effect = Effect::new(EffectKind::RetreatModifier { change })
            .with_target(target)
            .with_timing(timing);
        if let Some(amount) = amount.filter(|_| change != RetreatChange::RemoveAll) {
            effect = effect.with_value(amount);
        }
        vec![effect]
    }
}

// === Trainer block ===

/// "次の相手の番、相手は手札からグッズを出して使えない".
pub struct TrainerBlockParser;

impl TrainerBlockParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrainerBlockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for TrainerBlockParser {
    fn name(&self) -> &'static str {
        "trainer-block"
    }

    fn can_parse(&self, clause: &str) -> bool {
        !trainer_kinds(clause).is_empty() && has_any(clause, &["使えない", "出せない", "つけられない"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let blocked = trainer_kinds(clause);
        let player = scope(clause);
        vec![Effect::new(EffectKind::TrainerBlock { blocked })
            .with_target(Target::cards(player, LocationType::Hand))
            .with_timing(lasting_timing(clause, player))]
    }
}

// === Prevention ===

/// "次の相手の番、このポケモンはワザのダメージや効果を受けない",
/// "受けるワザのダメージは「-30」される".
pub struct PreventionParser {
    reduction: Regex,
    mon_count: Regex,
}

impl PreventionParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reduction: compile(r"-(\d+)|(\d+)少なく"),
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for PreventionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for PreventionParser {
    fn name(&self) -> &'static str {
        "prevention"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("受けない")
            || (clause.contains("受ける") && clause.contains("ダメージ") && self.reduction.is_match(clause))
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let reduction = self.reduction.captures(clause).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        });

        let prevention = match reduction {
            Some(_) if !clause.contains("受けない") => PreventionKind::ReduceDamage,
            _ if has_any(clause, &["ダメージや効果", "ダメージと効果"]) => PreventionKind::DamageAndEffects,
            _ if clause.contains("ダメージ") => PreventionKind::AllDamage,
            _ => PreventionKind::Effects,
        };

        // The protected Pokémon is named before "受け".
        let subject = clause.split("受け").next().unwrap_or(clause);
        let target = if subject.contains("ポケモン") {
            pokemon_target(subject, &self.mon_count)
        } else {
            Target::self_active()
        };
        // Protection lasts through the opponent's next turn unless stated.
        let timing = timing(clause).unwrap_or(Timing::OpponentNextTurn);

        let mut effect = Effect::new(EffectKind::Prevention { prevention })
            .with_target(target)
            .with_timing(timing);
        if prevention == PreventionKind::ReduceDamage {
            if let Some(amount) = reduction {
                effect = effect.with_value(amount);
            }
        }
        vec![effect]
    }
}

// === Prize ===

/// "サイドを1枚とる", "サイドを1枚多くとる".
pub struct PrizeParser {
    count: Regex,
}

impl PrizeParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: compile(r"サイドを(\d+)枚"),
        }
    }
}

impl Default for PrizeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for PrizeParser {
    fn name(&self) -> &'static str {
        "prize"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("サイド") && has_any(clause, &["とる", "取る"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let action = if clause.contains("多く") {
            PrizeAction::Extra
        } else {
            PrizeAction::Take
        };
        let count = capture_u32(&self.count, clause).unwrap_or(1);
        vec![Effect::new(EffectKind::Prize { action })
            .with_value(count)
            .with_target(Target::cards(scope(clause), LocationType::Prize))]
    }
}

// === Copy ===

/// "相手のバトルポケモンが持っているワザを1つ選び、このワザとして使う".
pub struct CopyParser {
    mon_count: Regex,
}

impl CopyParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mon_count: compile(r"(\d+)匹"),
        }
    }
}

impl Default for CopyParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for CopyParser {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("として使う")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let source = clause.split("ワザ").next().unwrap_or(clause);
        let target = if source.contains("ポケモン") {
            pokemon_target(source, &self.mon_count)
        } else {
            Target::opponent_active()
        };
        vec![Effect::new(EffectKind::Copy).with_target(target)]
    }
}

// === Special play ===

/// "山札から進化させる", "出したばかりでも進化できる",
/// "最初の番でも使える".
pub struct SpecialPlayParser;

impl SpecialPlayParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpecialPlayParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialPlayParser {
    fn play(clause: &str) -> Option<SpecialPlayKind> {
        let evolves = clause.contains("進化") && !clause.contains("退化");
        if evolves && clause.contains("山札から") {
            Some(SpecialPlayKind::EvolveFromDeck)
        } else if evolves && has_any(clause, &["出したばかり", "最初の番"]) {
            Some(SpecialPlayKind::EvolveImmediately)
        } else if clause.contains("最初の番") && has_any(clause, &["使える", "出せる"]) {
            Some(SpecialPlayKind::PlayOnFirstTurn)
        } else {
            None
        }
    }
}

impl RuleParser for SpecialPlayParser {
    fn name(&self) -> &'static str {
        "special-play"
    }

    fn can_parse(&self, clause: &str) -> bool {
        Self::play(clause).is_some()
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let Some(play) = Self::play(clause) else {
            return Vec::new();
        };
        let target = Target::pokemon(PlayerScope::SelfSide, LocationType::Field);
        vec![Effect::new(EffectKind::SpecialPlay { play })
            .with_target(target)
            .with_timing(Timing::ThisTurn)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectType, TargetCount, TrainerKind};

    fn registry() -> ParserRegistry {
        ParserRegistry::with_default_rules()
    }

    #[test]
    fn test_once_per_turn_ability_with_body() {
        let effects = AbilityParser::new().parse("自分の番に1回使える。", &registry());
        assert_eq!(effects.len(), 1);
        assert_eq!(
            effects[0].kind,
            EffectKind::Ability {
                name: None,
                usage: AbilityUsage::OncePerTurn
            }
        );
    }

    #[test]
    fn test_passive_ability_wraps_body() {
        let effects = AbilityParser::new()
            .parse("このポケモンがいるかぎり、相手は手札からグッズを出して使えない", &registry());
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[1].effect_type(), EffectType::TrainerBlock);
        assert_eq!(effects[1].timing, Some(Timing::WhileInPlay));
    }

    #[test]
    fn test_passive_body_keeps_named_duration() {
        let body = "相手のバトルポケモンは、次の相手の番、にげられない";
        let named = timing(body);
        assert!(named.is_some());

        let effects = AbilityParser::new().parse(&format!("このポケモンがいるかぎり、{body}"), &registry());
        assert_eq!(effects[0].timing, Some(Timing::WhileInPlay));
        assert!(effects.len() > 1);
        assert_eq!(effects[1].timing, named);
    }

    #[test]
    fn test_restriction_named_attack() {
        let effects = MoveRestrictionParser::new().parse("このポケモンは、次の自分の番、ワザ「はかいこうせん」が使えない", &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::Restriction {
                restriction: RestrictionKind::CannotUseAttack {
                    name: "はかいこうせん".into()
                }
            }
        );
        assert_eq!(effects[0].timing, Some(Timing::OwnNextTurn));
        assert_eq!(effects[0].targets[0], Target::self_active());
    }

    #[test]
    fn test_cannot_retreat_defaults_to_opponent_turn() {
        let effects = MoveRestrictionParser::new().parse("相手のバトルポケモンは、にげられない", &registry());
        assert_eq!(effects[0].timing, Some(Timing::OpponentNextTurn));
        assert_eq!(effects[0].targets[0], Target::opponent_active());
    }

    #[test]
    fn test_retreat_reduce() {
        let effects = RetreatModifierParser::new().parse("この番、自分のバトルポケモンのにげるためのエネルギーは、2個少なくなる", &registry());
        assert_eq!(effects[0].kind, EffectKind::RetreatModifier { change: RetreatChange::Reduce });
        assert_eq!(effects[0].value, Some(2));
        assert_eq!(effects[0].timing, Some(Timing::ThisTurn));
    }

    #[test]
    fn test_trainer_block_item() {
        let effects = TrainerBlockParser::new().parse("次の相手の番、相手は手札からグッズを出して使えない", &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::TrainerBlock {
                blocked: vec![TrainerKind::Item]
            }
        );
        assert_eq!(effects[0].targets[0].player, PlayerScope::Opponent);
        assert_eq!(effects[0].timing, Some(Timing::OpponentNextTurn));
    }

    #[test]
    fn test_prevention_kinds() {
        let parser = PreventionParser::new();
        let effects = parser.parse("次の相手の番、このポケモンはワザのダメージや効果を受けない", &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::Prevention {
                prevention: PreventionKind::DamageAndEffects
            }
        );
        assert_eq!(effects[0].targets[0], Target::self_active());

        let clause = "次の相手の番、このポケモンが受けるワザのダメージは「-30」される";
        assert!(parser.can_parse(clause));
        let effects = parser.parse(clause, &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::Prevention {
                prevention: PreventionKind::ReduceDamage
            }
        );
        assert_eq!(effects[0].value, Some(30));
    }

    #[test]
    fn test_prize_extra() {
        let effects = PrizeParser::new().parse("サイドを1枚多くとる", &registry());
        assert_eq!(effects[0].kind, EffectKind::Prize { action: PrizeAction::Extra });
        assert_eq!(effects[0].value, Some(1));
    }

    #[test]
    fn test_copy_target() {
        let effects = CopyParser::new().parse("相手のバトルポケモンが持っているワザを1つ選び、このワザとして使う", &registry());
        assert_eq!(effects[0].targets[0], Target::opponent_active());
    }

    #[test]
    fn test_special_play_from_deck() {
        let parser = SpecialPlayParser::new();
        assert!(parser.can_parse("自分の山札から、そのポケモンから進化するカードを1枚選び、進化させる"));
        assert!(!parser.can_parse("相手の進化ポケモンを退化させる"));
        let effects = parser.parse("最初の番でも使える", &registry());
        assert_eq!(effects[0].kind, EffectKind::SpecialPlay { play: SpecialPlayKind::PlayOnFirstTurn });
        assert_eq!(effects[0].targets[0].count, None::<TargetCount>);
    }
}

//! Ordered registry of rule parsers.
//!
//! ## Order contract
//!
//! The registry tries parsers in registration order and commits to the
//! first whose `can_parse` returns true, even when that parser then
//! produces nothing. Order is part of the interface: specific matchers must
//! come before the generic ones that would otherwise consume their text and
//! produce a narrower, wrong effect. The default order is:
//!
//! | # | Parser | Must precede |
//! |---|--------|--------------|
//! | 1 | ability | everything (timing text) |
//! | 2 | status | condition-check (owns its coin-flip prefix) |
//! | 3 | search | condition-check, bench-placement |
//! | 4 | condition-check | the parsers its body is re-parsed with |
//! | 5 | damage-modifier | count-multiplier-damage, damage |
//! | 6 | count-multiplier-damage | damage |
//! | 7 | energy | discard |
//! | 8 | bench-damage | damage |
//! | 9 | move-restriction | |
//! | 10 | retreat-modifier | energy wording in "にげるためのエネルギー" |
//! | 11 | trainer-block | |
//! | 12 | prevention | damage ("受けるダメージ") |
//! | 13 | prize | |
//! | 14 | devolution | |
//! | 15 | copy | |
//! | 16 | special-play | |
//! | 17 | hand-to-deck | draw, discard |
//! | 18 | bench-placement | deck-manipulation |
//! | 19 | deck-manipulation | draw, discard |
//! | 20 | switch | |
//! | 21 | counter | heal |
//! | 22 | heal | |
//! | 23 | damage | |
//! | 24 | discard | draw |
//! | 25 | draw | |

use crate::effects::Effect;

use super::rules;

/// A specialized clause matcher.
pub trait RuleParser: Send + Sync {
    /// Stable name, used in parse reports.
    fn name(&self) -> &'static str;

    /// Whether this parser claims the clause.
    fn can_parse(&self, clause: &str) -> bool;

    /// Parse a claimed clause. May return several effects, or none.
    ///
    /// The registry is passed in so a parser can re-parse a sub-clause.
    fn parse(&self, clause: &str, registry: &ParserRegistry) -> Vec<Effect>;
}

/// Result of matching one clause.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClauseMatch {
    /// Name of the parser that claimed the clause.
    pub parser: Option<&'static str>,
    pub effects: Vec<Effect>,
}

/// Parsers in priority order.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn RuleParser>>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("parsers", &self.names())
            .finish()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl ParserRegistry {
    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// The standard parsers in the documented order.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(rules::AbilityParser::new()));
        registry.register(Box::new(rules::StatusParser::new()));
        registry.register(Box::new(rules::SearchParser::new()));
        registry.register(Box::new(rules::ConditionCheckParser::new()));
        registry.register(Box::new(rules::DamageModifierParser::new()));
        registry.register(Box::new(rules::CountMultiplierDamageParser::new()));
        registry.register(Box::new(rules::EnergyParser::new()));
        registry.register(Box::new(rules::BenchDamageParser::new()));
        registry.register(Box::new(rules::MoveRestrictionParser::new()));
        registry.register(Box::new(rules::RetreatModifierParser::new()));
        registry.register(Box::new(rules::TrainerBlockParser::new()));
        registry.register(Box::new(rules::PreventionParser::new()));
        registry.register(Box::new(rules::PrizeParser::new()));
        registry.register(Box::new(rules::DevolutionParser::new()));
        registry.register(Box::new(rules::CopyParser::new()));
        registry.register(Box::new(rules::SpecialPlayParser::new()));
        registry.register(Box::new(rules::HandToDeckParser::new()));
        registry.register(Box::new(rules::BenchPlacementParser::new()));
        registry.register(Box::new(rules::DeckManipulationParser::new()));
        registry.register(Box::new(rules::SwitchParser::new()));
        registry.register(Box::new(rules::CounterParser::new()));
        registry.register(Box::new(rules::HealParser::new()));
        registry.register(Box::new(rules::DamageParser::new()));
        registry.register(Box::new(rules::DiscardParser::new()));
        registry.register(Box::new(rules::DrawParser::new()));
        registry
    }

    /// Append a parser at the lowest priority.
    ///
    /// Panics if a parser with the same name is already registered.
    pub fn register(&mut self, parser: Box<dyn RuleParser>) {
        if self.parsers.iter().any(|p| p.name() == parser.name()) {
            panic!("Rule parser '{}' already registered", parser.name());
        }
        self.parsers.push(parser);
    }

    /// Parser names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Number of registered parsers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether no parser is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// The parser that claims a clause.
    #[must_use]
    pub fn find(&self, clause: &str) -> Option<&dyn RuleParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(clause))
            .map(|p| p.as_ref())
    }

    /// Parse a clause with the first parser that claims it.
    #[must_use]
    pub fn parse(&self, clause: &str) -> ClauseMatch {
        let Some(parser) = self.find(clause) else {
            log::debug!("no rule parser matched clause {clause:?}");
            return ClauseMatch::default();
        };

        let effects = parser.parse(clause, self);
        if effects.is_empty() {
            log::debug!("{} claimed clause {clause:?} but produced no effect", parser.name());
        } else {
            log::trace!("{} parsed {clause:?} into {} effect(s)", parser.name(), effects.len());
        }
        ClauseMatch {
            parser: Some(parser.name()),
            effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectKind, EffectType, PlayerScope};

    struct Greedy;

    impl RuleParser for Greedy {
        fn name(&self) -> &'static str {
            "greedy"
        }

        fn can_parse(&self, _clause: &str) -> bool {
            true
        }

        fn parse(&self, _clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
            Vec::new()
        }
    }

    #[test]
    fn test_default_order_contract() {
        let names = ParserRegistry::with_default_rules().names();
        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();

        let required = [
            "ability",
            "status",
            "search",
            "condition-check",
            "damage-modifier",
            "count-multiplier-damage",
            "energy",
            "bench-damage",
            "move-restriction",
        ];
        for pair in required.windows(2) {
            assert!(position(pair[0]) < position(pair[1]), "{} before {}", pair[0], pair[1]);
        }
        for generic in ["damage", "draw", "discard"] {
            assert!(position("move-restriction") < position(generic));
        }
    }

    #[test]
    fn test_first_claim_commits() {
        let mut registry = ParserRegistry::empty();
        registry.register(Box::new(Greedy));
        registry.register(Box::new(rules::DrawParser::new()));

        let result = registry.parse("山札を2枚引く");
        assert_eq!(result.parser, Some("greedy"));
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_unmatched_clause() {
        let result = ParserRegistry::with_default_rules().parse("このワザは失敗");
        assert_eq!(result, ClauseMatch::default());
    }

    #[test]
    fn test_generic_draw() {
        let result = ParserRegistry::with_default_rules().parse("山札を2枚引く");
        assert_eq!(result.parser, Some("draw"));
        assert_eq!(result.effects.len(), 1);
        let draw = &result.effects[0];
        assert_eq!(draw.effect_type(), EffectType::Draw);
        assert_eq!(draw.value, Some(2));
        assert_eq!(draw.targets[0].player, PlayerScope::SelfSide);
        assert!(matches!(draw.kind, EffectKind::Draw { until_hand_size: false }));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = ParserRegistry::empty();
        registry.register(Box::new(Greedy));
        registry.register(Box::new(Greedy));
    }
}

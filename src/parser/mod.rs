//! Card text to effect parser.
//!
//! ## Pipeline
//!
//! 1. `text::normalize` folds full-width characters and collapses spaces.
//! 2. `Segmenter` splits the text into clauses and annotations.
//! 3. `ParserRegistry` matches each clause against the rule parsers in
//!    priority order; the first parser that claims a clause wins.
//! 4. Annotations are merged into the effects of the clause they follow.
//! 5. A tails sentence ("ウラなら、…") becomes the failure branch of the
//!    coin flip in the clause before it, so both branches share one flip.
//!
//! Parsing never fails. A clause no parser understands contributes no
//! effects and is listed by `ParseReport::misses`.

mod registry;
mod rules;
mod segmenter;
pub mod text;

pub use registry::{ClauseMatch, ParserRegistry, RuleParser};
pub use rules::*;
pub use segmenter::{ConditionType, Relationship, Segment, Segmenter};

use crate::effects::{Condition, ConditionKind, Effect, EffectKind, Modifier, ModifierScope};
use crate::state::Side;

/// Parser name recorded for annotation segments.
const ANNOTATION: &str = "annotation";

/// Parser name recorded for sentences folded into an earlier coin flip.
const ELSE_BRANCH: &str = "else-branch";

/// Phrase of a sentence that flips its own coins.
const COIN_FLIP: &str = "コインを";

/// One clause and what it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseReport {
    pub segment: Segment,
    /// Parser that claimed the clause.
    pub parser: Option<&'static str>,
    /// Top-level effects. An else branch keeps its effects inside the
    /// earlier clause's coin-flip condition instead.
    pub effects: Vec<Effect>,
}

impl ClauseReport {
    /// Whether this is an effect clause nothing was produced for.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.segment.relationship != Relationship::Modifier
            && self.parser != Some(ELSE_BRANCH)
            && self.effects.is_empty()
    }
}

/// Full result of parsing one text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Normalized source text.
    pub text: String,
    pub clauses: Vec<ClauseReport>,
}

impl ParseReport {
    /// Every effect in clause order, with annotations merged.
    #[must_use]
    pub fn effects(&self) -> Vec<Effect> {
        self.clauses
            .iter()
            .flat_map(|clause| clause.effects.iter().cloned())
            .collect()
    }

    /// Clauses no parser produced anything for.
    pub fn misses(&self) -> impl Iterator<Item = &ClauseReport> {
        self.clauses.iter().filter(|c| c.is_miss())
    }

    /// Whether every effect clause produced something.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.misses().next().is_none()
    }
}

/// Parses card text into effects.
///
/// Owns its segmenter and registry; both are built once and immutable
/// afterwards, so one parser can be shared across threads.
#[derive(Debug, Default)]
pub struct EffectParser {
    segmenter: Segmenter,
    registry: ParserRegistry,
}

impl EffectParser {
    /// A parser with the standard rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with a custom registry.
    #[must_use]
    pub fn with_registry(registry: ParserRegistry) -> Self {
        Self {
            segmenter: Segmenter::new(),
            registry,
        }
    }

    /// The rule registry.
    #[must_use]
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Parse text into effects.
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<Effect> {
        self.parse_with_report(text).effects()
    }

    /// Parse text, keeping the per-clause breakdown.
    #[must_use]
    pub fn parse_with_report(&self, text: &str) -> ParseReport {
        let text = text::normalize(text);
        let mut clauses: Vec<ClauseReport> = Vec::new();

        for segment in self.segmenter.segment(&text) {
            if segment.relationship == Relationship::Modifier {
                if let Some(parent) = segment.parent_index.and_then(|i| clauses.get_mut(i)) {
                    merge_annotation(&segment.text, &mut parent.effects);
                }
                clauses.push(ClauseReport {
                    segment,
                    parser: Some(ANNOTATION),
                    effects: Vec::new(),
                });
                continue;
            }

            if segment.condition_type == Some(ConditionType::Else) && !segment.text.contains(COIN_FLIP) {
                if let Some(parser) = self.else_branch(&segment.text, &mut clauses) {
                    clauses.push(ClauseReport {
                        segment,
                        parser,
                        effects: Vec::new(),
                    });
                    continue;
                }
            }

            let ClauseMatch { parser, effects } = self.registry.parse(&segment.text);
            clauses.push(ClauseReport {
                segment,
                parser,
                effects,
            });
        }

        let report = ParseReport { text, clauses };
        for miss in report.misses() {
            log::debug!("parse miss: {:?}", miss.segment.text);
        }
        report
    }

    /// Fold an otherwise-branch sentence into the last coin flip of the
    /// preceding clause.
    ///
    /// Returns `None` when there is no flip to attach to, and `Some(None)`
    /// when the flip was found but the body parsed to nothing.
    fn else_branch(
        &self,
        sentence: &str,
        clauses: &mut [ClauseReport],
    ) -> Option<Option<&'static str>> {
        let body = self.segmenter.else_body(sentence)?;
        let previous = clauses
            .iter_mut()
            .rev()
            .find(|c| c.segment.relationship != Relationship::Modifier)?;
        let flip = last_coin_flip(&mut previous.effects)?;

        let effects: Vec<Effect> = self
            .segmenter
            .clauses(body)
            .iter()
            .flat_map(|clause| self.registry.parse(clause).effects)
            .collect();
        if effects.is_empty() {
            return Some(None);
        }
        flip.on_failure.extend(effects);
        Some(Some(ELSE_BRANCH))
    }
}

/// The last coin-flip condition among some effects.
fn last_coin_flip(effects: &mut [Effect]) -> Option<&mut Condition> {
    effects.iter_mut().rev().find_map(|effect| {
        effect
            .conditions
            .iter_mut()
            .rev()
            .find(|c| c.kind == ConditionKind::CoinFlip)
    })
}

/// Modifiers named by an annotation.
fn annotation_modifiers(annotation: &str) -> Vec<Modifier> {
    if annotation.contains("弱点・抵抗力") || annotation.contains("弱点と抵抗力") {
        vec![Modifier::ignore(ModifierScope::Effects)]
    } else if annotation.contains("弱点") {
        vec![Modifier::ignore(ModifierScope::Weakness)]
    } else if annotation.contains("抵抗力") {
        vec![Modifier::ignore(ModifierScope::Resistance)]
    } else {
        Vec::new()
    }
}

/// Merge an annotation into the effects of the clause it follows.
fn merge_annotation(annotation: &str, effects: &mut [Effect]) {
    let modifiers = annotation_modifiers(annotation);
    let opponent_chooses = annotation.contains("相手が選ぶ");

    for effect in effects.iter_mut() {
        effect.modifiers.extend(modifiers.iter().copied());
        if opponent_chooses {
            if let EffectKind::Switch { chooser } = &mut effect.kind {
                *chooser = Side::Opponent;
            }
        }
    }
}

/// Parse card text with the standard rules.
///
/// Builds a fresh `EffectParser`; hold on to one instead when parsing many
/// texts.
#[must_use]
pub fn parse_effect_text(text: &str) -> Vec<Effect> {
    EffectParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectType, LocationType, PlayerScope, TargetCount};
    use crate::state::StatusKind;

    #[test]
    fn test_bench_annotation_merges() {
        let effects = parse_effect_text("相手のベンチポケモン1匹にも、30ダメージ。［ベンチは弱点・抵抗力を計算しない。］");
        assert_eq!(effects.len(), 1);
        let effect = &effects[0];
        assert_eq!(effect.effect_type(), EffectType::Damage);
        assert_eq!(effect.value, Some(30));
        assert_eq!(effect.targets.len(), 1);
        assert_eq!(effect.targets[0].player, PlayerScope::Opponent);
        assert_eq!(effect.targets[0].location.kind, LocationType::Bench);
        assert_eq!(effect.targets[0].count, Some(TargetCount::Exactly(1)));
        assert_eq!(effect.modifiers, vec![Modifier::ignore(ModifierScope::Effects)]);
    }

    #[test]
    fn test_switch_chooser_annotation() {
        let effects = parse_effect_text(
            "相手のバトルポケモンをベンチポケモンと入れ替える。［バトル場に出すポケモンは相手が選ぶ。］",
        );
        assert_eq!(effects[0].kind, EffectKind::Switch { chooser: Side::Opponent });
    }

    #[test]
    fn test_report_misses() {
        let report = EffectParser::new().parse_with_report("山札を2枚引く。このワザは失敗。");
        assert_eq!(report.clauses.len(), 2);
        assert_eq!(report.clauses[0].parser, Some("draw"));
        let misses: Vec<_> = report.misses().map(|c| c.segment.text.as_str()).collect();
        assert_eq!(misses, vec!["このワザは失敗"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_full_width_input() {
        let effects = parse_effect_text("相手のバトルポケモンに３０ダメージ。");
        assert_eq!(effects[0].value, Some(30));
    }

    #[test]
    fn test_tails_sentence_joins_previous_flip() {
        let report = EffectParser::new().parse_with_report(
            "コインを1回投げオモテなら、相手のバトルポケモンをマヒにする。ウラなら、相手のバトルポケモンをやけどにする。",
        );
        assert!(report.is_complete());
        assert_eq!(report.clauses[1].parser, Some(ELSE_BRANCH));

        let effects = report.effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::Status { status: StatusKind::Paralyzed });

        let flip = &effects[0].conditions[0];
        assert_eq!(flip.kind, ConditionKind::CoinFlip);
        assert_eq!(flip.on_failure.len(), 1);
        assert_eq!(flip.on_failure[0].kind, EffectKind::Status { status: StatusKind::Burned });
    }

    #[test]
    fn test_tails_sentence_without_flip_parses_alone() {
        let report = EffectParser::new().parse_with_report("山札を1枚引く。ウラなら、このワザは失敗。");
        assert_eq!(report.clauses[0].effects.len(), 1);
        assert!(report.clauses[0].effects[0].conditions.is_empty());
        assert_ne!(report.clauses[1].parser, Some(ELSE_BRANCH));
    }
}

//! Card movement matchers: search, bench placement, draw, discard,
//! hand-to-deck and deck manipulation.

use regex_lite::Regex;

use crate::effects::{
    DeckAction, DeckPlacement, Effect, EffectKind, Location, LocationType, PlayerScope,
    SearchDestination, SelectionMode, Target, TargetKind,
};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::text::{capture_u32, card_noun, compile, has_any, scope};

/// Source zone of a "<zone>から" phrase.
fn source_zone(clause: &str) -> LocationType {
    if clause.contains("トラッシュから") {
        LocationType::Discard
    } else if clause.contains("手札から") {
        LocationType::Hand
    } else {
        LocationType::Deck
    }
}

/// Owner of the zone named before the first "から".
fn zone_owner(clause: &str) -> PlayerScope {
    let head = clause.find("から").map_or(clause, |at| &clause[..at]);
    scope(head)
}

/// Target for "<noun>をN枚" picked from a zone.
fn picked_cards(clause: &str, pick: &Regex, zone: LocationType) -> Target {
    let (noun, count) = match pick.captures(clause) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
        ),
        None => ("", None),
    };
    let (kind, filters) = card_noun(noun);

    let mut location = Location::new(zone);
    if clause.contains("見せ") {
        location = location.revealed();
    }
    if clause.contains("山札を切る") || clause.contains("もどして切る") {
        location = location.shuffled();
    }

    let mut target = Target::new(kind, zone_owner(clause), zone).at(location);
    target.filters = filters;
    if clause.contains("好きなだけ") || clause.contains("すべて") {
        target.with_all()
    } else {
        target.with_count(count.unwrap_or(1))
    }
}

fn apply_up_to(effect: Effect, clause: &str) -> Effect {
    if clause.contains("まで") {
        effect.up_to()
    } else {
        effect
    }
}

// === Search ===

/// "自分の山札からたねポケモンを1枚選び、相手に見せて、手札に加える".
pub struct SearchParser {
    pick: Regex,
    look: Regex,
}

impl SearchParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pick: compile(r"(?:から|その中から|の中から)([^、]*?)を(\d+)?枚?"),
            look: compile(r"山札を上から(\d+)枚"),
        }
    }
}

impl Default for SearchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for SearchParser {
    fn name(&self) -> &'static str {
        "search"
    }

    fn can_parse(&self, clause: &str) -> bool {
        has_any(clause, &["山札から", "トラッシュから", "山札を上から"]) && clause.contains("手札に加える")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let look_at = capture_u32(&self.look, clause);
        // After "N枚見て" the pick phrase follows "その中から".
        let pick_text = match clause.find("その中から") {
            Some(at) => &clause[at..],
            None => clause,
        };
        let mut target = picked_cards(pick_text, &self.pick, source_zone(clause));
        target.player = zone_owner(clause);
        if clause.contains("山札を切る") {
            target.location = target.location.shuffled();
        }

        let effect = Effect::new(EffectKind::Search {
            destination: SearchDestination::Hand,
            look_at,
        })
        .with_target(target);
        vec![apply_up_to(effect, clause)]
    }
}

// === Bench placement ===

/// "山札からたねポケモンを2枚まで選び、ベンチに出す". When the clause
/// looks at the top of the deck the rest goes back: `[Place, Search]`.
pub struct BenchPlacementParser {
    pick: Regex,
    look: Regex,
}

impl BenchPlacementParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pick: compile(r"(?:から|その中から)([^、]*?)を(\d+)?枚?"),
            look: compile(r"山札を上から(\d+)枚"),
        }
    }
}

impl Default for BenchPlacementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for BenchPlacementParser {
    fn name(&self) -> &'static str {
        "bench-placement"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("ベンチに出す")
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let look_at = capture_u32(&self.look, clause);
        let pick_text = match clause.find("その中から") {
            Some(at) => &clause[at..],
            None => clause,
        };

        let mut target = picked_cards(pick_text, &self.pick, source_zone(clause));
        target.player = PlayerScope::SelfSide;
        if target.kind == TargetKind::Card {
            target.kind = TargetKind::Pokemon;
        }

        let place = apply_up_to(
            Effect::new(EffectKind::Place { look_at }).with_target(target),
            clause,
        );
        match look_at {
            Some(_) => {
                let rest = Target::cards(PlayerScope::SelfSide, LocationType::Deck)
                    .at(Location::new(LocationType::Deck).shuffled())
                    .with_all();
                let back = Effect::new(EffectKind::Search {
                    destination: SearchDestination::Deck,
                    look_at,
                })
                .with_selection(SelectionMode::All)
                .with_target(rest);
                vec![place, back]
            }
            None => vec![place],
        }
    }
}

// === Draw ===

/// "山札を2枚引く", "手札が6枚になるように、山札を引く".
pub struct DrawParser {
    count: Regex,
    until: Regex,
}

impl DrawParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: compile(r"(\d+)枚引"),
            until: compile(r"手札が(\d+)枚になるまで|手札が(\d+)枚になるように"),
        }
    }
}

impl Default for DrawParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DrawParser {
    fn name(&self) -> &'static str {
        "draw"
    }

    fn can_parse(&self, clause: &str) -> bool {
        has_any(clause, &["引く", "引き", "引いて"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let player = scope(clause);

        if let Some(caps) = self.until.captures(clause) {
            let size = caps
                .get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().parse::<u32>().ok());
            if let Some(size) = size {
                let effect = Effect::new(EffectKind::Draw {
                    until_hand_size: true,
                })
                .with_value(size)
                .with_target(Target::cards(player, LocationType::Deck));
                return vec![effect];
            }
        }

        let count = capture_u32(&self.count, clause).unwrap_or(1);
        vec![Effect::draw(count, player)]
    }
}

// === Discard ===

/// "手札を1枚トラッシュし、山札を2枚引く" yields `[Discard, Draw]`.
pub struct DiscardParser {
    count: Regex,
    noun: Regex,
}

impl DiscardParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: compile(r"(\d+)枚"),
            noun: compile(r"手札(?:の|から)([^、を]*)を"),
        }
    }
}

impl Default for DiscardParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DiscardParser {
    fn name(&self) -> &'static str {
        "discard"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("トラッシュ") && !clause.contains("トラッシュから") && !clause.contains("トラッシュに")
    }

    fn parse(&self, clause: &str, registry: &ParserRegistry) -> Vec<Effect> {
        let (head, tail) = match clause.find("トラッシュし、") {
            Some(at) => (&clause[..at], Some(&clause[at + "トラッシュし、".len()..])),
            None => (clause, None),
        };

        let noun = self
            .noun
            .captures(head)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());
        let (kind, filters) = card_noun(noun);
        let mut target = Target::new(kind, scope(head), LocationType::Hand);
        target.filters = filters;

        let mut effect = Effect::new(EffectKind::Discard);
        if head.contains("すべて") {
            target = target.with_all();
            effect = effect.with_selection(SelectionMode::All);
        } else {
            let count = capture_u32(&self.count, head).unwrap_or(1);
            target = target.with_count(count);
            effect = effect.with_value(count);
        }
        if head.contains("見ないで") {
            effect = effect.with_selection(SelectionMode::Random);
        }
        let effect = apply_up_to(effect.with_target(target), head);

        let mut effects = vec![effect];
        if let Some(tail) = tail.filter(|t| !t.is_empty()) {
            effects.extend(registry.parse(tail).effects);
        }
        effects
    }
}

// === Hand to deck ===

/// "手札をすべて山札にもどして切る", "手札を山札の下にもどす".
pub struct HandToDeckParser;

impl HandToDeckParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for HandToDeckParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for HandToDeckParser {
    fn name(&self) -> &'static str {
        "hand-to-deck"
    }

    fn can_parse(&self, clause: &str) -> bool {
        clause.contains("手札") && has_any(clause, &["山札にもど", "山札の下にもど"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let placement = if clause.contains("山札の下") {
            DeckPlacement::Bottom
        } else {
            DeckPlacement::ShuffleIn
        };
        let target = Target::cards(scope(clause), LocationType::Hand).with_all();
        vec![Effect::new(EffectKind::HandToDeck { placement })
            .with_selection(SelectionMode::All)
            .with_target(target)]
    }
}

// === Deck manipulation ===

/// "山札を切る", "山札を上から3枚見る", "山札を上から2枚トラッシュする".
pub struct DeckManipulationParser {
    top: Regex,
}

impl DeckManipulationParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            top: compile(r"山札を上から(\d+)枚"),
        }
    }
}

impl Default for DeckManipulationParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for DeckManipulationParser {
    fn name(&self) -> &'static str {
        "deck-manipulation"
    }

    fn can_parse(&self, clause: &str) -> bool {
        has_any(clause, &["山札を切る", "山札を上から", "山札の上から"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        let target = Target::cards(scope(clause), LocationType::Deck);
        let count = capture_u32(&self.top, clause);

        let (action, value) = match count {
            Some(n) if clause.contains("トラッシュ") => (DeckAction::DiscardTop, Some(n)),
            Some(n) => (DeckAction::LookTop, Some(n)),
            None if clause.contains("山札を切る") => (DeckAction::Shuffle, None),
            None => return Vec::new(),
        };

        let mut effect = Effect::new(EffectKind::DeckManipulation { action }).with_target(target);
        if let Some(value) = value {
            effect = effect.with_value(value);
        }
        vec![effect]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectType, Filter, Stage, TargetCount};

    fn registry() -> ParserRegistry {
        ParserRegistry::with_default_rules()
    }

    #[test]
    fn test_search_basic_pokemon() {
        let clause = "自分の山札からたねポケモンを1枚選び、相手に見せて、手札に加える";
        let parser = SearchParser::new();
        assert!(parser.can_parse(clause));
        let effects = parser.parse(clause, &registry());
        let target = &effects[0].targets[0];
        assert_eq!(target.kind, TargetKind::Pokemon);
        assert_eq!(target.filters, vec![Filter::Stage(Stage::Basic)]);
        assert_eq!(target.location.kind, LocationType::Deck);
        assert!(target.location.reveal);
        assert_eq!(target.count, Some(TargetCount::Exactly(1)));
    }

    #[test]
    fn test_search_from_discard_up_to() {
        let effects = SearchParser::new().parse("自分のトラッシュから基本エネルギーを2枚まで選び、手札に加える", &registry());
        let target = &effects[0].targets[0];
        assert_eq!(target.kind, TargetKind::Energy);
        assert_eq!(target.location.kind, LocationType::Discard);
        assert_eq!(target.count, Some(TargetCount::Exactly(2)));
        assert!(effects[0].is_up_to);
    }

    #[test]
    fn test_bench_placement_look_at() {
        let effects = BenchPlacementParser::new().parse(
            "自分の山札を上から6枚見て、その中からたねポケモンを2枚まで選び、ベンチに出す",
            &registry(),
        );
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].effect_type(), EffectType::Place);
        assert_eq!(effects[0].kind, EffectKind::Place { look_at: Some(6) });
        assert!(effects[0].is_up_to);
        assert_eq!(effects[1].effect_type(), EffectType::Search);
    }

    #[test]
    fn test_discard_then_draw() {
        let effects = DiscardParser::new().parse("自分の手札を1枚トラッシュし、山札を2枚引く", &registry());
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].effect_type(), EffectType::Discard);
        assert_eq!(effects[0].targets[0].location.kind, LocationType::Hand);
        assert_eq!(effects[1].effect_type(), EffectType::Draw);
        assert_eq!(effects[1].value, Some(2));
    }

    #[test]
    fn test_random_opponent_discard() {
        let effects = DiscardParser::new().parse("相手の手札をオモテを見ないで1枚選び、トラッシュする", &registry());
        assert_eq!(effects[0].selection, SelectionMode::Random);
        assert_eq!(effects[0].targets[0].player, PlayerScope::Opponent);
    }

    #[test]
    fn test_draw_until_hand_size() {
        let effects = DrawParser::new().parse("手札が6枚になるように、山札を引く", &registry());
        assert_eq!(effects[0].kind, EffectKind::Draw { until_hand_size: true });
        assert_eq!(effects[0].value, Some(6));
    }

    #[test]
    fn test_hand_to_deck_both() {
        let effects = HandToDeckParser::new().parse("おたがいのプレイヤーは、それぞれ手札をすべて山札にもどして切る", &registry());
        assert_eq!(effects[0].targets[0].player, PlayerScope::Both);
        assert_eq!(
            effects[0].kind,
            EffectKind::HandToDeck {
                placement: DeckPlacement::ShuffleIn
            }
        );
    }

    #[test]
    fn test_deck_mill() {
        let effects = DeckManipulationParser::new().parse("相手の山札を上から2枚トラッシュする", &registry());
        assert_eq!(
            effects[0].kind,
            EffectKind::DeckManipulation {
                action: DeckAction::DiscardTop
            }
        );
        assert_eq!(effects[0].targets[0].player, PlayerScope::Opponent);
    }
}

//! Parser integration tests.
//!
//! Tests for full card texts going through normalization, segmentation,
//! annotation merging and the ordered rule registry.

use rust_tcg_effects::{
    parse_effect_text, ConditionKind, Effect, EffectKind, EffectParser, EffectType, LocationType,
    Modifier, ModifierScope, PlayerScope, Side, StatusKind, TargetCount,
};

// ============================================================================
// Annotations
// ============================================================================

/// Test that a bracketed bench note attaches to the damage clause before it
/// instead of producing its own effect.
#[test]
fn test_bench_note_merges_into_damage() {
    let effects =
        parse_effect_text("相手のベンチポケモン1匹にも、30ダメージ。［ベンチは弱点・抵抗力を計算しない。］");

    assert_eq!(effects.len(), 1);
    let effect = &effects[0];
    assert_eq!(effect.effect_type(), EffectType::Damage);
    assert_eq!(effect.value, Some(30));

    let target = &effect.targets[0];
    assert_eq!(target.player, PlayerScope::Opponent);
    assert_eq!(target.location.kind, LocationType::Bench);
    assert_eq!(target.count, Some(TargetCount::Exactly(1)));
    assert!(effect.modifiers.contains(&Modifier::ignore(ModifierScope::Effects)));
}

/// Test that a chooser note changes who picks the new Active Pokémon.
#[test]
fn test_switch_chooser_note() {
    let effects = parse_effect_text(
        "相手のバトルポケモンをベンチポケモンと入れ替える。［バトル場に出すポケモンは相手が選ぶ。］",
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].kind, EffectKind::Switch { chooser: Side::Opponent });
}

// ============================================================================
// Multi-effect texts
// ============================================================================

/// Test that one sentence can yield several effects in reading order.
#[test]
fn test_discard_then_draw() {
    let effects = parse_effect_text("自分の手札を1枚トラッシュし、山札を2枚引く。");

    let types: Vec<EffectType> = effects.iter().map(Effect::effect_type).collect();
    assert_eq!(types, vec![EffectType::Discard, EffectType::Draw]);
    assert_eq!(effects[0].targets[0].location.kind, LocationType::Hand);
    assert_eq!(effects[1].value, Some(2));
}

/// Test that sentences are parsed independently and concatenated.
#[test]
fn test_damage_then_status() {
    let effects = parse_effect_text("相手のバトルポケモンに30ダメージ。相手のバトルポケモンをマヒにする。");

    let types: Vec<EffectType> = effects.iter().map(Effect::effect_type).collect();
    assert_eq!(types, vec![EffectType::Damage, EffectType::Status]);
    assert_eq!(
        effects[1].kind,
        EffectKind::Status {
            status: StatusKind::Paralyzed
        }
    );
}

/// Test that full-width digits are read as numbers.
#[test]
fn test_full_width_digits() {
    let effects = parse_effect_text("相手のバトルポケモンに３０ダメージ。");
    assert_eq!(effects[0].value, Some(30));
}

// ============================================================================
// Conditions
// ============================================================================

/// Test that a coin-flip prefix becomes a condition on the bonus damage.
#[test]
fn test_coin_flip_bonus() {
    let effects = parse_effect_text("コインを1回投げオモテなら、30ダメージ追加。");

    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].effect_type(), EffectType::DamageModifier);
    assert_eq!(effects[0].conditions[0].kind, ConditionKind::CoinFlip);
}

/// Test that a bench-count guard keeps its threshold and owner.
#[test]
fn test_bench_count_guard() {
    let effects = parse_effect_text("自分のベンチポケモンが3匹以上なら、50ダメージ追加。");
    let condition = &effects[0].conditions[0];

    assert_eq!(condition.kind, ConditionKind::BenchCount);
    assert_eq!(condition.value, Some(3));
    assert_eq!(condition.target.as_ref().unwrap().player, PlayerScope::SelfSide);
}

/// Test that a tails sentence becomes the failure branch of the flip in the
/// sentence before it.
#[test]
fn test_heads_and_tails_share_one_flip() {
    let effects = parse_effect_text(
        "コインを1回投げオモテなら、相手のバトルポケモンをマヒにする。ウラなら、相手のバトルポケモンをやけどにする。",
    );

    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].kind, EffectKind::Status { status: StatusKind::Paralyzed });
    let flip = &effects[0].conditions[0];
    assert_eq!(flip.kind, ConditionKind::CoinFlip);
    assert_eq!(flip.on_failure.len(), 1);
    assert_eq!(flip.on_failure[0].kind, EffectKind::Status { status: StatusKind::Burned });
}

/// Test that every clause of a coin-flip body is gated by the flip.
#[test]
fn test_coin_flip_gates_whole_body() {
    let effects = parse_effect_text("コインを1回投げオモテなら、相手のバトルポケモンをマヒにして、山札を1枚引く。");

    assert_eq!(effects.len(), 1);
    let flip = &effects[0].conditions[0];
    assert_eq!(flip.kind, ConditionKind::CoinFlip);
    let types: Vec<EffectType> = flip.on_success.iter().map(Effect::effect_type).collect();
    assert_eq!(types, vec![EffectType::Status, EffectType::Draw]);
}

// ============================================================================
// Edge cases
// ============================================================================

/// Test that blank or punctuation-only text yields nothing.
#[test]
fn test_blank_text() {
    assert!(parse_effect_text("").is_empty());
    assert!(parse_effect_text("   ").is_empty());
    assert!(EffectParser::new().parse_with_report("、。").clauses.is_empty());
}

/// Test that the report names the clauses no rule claimed.
#[test]
fn test_report_lists_misses() {
    let report = EffectParser::new().parse_with_report("山札を2枚引く。このワザは失敗。");

    assert_eq!(report.clauses.len(), 2);
    assert_eq!(report.clauses[0].parser, Some("draw"));
    let misses: Vec<&str> = report.misses().map(|c| c.segment.text.as_str()).collect();
    assert_eq!(misses, vec!["このワザは失敗"]);
    assert!(!report.is_complete());
}

/// Test that parsed effects survive a trip through JSON.
#[test]
fn test_effects_serialize() {
    let effects = parse_effect_text("自分の手札を1枚トラッシュし、山札を2枚引く。");
    let json = serde_json::to_string(&effects).unwrap();
    let back: Vec<Effect> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, effects);
}

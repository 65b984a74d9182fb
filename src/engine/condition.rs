//! Condition evaluation.
//!
//! Conditions are control flow. A passing chain may substitute its
//! `on_success` continuation for the effect's own handler, a failing one
//! its `on_failure` continuation.
//!
//! Chains are ANDed and short-circuit on the first failure. When every
//! condition passes, the continuation is the `on_success` of the LAST
//! condition in the chain.

use crate::effects::{Condition, ConditionKind, Effect, LocationType, PlayerScope, Target};
use crate::state::{CardInstance, GameState, PlayerBoard, PokemonState};

use super::context::ExecutionContext;
use super::message::{Message, MessageKind};
use super::resolver::TargetResolver;

/// Result of evaluating one condition or a chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionOutcome {
    pub passed: bool,
    pub success_effects: Vec<Effect>,
    pub failure_effects: Vec<Effect>,
    pub messages: Vec<Message>,
}

impl ConditionOutcome {
    fn new(passed: bool, condition: &Condition) -> Self {
        Self {
            passed,
            success_effects: condition.on_success.clone(),
            failure_effects: condition.on_failure.clone(),
            messages: Vec::new(),
        }
    }
}

/// Evaluate a single condition.
pub fn evaluate_condition(
    state: &GameState,
    condition: &Condition,
    ctx: &mut ExecutionContext,
) -> ConditionOutcome {
    let mut messages = Vec::new();
    let passed = match &condition.kind {
        ConditionKind::CoinFlip => coin_flip(condition, ctx, &mut messages),
        ConditionKind::CardCount => {
            let target = target_or(condition, PlayerScope::SelfSide, LocationType::Hand);
            compare(condition, count(state, &target))
        }
        ConditionKind::PrizeCount => {
            let target = target_or(condition, PlayerScope::SelfSide, LocationType::Prize);
            let remaining: u32 = target
                .player
                .sides()
                .iter()
                .map(|&side| state.board(side).prizes.remaining)
                .sum();
            compare(condition, i64::from(remaining))
        }
        ConditionKind::BenchCount => {
            let target = target_or(condition, PlayerScope::SelfSide, LocationType::Bench);
            compare(condition, count(state, &target))
        }
        ConditionKind::TurnCount => compare(condition, i64::from(state.turn_number)),
        ConditionKind::HpRemaining => {
            first_pokemon(state, condition).is_some_and(|p| compare(condition, i64::from(p.hp)))
        }
        ConditionKind::HasEnergy => first_pokemon(state, condition).is_some_and(|p| {
            compare_or_one(condition, p.attached_energy.len() as i64)
        }),
        ConditionKind::HasDamage => first_pokemon(state, condition)
            .is_some_and(|p| compare_or_one(condition, i64::from(p.damage_counters()))),
        ConditionKind::Status => first_pokemon(state, condition).is_some_and(|p| {
            p.status
                .is_some_and(|s| condition.status.map_or(true, |wanted| s.kind == wanted))
        }),
        ConditionKind::IsEx => first_card(state, condition).is_some_and(is_ex),
        ConditionKind::IsGx => first_card(state, condition).is_some_and(|c| c.mentions("GX")),
        ConditionKind::IsV => first_card(state, condition).is_some_and(is_v),
        ConditionKind::IsBasic => {
            first_card(state, condition).is_some_and(|c| c.has_subtype("basic"))
        }
        ConditionKind::NameContains => {
            let target = target_or(condition, PlayerScope::SelfSide, LocationType::Field);
            let needle = condition.text.as_deref().unwrap_or_default();
            TargetResolver::new(state)
                .candidates(&target)
                .pokemon
                .iter()
                .any(|p| p.pokemon.card.name.contains(needle))
        }
        ConditionKind::Other(kind) => {
            let passed = ctx.config.unknown_condition.passes();
            log::warn!("unknown condition kind '{kind}', treated as {}", if passed { "passed" } else { "failed" });
            passed
        }
    };

    let mut outcome = ConditionOutcome::new(passed, condition);
    outcome.messages = messages;
    outcome
}

/// Evaluate a chain with AND semantics.
pub fn evaluate_conditions(
    state: &GameState,
    conditions: &[Condition],
    ctx: &mut ExecutionContext,
) -> ConditionOutcome {
    let mut messages = Vec::new();
    let mut success_effects = Vec::new();

    for condition in conditions {
        let outcome = evaluate_condition(state, condition, ctx);
        messages.extend(outcome.messages);
        if !outcome.passed {
            return ConditionOutcome {
                passed: false,
                success_effects: Vec::new(),
                failure_effects: outcome.failure_effects,
                messages,
            };
        }
        success_effects = outcome.success_effects;
    }

    ConditionOutcome {
        passed: true,
        success_effects,
        failure_effects: Vec::new(),
        messages,
    }
}

// === Kinds ===

fn coin_flip(condition: &Condition, ctx: &mut ExecutionContext, messages: &mut Vec<Message>) -> bool {
    let coins = u32::try_from(condition.value.unwrap_or(1)).unwrap_or(0);
    let heads = ctx.rng.flip_coins(coins);
    let required = condition.values.first().copied().unwrap_or(1);

    messages.push(Message::new(
        MessageKind::Coin,
        if coins == 1 {
            format!("Coin flip: {}", if heads == 1 { "heads" } else { "tails" })
        } else {
            format!("Flipped {coins} coins: {heads} heads")
        },
    ));

    match condition.comparison {
        Some(comparison) => comparison.compare(i64::from(heads), required),
        None => i64::from(heads) >= required,
    }
}

fn compare(condition: &Condition, observed: i64) -> bool {
    condition
        .comparison_or_default()
        .compare(observed, condition.value.unwrap_or(0))
}

/// Presence-style checks: at least one unless told otherwise.
fn compare_or_one(condition: &Condition, observed: i64) -> bool {
    condition
        .comparison_or_default()
        .compare(observed, condition.value.unwrap_or(1))
}

// === Observations ===

fn target_or(condition: &Condition, player: PlayerScope, location: LocationType) -> Target {
    condition.target.clone().unwrap_or_else(|| match location {
        LocationType::Active | LocationType::Bench | LocationType::Field => {
            Target::pokemon(player, location)
        }
        _ => Target::cards(player, location),
    })
}

/// Size of a zone. Unfiltered counts use public sizes, so hidden zones
/// still count.
fn count(state: &GameState, target: &Target) -> i64 {
    if !target.filters.is_empty() {
        return TargetResolver::new(state).candidates(target).len() as i64;
    }
    target
        .player
        .sides()
        .iter()
        .map(|&side| zone_size(state.board(side), target.location.kind) as i64)
        .sum()
}

fn zone_size(board: &PlayerBoard, zone: LocationType) -> usize {
    match zone {
        LocationType::Hand => board.hand.len(),
        LocationType::Deck => board.deck.size as usize,
        LocationType::Discard => board.discard.len(),
        LocationType::Prize => board.prizes.remaining as usize,
        LocationType::Bench => board.bench_count(),
        LocationType::Active => usize::from(board.active.is_some()),
        LocationType::Field => board.field().count(),
    }
}

fn first_pokemon<'s>(state: &'s GameState, condition: &Condition) -> Option<&'s PokemonState> {
    let target = target_or(condition, PlayerScope::SelfSide, LocationType::Active);
    let found = TargetResolver::new(state).candidates(&target).pokemon.into_iter().next()?;
    state.board(found.side).pokemon(found.slot)
}

fn first_card<'s>(state: &'s GameState, condition: &Condition) -> Option<&'s CardInstance> {
    first_pokemon(state, condition).map(|p| &p.card)
}

fn is_ex(card: &CardInstance) -> bool {
    card.name.ends_with("ex") || card.name.ends_with("EX") || card.has_subtype("ex")
}

fn is_v(card: &CardInstance) -> bool {
    ["V", "VMAX", "VSTAR"]
        .iter()
        .any(|suffix| card.name.ends_with(&format!(" {suffix}")) || card.has_subtype(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Comparison;
    use crate::state::StatusKind;

    fn mon(name: &str, hp: u32) -> PokemonState {
        PokemonState::new(CardInstance::pokemon(name, name, hp), hp)
    }

    fn state() -> GameState {
        let player = PlayerBoard::player()
            .with_active(mon("Pikachu", 70).with_damage(20))
            .with_bench(0, mon("Eevee", 60))
            .with_bench(
                2,
                PokemonState::new(CardInstance::pokemon("z1", "Zapdos ex", 200).with_subtype("ex"), 200),
            );
        let opponent = PlayerBoard::opponent()
            .with_active(mon("Charizard ex", 330).with_status(StatusKind::Burned))
            .with_hand_count(4);
        GameState::new(player, opponent).with_turn(3)
    }

    fn eval(condition: Condition) -> bool {
        let mut ctx = ExecutionContext::new(7);
        evaluate_condition(&state(), &condition, &mut ctx).passed
    }

    #[test]
    fn test_bench_count_default_at_least() {
        assert!(eval(Condition::new(ConditionKind::BenchCount).with_value(2)));
        assert!(!eval(Condition::new(ConditionKind::BenchCount).with_value(3)));
    }

    #[test]
    fn test_opponent_hand_count_is_public() {
        let condition = Condition::new(ConditionKind::CardCount)
            .with_value(4)
            .with_comparison(Comparison::Equal)
            .with_target(Target::cards(PlayerScope::Opponent, LocationType::Hand));
        assert!(eval(condition));
    }

    #[test]
    fn test_turn_count() {
        let condition = Condition::new(ConditionKind::TurnCount)
            .with_value(1)
            .with_comparison(Comparison::Equal);
        assert!(!eval(condition));
    }

    #[test]
    fn test_has_damage_and_absence() {
        assert!(eval(Condition::new(ConditionKind::HasDamage)));
        let none = Condition::new(ConditionKind::HasDamage)
            .with_value(0)
            .with_comparison(Comparison::Equal);
        assert!(!eval(none));
    }

    #[test]
    fn test_status_specific_and_any() {
        let target = Target::opponent_active();
        assert!(eval(Condition::new(ConditionKind::Status).with_target(target.clone())));
        assert!(eval(
            Condition::new(ConditionKind::Status)
                .with_status(StatusKind::Burned)
                .with_target(target.clone())
        ));
        assert!(!eval(
            Condition::new(ConditionKind::Status)
                .with_status(StatusKind::Asleep)
                .with_target(target)
        ));
        assert!(!eval(Condition::new(ConditionKind::Status)));
    }

    #[test]
    fn test_is_ex_and_name_contains() {
        assert!(eval(Condition::new(ConditionKind::IsEx).with_target(Target::opponent_active())));
        assert!(!eval(Condition::new(ConditionKind::IsEx)));
        assert!(eval(Condition::new(ConditionKind::NameContains).with_text("Zapdos")));
        assert!(!eval(Condition::new(ConditionKind::NameContains).with_text("Mew")));
    }

    #[test]
    fn test_hp_remaining() {
        let condition = Condition::new(ConditionKind::HpRemaining)
            .with_value(50)
            .with_comparison(Comparison::Equal);
        assert!(eval(condition));
    }

    #[test]
    fn test_unknown_kind_follows_policy() {
        use crate::core::{EngineConfig, UnknownConditionPolicy};

        let condition = Condition::new(ConditionKind::Other("moon-phase".into()));
        assert!(eval(condition.clone()));

        let mut ctx = ExecutionContext::new(1)
            .with_config(EngineConfig::default().with_unknown_condition(UnknownConditionPolicy::Fail));
        assert!(!evaluate_condition(&state(), &condition, &mut ctx).passed);
    }

    #[test]
    fn test_coin_flip_tails_is_complement() {
        for seed in 0..20 {
            let mut heads_ctx = ExecutionContext::new(seed);
            let mut tails_ctx = ExecutionContext::new(seed);
            let heads = evaluate_condition(&state(), &Condition::coin_flip(1, 1), &mut heads_ctx);
            let tails = evaluate_condition(&state(), &Condition::coin_flip_tails(), &mut tails_ctx);
            assert_ne!(heads.passed, tails.passed);
            assert_eq!(heads.messages[0].kind, MessageKind::Coin);
        }
    }

    #[test]
    fn test_chain_short_circuits() {
        let draw = Effect::draw(1, PlayerScope::SelfSide);
        let failing = Condition::new(ConditionKind::BenchCount)
            .with_value(5)
            .on_failure([draw.clone()]);
        let passing = Condition::new(ConditionKind::TurnCount).on_success([draw]);

        let mut ctx = ExecutionContext::new(1);
        let outcome = evaluate_conditions(&state(), &[failing, passing], &mut ctx);
        assert!(!outcome.passed);
        assert!(outcome.success_effects.is_empty());
        assert_eq!(outcome.failure_effects.len(), 1);
    }

    #[test]
    fn test_chain_last_success_wins() {
        let first = Condition::new(ConditionKind::TurnCount).on_success([Effect::draw(1, PlayerScope::SelfSide)]);
        let last = Condition::new(ConditionKind::TurnCount).on_success([Effect::draw(3, PlayerScope::SelfSide)]);

        let mut ctx = ExecutionContext::new(1);
        let outcome = evaluate_conditions(&state(), &[first, last], &mut ctx);
        assert!(outcome.passed);
        assert_eq!(outcome.success_effects.len(), 1);
        assert_eq!(outcome.success_effects[0].value, Some(3));
    }
}

//! Damage, damage modifiers, healing, status conditions and damage counters.

use futures::future::{BoxFuture, FutureExt};

use super::{apply_damage, chosen_pokemon, knock_out, targets_or, HandlerOutcome};
use crate::effects::{
    CounterAction, DamageScaling, Effect, EffectKind, HealUnit, ModifyOperation, PlayerScope,
    Target, Timing,
};
use crate::engine::context::ExecutionContext;
use crate::engine::message::{Message, MessageKind};
use crate::state::{GameState, PlayerBoard, StatusCondition, HP_PER_COUNTER};

// === Damage ===

pub(super) fn damage<'a>(
    state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Damage { scaling } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let amount = amount(&state, effect.value, *scaling, ctx, &mut messages);
        deal(state, effect, amount, ctx, messages).await
    }
    .boxed()
}

pub(super) fn damage_modifier<'a>(
    state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::DamageModifier { operation, scaling } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let value = effect.value.unwrap_or(0);

        if let Some(timing) = effect.timing.filter(|t| *t != Timing::Immediate) {
            let sign = match operation {
                ModifyOperation::Add => '+',
                ModifyOperation::Subtract => '-',
            };
            messages.push(Message::info(format!(
                "Damage {sign}{value} applies {}",
                timing.describe()
            )));
            return HandlerOutcome::new(state, messages);
        }

        match operation {
            ModifyOperation::Subtract => {
                messages.push(Message::info(format!("Damage reduced by {value}")));
                HandlerOutcome::new(state, messages)
            }
            ModifyOperation::Add => {
                let amount = amount(&state, effect.value, *scaling, ctx, &mut messages);
                deal(state, effect, amount, ctx, messages).await
            }
        }
    }
    .boxed()
}

/// Base value times the scaling count, if any.
fn amount(
    state: &GameState,
    value: Option<u32>,
    scaling: Option<DamageScaling>,
    ctx: &mut ExecutionContext,
    messages: &mut Vec<Message>,
) -> u32 {
    let base = value.unwrap_or(0);
    match scaling {
        Some(scaling) if base > 0 => base * scale(state, scaling, ctx, messages),
        _ => base,
    }
}

fn scale(
    state: &GameState,
    scaling: DamageScaling,
    ctx: &mut ExecutionContext,
    messages: &mut Vec<Message>,
) -> u32 {
    match scaling {
        DamageScaling::BenchPokemon { player } => per_side(state, player, PlayerBoard::bench_count),
        DamageScaling::AttachedEnergy { player } => per_side(state, player, |b| {
            b.active.as_ref().map_or(0, |p| p.attached_energy.len())
        }),
        DamageScaling::DamageCounters { player } => per_side(state, player, |b| {
            b.active.as_ref().map_or(0, |p| p.damage_counters() as usize)
        }),
        DamageScaling::HandSize { player } => per_side(state, player, |b| b.hand.len()),
        DamageScaling::CoinHeads { coins } => {
            let heads = ctx.rng.flip_coins(coins);
            messages.push(Message::new(
                MessageKind::Coin,
                format!("Flipped {coins} coins: {heads} heads"),
            ));
            heads
        }
    }
}

/// Sum of a per-board count over the sides of a scope.
fn per_side(state: &GameState, player: PlayerScope, count: impl Fn(&PlayerBoard) -> usize) -> u32 {
    player
        .sides()
        .iter()
        .map(|&side| count(state.board(side)) as u32)
        .sum()
}

async fn deal(
    mut state: GameState,
    effect: &Effect,
    amount: u32,
    ctx: &mut ExecutionContext,
    mut messages: Vec<Message>,
) -> HandlerOutcome {
    if amount == 0 {
        return HandlerOutcome::new(state, messages);
    }
    for target in targets_or(effect, Target::opponent_active()) {
        let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
        for found in chosen {
            apply_damage(&mut state, found.side, found.slot, amount, MessageKind::Damage, &mut messages);
        }
    }
    HandlerOutcome::new(state, messages)
}

// === Heal ===

pub(super) fn heal<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Heal {
            unit,
            all,
            cure_status,
        } = &effect.kind
        else {
            return HandlerOutcome::new(state, messages);
        };
        let per_unit = match unit {
            HealUnit::Hp => 1,
            HealUnit::DamageCounters => HP_PER_COUNTER,
        };
        let amount = effect.value.unwrap_or(0) * per_unit;

        for target in targets_or(effect, Target::self_active()) {
            let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
            for found in chosen {
                let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) else {
                    continue;
                };
                let label = found.side.label();

                if *cure_status {
                    if let Some(status) = pokemon.status.take() {
                        messages.push(Message::new(
                            MessageKind::Status,
                            format!("{label} {} recovered from {}", pokemon.card.name, status.kind),
                        ));
                    }
                }

                let healed = if *all { pokemon.damage } else { amount.min(pokemon.damage) };
                if healed > 0 {
                    pokemon.set_damage(pokemon.damage - healed);
                    messages.push(Message::new(
                        MessageKind::Heal,
                        format!("{label} {} healed {healed} HP", pokemon.card.name),
                    ));
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Status ===

pub(super) fn status<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Status { status } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };

        for target in targets_or(effect, Target::opponent_active()) {
            let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
            for found in chosen {
                let label = found.side.label();
                let name = &found.pokemon.card.name;
                if found.slot.is_bench() && status.is_active_only() {
                    messages.push(Message::info(format!(
                        "{label} {name} is on the Bench and cannot become {status}"
                    )));
                    continue;
                }
                if let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) {
                    pokemon.status = Some(StatusCondition::new(*status));
                    messages.push(Message::new(
                        MessageKind::Status,
                        format!("{label} {name} is now {status}"),
                    ));
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Damage counters ===

pub(super) fn counter<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Counter { action } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let counters = effect.value.unwrap_or(0);
        if counters == 0 {
            return HandlerOutcome::new(state, messages);
        }

        match action {
            CounterAction::Place => {
                for target in targets_or(effect, Target::opponent_active()) {
                    let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
                    for found in chosen {
                        place_counters(&mut state, &found, counters, &mut messages);
                    }
                }
            }
            CounterAction::Remove => {
                for target in targets_or(effect, Target::self_active()) {
                    let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
                    for found in chosen {
                        let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) else {
                            continue;
                        };
                        let removed = (counters * HP_PER_COUNTER).min(pokemon.damage) / HP_PER_COUNTER;
                        if removed > 0 {
                            pokemon.set_damage(pokemon.damage - removed * HP_PER_COUNTER);
                            messages.push(Message::new(
                                MessageKind::Counter,
                                format!(
                                    "Removed {removed} damage counters from {} {}",
                                    found.side.label(),
                                    pokemon.card.name
                                ),
                            ));
                        }
                    }
                }
            }
            CounterAction::Move => {
                let (Some(from), Some(to)) = (effect.targets.first(), effect.targets.get(1)) else {
                    messages.push(Message::info("Nowhere to move damage counters"));
                    return HandlerOutcome::new(state, messages);
                };
                let source = chosen_pokemon(&state, from, effect, ctx).await.into_iter().next();
                let destination = chosen_pokemon(&state, to, effect, ctx).await.into_iter().next();
                let (Some(source), Some(destination)) = (source, destination) else {
                    messages.push(Message::info("Nowhere to move damage counters"));
                    return HandlerOutcome::new(state, messages);
                };

                let moved = counters.min(source.pokemon.damage_counters());
                if moved == 0 || (source.side, source.slot) == (destination.side, destination.slot) {
                    return HandlerOutcome::new(state, messages);
                }
                if let Some(pokemon) = state.board_mut(source.side).pokemon_mut(source.slot) {
                    pokemon.set_damage(pokemon.damage - moved * HP_PER_COUNTER);
                }
                place_counters(&mut state, &destination, moved, &mut messages);
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

fn place_counters(
    state: &mut GameState,
    found: &crate::engine::resolver::ResolvedPokemon,
    counters: u32,
    messages: &mut Vec<Message>,
) {
    let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) else {
        return;
    };
    messages.push(Message::new(
        MessageKind::Counter,
        format!(
            "Placed {counters} damage counters on {} {}",
            found.side.label(),
            pokemon.card.name
        ),
    ));

    let damage = pokemon.damage + counters * HP_PER_COUNTER;
    if damage >= pokemon.max_hp {
        knock_out(state, found.side, found.slot, messages);
    } else {
        pokemon.set_damage(damage);
    }
}

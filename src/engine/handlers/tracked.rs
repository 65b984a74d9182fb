//! Lasting effects: abilities, restrictions, retreat changes, trainer
//! blocks, damage prevention and special plays.
//!
//! These handlers leave the board alone. Each records a `TrackedEffect` on
//! the state and logs it. Effects limited to the acting player's current
//! turn also clear the matching turn flag.

use futures::future::{BoxFuture, FutureExt};

use super::{target_sides, timing_or, HandlerOutcome};
use crate::effects::{
    AbilityUsage, Effect, EffectKind, PlayerScope, PreventionKind, RestrictionKind, RetreatChange,
    SpecialPlayKind, Timing, TrainerKind,
};
use crate::engine::context::ExecutionContext;
use crate::engine::message::{subject, Message, MessageKind};
use crate::engine::resolver::TargetResolver;
use crate::state::{GameState, Side, TrackedEffect, TrackedKind};

/// Name of the first Pokémon the effect's target names on `side`.
fn source_name(state: &GameState, effect: &Effect, side: Side) -> Option<String> {
    let mut target = effect.primary_target()?.clone();
    target.player = PlayerScope::of(side);
    TargetResolver::new(state)
        .resolve(&target)
        .pokemon
        .into_iter()
        .next()
        .map(|found| found.pokemon.card.name)
}

fn track(state: &mut GameState, effect: &Effect, side: Side, kind: TrackedKind, duration: Timing) {
    let mut tracked = TrackedEffect::new(side, kind, duration);
    if let Some(name) = source_name(state, effect, side) {
        tracked = tracked.with_source(name);
    }
    state.track(tracked);
}

// === Ability ===

pub(super) fn ability<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Ability { name, usage } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let label = name.as_deref().unwrap_or("Ability");

        match usage {
            AbilityUsage::Passive => {
                messages.push(Message::new(MessageKind::Ability, format!("{label} is in effect")));
            }
            AbilityUsage::Unlimited => {
                messages.push(Message::new(MessageKind::Ability, format!("You used {label}")));
            }
            AbilityUsage::OncePerTurn => {
                let used = state.tracked_for(Side::Player).any(|e| {
                    matches!(&e.kind, TrackedKind::AbilityUsed { name: used } if used == name)
                });
                if used {
                    messages.push(Message::info(format!("{label} was already used this turn")));
                } else {
                    let kind = TrackedKind::AbilityUsed { name: name.clone() };
                    state.track(TrackedEffect::new(Side::Player, kind, Timing::ThisTurn).with_source(label));
                    messages.push(Message::new(MessageKind::Ability, format!("You used {label}")));
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Restriction ===

pub(super) fn restriction<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Restriction { restriction } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let duration = timing_or(effect, Timing::OpponentNextTurn);

        for &side in target_sides(effect, Side::Opponent) {
            track(
                &mut state,
                effect,
                side,
                TrackedKind::Restriction {
                    restriction: restriction.clone(),
                },
                duration,
            );
            if side == Side::Player && duration == Timing::ThisTurn {
                match restriction {
                    RestrictionKind::CannotAttack => state.can_attack = false,
                    RestrictionKind::CannotRetreat => state.can_retreat = false,
                    RestrictionKind::CannotUseAttack { .. } => {}
                }
            }
            messages.push(Message::new(
                MessageKind::Restriction,
                format!(
                    "{} Active Pokémon {restriction} {}",
                    side.label(),
                    duration.describe()
                ),
            ));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Retreat cost ===

pub(super) fn retreat_modifier<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::RetreatModifier { change } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let duration = timing_or(effect, Timing::ThisTurn);
        let amount = effect.value;

        for &side in target_sides(effect, Side::Player) {
            let kind = TrackedKind::RetreatModifier {
                change: *change,
                amount,
            };
            track(&mut state, effect, side, kind, duration);
            let n = amount.unwrap_or(1);
            let what = match change {
                RetreatChange::Reduce => format!("retreat cost is reduced by {n}"),
                RetreatChange::Increase => format!("retreat cost is increased by {n}"),
                RetreatChange::RemoveAll => "retreat cost is removed".to_string(),
            };
            messages.push(Message::new(
                MessageKind::Retreat,
                format!("{} Pokémon's {what} {}", side.label(), duration.describe()),
            ));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Trainer block ===

pub(super) fn trainer_block<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::TrainerBlock { blocked } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        if blocked.is_empty() {
            return HandlerOutcome::new(state, messages);
        }
        let duration = timing_or(effect, Timing::OpponentNextTurn);
        let kinds = blocked.iter().map(|k| k.label()).collect::<Vec<_>>().join(" or ");

        for &side in target_sides(effect, Side::Opponent) {
            state.track(TrackedEffect::new(
                side,
                TrackedKind::TrainerBlock {
                    blocked: blocked.clone(),
                },
                duration,
            ));
            if side == Side::Player
                && duration == Timing::ThisTurn
                && blocked.contains(&TrainerKind::Supporter)
            {
                state.can_play_supporter = false;
            }
            messages.push(Message::new(
                MessageKind::TrainerBlock,
                format!("{} cannot play {kinds} cards {}", subject(side), duration.describe()),
            ));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Prevention ===

pub(super) fn prevention<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Prevention { prevention } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let duration = timing_or(effect, Timing::OpponentNextTurn);

        for &side in target_sides(effect, Side::Player) {
            let who = source_name(&state, effect, side)
                .map_or_else(|| format!("{} Pokémon", side.label()), |name| format!("{} {name}", side.label()));
            track(
                &mut state,
                effect,
                side,
                TrackedKind::Prevention {
                    prevention: *prevention,
                    amount: effect.value,
                },
                duration,
            );
            let what = match prevention {
                PreventionKind::AllDamage => "is protected from all damage".to_string(),
                PreventionKind::DamageAndEffects => "is protected from damage and effects".to_string(),
                PreventionKind::Effects => "is protected from attack effects".to_string(),
                PreventionKind::ReduceDamage => {
                    format!("takes {} less damage", effect.value.unwrap_or(0))
                }
            };
            messages.push(Message::new(
                MessageKind::Prevention,
                format!("{who} {what} {}", duration.describe()),
            ));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Special play ===

pub(super) fn special_play<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::SpecialPlay { play } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let duration = timing_or(effect, Timing::ThisTurn);

        for &side in target_sides(effect, Side::Player) {
            state.track(TrackedEffect::new(side, TrackedKind::SpecialPlay { play: *play }, duration));
            let text = match play {
                SpecialPlayKind::EvolveFromDeck => "may evolve a Pokémon from the deck",
                SpecialPlayKind::EvolveImmediately => "may evolve a Pokémon right away",
                SpecialPlayKind::PlayOnFirstTurn => "may play this card on the first turn",
            };
            messages.push(Message::new(MessageKind::SpecialPlay, format!("{} {text}", subject(side))));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

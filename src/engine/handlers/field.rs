//! Board rearrangement: switching, energy, devolution and copied attacks.

use futures::future::{BoxFuture, FutureExt};

use super::{
    card_names, chosen_pokemon, knock_out, possessive, select, shuffle_deck, target_sides,
    targets_or, wanted, HandlerOutcome,
};
use crate::effects::{
    Effect, EffectKind, EnergyAction, Filter, LocationType, PlayerScope, Target, TargetKind,
};
use crate::engine::context::{ChoiceKind, ExecutionContext};
use crate::engine::message::{subject, Message, MessageKind};
use crate::engine::resolver::ResolvedPokemon;
use crate::state::{CardInstance, GameState, Side, Slot};

// === Switch ===

pub(super) fn switch<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Switch { chooser } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };

        for &side in target_sides(effect, Side::Player) {
            let bench: Vec<(usize, String)> = state
                .board(side)
                .bench_pokemon()
                .map(|(i, p)| (i, p.card.name.clone()))
                .collect();
            if bench.is_empty() {
                messages.push(Message::info(format!("{} has no Benched Pokémon", subject(side))));
                continue;
            }

            let labels = bench.iter().map(|(i, name)| format!("{name} (Bench {})", i + 1)).collect();
            let prompt = format!("Choose {} new Active Pokémon", possessive(side));
            let picked = select(ctx, *chooser, effect, ChoiceKind::BenchSlot, prompt, labels, Some(1)).await;
            let Some(&pick) = picked.first() else {
                continue;
            };
            let (index, incoming_name) = &bench[pick];

            let board = state.board_mut(side);
            let incoming = board.take_pokemon(Slot::Bench(*index));
            let mut outgoing = board.put_pokemon(Slot::Active, incoming);
            let text = match outgoing.as_mut() {
                Some(old) => {
                    // Leaving the Active Spot clears paralysis, sleep and confusion.
                    if old.status.is_some_and(|s| s.kind.is_active_only()) {
                        old.status = None;
                    }
                    format!("{} {} switched with {incoming_name}", side.label(), old.card.name)
                }
                None => format!("{} {incoming_name} moved to the Active Spot", side.label()),
            };
            board.put_pokemon(Slot::Bench(*index), outgoing);
            messages.push(Message::new(MessageKind::Switch, text));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Energy ===

pub(super) fn energy<'a>(
    state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let EffectKind::Energy {
            action,
            energy_type,
            source,
        } = &effect.kind
        else {
            return HandlerOutcome::new(state, Vec::new());
        };
        let energy_type = energy_type.as_deref();

        match action {
            EnergyAction::Attach => {
                let zone = source.map_or(LocationType::Hand, |l| l.kind);
                let shuffle = source.is_some_and(|l| l.shuffle);
                attach(state, effect, energy_type, zone, shuffle, ctx).await
            }
            EnergyAction::Discard => discard_attached(state, effect, energy_type, ctx).await,
            EnergyAction::Move => move_attached(state, effect, energy_type, ctx).await,
        }
    }
    .boxed()
}

fn energy_matches(card: &CardInstance, energy_type: Option<&str>) -> bool {
    energy_type.map_or(true, |t| card.name.contains(t))
}

async fn recipients(state: &GameState, effect: &Effect, ctx: &mut ExecutionContext) -> Vec<ResolvedPokemon> {
    let mut found = Vec::new();
    for target in targets_or(effect, Target::self_active()) {
        found.extend(chosen_pokemon(state, &target, effect, ctx).await);
    }
    found
}

/// Attach energy cards from one of the player's zones, spreading them over
/// the recipients in turn.
async fn attach(
    mut state: GameState,
    effect: &Effect,
    energy_type: Option<&str>,
    zone: LocationType,
    shuffle: bool,
    ctx: &mut ExecutionContext,
) -> HandlerOutcome {
    let mut messages = Vec::new();
    let recipients = recipients(&state, effect, ctx).await;
    if recipients.is_empty() {
        messages.push(Message::info("No Pokémon to attach Energy to"));
        return HandlerOutcome::new(state, messages);
    }

    let mut pool = Target::new(TargetKind::Energy, PlayerScope::SelfSide, zone);
    if let Some(t) = energy_type {
        pool = pool.with_filter(Filter::EnergyType(t.to_string()));
    }
    let needed = wanted(effect, None);
    let cards = super::cards::gather(&mut state, effect, &pool, Side::Player, None, needed, ctx).await;

    if cards.is_empty() {
        messages.push(Message::info(format!("You have no matching Energy in your {}", zone_label(zone))));
    }
    for (i, card) in cards.into_iter().enumerate() {
        let to = &recipients[i % recipients.len()];
        let Some(pokemon) = state.board_mut(to.side).pokemon_mut(to.slot) else {
            state.board_mut(Side::Player).discard.push_back(card);
            continue;
        };
        messages.push(Message::new(
            MessageKind::Energy,
            format!("You attached {} to {} {}", card.name, to.side.label(), pokemon.card.name),
        ));
        pokemon.attached_energy.push_back(card);
    }

    if shuffle && zone == LocationType::Deck {
        shuffle_deck(&mut state, Side::Player, ctx, &mut messages);
    }
    HandlerOutcome::new(state, messages)
}

const fn zone_label(zone: LocationType) -> &'static str {
    match zone {
        LocationType::Deck => "deck",
        LocationType::Discard => "discard pile",
        _ => "hand",
    }
}

/// Pick attached energy on one Pokémon. Returns indices into
/// `attached_energy`, highest first so they can be removed in order.
async fn pick_attached(
    found: &ResolvedPokemon,
    effect: &Effect,
    energy_type: Option<&str>,
    ctx: &mut ExecutionContext,
) -> Vec<usize> {
    let eligible: Vec<usize> = found
        .pokemon
        .attached_energy
        .iter()
        .enumerate()
        .filter(|(_, card)| energy_matches(card, energy_type))
        .map(|(i, _)| i)
        .collect();
    let labels = eligible
        .iter()
        .map(|&i| found.pokemon.attached_energy[i].name.clone())
        .collect();
    let prompt = format!("Choose Energy on {} {}", found.side.label(), found.pokemon.card.name);
    let picked = select(ctx, Side::Player, effect, ChoiceKind::Energy, prompt, labels, wanted(effect, None)).await;

    let mut indices: Vec<usize> = picked.into_iter().map(|p| eligible[p]).collect();
    indices.sort_unstable_by(|a, b| b.cmp(a));
    indices
}

fn detach(state: &mut GameState, found: &ResolvedPokemon, indices: &[usize]) -> Vec<CardInstance> {
    let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) else {
        return Vec::new();
    };
    let mut removed = Vec::with_capacity(indices.len());
    for &i in indices {
        if i < pokemon.attached_energy.len() {
            removed.push(pokemon.attached_energy.remove(i));
        }
    }
    removed.reverse();
    removed
}

async fn discard_attached(
    mut state: GameState,
    effect: &Effect,
    energy_type: Option<&str>,
    ctx: &mut ExecutionContext,
) -> HandlerOutcome {
    let mut messages = Vec::new();
    for target in targets_or(effect, Target::self_active()) {
        let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
        for found in chosen {
            let indices = pick_attached(&found, effect, energy_type, ctx).await;
            let removed = detach(&mut state, &found, &indices);
            if removed.is_empty() {
                continue;
            }
            messages.push(Message::new(
                MessageKind::Energy,
                format!(
                    "Discarded {} from {} {}",
                    card_names(&removed),
                    found.side.label(),
                    found.pokemon.card.name
                ),
            ));
            state.board_mut(found.side).discard.extend(removed);
        }
    }
    HandlerOutcome::new(state, messages)
}

async fn move_attached(
    mut state: GameState,
    effect: &Effect,
    energy_type: Option<&str>,
    ctx: &mut ExecutionContext,
) -> HandlerOutcome {
    let mut messages = Vec::new();
    let (Some(from), Some(to)) = (effect.targets.first(), effect.targets.get(1)) else {
        messages.push(Message::info("Energy move needs a source and a destination"));
        return HandlerOutcome::new(state, messages);
    };

    let source = chosen_pokemon(&state, from, effect, ctx).await.into_iter().next();
    let destination = chosen_pokemon(&state, to, effect, ctx).await.into_iter().next();
    let (Some(source), Some(destination)) = (source, destination) else {
        messages.push(Message::info("No Pokémon to move Energy between"));
        return HandlerOutcome::new(state, messages);
    };
    if source.side == destination.side && source.slot == destination.slot {
        return HandlerOutcome::new(state, messages);
    }

    let indices = pick_attached(&source, effect, energy_type, ctx).await;
    let moved = detach(&mut state, &source, &indices);
    if moved.is_empty() {
        return HandlerOutcome::new(state, messages);
    }
    let text = format!(
        "Moved {} from {} {} to {} {}",
        card_names(&moved),
        source.side.label(),
        source.pokemon.card.name,
        destination.side.label(),
        destination.pokemon.card.name
    );
    match state.board_mut(destination.side).pokemon_mut(destination.slot) {
        Some(pokemon) => pokemon.attached_energy.extend(moved),
        None => state.board_mut(source.side).discard.extend(moved),
    }
    messages.push(Message::new(MessageKind::Energy, text));
    HandlerOutcome::new(state, messages)
}

// === Devolution ===

pub(super) fn devolution<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        for target in targets_or(effect, Target::opponent_active()) {
            let chosen = chosen_pokemon(&state, &target, effect, ctx).await;
            for found in chosen {
                let label = found.side.label();
                let Some(pokemon) = state.board_mut(found.side).pokemon_mut(found.slot) else {
                    continue;
                };
                let Some(prior) = pokemon.evolution.pop_back() else {
                    messages.push(Message::info(format!("{label} {} is not evolved", pokemon.card.name)));
                    continue;
                };

                let top = std::mem::replace(&mut pokemon.card, prior.card);
                pokemon.max_hp = prior.max_hp;
                pokemon.status = None;
                pokemon.set_damage(pokemon.damage);
                let knocked_out = pokemon.is_knocked_out();
                messages.push(Message::new(
                    MessageKind::Devolution,
                    format!("{label} {} devolved into {}", top.name, pokemon.card.name),
                ));

                state.board_mut(found.side).hand.add(top);
                if knocked_out {
                    knock_out(&mut state, found.side, found.slot, &mut messages);
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Copy ===

pub(super) fn copy<'a>(
    state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let target = effect.primary_target().cloned().unwrap_or_else(Target::opponent_active);
        let Some(found) = chosen_pokemon(&state, &target, effect, ctx).await.into_iter().next() else {
            messages.push(Message::info("No Pokémon to copy an attack from"));
            return HandlerOutcome::new(state, messages);
        };

        let label = found.side.label();
        let name = &found.pokemon.card.name;
        let attacks: Vec<String> = found.pokemon.attacks.iter().cloned().collect();
        if attacks.is_empty() {
            messages.push(Message::info(format!("{label} {name} has no attacks to copy")));
            return HandlerOutcome::new(state, messages);
        }

        let prompt = format!("Choose an attack of {label} {name}");
        let picked = select(ctx, Side::Player, effect, ChoiceKind::Attack, prompt, attacks.clone(), Some(1)).await;
        if let Some(&pick) = picked.first() {
            messages.push(Message::new(
                MessageKind::Copy,
                format!("You used {} copied from {label} {name}", attacks[pick]),
            ));
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Location, SelectionMode};
    use crate::engine::context::ScriptedChooser;
    use crate::state::{PlayerBoard, PokemonState, PrizeInfo, StatusKind};
    use futures::executor::block_on;

    fn mon(id: &str, hp: u32) -> PokemonState {
        PokemonState::new(CardInstance::pokemon(id, id, hp), hp)
    }

    fn run(handler: super::super::Handler, state: GameState, effect: &Effect) -> HandlerOutcome {
        let mut ctx = ExecutionContext::new(3);
        block_on(handler(state, effect, &mut ctx))
    }

    fn switch_state(status: StatusKind) -> GameState {
        let player = PlayerBoard::player()
            .with_active(mon("pikachu", 70).with_status(status))
            .with_bench(2, mon("eevee", 60));
        GameState::new(player, PlayerBoard::opponent())
    }

    fn self_switch() -> Effect {
        Effect::new(EffectKind::Switch { chooser: Side::Player })
            .with_target(Target::pokemon(PlayerScope::SelfSide, LocationType::Active))
    }

    #[test]
    fn test_switch_clears_active_only_status() {
        let outcome = run(switch, switch_state(StatusKind::Paralyzed), &self_switch());
        let board = &outcome.state.player;
        assert_eq!(board.active.as_ref().unwrap().card.name, "eevee");
        let benched = board.bench[2].as_ref().unwrap();
        assert_eq!(benched.card.name, "pikachu");
        assert!(benched.status.is_none());
    }

    #[test]
    fn test_switch_keeps_poison() {
        let outcome = run(switch, switch_state(StatusKind::Poisoned), &self_switch());
        let benched = outcome.state.player.bench[2].as_ref().unwrap();
        assert!(benched.has_status(StatusKind::Poisoned));
    }

    #[test]
    fn test_switch_opponent_chooses() {
        let opponent = PlayerBoard::opponent()
            .with_active(mon("charmander", 70))
            .with_bench(0, mon("vulpix", 60))
            .with_bench(1, mon("growlithe", 70));
        let state = GameState::new(PlayerBoard::player(), opponent);
        let effect = Effect::new(EffectKind::Switch { chooser: Side::Opponent })
            .with_target(Target::pokemon(PlayerScope::Opponent, LocationType::Active));
        let mut ctx = ExecutionContext::new(1).with_opponent_chooser(ScriptedChooser::new([vec![1]]));

        let outcome = block_on(switch(state, &effect, &mut ctx));
        assert_eq!(outcome.state.opponent.active.as_ref().unwrap().card.name, "growlithe");
        assert_eq!(outcome.state.opponent.bench[1].as_ref().unwrap().card.name, "charmander");
    }

    #[test]
    fn test_switch_without_bench_is_info() {
        let state = GameState::new(PlayerBoard::player().with_active(mon("pikachu", 70)), PlayerBoard::opponent());
        let outcome = run(switch, state.clone(), &self_switch());
        assert_eq!(outcome.state, state);
        assert_eq!(outcome.messages[0].kind, MessageKind::Info);
    }

    #[test]
    fn test_attach_from_discard_round_robin() {
        let player = PlayerBoard::player()
            .with_active(mon("pikachu", 70))
            .with_bench(0, mon("raichu", 120))
            .with_discard([
                CardInstance::energy("e1", "Lightning Energy"),
                CardInstance::energy("e2", "Lightning Energy"),
                CardInstance::energy("e3", "Water Energy"),
            ]);
        let state = GameState::new(player, PlayerBoard::opponent());
        let effect = Effect::new(EffectKind::Energy {
            action: EnergyAction::Attach,
            energy_type: Some("Lightning".into()),
            source: Some(Location::new(LocationType::Discard)),
        })
        .with_value(2)
        .with_target(Target::pokemon(PlayerScope::SelfSide, LocationType::Field).with_all());

        let outcome = run(energy, state, &effect);
        let board = &outcome.state.player;
        assert_eq!(board.active.as_ref().unwrap().attached_energy.len(), 1);
        assert_eq!(board.bench[0].as_ref().unwrap().attached_energy.len(), 1);
        assert_eq!(board.discard.len(), 1);
        assert_eq!(board.discard[0].id, "e3");
    }

    #[test]
    fn test_discard_all_attached_energy() {
        let target = mon("charmander", 70)
            .with_energy(CardInstance::energy("e1", "Fire Energy"))
            .with_energy(CardInstance::energy("e2", "Fire Energy"));
        let state = GameState::new(PlayerBoard::player(), PlayerBoard::opponent().with_active(target));
        let effect = Effect::new(EffectKind::Energy {
            action: EnergyAction::Discard,
            energy_type: None,
            source: None,
        })
        .with_selection(SelectionMode::All)
        .with_target(Target::opponent_active());

        let outcome = run(energy, state, &effect);
        assert!(outcome.state.opponent.active.as_ref().unwrap().attached_energy.is_empty());
        let ids: Vec<_> = outcome.state.opponent.discard.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[test]
    fn test_move_energy_between_pokemon() {
        let player = PlayerBoard::player()
            .with_active(mon("pikachu", 70).with_energy(CardInstance::energy("e1", "Lightning Energy")))
            .with_bench(0, mon("raichu", 120));
        let state = GameState::new(player, PlayerBoard::opponent());
        let effect = Effect::new(EffectKind::Energy {
            action: EnergyAction::Move,
            energy_type: None,
            source: None,
        })
        .with_value(1)
        .with_target(Target::self_active())
        .with_target(Target::pokemon(PlayerScope::SelfSide, LocationType::Bench).with_count(1));

        let outcome = run(energy, state, &effect);
        let board = &outcome.state.player;
        assert!(board.active.as_ref().unwrap().attached_energy.is_empty());
        assert_eq!(board.bench[0].as_ref().unwrap().attached_energy[0].id, "e1");
    }

    #[test]
    fn test_devolution_returns_top_card() {
        let evolved = PokemonState::new(CardInstance::pokemon("r1", "Raichu", 120), 120)
            .evolved_from(CardInstance::pokemon("p1", "Pikachu", 70), 70)
            .with_damage(30)
            .with_status(StatusKind::Confused);
        let state = GameState::new(PlayerBoard::player(), PlayerBoard::opponent().with_active(evolved));
        let effect = Effect::new(EffectKind::Devolution).with_target(Target::opponent_active());

        let outcome = run(devolution, state, &effect);
        let active = outcome.state.opponent.active.as_ref().unwrap();
        assert_eq!(active.card.name, "Pikachu");
        assert_eq!(active.max_hp, 70);
        assert_eq!(active.hp, 40);
        assert!(active.status.is_none());
        assert_eq!(outcome.state.opponent.hand.len(), 1);
    }

    #[test]
    fn test_devolution_can_knock_out() {
        let evolved = PokemonState::new(CardInstance::pokemon("r1", "Raichu", 120), 120)
            .evolved_from(CardInstance::pokemon("p1", "Pikachu", 70), 70)
            .with_damage(80);
        let player = PlayerBoard::player().with_prizes(PrizeInfo::hidden(6));
        let state = GameState::new(player, PlayerBoard::opponent().with_active(evolved));
        let effect = Effect::new(EffectKind::Devolution).with_target(Target::opponent_active());

        let outcome = run(devolution, state, &effect);
        assert!(outcome.state.opponent.active.is_none());
        assert_eq!(outcome.state.player.prizes.remaining, 5);
        let kinds: Vec<_> = outcome.messages.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::Devolution, MessageKind::Knockout, MessageKind::Prize]);
    }

    #[test]
    fn test_copy_prompts_for_attack() {
        let target = mon("mew", 60).with_attack("Psychic").with_attack("Psywave");
        let state = GameState::new(PlayerBoard::player(), PlayerBoard::opponent().with_active(target));
        let effect = Effect::new(EffectKind::Copy).with_target(Target::opponent_active());
        let mut ctx = ExecutionContext::new(1).with_self_chooser(ScriptedChooser::new([vec![1]]));

        let outcome = block_on(copy(state, &effect, &mut ctx));
        assert_eq!(outcome.messages[0].kind, MessageKind::Copy);
        assert!(outcome.messages[0].text.contains("Psywave"));
    }
}

//! Effect handlers, one per `EffectType`.
//!
//! A handler takes the current state by value, applies one effect and
//! returns the next state with its log. Handlers never fail: a target that
//! resolves to nothing is a silent no-op or an `Info` message.
//!
//! Shared helpers live here: selection honoring `SelectionMode`, Pokémon
//! target choice, knockouts and prize awards, zone edits and deck shuffles.

mod cards;
mod combat;
mod field;
mod tracked;

use futures::future::BoxFuture;

use crate::effects::{
    Effect, EffectType, LocationType, PlayerScope, SelectionMode, Target, TargetCount, Timing,
};
use crate::state::{CardInstance, GameState, Side, Slot};

use super::context::{ChoiceKind, ChoiceRequest, ExecutionContext, Selection};
use super::message::{subject, Message, MessageKind};
use super::resolver::{ResolvedPokemon, TargetResolver};

/// What a handler produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub state: GameState,
    pub messages: Vec<Message>,
    /// Effects to run right after this one.
    pub pending: Vec<Effect>,
}

impl HandlerOutcome {
    #[must_use]
    pub fn new(state: GameState, messages: Vec<Message>) -> Self {
        Self {
            state,
            messages,
            pending: Vec::new(),
        }
    }

    /// Queue follow-up effects (builder pattern).
    #[must_use]
    pub fn with_pending(mut self, pending: Vec<Effect>) -> Self {
        self.pending = pending;
        self
    }
}

/// A handler entry in the executor's registry.
pub type Handler =
    for<'a> fn(GameState, &'a Effect, &'a mut ExecutionContext) -> BoxFuture<'a, HandlerOutcome>;

/// The built-in handler for every known effect type.
#[must_use]
pub fn standard_handlers() -> Vec<(EffectType, Handler)> {
    vec![
        (EffectType::Damage, combat::damage as Handler),
        (EffectType::DamageModifier, combat::damage_modifier),
        (EffectType::Heal, combat::heal),
        (EffectType::Status, combat::status),
        (EffectType::Counter, combat::counter),
        (EffectType::Draw, cards::draw),
        (EffectType::Discard, cards::discard),
        (EffectType::Search, cards::search),
        (EffectType::Place, cards::place),
        (EffectType::HandToDeck, cards::hand_to_deck),
        (EffectType::DeckManipulation, cards::deck_manipulation),
        (EffectType::Prize, cards::prize),
        (EffectType::Switch, field::switch),
        (EffectType::Energy, field::energy),
        (EffectType::Devolution, field::devolution),
        (EffectType::Copy, field::copy),
        (EffectType::Ability, tracked::ability),
        (EffectType::Restriction, tracked::restriction),
        (EffectType::RetreatModifier, tracked::retreat_modifier),
        (EffectType::TrainerBlock, tracked::trainer_block),
        (EffectType::Prevention, tracked::prevention),
        (EffectType::SpecialPlay, tracked::special_play),
    ]
}

// === Selection ===

/// How many candidates an effect wants; `None` means all of them.
fn wanted(effect: &Effect, target: Option<&Target>) -> Option<usize> {
    if effect.selection == SelectionMode::All || target.and_then(|t| t.count) == Some(TargetCount::All) {
        return None;
    }
    Some(
        effect
            .value
            .map(|v| v as usize)
            .or_else(|| target.and_then(|t| t.count).and_then(TargetCount::limit))
            .unwrap_or(1),
    )
}

/// Pick `needed` of `options` (all when `None`) the way the effect says.
///
/// `Choose` prompts `chooser` only when there are more options than
/// needed. `Random` uses the seeded RNG. `All` takes everything.
async fn select(
    ctx: &mut ExecutionContext,
    chooser: Side,
    effect: &Effect,
    kind: ChoiceKind,
    prompt: String,
    options: Vec<String>,
    needed: Option<usize>,
) -> Selection {
    let available = options.len();
    let needed = needed.map_or(available, |n| n.min(available));

    if available == 0 {
        return Selection::new();
    }
    if needed == available || effect.selection == SelectionMode::All {
        return (0..available).collect();
    }
    if effect.selection == SelectionMode::Random {
        return ctx.rng.pick_random_indices(available, needed).into_iter().collect();
    }

    let min = if effect.is_up_to { 0 } else { needed };
    let request = ChoiceRequest::new(kind, prompt, options).with_range(min, needed);
    ctx.choose(chooser, &request).await
}

/// Pokémon a target applies to, letting the player choose when the target
/// names fewer than are eligible.
async fn chosen_pokemon(
    state: &GameState,
    target: &Target,
    effect: &Effect,
    ctx: &mut ExecutionContext,
) -> Vec<ResolvedPokemon> {
    let candidates = TargetResolver::new(state).candidates(target).pokemon;
    let Some(limit) = target.count.and_then(TargetCount::limit) else {
        return candidates;
    };
    if candidates.len() <= limit {
        return candidates;
    }

    let labels = candidates.iter().map(pokemon_label).collect();
    let picked = select(
        ctx,
        Side::Player,
        effect,
        ChoiceKind::Pokemon,
        format!("Choose {limit} Pokémon"),
        labels,
        Some(limit),
    )
    .await;
    picked.into_iter().map(|i| candidates[i].clone()).collect()
}

fn pokemon_label(found: &ResolvedPokemon) -> String {
    let place = match found.slot {
        Slot::Active => "Active".to_string(),
        Slot::Bench(i) => format!("Bench {}", i + 1),
    };
    format!("{} {} ({place})", found.side.label(), found.pokemon.card.name)
}

/// Effect targets, or `fallback` when the effect names none.
fn targets_or(effect: &Effect, fallback: Target) -> Vec<Target> {
    if effect.targets.is_empty() {
        vec![fallback]
    } else {
        effect.targets.clone()
    }
}

/// Sides named by the effect's primary target, or `fallback`.
fn target_sides(effect: &Effect, fallback: Side) -> &'static [Side] {
    effect
        .primary_target()
        .map_or(PlayerScope::of(fallback), |t| t.player)
        .sides()
}

fn timing_or(effect: &Effect, fallback: Timing) -> Timing {
    effect.timing.unwrap_or(fallback)
}

// === Board edits ===

/// Add `amount` damage to a Pokémon, knocking it out at max HP.
fn apply_damage(
    state: &mut GameState,
    side: Side,
    slot: Slot,
    amount: u32,
    kind: MessageKind,
    messages: &mut Vec<Message>,
) {
    let Some(pokemon) = state.board_mut(side).pokemon_mut(slot) else {
        return;
    };
    let name = pokemon.card.name.clone();
    let damage = pokemon.damage + amount;

    if damage >= pokemon.max_hp {
        log::debug!("{} {name} took {amount} damage and was knocked out", side.label());
        knock_out(state, side, slot, messages);
    } else {
        pokemon.set_damage(damage);
        let text = format!(
            "{} {name} took {amount} damage ({}/{} HP)",
            side.label(),
            pokemon.hp,
            pokemon.max_hp
        );
        messages.push(Message::new(kind, text));
    }
}

/// Remove a Pokémon from play: its cards go to its owner's discard pile and
/// the other player takes a prize card (plus any extra prize grants).
fn knock_out(state: &mut GameState, side: Side, slot: Slot, messages: &mut Vec<Message>) {
    let Some(pokemon) = state.board_mut(side).take_pokemon(slot) else {
        return;
    };
    let name = pokemon.card.name.clone();
    state.board_mut(side).discard.append(pokemon.into_cards());
    messages.push(Message::new(
        MessageKind::Knockout,
        format!("{} {name} was knocked out!", side.label()),
    ));

    let taker = side.other();
    let extra = state.extra_prizes(taker);
    if extra > 0 {
        state.active_effects.retain(|e| {
            !(e.side == taker && matches!(e.kind, crate::state::TrackedKind::ExtraPrize { .. }))
        });
    }
    take_prizes(state, taker, 1 + extra, messages);
}

/// Move up to `count` prize cards into `side`'s hand.
fn take_prizes(state: &mut GameState, side: Side, count: u32, messages: &mut Vec<Message>) {
    let mut taken = 0;
    for _ in 0..count {
        let Some(card) = state.board_mut(side).prizes.take_one() else {
            break;
        };
        let card = match card {
            Some(card) => card,
            None => state.placeholder_card(),
        };
        state.board_mut(side).hand.add(card);
        taken += 1;
    }
    if taken > 0 {
        let plural = if taken == 1 { "" } else { "s" };
        messages.push(Message::new(
            MessageKind::Prize,
            format!("{} took {taken} prize card{plural}", subject(side)),
        ));
    }
}

/// Remove a card from a zone by instance id.
fn take_card(state: &mut GameState, side: Side, zone: LocationType, id: &str) -> Option<CardInstance> {
    let board = state.board_mut(side);
    match zone {
        LocationType::Hand => match &mut board.hand {
            crate::state::Hand::Known(cards) => {
                let index = cards.iter().position(|c| c.id == id)?;
                Some(cards.remove(index))
            }
            crate::state::Hand::Hidden(_) => None,
        },
        LocationType::Deck => board.deck.remove_known(id),
        LocationType::Discard => {
            let index = board.discard.iter().position(|c| c.id == id)?;
            Some(board.discard.remove(index))
        }
        LocationType::Prize => {
            let index = board.prizes.known_cards.iter().position(|c| c.id == id)?;
            board.prizes.remaining = board.prizes.remaining.saturating_sub(1);
            Some(board.prizes.known_cards.remove(index))
        }
        LocationType::Active | LocationType::Bench | LocationType::Field => None,
    }
}

/// Shuffle a deck. A partially known deck loses its known order.
fn shuffle_deck(state: &mut GameState, side: Side, ctx: &mut ExecutionContext, messages: &mut Vec<Message>) {
    let deck = &mut state.board_mut(side).deck;
    if deck.is_fully_known() {
        deck.known_cards = ctx.rng.shuffled(&deck.known_cards);
    } else {
        deck.known_cards.clear();
    }
    messages.push(Message::new(
        MessageKind::Deck,
        format!("{} shuffled {} deck", subject(side), possessive(side)),
    ));
}

const fn possessive(side: Side) -> &'static str {
    match side {
        Side::Player => "your",
        Side::Opponent => "their",
    }
}

fn card_names(cards: &[CardInstance]) -> String {
    cards.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PlayerBoard, PokemonState, PrizeInfo, TrackedEffect, TrackedKind};

    fn knockout_state() -> GameState {
        let opponent = PlayerBoard::opponent()
            .with_active(PokemonState::new(CardInstance::pokemon("c1", "Charmander", 70), 70));
        let player = PlayerBoard::player().with_prizes(PrizeInfo::known([
            CardInstance::energy("p1", "Fire Energy"),
            CardInstance::energy("p2", "Water Energy"),
            CardInstance::energy("p3", "Grass Energy"),
        ]));
        GameState::new(player, opponent)
    }

    #[test]
    fn test_knockout_awards_known_prize() {
        let mut state = knockout_state();
        let mut messages = Vec::new();
        apply_damage(&mut state, Side::Opponent, Slot::Active, 70, MessageKind::Damage, &mut messages);

        assert!(state.opponent.active.is_none());
        assert_eq!(state.opponent.discard.len(), 1);
        assert_eq!(state.player.prizes.remaining, 2);
        assert_eq!(state.player.hand.cards().unwrap()[0].id, "p1");
        let kinds: Vec<_> = messages.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::Knockout, MessageKind::Prize]);
    }

    #[test]
    fn test_surviving_hit_logs_damage_only() {
        let mut state = knockout_state();
        let mut messages = Vec::new();
        apply_damage(&mut state, Side::Opponent, Slot::Active, 60, MessageKind::Damage, &mut messages);

        assert_eq!(state.opponent.active.as_ref().unwrap().hp, 10);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Damage);
        assert_eq!(messages[0].text, "Opponent's Charmander took 60 damage (10/70 HP)");
    }

    #[test]
    fn test_knockout_consumes_extra_prize() {
        let mut state = knockout_state();
        state.track(TrackedEffect::new(
            Side::Player,
            TrackedKind::ExtraPrize { amount: 1 },
            Timing::ThisTurn,
        ));
        let mut messages = Vec::new();
        knock_out(&mut state, Side::Opponent, Slot::Active, &mut messages);

        assert_eq!(state.player.prizes.remaining, 1);
        assert_eq!(state.extra_prizes(Side::Player), 0);
    }

    #[test]
    fn test_wanted_counts() {
        let effect = Effect::new(crate::effects::EffectKind::Discard).with_value(2);
        assert_eq!(wanted(&effect, None), Some(2));
        let all = Target::cards(PlayerScope::SelfSide, LocationType::Hand).with_all();
        assert_eq!(wanted(&effect, Some(&all)), None);
        assert_eq!(wanted(&Effect::new(crate::effects::EffectKind::Discard), None), Some(1));
    }

    #[test]
    fn test_random_selection_is_seeded() {
        use futures::executor::block_on;

        let effect = Effect::new(crate::effects::EffectKind::Discard).with_selection(SelectionMode::Random);
        let options: Vec<String> = (0..6).map(|i| i.to_string()).collect();
        let run = |seed| {
            let mut ctx = ExecutionContext::new(seed);
            block_on(select(&mut ctx, Side::Player, &effect, ChoiceKind::Cards, "pick".into(), options.clone(), Some(2)))
        };
        assert_eq!(run(5), run(5));
        assert_eq!(run(5).len(), 2);
    }
}

//! Card movement between zones: draw, discard, search, bench placement,
//! hand-to-deck, deck manipulation and prizes.

use futures::future::{BoxFuture, FutureExt};

use super::{
    card_names, possessive, select, shuffle_deck, take_card, take_prizes, target_sides,
    targets_or, timing_or, wanted, HandlerOutcome,
};
use crate::effects::{
    DeckAction, DeckPlacement, Effect, EffectKind, LocationType, PlayerScope, PrizeAction,
    SearchDestination, Target, Timing,
};
use crate::engine::context::{ChoiceKind, ExecutionContext};
use crate::engine::message::{subject, Message, MessageKind};
use crate::engine::resolver::TargetResolver;
use crate::state::{
    CardInstance, GameState, Hand, PokemonState, Side, Slot, TrackedEffect, TrackedKind,
    BENCH_SIZE,
};

const fn cards_word(n: u32) -> &'static str {
    if n == 1 {
        "card"
    } else {
        "cards"
    }
}

const fn zone_name(zone: LocationType) -> &'static str {
    match zone {
        LocationType::Deck => "deck",
        LocationType::Hand => "hand",
        LocationType::Discard => "discard pile",
        LocationType::Prize => "prize cards",
        LocationType::Bench => "Bench",
        LocationType::Active => "Active Spot",
        LocationType::Field => "field",
    }
}

/// Pop up to `count` cards off the top of a deck into the hand. Unknown
/// cards become placeholders. Returns how many were drawn.
fn draw_cards(state: &mut GameState, side: Side, count: u32) -> u32 {
    let mut drawn = 0;
    while drawn < count {
        let Some(top) = state.board_mut(side).deck.pop_top() else {
            break;
        };
        let card = match top {
            Some(card) => card,
            None => state.placeholder_card(),
        };
        state.board_mut(side).hand.add(card);
        drawn += 1;
    }
    drawn
}

/// Pick and remove cards matching `target` on one side.
///
/// With `look_at`, only the top N known deck cards are candidates.
pub(super) async fn gather(
    state: &mut GameState,
    effect: &Effect,
    target: &Target,
    side: Side,
    look_at: Option<u32>,
    needed: Option<usize>,
    ctx: &mut ExecutionContext,
) -> Vec<CardInstance> {
    let mut scoped = target.clone();
    scoped.player = PlayerScope::of(side);
    let mut candidates = TargetResolver::new(state).candidates(&scoped).cards;

    if let (Some(n), LocationType::Deck) = (look_at, target.location.kind) {
        let top: Vec<String> = state
            .board(side)
            .deck
            .known_cards
            .iter()
            .take(n as usize)
            .map(|c| c.id.clone())
            .collect();
        candidates.retain(|c| top.contains(&c.card.id));
    }

    let labels = candidates.iter().map(|c| c.card.name.clone()).collect();
    let prompt = format!("Choose cards from {} {}", possessive(side), zone_name(target.location.kind));
    let picked = select(ctx, side, effect, ChoiceKind::Cards, prompt, labels, needed).await;

    picked
        .into_iter()
        .filter_map(|i| {
            let found = &candidates[i];
            take_card(state, found.side, found.zone, &found.card.id)
        })
        .collect()
}

/// Put cards from play-ready zones onto empty bench slots.
fn bench_cards(
    state: &mut GameState,
    side: Side,
    cards: Vec<CardInstance>,
    fallback_hp: u32,
    messages: &mut Vec<Message>,
) {
    for card in cards {
        let Some(index) = state.board(side).first_empty_bench() else {
            messages.push(Message::info(format!("Bench is full, {} was discarded", card.name)));
            state.board_mut(side).discard.push_back(card);
            continue;
        };
        let name = card.name.clone();
        let pokemon = PokemonState::from_card(card, fallback_hp);
        state.board_mut(side).put_pokemon(Slot::Bench(index), Some(pokemon));
        messages.push(Message::new(
            MessageKind::Place,
            format!("{} put {name} onto the Bench", subject(side)),
        ));
    }
}

/// Free bench slots.
fn bench_room(state: &GameState, side: Side) -> usize {
    BENCH_SIZE - state.board(side).bench_count()
}

// === Draw ===

pub(super) fn draw<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Draw { until_hand_size } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let value = effect.value.unwrap_or(1);

        for &side in target_sides(effect, Side::Player) {
            let requested = if *until_hand_size {
                value.saturating_sub(state.board(side).hand.len() as u32)
            } else {
                value
            };
            if requested == 0 {
                continue;
            }

            let drawn = draw_cards(&mut state, side, requested);
            if drawn > 0 {
                messages.push(Message::new(
                    MessageKind::Draw,
                    format!("{} drew {drawn} {}", subject(side), cards_word(drawn)),
                ));
            }
            if drawn < requested {
                messages.push(Message::info(format!(
                    "{} could only draw {drawn} of {requested} {}",
                    subject(side),
                    cards_word(requested)
                )));
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Discard ===

pub(super) fn discard<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let fallback = Target::cards(PlayerScope::SelfSide, LocationType::Hand);

        for target in targets_or(effect, fallback) {
            for &side in target.player.sides() {
                let hidden_hand = target.location.kind == LocationType::Hand
                    && state.board(side).hand.cards().is_none();
                if hidden_hand {
                    discard_hidden(&mut state, side, effect, &target, &mut messages);
                    continue;
                }

                let needed = wanted(effect, Some(&target));
                let discarded = gather(&mut state, effect, &target, side, None, needed, ctx).await;
                if discarded.is_empty() {
                    continue;
                }
                let count = discarded.len() as u32;
                messages.push(Message::new(
                    MessageKind::Discard,
                    format!(
                        "{} discarded {count} {}: {}",
                        subject(side),
                        cards_word(count),
                        card_names(&discarded)
                    ),
                ));
                state.board_mut(side).discard.extend(discarded);
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

/// Discard from a hand only known as a count. The faces become
/// placeholders in the discard pile.
fn discard_hidden(
    state: &mut GameState,
    side: Side,
    effect: &Effect,
    target: &Target,
    messages: &mut Vec<Message>,
) {
    let in_hand = state.board(side).hand.len() as u32;
    let count = wanted(effect, Some(target)).map_or(in_hand, |n| (n as u32).min(in_hand));
    if count == 0 {
        return;
    }
    if let Hand::Hidden(size) = &mut state.board_mut(side).hand {
        *size -= count;
    }
    for _ in 0..count {
        let card = state.placeholder_card();
        state.board_mut(side).discard.push_back(card);
    }
    messages.push(Message::new(
        MessageKind::Discard,
        format!("{} discarded {count} {} from {} hand", subject(side), cards_word(count), possessive(side)),
    ));
}

// === Search ===

pub(super) fn search<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Search {
            destination,
            look_at,
        } = &effect.kind
        else {
            return HandlerOutcome::new(state, messages);
        };
        let target = effect
            .primary_target()
            .cloned()
            .unwrap_or_else(|| Target::cards(PlayerScope::SelfSide, LocationType::Deck));
        let from_deck = target.location.kind == LocationType::Deck;

        for &side in target.player.sides() {
            // Looked-at cards simply stay in the deck.
            if *destination != SearchDestination::Deck {
                let mut needed = wanted(effect, Some(&target));
                if *destination == SearchDestination::Bench {
                    let room = bench_room(&state, side);
                    if room == 0 {
                        messages.push(Message::info("Bench is full"));
                        continue;
                    }
                    needed = Some(needed.map_or(room, |n| n.min(room)));
                }

                let found = gather(&mut state, effect, &target, side, *look_at, needed, ctx).await;
                if found.is_empty() {
                    messages.push(Message::info(format!(
                        "{} found nothing in {} {}",
                        subject(side),
                        possessive(side),
                        zone_name(target.location.kind)
                    )));
                } else {
                    deliver(&mut state, side, *destination, found, ctx.config.fallback_max_hp, &mut messages);
                }
            }

            if from_deck && target.location.shuffle {
                shuffle_deck(&mut state, side, ctx, &mut messages);
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

fn deliver(
    state: &mut GameState,
    side: Side,
    destination: SearchDestination,
    cards: Vec<CardInstance>,
    fallback_hp: u32,
    messages: &mut Vec<Message>,
) {
    let names = card_names(&cards);
    let who = subject(side);
    let whose = possessive(side);
    match destination {
        SearchDestination::Hand => {
            messages.push(Message::new(MessageKind::Search, format!("{who} put {names} into {whose} hand")));
            let board = state.board_mut(side);
            for card in cards {
                board.hand.add(card);
            }
        }
        SearchDestination::Bench => bench_cards(state, side, cards, fallback_hp, messages),
        SearchDestination::Discard => {
            messages.push(Message::new(MessageKind::Discard, format!("{who} discarded {names}")));
            state.board_mut(side).discard.extend(cards);
        }
        SearchDestination::DeckTop => {
            messages.push(Message::new(
                MessageKind::Deck,
                format!("{who} put {names} on top of {whose} deck"),
            ));
            let deck = &mut state.board_mut(side).deck;
            for card in cards.into_iter().rev() {
                deck.known_cards.push_front(card);
                deck.size += 1;
            }
        }
        SearchDestination::Deck => {}
    }
}

// === Bench placement ===

pub(super) fn place<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Place { look_at } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let target = effect
            .primary_target()
            .cloned()
            .unwrap_or_else(|| Target::pokemon(PlayerScope::SelfSide, LocationType::Deck));

        for &side in target.player.sides() {
            let room = bench_room(&state, side);
            if room == 0 {
                messages.push(Message::info("Bench is full"));
                continue;
            }
            let needed = wanted(effect, Some(&target)).map_or(room, |n| n.min(room));
            let found = gather(&mut state, effect, &target, side, *look_at, Some(needed), ctx).await;
            if found.is_empty() {
                messages.push(Message::info(format!(
                    "{} found no Pokémon to put onto the Bench",
                    subject(side)
                )));
            }
            bench_cards(&mut state, side, found, ctx.config.fallback_max_hp, &mut messages);

            if target.location.kind == LocationType::Deck && target.location.shuffle {
                shuffle_deck(&mut state, side, ctx, &mut messages);
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Hand to deck ===

pub(super) fn hand_to_deck<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::HandToDeck { placement } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };

        for &side in target_sides(effect, Side::Player) {
            let (cards, count) = state.board_mut(side).hand.take_all();
            if count == 0 {
                continue;
            }
            state.board_mut(side).deck.put_bottom(cards, count);
            let whose = possessive(side);
            let where_to = match placement {
                DeckPlacement::ShuffleIn => "into",
                DeckPlacement::Bottom => "on the bottom of",
            };
            messages.push(Message::new(
                MessageKind::Hand,
                format!(
                    "{} put {count} {} from {whose} hand {where_to} {whose} deck",
                    subject(side),
                    cards_word(count)
                ),
            ));
            if *placement == DeckPlacement::ShuffleIn {
                shuffle_deck(&mut state, side, ctx, &mut messages);
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Deck manipulation ===

pub(super) fn deck_manipulation<'a>(
    mut state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::DeckManipulation { action } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let count = effect.value.unwrap_or(1);

        for &side in target_sides(effect, Side::Player) {
            match action {
                DeckAction::Shuffle => shuffle_deck(&mut state, side, ctx, &mut messages),
                DeckAction::LookTop => {
                    let deck = &state.board(side).deck;
                    let seen = count.min(deck.size);
                    let known: Vec<CardInstance> =
                        deck.known_cards.iter().take(seen as usize).cloned().collect();
                    let text = if side == Side::Player && !known.is_empty() {
                        format!("You looked at the top {seen} {}: {}", cards_word(seen), card_names(&known))
                    } else {
                        format!(
                            "{} looked at the top {seen} {} of {} deck",
                            subject(side),
                            cards_word(seen),
                            possessive(side)
                        )
                    };
                    messages.push(Message::new(MessageKind::Deck, text));
                }
                DeckAction::DiscardTop => {
                    let mut milled = Vec::new();
                    for _ in 0..count {
                        let Some(top) = state.board_mut(side).deck.pop_top() else {
                            break;
                        };
                        milled.push(match top {
                            Some(card) => card,
                            None => state.placeholder_card(),
                        });
                    }
                    if milled.is_empty() {
                        messages.push(Message::info(format!("{} deck is empty", side.label())));
                        continue;
                    }
                    let n = milled.len() as u32;
                    messages.push(Message::new(
                        MessageKind::Discard,
                        format!(
                            "{} discarded the top {n} {} of {} deck",
                            subject(side),
                            cards_word(n),
                            possessive(side)
                        ),
                    ));
                    state.board_mut(side).discard.extend(milled);
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

// === Prizes ===

pub(super) fn prize<'a>(
    mut state: GameState,
    effect: &'a Effect,
    _ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, HandlerOutcome> {
    async move {
        let mut messages = Vec::new();
        let EffectKind::Prize { action } = &effect.kind else {
            return HandlerOutcome::new(state, messages);
        };
        let count = effect.value.unwrap_or(1);

        for &side in target_sides(effect, Side::Player) {
            match action {
                PrizeAction::Take => take_prizes(&mut state, side, count, &mut messages),
                PrizeAction::Extra => {
                    let timing = timing_or(effect, Timing::ThisTurn);
                    state.track(TrackedEffect::new(side, TrackedKind::ExtraPrize { amount: count }, timing));
                    messages.push(Message::new(
                        MessageKind::Prize,
                        format!(
                            "{} will take {count} more prize {} for the next knockout",
                            subject(side),
                            cards_word(count)
                        ),
                    ));
                }
            }
        }
        HandlerOutcome::new(state, messages)
    }
    .boxed()
}

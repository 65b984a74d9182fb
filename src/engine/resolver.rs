//! Target resolution: abstract `Target` to concrete entities.
//!
//! ## Rules
//!
//! - `Both` resolves for self, then for the opponent, and concatenates.
//! - `Active` yields the active Pokémon if present and accepted.
//! - `Bench` scans the slots in order and records each kept slot index.
//! - `Field` is active followed by bench.
//! - The opponent's hand, deck and prizes are hidden and always resolve
//!   empty. Only their discard pile is visible.
//! - Filters are ANDed.
//! - `count` truncates once, after every zone and filter rule has run.

use smallvec::SmallVec;

use crate::effects::{LocationType, PlayerScope, Target, TargetCount};
use crate::state::{CardInstance, GameState, PokemonState, Side, Slot};

/// A Pokémon found in play, with its position for re-mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPokemon {
    pub side: Side,
    pub slot: Slot,
    pub pokemon: PokemonState,
}

/// A card found in a zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCard {
    pub side: Side,
    pub zone: LocationType,
    pub card: CardInstance,
}

/// Everything a target resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub pokemon: Vec<ResolvedPokemon>,
    pub cards: Vec<ResolvedCard>,
    pub location: LocationType,
    pub player: PlayerScope,
    /// Bench slots of the kept bench Pokémon, in order.
    pub bench_indices: SmallVec<[usize; 5]>,
}

impl ResolvedTarget {
    fn empty(target: &Target) -> Self {
        Self {
            pokemon: Vec::new(),
            cards: Vec::new(),
            location: target.location.kind,
            player: target.player,
            bench_indices: SmallVec::new(),
        }
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pokemon.is_empty() && self.cards.is_empty()
    }

    /// Number of entities found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pokemon.len() + self.cards.len()
    }

    fn truncate(&mut self, count: Option<TargetCount>) {
        if let Some(limit) = count.and_then(TargetCount::limit) {
            self.pokemon.truncate(limit);
            self.cards.truncate(limit);
        }
        self.bench_indices = self
            .pokemon
            .iter()
            .filter_map(|p| match p.slot {
                Slot::Bench(index) => Some(index),
                Slot::Active => None,
            })
            .collect();
    }
}

/// Resolves targets against one state snapshot.
#[derive(Clone, Copy, Debug)]
pub struct TargetResolver<'a> {
    state: &'a GameState,
}

impl<'a> TargetResolver<'a> {
    #[must_use]
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }

    /// Resolve a target, truncated to its count.
    #[must_use]
    pub fn resolve(&self, target: &Target) -> ResolvedTarget {
        let mut resolved = self.candidates(target);
        resolved.truncate(target.count);
        resolved
    }

    /// Resolve a target ignoring its count: everything eligible.
    #[must_use]
    pub fn candidates(&self, target: &Target) -> ResolvedTarget {
        let mut resolved = ResolvedTarget::empty(target);
        for &side in target.player.sides() {
            self.resolve_side(target, side, &mut resolved);
        }
        resolved.truncate(None);
        resolved
    }

    fn resolve_side(&self, target: &Target, side: Side, out: &mut ResolvedTarget) {
        let board = self.state.board(side);
        let in_play: Vec<(Slot, &PokemonState)> = match target.location.kind {
            LocationType::Active => board.active.iter().map(|p| (Slot::Active, p)).collect(),
            LocationType::Bench => board.bench_pokemon().map(|(i, p)| (Slot::Bench(i), p)).collect(),
            LocationType::Field => board.field().collect(),
            _ => Vec::new(),
        };
        out.pokemon.extend(
            in_play
                .into_iter()
                .filter(|(_, pokemon)| target.accepts_pokemon(pokemon))
                .map(|(slot, pokemon)| ResolvedPokemon {
                    side,
                    slot,
                    pokemon: pokemon.clone(),
                }),
        );

        match target.location.kind {
            LocationType::Active | LocationType::Bench | LocationType::Field => {}
            LocationType::Discard => {
                self.keep_cards(target, side, LocationType::Discard, board.discard.iter(), out);
            }
            hidden @ (LocationType::Hand | LocationType::Deck | LocationType::Prize) => {
                if side == Side::Opponent {
                    return;
                }
                match hidden {
                    LocationType::Hand => {
                        if let Some(cards) = board.hand.cards() {
                            self.keep_cards(target, side, hidden, cards.iter(), out);
                        }
                    }
                    LocationType::Deck => {
                        self.keep_cards(target, side, hidden, board.deck.known_cards.iter(), out);
                    }
                    _ => {
                        self.keep_cards(target, side, hidden, board.prizes.known_cards.iter(), out);
                    }
                }
            }
        }
    }

    fn keep_cards<'c>(
        &self,
        target: &Target,
        side: Side,
        zone: LocationType,
        cards: impl Iterator<Item = &'c CardInstance>,
        out: &mut ResolvedTarget,
    ) {
        out.cards.extend(
            cards
                .filter(|card| target.accepts_card(card))
                .map(|card| ResolvedCard {
                    side,
                    zone,
                    card: card.clone(),
                }),
        );
    }
}

/// Resolve a target against a state.
#[must_use]
pub fn resolve_target(state: &GameState, target: &Target) -> ResolvedTarget {
    TargetResolver::new(state).resolve(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Filter, Stage};
    use crate::state::{DeckInfo, PlayerBoard, StatusKind};

    fn mon(id: &str, hp: u32) -> PokemonState {
        PokemonState::new(CardInstance::pokemon(id, id, hp).with_subtype("basic"), hp)
    }

    fn state() -> GameState {
        let player = PlayerBoard::player()
            .with_active(mon("pikachu", 70))
            .with_bench(1, mon("eevee", 60))
            .with_bench(3, mon("snorlax", 150).with_status(StatusKind::Poisoned))
            .with_hand([
                CardInstance::energy("e1", "Lightning Energy"),
                CardInstance::trainer("t1", "Nest Ball", "item"),
            ])
            .with_deck(DeckInfo::known([CardInstance::pokemon("d1", "Pichu", 30)]));
        let opponent = PlayerBoard::opponent()
            .with_active(mon("charmander", 70))
            .with_bench(0, mon("vulpix", 60))
            .with_hand_count(6)
            .with_deck(DeckInfo::hidden(30))
            .with_discard([CardInstance::energy("oe1", "Fire Energy")]);
        GameState::new(player, opponent)
    }

    #[test]
    fn test_active() {
        let resolved = resolve_target(&state(), &Target::opponent_active());
        assert_eq!(resolved.pokemon.len(), 1);
        assert_eq!(resolved.pokemon[0].pokemon.card.name, "charmander");
        assert_eq!(resolved.pokemon[0].side, Side::Opponent);
    }

    #[test]
    fn test_bench_records_indices() {
        let target = Target::pokemon(PlayerScope::SelfSide, LocationType::Bench);
        let resolved = resolve_target(&state(), &target);
        assert_eq!(resolved.bench_indices.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_both_fans_out_self_first() {
        let target = Target::pokemon(PlayerScope::Both, LocationType::Active);
        let resolved = resolve_target(&state(), &target);
        let names: Vec<_> = resolved.pokemon.iter().map(|p| p.pokemon.card.name.as_str()).collect();
        assert_eq!(names, vec!["pikachu", "charmander"]);
    }

    #[test]
    fn test_field_truncates_once() {
        let target = Target::pokemon(PlayerScope::Both, LocationType::Field).with_count(4);
        let resolved = resolve_target(&state(), &target);
        let names: Vec<_> = resolved.pokemon.iter().map(|p| p.pokemon.card.name.as_str()).collect();
        assert_eq!(names, vec!["pikachu", "eevee", "snorlax", "charmander"]);
        assert_eq!(resolved.bench_indices.as_slice(), &[1, 3]);
    }

    #[test]
    fn test_opponent_hidden_zones_empty() {
        let state = state();
        for zone in [LocationType::Hand, LocationType::Deck, LocationType::Prize] {
            let target = Target::cards(PlayerScope::Opponent, zone);
            assert!(resolve_target(&state, &target).is_empty(), "{zone:?}");
        }
        let discard = Target::cards(PlayerScope::Opponent, LocationType::Discard);
        assert_eq!(resolve_target(&state, &discard).cards.len(), 1);
    }

    #[test]
    fn test_filters_and() {
        let target = Target::pokemon(PlayerScope::SelfSide, LocationType::Field)
            .with_filter(Filter::Stage(Stage::Basic))
            .with_filter(Filter::Status(None));
        let resolved = resolve_target(&state(), &target);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_hand_card_kind() {
        let target = Target::new(crate::effects::TargetKind::Energy, PlayerScope::SelfSide, LocationType::Hand);
        let resolved = resolve_target(&state(), &target);
        assert_eq!(resolved.cards.len(), 1);
        assert_eq!(resolved.cards[0].card.id, "e1");
    }

    #[test]
    fn test_candidates_ignore_count() {
        let target = Target::pokemon(PlayerScope::SelfSide, LocationType::Bench).with_count(1);
        let state = state();
        let resolver = TargetResolver::new(&state);
        assert_eq!(resolver.resolve(&target).len(), 1);
        assert_eq!(resolver.candidates(&target).len(), 2);
    }
}

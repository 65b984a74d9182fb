//! One player's side of the table.
//!
//! ## Information asymmetry
//!
//! The state is a single-player perspective. The player's own hand is a
//! list of known cards; the opponent's hand is only a count. Deck and prize
//! contents are known only as far as `known_cards` reveals them.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::CardInstance;
use super::pokemon::PokemonState;

/// Number of bench slots. The bench always has exactly this many entries.
pub const BENCH_SIZE: usize = 5;

/// Which side of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// The perspective player.
    #[serde(rename = "self")]
    Player,
    Opponent,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    /// Possessive label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Player => "Your",
            Self::Opponent => "Opponent's",
        }
    }
}

/// A Pokémon position on one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    Active,
    Bench(usize),
}

impl Slot {
    /// Whether this is a bench slot.
    #[must_use]
    pub const fn is_bench(self) -> bool {
        matches!(self, Self::Bench(_))
    }
}

/// A hand: fully known for the player, a bare count for the opponent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hand {
    Known(Vector<CardInstance>),
    Hidden(u32),
}

impl Default for Hand {
    fn default() -> Self {
        Self::Known(Vector::new())
    }
}

impl Hand {
    /// Number of cards in hand.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Known(cards) => cards.len(),
            Self::Hidden(count) => *count as usize,
        }
    }

    /// Whether the hand is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Known cards, if this hand is visible.
    #[must_use]
    pub fn cards(&self) -> Option<&Vector<CardInstance>> {
        match self {
            Self::Known(cards) => Some(cards),
            Self::Hidden(_) => None,
        }
    }

    /// Add a card. A hidden hand only counts it.
    pub fn add(&mut self, card: CardInstance) {
        match self {
            Self::Known(cards) => cards.push_back(card),
            Self::Hidden(count) => *count += 1,
        }
    }

    /// Empty the hand, returning the known cards (empty for a hidden hand)
    /// and the number of cards removed.
    pub fn take_all(&mut self) -> (Vector<CardInstance>, u32) {
        match self {
            Self::Known(cards) => {
                let taken = std::mem::take(cards);
                let count = taken.len() as u32;
                (taken, count)
            }
            Self::Hidden(count) => {
                let removed = std::mem::take(count);
                (Vector::new(), removed)
            }
        }
    }
}

/// Deck: a size plus whatever prefix of its order is known (top first).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckInfo {
    pub size: u32,
    #[serde(default, skip_serializing_if = "Vector::is_empty")]
    pub known_cards: Vector<CardInstance>,
}

impl DeckInfo {
    /// A deck whose full contents are known.
    pub fn known(cards: impl IntoIterator<Item = CardInstance>) -> Self {
        let known_cards: Vector<CardInstance> = cards.into_iter().collect();
        Self {
            size: known_cards.len() as u32,
            known_cards,
        }
    }

    /// A deck of which only the size is known.
    #[must_use]
    pub fn hidden(size: u32) -> Self {
        Self {
            size,
            known_cards: Vector::new(),
        }
    }

    /// Remove the top card. Returns `None` when empty, `Some(None)` when the
    /// top card is not known.
    pub fn pop_top(&mut self) -> Option<Option<CardInstance>> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        Some(self.known_cards.pop_front())
    }

    /// Remove a known card by instance id.
    pub fn remove_known(&mut self, id: &str) -> Option<CardInstance> {
        let index = self.known_cards.iter().position(|c| c.id == id)?;
        self.size = self.size.saturating_sub(1);
        Some(self.known_cards.remove(index))
    }

    /// Add `count` cards to the bottom. `cards` are their faces where known;
    /// the known prefix only grows if the whole deck stays known.
    pub fn put_bottom(&mut self, cards: Vector<CardInstance>, count: u32) {
        let fully_known = self.known_cards.len() as u32 == self.size;
        self.size += count;
        if fully_known && cards.len() as u32 == count {
            self.known_cards.append(cards);
        }
    }

    /// Whether every card in the deck is known.
    #[must_use]
    pub fn is_fully_known(&self) -> bool {
        self.known_cards.len() as u32 == self.size
    }
}

/// Prize cards: a remaining count plus any known cards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeInfo {
    pub remaining: u32,
    #[serde(default, skip_serializing_if = "Vector::is_empty")]
    pub known_cards: Vector<CardInstance>,
}

impl PrizeInfo {
    /// Prizes with nothing known about their faces.
    #[must_use]
    pub fn hidden(remaining: u32) -> Self {
        Self {
            remaining,
            known_cards: Vector::new(),
        }
    }

    /// Prizes whose faces are known.
    pub fn known(cards: impl IntoIterator<Item = CardInstance>) -> Self {
        let known_cards: Vector<CardInstance> = cards.into_iter().collect();
        Self {
            remaining: known_cards.len() as u32,
            known_cards,
        }
    }

    /// Take one prize. `None` if no prizes remain; the inner option is the
    /// card face if known.
    pub fn take_one(&mut self) -> Option<Option<CardInstance>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.known_cards.pop_front())
    }
}

/// Everything on one side of the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBoard {
    pub hand: Hand,
    pub deck: DeckInfo,
    pub discard: Vector<CardInstance>,
    pub prizes: PrizeInfo,
    pub active: Option<PokemonState>,
    pub bench: [Option<PokemonState>; BENCH_SIZE],
}

impl PlayerBoard {
    /// The perspective player's empty board (known hand).
    #[must_use]
    pub fn player() -> Self {
        Self {
            hand: Hand::Known(Vector::new()),
            deck: DeckInfo::default(),
            discard: Vector::new(),
            prizes: PrizeInfo::default(),
            active: None,
            bench: Default::default(),
        }
    }

    /// The opponent's empty board (hidden hand).
    #[must_use]
    pub fn opponent() -> Self {
        Self {
            hand: Hand::Hidden(0),
            ..Self::player()
        }
    }

    /// Set the active Pokémon (builder pattern).
    #[must_use]
    pub fn with_active(mut self, pokemon: PokemonState) -> Self {
        self.active = Some(pokemon);
        self
    }

    /// Put a Pokémon in a bench slot (builder pattern). Out-of-range slots
    /// are ignored.
    #[must_use]
    pub fn with_bench(mut self, slot: usize, pokemon: PokemonState) -> Self {
        if let Some(entry) = self.bench.get_mut(slot) {
            *entry = Some(pokemon);
        }
        self
    }

    /// Set hand contents (builder pattern). Keeps a hidden hand hidden.
    #[must_use]
    pub fn with_hand(mut self, cards: impl IntoIterator<Item = CardInstance>) -> Self {
        let cards: Vector<CardInstance> = cards.into_iter().collect();
        self.hand = match self.hand {
            Hand::Known(_) => Hand::Known(cards),
            Hand::Hidden(_) => Hand::Hidden(cards.len() as u32),
        };
        self
    }

    /// Set the hidden hand size (builder pattern).
    #[must_use]
    pub fn with_hand_count(mut self, count: u32) -> Self {
        self.hand = Hand::Hidden(count);
        self
    }

    /// Set the deck (builder pattern).
    #[must_use]
    pub fn with_deck(mut self, deck: DeckInfo) -> Self {
        self.deck = deck;
        self
    }

    /// Set the prizes (builder pattern).
    #[must_use]
    pub fn with_prizes(mut self, prizes: PrizeInfo) -> Self {
        self.prizes = prizes;
        self
    }

    /// Set the discard pile (builder pattern).
    #[must_use]
    pub fn with_discard(mut self, cards: impl IntoIterator<Item = CardInstance>) -> Self {
        self.discard = cards.into_iter().collect();
        self
    }

    // === Pokémon slots ===

    /// The Pokémon in a slot.
    #[must_use]
    pub fn pokemon(&self, slot: Slot) -> Option<&PokemonState> {
        match slot {
            Slot::Active => self.active.as_ref(),
            Slot::Bench(index) => self.bench.get(index).and_then(Option::as_ref),
        }
    }

    /// Mutable access to the Pokémon in a slot.
    pub fn pokemon_mut(&mut self, slot: Slot) -> Option<&mut PokemonState> {
        match slot {
            Slot::Active => self.active.as_mut(),
            Slot::Bench(index) => self.bench.get_mut(index).and_then(Option::as_mut),
        }
    }

    /// Remove and return the Pokémon in a slot.
    pub fn take_pokemon(&mut self, slot: Slot) -> Option<PokemonState> {
        match slot {
            Slot::Active => self.active.take(),
            Slot::Bench(index) => self.bench.get_mut(index).and_then(Option::take),
        }
    }

    /// Place a Pokémon into a slot, returning what was there.
    pub fn put_pokemon(&mut self, slot: Slot, pokemon: Option<PokemonState>) -> Option<PokemonState> {
        match slot {
            Slot::Active => std::mem::replace(&mut self.active, pokemon),
            Slot::Bench(index) => match self.bench.get_mut(index) {
                Some(entry) => std::mem::replace(entry, pokemon),
                None => pokemon,
            },
        }
    }

    /// Occupied bench slots, in slot order.
    pub fn bench_pokemon(&self) -> impl Iterator<Item = (usize, &PokemonState)> {
        self.bench
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p)))
    }

    /// Number of occupied bench slots.
    #[must_use]
    pub fn bench_count(&self) -> usize {
        self.bench.iter().filter(|p| p.is_some()).count()
    }

    /// First empty bench slot.
    #[must_use]
    pub fn first_empty_bench(&self) -> Option<usize> {
        self.bench.iter().position(Option::is_none)
    }

    /// Active then bench, in slot order.
    pub fn field(&self) -> impl Iterator<Item = (Slot, &PokemonState)> {
        self.active
            .iter()
            .map(|p| (Slot::Active, p))
            .chain(self.bench_pokemon().map(|(i, p)| (Slot::Bench(i), p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mon(id: &str) -> PokemonState {
        PokemonState::new(CardInstance::pokemon(id, id, 60), 60)
    }

    #[test]
    fn test_bench_fixed_arity() {
        let board = PlayerBoard::player().with_bench(1, mon("a")).with_bench(9, mon("b"));
        assert_eq!(board.bench.len(), BENCH_SIZE);
        assert_eq!(board.bench_count(), 1);
        assert_eq!(board.first_empty_bench(), Some(0));
    }

    #[test]
    fn test_field_order() {
        let board = PlayerBoard::player()
            .with_active(mon("act"))
            .with_bench(3, mon("b3"))
            .with_bench(0, mon("b0"));

        let slots: Vec<_> = board.field().map(|(slot, _)| slot).collect();
        assert_eq!(slots, vec![Slot::Active, Slot::Bench(0), Slot::Bench(3)]);
    }

    #[test]
    fn test_take_and_put() {
        let mut board = PlayerBoard::player().with_active(mon("a")).with_bench(2, mon("b"));
        let bench = board.take_pokemon(Slot::Bench(2));
        let old = board.put_pokemon(Slot::Active, bench);
        board.put_pokemon(Slot::Bench(2), old);

        assert_eq!(board.active.as_ref().unwrap().card.id, "b");
        assert_eq!(board.bench[2].as_ref().unwrap().card.id, "a");
    }

    #[test]
    fn test_hidden_hand() {
        let mut hand = Hand::Hidden(3);
        hand.add(CardInstance::placeholder("u"));
        assert_eq!(hand.len(), 4);
        assert!(hand.cards().is_none());
        let (cards, count) = hand.take_all();
        assert!(cards.is_empty());
        assert_eq!(count, 4);
        assert!(hand.is_empty());
    }

    #[test]
    fn test_deck_pop_known_then_unknown() {
        let mut deck = DeckInfo {
            size: 2,
            known_cards: Vector::unit(CardInstance::energy("e1", "Water Energy")),
        };
        assert_eq!(deck.pop_top().unwrap().unwrap().id, "e1");
        assert_eq!(deck.pop_top(), Some(None));
        assert_eq!(deck.pop_top(), None);
        assert_eq!(deck.size, 0);
    }

    #[test]
    fn test_prize_take() {
        let mut prizes = PrizeInfo::hidden(1);
        assert_eq!(prizes.take_one(), Some(None));
        assert_eq!(prizes.take_one(), None);
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Player).unwrap(), "\"self\"");
        assert_eq!(serde_json::to_string(&Side::Opponent).unwrap(), "\"opponent\"");
    }
}

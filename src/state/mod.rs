//! Game state: cards, Pokémon, boards and the full snapshot.
//!
//! ## Information model
//!
//! The state is seen from one player's perspective. The player's own zones
//! are fully known; the opponent's hand, deck and prizes are known only as
//! counts plus whatever cards have been revealed.

mod board;
mod card;
mod game;
mod pokemon;
mod tracked;

pub use board::{DeckInfo, Hand, PlayerBoard, PrizeInfo, Side, Slot, BENCH_SIZE};
pub use card::{CardInstance, CardKind};
pub use game::GameState;
pub use pokemon::{PokemonState, PriorStage, StatusCondition, StatusKind, HP_PER_COUNTER};
pub use tracked::{TrackedEffect, TrackedKind};

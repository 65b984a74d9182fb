//! The full game state snapshot.
//!
//! `GameState` is a single-player perspective: the player's own zones sit
//! at the top level, the opponent's publicly observable zones in
//! `opponent`. All lists are `im` persistent vectors, so cloning a state
//! to produce the next one is O(1).

use im::Vector;
use serde::{Deserialize, Serialize};

use super::board::{PlayerBoard, Side};
use super::card::CardInstance;
use super::tracked::{TrackedEffect, TrackedKind};
use crate::effects::{PreventionKind, RestrictionKind, TrainerKind};

/// Immutable game snapshot threaded through effect execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    // === Boards ===
    #[serde(flatten)]
    pub player: PlayerBoard,
    pub opponent: PlayerBoard,

    // === Shared ===
    #[serde(default)]
    pub stadium: Option<CardInstance>,
    pub turn_number: u32,
    #[serde(default)]
    pub is_first_turn: bool,
    #[serde(default = "default_true")]
    pub can_play_supporter: bool,
    #[serde(default = "default_true")]
    pub can_attack: bool,
    #[serde(default = "default_true")]
    pub can_retreat: bool,
    #[serde(default)]
    pub energy_attached_this_turn: bool,

    // === Tracking ===
    /// Lasting effects that legality checks consult.
    #[serde(default, skip_serializing_if = "Vector::is_empty")]
    pub active_effects: Vector<TrackedEffect>,

    /// Counter for unique placeholder ids.
    #[serde(default)]
    pub placeholder_seq: u32,
}

fn default_true() -> bool {
    true
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(PlayerBoard::player(), PlayerBoard::opponent())
    }
}

impl GameState {
    /// A state on turn 1 with every per-turn permission granted.
    #[must_use]
    pub fn new(player: PlayerBoard, opponent: PlayerBoard) -> Self {
        Self {
            player,
            opponent,
            stadium: None,
            turn_number: 1,
            is_first_turn: false,
            can_play_supporter: true,
            can_attack: true,
            can_retreat: true,
            energy_attached_this_turn: false,
            active_effects: Vector::new(),
            placeholder_seq: 0,
        }
    }

    /// Set the stadium in play (builder pattern).
    #[must_use]
    pub fn with_stadium(mut self, stadium: CardInstance) -> Self {
        self.stadium = Some(stadium);
        self
    }

    /// Set the turn number (builder pattern).
    #[must_use]
    pub fn with_turn(mut self, turn_number: u32) -> Self {
        self.turn_number = turn_number;
        self
    }

    // === Boards ===

    /// One side's board.
    #[must_use]
    pub fn board(&self, side: Side) -> &PlayerBoard {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Mutable access to one side's board.
    pub fn board_mut(&mut self, side: Side) -> &mut PlayerBoard {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// A fresh opaque card with a unique id, for draws from unknown zones.
    pub fn placeholder_card(&mut self) -> CardInstance {
        self.placeholder_seq += 1;
        CardInstance::placeholder(format!("unknown-{}", self.placeholder_seq))
    }

    // === Tracked effects ===

    /// Record a lasting effect.
    pub fn track(&mut self, effect: TrackedEffect) {
        self.active_effects.push_back(effect);
    }

    /// Tracked effects applying to a side.
    pub fn tracked_for(&self, side: Side) -> impl Iterator<Item = &TrackedEffect> {
        self.active_effects.iter().filter(move |e| e.side == side)
    }

    /// Restrictions currently applying to a side.
    pub fn restrictions_for(&self, side: Side) -> impl Iterator<Item = &RestrictionKind> {
        self.tracked_for(side).filter_map(|e| match &e.kind {
            TrackedKind::Restriction { restriction } => Some(restriction),
            _ => None,
        })
    }

    /// Preventions currently protecting a side.
    pub fn preventions_for(&self, side: Side) -> impl Iterator<Item = PreventionKind> + '_ {
        self.tracked_for(side).filter_map(|e| match e.kind {
            TrackedKind::Prevention { prevention, .. } => Some(prevention),
            _ => None,
        })
    }

    /// Whether a side may not play trainer cards of the given kind.
    #[must_use]
    pub fn is_trainer_blocked(&self, side: Side, kind: TrainerKind) -> bool {
        self.tracked_for(side).any(|e| match &e.kind {
            TrackedKind::TrainerBlock { blocked } => blocked.contains(&kind),
            _ => false,
        })
    }

    /// Extra prize cards granted to a side for its next knockout.
    #[must_use]
    pub fn extra_prizes(&self, side: Side) -> u32 {
        self.tracked_for(side)
            .map(|e| match e.kind {
                TrackedKind::ExtraPrize { amount } => amount,
                _ => 0,
            })
            .sum()
    }
}

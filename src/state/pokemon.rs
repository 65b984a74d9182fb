//! Pokémon in play and their status conditions.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::card::CardInstance;

/// HP represented by one damage counter.
pub const HP_PER_COUNTER: u32 = 10;

/// Special condition kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    Paralyzed,
    Asleep,
    Confused,
    Burned,
    Poisoned,
}

impl StatusKind {
    /// All kinds, in a fixed order.
    pub const ALL: [StatusKind; 5] = [
        Self::Paralyzed,
        Self::Asleep,
        Self::Confused,
        Self::Burned,
        Self::Poisoned,
    ];

    /// Conditions that only exist on the active Pokémon and are removed when
    /// it leaves the active slot.
    #[must_use]
    pub const fn is_active_only(self) -> bool {
        matches!(self, Self::Paralyzed | Self::Asleep | Self::Confused)
    }

    /// Lowercase name used in messages and serialized forms.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paralyzed => "paralyzed",
            Self::Asleep => "asleep",
            Self::Confused => "confused",
            Self::Burned => "burned",
            Self::Poisoned => "poisoned",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An applied special condition. Only one may be active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns_remaining: Option<u32>,
}

impl StatusCondition {
    /// A condition with no expiry.
    #[must_use]
    pub const fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            turns_remaining: None,
        }
    }
}

/// A lower evolution stage kept underneath an evolved Pokémon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorStage {
    pub card: CardInstance,
    pub max_hp: u32,
}

/// A Pokémon in the active spot or on the bench.
///
/// Invariant: `hp == max(0, max_hp - damage)`. Setters keep it; a Pokémon
/// whose damage reaches `max_hp` is removed by the knockout path and never
/// stays in state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonState {
    pub card: CardInstance,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    #[serde(default)]
    pub status: Option<StatusCondition>,
    #[serde(default)]
    pub attached_energy: Vector<CardInstance>,
    #[serde(default)]
    pub attached_tools: Vector<CardInstance>,
    #[serde(default)]
    pub abilities: Vector<String>,
    #[serde(default)]
    pub attacks: Vector<String>,
    #[serde(default = "default_true")]
    pub can_retreat: bool,
    #[serde(default)]
    pub retreat_cost: u32,
    /// Lower stages, bottom first.
    #[serde(default, skip_serializing_if = "Vector::is_empty")]
    pub evolution: Vector<PriorStage>,
}

fn default_true() -> bool {
    true
}

impl PokemonState {
    /// A fresh, undamaged Pokémon.
    pub fn new(card: CardInstance, max_hp: u32) -> Self {
        Self {
            card,
            hp: max_hp,
            max_hp,
            damage: 0,
            status: None,
            attached_energy: Vector::new(),
            attached_tools: Vector::new(),
            abilities: Vector::new(),
            attacks: Vector::new(),
            can_retreat: true,
            retreat_cost: 0,
            evolution: Vector::new(),
        }
    }

    /// Put a card into play using its printed HP, or `fallback_hp` if it has none.
    pub fn from_card(card: CardInstance, fallback_hp: u32) -> Self {
        let max_hp = card.hp.unwrap_or(fallback_hp);
        Self::new(card, max_hp)
    }

    /// Set damage (builder pattern).
    #[must_use]
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.set_damage(damage);
        self
    }

    /// Set status (builder pattern).
    #[must_use]
    pub fn with_status(mut self, kind: StatusKind) -> Self {
        self.status = Some(StatusCondition::new(kind));
        self
    }

    /// Attach an energy card (builder pattern).
    #[must_use]
    pub fn with_energy(mut self, energy: CardInstance) -> Self {
        self.attached_energy.push_back(energy);
        self
    }

    /// Attach a tool card (builder pattern).
    #[must_use]
    pub fn with_tool(mut self, tool: CardInstance) -> Self {
        self.attached_tools.push_back(tool);
        self
    }

    /// Add an attack name (builder pattern).
    #[must_use]
    pub fn with_attack(mut self, name: impl Into<String>) -> Self {
        self.attacks.push_back(name.into());
        self
    }

    /// Set the retreat cost (builder pattern).
    #[must_use]
    pub fn with_retreat_cost(mut self, cost: u32) -> Self {
        self.retreat_cost = cost;
        self
    }

    /// Record a lower stage underneath this Pokémon (builder pattern).
    #[must_use]
    pub fn evolved_from(mut self, card: CardInstance, max_hp: u32) -> Self {
        self.evolution.push_back(PriorStage { card, max_hp });
        self
    }

    /// Set damage and recompute `hp`.
    pub fn set_damage(&mut self, damage: u32) {
        self.damage = damage;
        self.hp = self.max_hp.saturating_sub(damage);
    }

    /// Whether the damage is lethal.
    #[must_use]
    pub fn is_knocked_out(&self) -> bool {
        self.damage >= self.max_hp
    }

    /// Number of damage counters on this Pokémon.
    #[must_use]
    pub fn damage_counters(&self) -> u32 {
        self.damage / HP_PER_COUNTER
    }

    /// Whether the Pokémon has any status condition of the given kind.
    #[must_use]
    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status.is_some_and(|s| s.kind == kind)
    }

    /// Whether this Pokémon has evolved from a lower stage.
    #[must_use]
    pub fn is_evolved(&self) -> bool {
        !self.evolution.is_empty()
    }

    /// Every card this Pokémon consists of, in discard order:
    /// lower stages, the Pokémon card, energy, tools.
    #[must_use]
    pub fn into_cards(self) -> Vector<CardInstance> {
        let mut cards: Vector<CardInstance> =
            self.evolution.into_iter().map(|stage| stage.card).collect();
        cards.push_back(self.card);
        cards.append(self.attached_energy);
        cards.append(self.attached_tools);
        cards
    }
}

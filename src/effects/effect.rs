//! Effect definitions.
//!
//! Effects are pure data: a tagged union over `EffectType` with a common
//! shape (targets, conditions, modifiers, timing, value, selection) plus
//! type-specific fields in `EffectKind`. No behavior attaches to them; all
//! behavior lives in the executor.

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::modifier::{Modifier, Timing};
use super::target::{Location, PlayerScope, Target};
use crate::state::{Side, StatusKind};

/// Closed set of effect kinds. Used as the executor registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectType {
    Damage,
    DamageModifier,
    Heal,
    Status,
    Draw,
    Discard,
    Search,
    Place,
    Switch,
    Energy,
    Counter,
    Ability,
    Restriction,
    RetreatModifier,
    TrainerBlock,
    Prevention,
    Prize,
    DeckManipulation,
    Devolution,
    Copy,
    SpecialPlay,
    HandToDeck,
    Unknown,
}

impl EffectType {
    /// Every known effect type (excludes `Unknown`).
    pub const KNOWN: [EffectType; 22] = [
        Self::Damage,
        Self::DamageModifier,
        Self::Heal,
        Self::Status,
        Self::Draw,
        Self::Discard,
        Self::Search,
        Self::Place,
        Self::Switch,
        Self::Energy,
        Self::Counter,
        Self::Ability,
        Self::Restriction,
        Self::RetreatModifier,
        Self::TrainerBlock,
        Self::Prevention,
        Self::Prize,
        Self::DeckManipulation,
        Self::Devolution,
        Self::Copy,
        Self::SpecialPlay,
        Self::HandToDeck,
    ];
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Damage => "damage",
            Self::DamageModifier => "damage-modifier",
            Self::Heal => "heal",
            Self::Status => "status",
            Self::Draw => "draw",
            Self::Discard => "discard",
            Self::Search => "search",
            Self::Place => "place",
            Self::Switch => "switch",
            Self::Energy => "energy",
            Self::Counter => "counter",
            Self::Ability => "ability",
            Self::Restriction => "restriction",
            Self::RetreatModifier => "retreat-modifier",
            Self::TrainerBlock => "trainer-block",
            Self::Prevention => "prevention",
            Self::Prize => "prize",
            Self::DeckManipulation => "deck-manipulation",
            Self::Devolution => "devolution",
            Self::Copy => "copy",
            Self::SpecialPlay => "special-play",
            Self::HandToDeck => "hand-to-deck",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// How candidates are picked when more are eligible than needed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Ask the deciding player.
    #[default]
    Choose,
    /// Draw with the seeded RNG.
    Random,
    /// Take every eligible candidate.
    All,
}

/// Unit of a heal amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealUnit {
    #[default]
    Hp,
    /// Each unit heals 10 HP.
    DamageCounters,
}

/// What a count-scaled damage value is multiplied by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum DamageScaling {
    /// Occupied bench slots.
    BenchPokemon { player: PlayerScope },
    /// Energy attached to the active Pokémon.
    AttachedEnergy { player: PlayerScope },
    /// Damage counters on the active Pokémon.
    DamageCounters { player: PlayerScope },
    /// Heads out of `coins` flips.
    CoinHeads { coins: u32 },
    /// Cards in hand.
    HandSize { player: PlayerScope },
}

/// Direction of a damage modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifyOperation {
    #[default]
    Add,
    Subtract,
}

/// Where searched cards go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchDestination {
    #[default]
    Hand,
    Bench,
    Discard,
    DeckTop,
    /// Put the looked-at cards back into the deck.
    Deck,
}

/// Energy operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyAction {
    /// Attach energy cards from `source` to the targeted Pokémon.
    Attach,
    /// Discard attached energy from the targeted Pokémon.
    Discard,
    /// Move attached energy from the first target to the second.
    Move,
}

/// Damage counter operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterAction {
    Place,
    Remove,
    /// From the first target to the second.
    Move,
}

/// How an ability is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbilityUsage {
    /// Always on.
    #[default]
    Passive,
    /// Usable once during each of the player's turns.
    OncePerTurn,
    /// Usable any number of times during the player's turn.
    Unlimited,
}

/// What a restriction forbids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RestrictionKind {
    CannotAttack,
    CannotUseAttack { name: String },
    CannotRetreat,
}

impl std::fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CannotAttack => f.write_str("cannot attack"),
            Self::CannotUseAttack { name } => write!(f, "cannot use {name}"),
            Self::CannotRetreat => f.write_str("cannot retreat"),
        }
    }
}

/// Retreat cost change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetreatChange {
    Reduce,
    Increase,
    RemoveAll,
}

/// Trainer card categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainerKind {
    Item,
    Supporter,
    Stadium,
    Tool,
}

impl TrainerKind {
    /// Card label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Item => "Item",
            Self::Supporter => "Supporter",
            Self::Stadium => "Stadium",
            Self::Tool => "Pokémon Tool",
        }
    }
}

/// What a prevention stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreventionKind {
    AllDamage,
    DamageAndEffects,
    Effects,
    /// Reduce incoming damage by the effect's `value`.
    ReduceDamage,
}

/// Prize operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrizeAction {
    /// Take `value` prize cards now.
    Take,
    /// Take `value` more prize cards on the next knockout.
    Extra,
}

/// Deck operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckAction {
    Shuffle,
    /// Look at the top `value` cards.
    LookTop,
    /// Discard the top `value` cards.
    DiscardTop,
}

/// Non-standard ways of playing cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialPlayKind {
    /// Evolve using a card searched from the deck.
    EvolveFromDeck,
    /// Evolve during the first turn or the turn the Pokémon was played.
    EvolveImmediately,
    /// Play this card during the first turn.
    PlayOnFirstTurn,
}

/// How a hand goes back into the deck.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeckPlacement {
    #[default]
    ShuffleIn,
    Bottom,
}

/// Type-specific effect payload. The serialized tag is `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EffectKind {
    #[serde(rename_all = "camelCase")]
    Damage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scaling: Option<DamageScaling>,
    },
    #[serde(rename_all = "camelCase")]
    DamageModifier {
        #[serde(default)]
        operation: ModifyOperation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scaling: Option<DamageScaling>,
    },
    #[serde(rename_all = "camelCase")]
    Heal {
        #[serde(default)]
        unit: HealUnit,
        /// Heal all damage regardless of `value`.
        #[serde(default)]
        all: bool,
        /// Also remove status conditions.
        #[serde(default)]
        cure_status: bool,
    },
    Status {
        status: StatusKind,
    },
    #[serde(rename_all = "camelCase")]
    Draw {
        /// `value` is a hand size to draw up to, not a card count.
        #[serde(default)]
        until_hand_size: bool,
    },
    Discard,
    #[serde(rename_all = "camelCase")]
    Search {
        #[serde(default)]
        destination: SearchDestination,
        /// Only the top N cards of the deck are candidates.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        look_at: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Place {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        look_at: Option<u32>,
    },
    Switch {
        /// Who picks the new active Pokémon.
        chooser: Side,
    },
    #[serde(rename_all = "camelCase")]
    Energy {
        action: EnergyAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        energy_type: Option<String>,
        /// Where attached energy comes from.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Location>,
    },
    Counter {
        action: CounterAction,
    },
    Ability {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        usage: AbilityUsage,
    },
    Restriction {
        restriction: RestrictionKind,
    },
    RetreatModifier {
        change: RetreatChange,
    },
    TrainerBlock {
        blocked: Vec<TrainerKind>,
    },
    Prevention {
        prevention: PreventionKind,
    },
    Prize {
        action: PrizeAction,
    },
    DeckManipulation {
        action: DeckAction,
    },
    Devolution,
    Copy,
    SpecialPlay {
        play: SpecialPlayKind,
    },
    HandToDeck {
        #[serde(default)]
        placement: DeckPlacement,
    },
    /// An effect type this crate does not know.
    #[serde(other)]
    Unknown,
}

impl EffectKind {
    /// The registry key for this payload.
    #[must_use]
    pub fn effect_type(&self) -> EffectType {
        match self {
            Self::Damage { .. } => EffectType::Damage,
            Self::DamageModifier { .. } => EffectType::DamageModifier,
            Self::Heal { .. } => EffectType::Heal,
            Self::Status { .. } => EffectType::Status,
            Self::Draw { .. } => EffectType::Draw,
            Self::Discard => EffectType::Discard,
            Self::Search { .. } => EffectType::Search,
            Self::Place { .. } => EffectType::Place,
            Self::Switch { .. } => EffectType::Switch,
            Self::Energy { .. } => EffectType::Energy,
            Self::Counter { .. } => EffectType::Counter,
            Self::Ability { .. } => EffectType::Ability,
            Self::Restriction { .. } => EffectType::Restriction,
            Self::RetreatModifier { .. } => EffectType::RetreatModifier,
            Self::TrainerBlock { .. } => EffectType::TrainerBlock,
            Self::Prevention { .. } => EffectType::Prevention,
            Self::Prize { .. } => EffectType::Prize,
            Self::DeckManipulation { .. } => EffectType::DeckManipulation,
            Self::Devolution => EffectType::Devolution,
            Self::Copy => EffectType::Copy,
            Self::SpecialPlay { .. } => EffectType::SpecialPlay,
            Self::HandToDeck { .. } => EffectType::HandToDeck,
            Self::Unknown => EffectType::Unknown,
        }
    }
}

/// A structured, typed description of one game-state transformation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    #[serde(flatten)]
    pub kind: EffectKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    #[serde(default)]
    pub selection: SelectionMode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_up_to: bool,
}

impl Effect {
    /// An effect with the given payload and no common fields set.
    #[must_use]
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            targets: Vec::new(),
            conditions: Vec::new(),
            modifiers: Vec::new(),
            timing: None,
            value: None,
            selection: SelectionMode::Choose,
            is_up_to: false,
        }
    }

    /// Registry key.
    #[must_use]
    pub fn effect_type(&self) -> EffectType {
        self.kind.effect_type()
    }

    // === Constructors ===

    /// Deal `value` damage to a target.
    #[must_use]
    pub fn damage(value: u32, target: Target) -> Self {
        Self::new(EffectKind::Damage { scaling: None })
            .with_value(value)
            .with_target(target)
    }

    /// Heal `value` HP from a target.
    #[must_use]
    pub fn heal(value: u32, target: Target) -> Self {
        Self::new(EffectKind::Heal {
            unit: HealUnit::Hp,
            all: false,
            cure_status: false,
        })
        .with_value(value)
        .with_target(target)
    }

    /// Apply a status condition to a target.
    #[must_use]
    pub fn status(status: StatusKind, target: Target) -> Self {
        Self::new(EffectKind::Status { status }).with_target(target)
    }

    /// The given player draws `count` cards.
    #[must_use]
    pub fn draw(count: u32, player: PlayerScope) -> Self {
        use super::target::LocationType;

        Self::new(EffectKind::Draw {
            until_hand_size: false,
        })
        .with_value(count)
        .with_target(Target::cards(player, LocationType::Deck))
    }

    // === Builders ===

    /// Add a target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Add a condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a modifier (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Set the timing (builder pattern).
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Set the value (builder pattern).
    #[must_use]
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the selection mode (builder pattern).
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionMode) -> Self {
        self.selection = selection;
        self
    }

    /// Allow selecting fewer than the stated count (builder pattern).
    #[must_use]
    pub fn up_to(mut self) -> Self {
        self.is_up_to = true;
        self
    }

    /// Copy of this effect without its conditions.
    #[must_use]
    pub fn without_conditions(&self) -> Self {
        Self {
            conditions: Vec::new(),
            ..self.clone()
        }
    }

    /// Primary target, if any.
    #[must_use]
    pub fn primary_target(&self) -> Option<&Target> {
        self.targets.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{LocationType, ModifierScope};

    #[test]
    fn test_effect_type_mapping() {
        let effect = Effect::damage(30, Target::opponent_active());
        assert_eq!(effect.effect_type(), EffectType::Damage);
        assert_eq!(effect.value, Some(30));
        assert_eq!(Effect::new(EffectKind::Copy).effect_type(), EffectType::Copy);
    }

    #[test]
    fn test_effect_serde_flattened_tag() {
        let effect = Effect::status(StatusKind::Paralyzed, Target::opponent_active())
            .with_modifier(Modifier::ignore(ModifierScope::Effects));
        let json = serde_json::to_value(&effect).unwrap();

        assert_eq!(json["type"], "status");
        assert_eq!(json["status"], "paralyzed");
        assert_eq!(json["targets"][0]["location"]["type"], "active");
        assert_eq!(json["modifiers"][0]["type"], "ignore");

        let back: Effect = serde_json::from_value(json).unwrap();
        assert_eq!(back, effect);
    }

    #[test]
    fn test_unknown_effect_type_deserializes() {
        let effect: Effect = serde_json::from_str(r#"{"type":"time-travel","value":3}"#).unwrap();
        assert_eq!(effect.kind, EffectKind::Unknown);
        assert_eq!(effect.effect_type(), EffectType::Unknown);
        assert_eq!(effect.value, Some(3));
    }

    #[test]
    fn test_draw_constructor_targets_deck() {
        let effect = Effect::draw(2, PlayerScope::SelfSide);
        let target = effect.primary_target().unwrap();
        assert_eq!(target.location.kind, LocationType::Deck);
        assert_eq!(effect.selection, SelectionMode::Choose);
        assert!(!effect.is_up_to);
    }

    #[test]
    fn test_known_types_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for kind in EffectType::KNOWN {
            assert!(seen.insert(kind));
        }
        assert!(!seen.contains(&EffectType::Unknown));
    }
}

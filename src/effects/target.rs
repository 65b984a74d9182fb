//! Effect targeting: who and where an effect applies.
//!
//! A `Target` is abstract. It names a player scope, a location and filters;
//! the `TargetResolver` maps it onto concrete entities at execution time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::{CardInstance, PokemonState, Side, StatusKind};

/// What kind of entity is targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    Pokemon,
    Card,
    Energy,
    Trainer,
}

/// Whose entities are targeted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerScope {
    #[default]
    #[serde(rename = "self")]
    SelfSide,
    Opponent,
    /// Resolve for self and for opponent independently and union the results.
    Both,
}

impl PlayerScope {
    /// Concrete sides this scope fans out to, self first.
    #[must_use]
    pub fn sides(self) -> &'static [Side] {
        match self {
            Self::SelfSide => &[Side::Player],
            Self::Opponent => &[Side::Opponent],
            Self::Both => &[Side::Player, Side::Opponent],
        }
    }

    /// Scope naming exactly one side.
    #[must_use]
    pub const fn of(side: Side) -> Self {
        match side {
            Side::Player => Self::SelfSide,
            Side::Opponent => Self::Opponent,
        }
    }
}

/// Zone kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    Deck,
    Hand,
    Discard,
    Bench,
    Active,
    /// Active and bench combined.
    Field,
    Prize,
}

/// A zone plus handling flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: LocationType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reveal: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shuffle: bool,
}

impl Location {
    /// A location with no flags.
    #[must_use]
    pub const fn new(kind: LocationType) -> Self {
        Self {
            kind,
            reveal: false,
            shuffle: false,
        }
    }

    /// Mark the zone to be shuffled afterwards (builder pattern).
    #[must_use]
    pub const fn shuffled(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// Mark the selection as revealed (builder pattern).
    #[must_use]
    pub const fn revealed(mut self) -> Self {
        self.reveal = true;
        self
    }
}

/// Evolution stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Basic,
    #[serde(rename = "stage1")]
    Stage1,
    #[serde(rename = "stage2")]
    Stage2,
}

impl Stage {
    /// Subtype string carried by cards of this stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Stage1 => "stage1",
            Self::Stage2 => "stage2",
        }
    }
}

/// Target filters. All filters on a target must match (AND).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Filter {
    /// Card type OR subtype equals the value.
    CardType(String),
    /// Evolution stage (matched against subtype).
    Stage(Stage),
    /// Name contains the value.
    Name(String),
    /// Energy card whose name contains the value, or a Pokémon with such
    /// energy attached.
    EnergyType(String),
    /// Status condition; `None` matches the absence of any status.
    Status(Option<StatusKind>),
    /// Pokémon with (true) or without (false) damage.
    HasDamage(bool),
    /// Pokémon with (true) or without (false) attached energy.
    HasEnergy(bool),
}

impl Filter {
    /// Check a Pokémon against this filter.
    #[must_use]
    pub fn matches_pokemon(&self, pokemon: &PokemonState) -> bool {
        match self {
            Self::CardType(value) => pokemon.card.matches_type(value),
            Self::Stage(stage) => pokemon.card.has_subtype(stage.as_str()),
            Self::Name(value) => pokemon.card.name.contains(value.as_str()),
            Self::EnergyType(value) => pokemon
                .attached_energy
                .iter()
                .any(|e| e.name.contains(value.as_str())),
            Self::Status(None) => pokemon.status.is_none(),
            Self::Status(Some(kind)) => pokemon.has_status(*kind),
            Self::HasDamage(expected) => (pokemon.damage > 0) == *expected,
            Self::HasEnergy(expected) => !pokemon.attached_energy.is_empty() == *expected,
        }
    }

    /// Check a card against this filter.
    #[must_use]
    pub fn matches_card(&self, card: &CardInstance) -> bool {
        match self {
            Self::CardType(value) => card.matches_type(value),
            Self::Stage(stage) => card.has_subtype(stage.as_str()),
            Self::Name(value) => card.name.contains(value.as_str()),
            Self::EnergyType(value) => {
                card.kind == crate::state::CardKind::Energy && card.name.contains(value.as_str())
            }
            // Pokémon-only filters never match loose cards.
            Self::Status(_) | Self::HasDamage(_) | Self::HasEnergy(_) => false,
        }
    }
}

/// How many entities a target selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetCount {
    Exactly(u32),
    All,
}

impl TargetCount {
    /// Limit as a number, `None` for all.
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Exactly(n) => Some(n as usize),
            Self::All => None,
        }
    }
}

impl Serialize for TargetCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Exactly(n) => serializer.serialize_u32(*n),
            Self::All => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for TargetCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self::Exactly(n)),
            Raw::Text(text) if text == "all" => Ok(Self::All),
            Raw::Text(other) => Err(serde::de::Error::custom(format!(
                "invalid target count '{other}', expected a number or \"all\""
            ))),
        }
    }
}

/// Abstract description of who/where an effect applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub player: PlayerScope,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<TargetCount>,
}

impl Target {
    /// Create a target with no filters and no count.
    #[must_use]
    pub fn new(kind: TargetKind, player: PlayerScope, location: LocationType) -> Self {
        Self {
            kind,
            player,
            location: Location::new(location),
            filters: Vec::new(),
            count: None,
        }
    }

    /// Pokémon target.
    #[must_use]
    pub fn pokemon(player: PlayerScope, location: LocationType) -> Self {
        Self::new(TargetKind::Pokemon, player, location)
    }

    /// Card target.
    #[must_use]
    pub fn cards(player: PlayerScope, location: LocationType) -> Self {
        Self::new(TargetKind::Card, player, location)
    }

    /// The opponent's active Pokémon.
    #[must_use]
    pub fn opponent_active() -> Self {
        Self::pokemon(PlayerScope::Opponent, LocationType::Active)
    }

    /// The player's own active Pokémon.
    #[must_use]
    pub fn self_active() -> Self {
        Self::pokemon(PlayerScope::SelfSide, LocationType::Active)
    }

    /// Add a filter (builder pattern).
    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Select exactly `n` (builder pattern).
    #[must_use]
    pub fn with_count(mut self, n: u32) -> Self {
        self.count = Some(TargetCount::Exactly(n));
        self
    }

    /// Select all matches (builder pattern).
    #[must_use]
    pub fn with_all(mut self) -> Self {
        self.count = Some(TargetCount::All);
        self
    }

    /// Replace the location flags (builder pattern).
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Whether a Pokémon passes every filter.
    #[must_use]
    pub fn accepts_pokemon(&self, pokemon: &PokemonState) -> bool {
        self.filters.iter().all(|f| f.matches_pokemon(pokemon))
    }

    /// Whether a card passes every filter, including the target kind.
    #[must_use]
    pub fn accepts_card(&self, card: &CardInstance) -> bool {
        use crate::state::CardKind;

        let kind_ok = match self.kind {
            TargetKind::Card => true,
            TargetKind::Pokemon => card.kind == CardKind::Pokemon,
            TargetKind::Energy => card.kind == CardKind::Energy,
            TargetKind::Trainer => card.kind == CardKind::Trainer,
        };
        kind_ok && self.filters.iter().all(|f| f.matches_card(card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_fan_out() {
        assert_eq!(PlayerScope::Both.sides(), &[Side::Player, Side::Opponent]);
        assert_eq!(PlayerScope::default(), PlayerScope::SelfSide);
    }

    #[test]
    fn test_filter_status_none() {
        let card = CardInstance::pokemon("p", "Pikachu", 60);
        let healthy = PokemonState::new(card.clone(), 60);
        let asleep = PokemonState::new(card, 60).with_status(StatusKind::Asleep);

        assert!(Filter::Status(None).matches_pokemon(&healthy));
        assert!(!Filter::Status(None).matches_pokemon(&asleep));
        assert!(Filter::Status(Some(StatusKind::Asleep)).matches_pokemon(&asleep));
    }

    #[test]
    fn test_card_type_matches_subtype() {
        let basic = PokemonState::new(
            CardInstance::pokemon("p", "Pikachu", 60).with_subtype("basic"),
            60,
        );
        assert!(Filter::CardType("pokemon".into()).matches_pokemon(&basic));
        assert!(Filter::CardType("basic".into()).matches_pokemon(&basic));
        assert!(Filter::Stage(Stage::Basic).matches_pokemon(&basic));
        assert!(!Filter::Stage(Stage::Stage1).matches_pokemon(&basic));
    }

    #[test]
    fn test_accepts_card_kind() {
        let target = Target::new(TargetKind::Energy, PlayerScope::SelfSide, LocationType::Discard);
        assert!(target.accepts_card(&CardInstance::energy("e", "Fire Energy")));
        assert!(!target.accepts_card(&CardInstance::trainer("t", "Potion", "item")));
    }

    #[test]
    fn test_target_serde_shape() {
        let target = Target::pokemon(PlayerScope::Opponent, LocationType::Bench).with_count(1);
        let json = serde_json::to_value(&target).unwrap();
        assert_eq!(json["type"], "pokemon");
        assert_eq!(json["player"], "opponent");
        assert_eq!(json["location"]["type"], "bench");
        assert_eq!(json["count"], 1);

        let all = Target::pokemon(PlayerScope::Both, LocationType::Field).with_all();
        let json = serde_json::to_value(&all).unwrap();
        assert_eq!(json["count"], "all");
        let back: Target = serde_json::from_value(json).unwrap();
        assert_eq!(back, all);
    }
}

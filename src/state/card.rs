//! Card instances.
//!
//! A `CardInstance` is one physical card in a game. Two instances may share
//! a `card_id` and `name` (duplicates in a deck); identity is the `id`.

use serde::{Deserialize, Serialize};

/// Top-level card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardKind {
    Pokemon,
    Trainer,
    Energy,
    /// Opaque placeholder for a card whose face is not known.
    Unknown,
}

impl CardKind {
    /// Canonical lowercase name, as used by `card-type` filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pokemon => "pokemon",
            Self::Trainer => "trainer",
            Self::Energy => "energy",
            Self::Unknown => "unknown",
        }
    }
}

/// A single card in play, in a zone, or attached to a Pokémon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstance {
    /// Unique instance id.
    pub id: String,
    /// Template (card definition) reference.
    pub card_id: String,
    /// Printed name.
    pub name: String,
    /// Card category.
    #[serde(rename = "type")]
    pub kind: CardKind,
    /// Finer classification: `basic`, `stage1`, `stage2`, `item`,
    /// `supporter`, `stadium`, `tool`, `ex`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Printed HP for Pokémon cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
}

impl CardInstance {
    /// Create a card instance.
    pub fn new(
        id: impl Into<String>,
        card_id: impl Into<String>,
        name: impl Into<String>,
        kind: CardKind,
    ) -> Self {
        Self {
            id: id.into(),
            card_id: card_id.into(),
            name: name.into(),
            kind,
            subtype: None,
            hp: None,
        }
    }

    /// A Pokémon card with printed HP. The template id is derived from the name.
    pub fn pokemon(id: impl Into<String>, name: impl Into<String>, hp: u32) -> Self {
        let name = name.into();
        Self::new(id, name.clone(), name, CardKind::Pokemon).with_hp(hp)
    }

    /// An energy card.
    pub fn energy(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(id, name.clone(), name, CardKind::Energy)
    }

    /// A trainer card with a subtype (`item`, `supporter`, ...).
    pub fn trainer(id: impl Into<String>, name: impl Into<String>, subtype: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(id, name.clone(), name, CardKind::Trainer).with_subtype(subtype)
    }

    /// Opaque stand-in for a card drawn from an unknown zone.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id, "unknown", "Unknown card", CardKind::Unknown)
    }

    /// Set the subtype (builder pattern).
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Set the printed HP (builder pattern).
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Same physical card (identity by instance id).
    #[must_use]
    pub fn same_instance(&self, other: &CardInstance) -> bool {
        self.id == other.id
    }

    /// Whether this is an opaque placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == CardKind::Unknown
    }

    /// `card-type` filter semantics: matches the card type OR the subtype.
    #[must_use]
    pub fn matches_type(&self, value: &str) -> bool {
        self.kind.as_str().eq_ignore_ascii_case(value)
            || self
                .subtype
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(value))
    }

    /// Whether the subtype equals `value` (case-insensitive).
    #[must_use]
    pub fn has_subtype(&self, value: &str) -> bool {
        self.subtype
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(value))
    }

    /// Substring check against name and subtype.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.subtype.as_deref().is_some_and(|s| s.contains(needle))
    }
}

impl std::fmt::Display for CardInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_type_or_subtype() {
        let card = CardInstance::trainer("t1", "Nest Ball", "item");
        assert!(card.matches_type("trainer"));
        assert!(card.matches_type("item"));
        assert!(!card.matches_type("supporter"));
    }

    #[test]
    fn test_identity_by_id() {
        let a = CardInstance::energy("e1", "Fire Energy");
        let b = CardInstance::energy("e2", "Fire Energy");
        assert!(!a.same_instance(&b));
        assert_eq!(a.card_id, b.card_id);
        assert!(a.same_instance(&a.clone()));
    }

    #[test]
    fn test_placeholder() {
        let card = CardInstance::placeholder("unknown-1");
        assert!(card.is_placeholder());
        assert_eq!(card.kind, CardKind::Unknown);
    }

    #[test]
    fn test_card_serde_shape() {
        let card = CardInstance::pokemon("p1", "Pikachu", 70).with_subtype("basic");
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["type"], "pokemon");
        assert_eq!(json["cardId"], "Pikachu");
        assert_eq!(json["subtype"], "basic");
        let back: CardInstance = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }
}

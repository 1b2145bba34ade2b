use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardType {
    Minion,
    Site,
    Magic,
    Aura,
    Artifact,
    Avatar,
}

impl CardType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Minion => "Minion",
            Self::Site => "Site",
            Self::Magic => "Magic",
            Self::Aura => "Aura",
            Self::Artifact => "Artifact",
            Self::Avatar => "Avatar",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minion" => Some(Self::Minion),
            "site" => Some(Self::Site),
            "magic" => Some(Self::Magic),
            "aura" => Some(Self::Aura),
            "artifact" => Some(Self::Artifact),
            "avatar" => Some(Self::Avatar),
            _ => None,
        }
    }

    /// Sort priority used when packing deck boards.
    pub fn board_priority(self) -> u8 {
        match self {
            Self::Minion => 0,
            Self::Magic => 1,
            Self::Aura | Self::Artifact => 2,
            Self::Site => 3,
            Self::Avatar => 4,
        }
    }
}

/// Rarity, declared in priority order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Ordinary,
    Exceptional,
    Elite,
    Unique,
}

impl Rarity {
    pub const ORDER: [Rarity; 4] = [
        Rarity::Ordinary,
        Rarity::Exceptional,
        Rarity::Elite,
        Rarity::Unique,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ordinary => "Ordinary",
            Self::Exceptional => "Exceptional",
            Self::Elite => "Elite",
            Self::Unique => "Unique",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ordinary" => Some(Self::Ordinary),
            "exceptional" => Some(Self::Exceptional),
            "elite" => Some(Self::Elite),
            "unique" => Some(Self::Unique),
            _ => None,
        }
    }

    pub fn priority(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Air,
    Earth,
    Fire,
    Water,
}

impl Element {
    pub fn name(self) -> &'static str {
        match self {
            Self::Air => "Air",
            Self::Earth => "Earth",
            Self::Fire => "Fire",
            Self::Water => "Water",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "air" => Some(Self::Air),
            "earth" => Some(Self::Earth),
            "fire" => Some(Self::Fire),
            "water" => Some(Self::Water),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardRecord {
    pub name: String,
    pub card_type: CardType,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defence: Option<i32>,
}

impl CardRecord {
    pub fn new(name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            name: name.into(),
            card_type,
            rarity: None,
            elements: Vec::new(),
            cost: None,
            attack: None,
            defence: None,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    pub fn with_elements(mut self, elements: &[Element]) -> Self {
        self.elements.clear();
        for element in elements {
            if !self.elements.contains(element) {
                self.elements.push(*element);
            }
        }
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn is_site(&self) -> bool {
        self.card_type == CardType::Site
    }

    pub fn rarity_or_default(&self) -> Rarity {
        self.rarity.unwrap_or(Rarity::Ordinary)
    }

    pub fn element_key(&self) -> ElementKey {
        match self.elements.as_slice() {
            [] => ElementKey::None,
            [single] => ElementKey::Single(*single),
            _ => ElementKey::Multiple,
        }
    }

    pub fn type_key(&self) -> TypeKey {
        match self.card_type {
            CardType::Aura | CardType::Magic => TypeKey::Spell,
            other => TypeKey::Raw(other),
        }
    }

    /// Name of the first listed element, or `"None"`.
    pub fn primary_element_name(&self) -> &'static str {
        self.elements.first().map(|e| e.name()).unwrap_or("None")
    }
}

/// Element bucket of the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKey {
    None,
    Single(Element),
    Multiple,
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Single(element) => f.write_str(element.name()),
            Self::Multiple => f.write_str("Multiple"),
        }
    }
}

/// Type bucket; auras and magics share the `Spell` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Spell,
    Raw(CardType),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spell => f.write_str("Spell"),
            Self::Raw(card_type) => f.write_str(card_type.name()),
        }
    }
}

/// Flags derived from rules text once at catalog load. Orthogonal to layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardAbilities {
    pub airborne: bool,
    pub submerge: bool,
    pub burrowing: bool,
    pub stealth: bool,
    pub lethal: bool,
    pub waterbound: bool,
    pub landbound: bool,
    pub voidwalk: bool,
    pub spellcaster: bool,
    pub ranged: bool,
    pub movement: i32,
    pub range: i32,
}

impl Default for CardAbilities {
    fn default() -> Self {
        Self {
            airborne: false,
            submerge: false,
            burrowing: false,
            stealth: false,
            lethal: false,
            waterbound: false,
            landbound: false,
            voidwalk: false,
            spellcaster: false,
            ranged: false,
            movement: 1,
            range: 1,
        }
    }
}

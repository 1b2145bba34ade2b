use serde::{Deserialize, Serialize};

pub use spellgrid_core::{
    BoardRule, CardAbilities, CardRecord, CatalogRule, ClusterRule, Deck, GridRule, LayoutConfig,
    PersistedLayout, PersistedPlacement, SpringRule,
};

/// One card as exported by the card database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRow {
    pub name: String,
    /// Comma separated element names, possibly empty.
    #[serde(default)]
    pub elements: String,
    pub guardian: GuardianRow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianRow {
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub cost: Option<u32>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defence: Option<i32>,
    #[serde(default)]
    pub rules_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckEntryRow {
    pub card: String,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckFile {
    /// Falls back to the file stem when empty.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: Vec<DeckEntryRow>,
    #[serde(default)]
    pub mainboard: Vec<DeckEntryRow>,
    #[serde(default)]
    pub sideboard: Vec<DeckEntryRow>,
    #[serde(default)]
    pub maybeboard: Vec<DeckEntryRow>,
}

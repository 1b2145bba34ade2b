use crate::abilities::parse_abilities;
use crate::schema::{CardRow, DeckEntryRow, DeckFile};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use spellgrid_core::{
    BoardKind, CardAbilities, CardCatalog, CardRecord, CardType, Deck, Element, LayoutConfig,
    Rarity,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CARDS_FILE: &str = "cards.json";
pub const LAYOUT_FILE: &str = "layout.json";
pub const DECKS_DIR: &str = "decks";

#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub catalog: CardCatalog,
    /// Flags parsed from each card's rules text.
    pub abilities: HashMap<String, CardAbilities>,
    /// Rows that could not be turned into a card, with the reason.
    pub skipped: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Assets {
    pub root: PathBuf,
    pub cards: CatalogLoad,
    pub config: LayoutConfig,
    pub decks: Vec<Deck>,
}

/// Loads everything under an assets directory. Blocks until done.
pub fn load_assets(dir: &Path) -> anyhow::Result<Assets> {
    let cards = load_catalog(&dir.join(CARDS_FILE))?;
    let config = load_layout_config(dir)?;
    let decks_dir = dir.join(DECKS_DIR);
    let decks = if decks_dir.is_dir() {
        load_decks(&decks_dir)?
    } else {
        Vec::new()
    };
    info!(
        root = %dir.display(),
        cards = cards.catalog.len(),
        skipped = cards.skipped.len(),
        decks = decks.len(),
        "assets loaded"
    );
    Ok(Assets {
        root: dir.to_path_buf(),
        cards,
        config,
        decks,
    })
}

pub fn load_catalog(path: &Path) -> anyhow::Result<CatalogLoad> {
    let rows: Vec<CardRow> = load_json(path)?;
    let mut records = Vec::with_capacity(rows.len());
    let mut abilities = HashMap::new();
    let mut skipped = Vec::new();
    for row in rows {
        match card_record(&row) {
            Ok(record) => {
                let text = row.guardian.rules_text.as_deref().unwrap_or_default();
                abilities.insert(record.name.clone(), parse_abilities(text));
                records.push(record);
            }
            Err(err) => {
                warn!(card = %row.name, error = %err, "card row skipped");
                skipped.push((row.name.clone(), err.to_string()));
            }
        }
    }
    Ok(CatalogLoad {
        catalog: CardCatalog::from_records(records),
        abilities,
        skipped,
    })
}

pub fn card_record(row: &CardRow) -> anyhow::Result<CardRecord> {
    let name = row.name.trim();
    if name.is_empty() {
        bail!("card without a name");
    }
    let Some(card_type) = CardType::from_name(&row.guardian.card_type) else {
        bail!("unknown card type {:?}", row.guardian.card_type);
    };
    let rarity = match row.guardian.rarity.as_deref() {
        None | Some("") => None,
        Some(value) => match Rarity::from_name(value) {
            Some(rarity) => Some(rarity),
            None => {
                debug!(card = %name, rarity = %value, "unknown rarity, treated as ordinary");
                None
            }
        },
    };
    let mut elements = Vec::new();
    for part in row.elements.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match Element::from_name(part) {
            Some(element) => elements.push(element),
            None => bail!("unknown element {part:?}"),
        }
    }
    let mut record = CardRecord::new(name, card_type).with_elements(&elements);
    record.rarity = rarity;
    record.cost = row.guardian.cost;
    record.attack = row.guardian.attack;
    record.defence = row.guardian.defence;
    Ok(record)
}

/// `layout.json` is optional; missing fields keep their defaults.
pub fn load_layout_config(dir: &Path) -> anyhow::Result<LayoutConfig> {
    let path = dir.join(LAYOUT_FILE);
    if path.exists() {
        load_json(path)
    } else {
        debug!(dir = %dir.display(), "no layout config, using defaults");
        Ok(LayoutConfig::default())
    }
}

pub fn load_deck(path: &Path) -> anyhow::Result<Deck> {
    let file: DeckFile = load_json(path)?;
    let id = if file.id.trim().is_empty() {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .with_context(|| format!("deck id for {}", path.display()))?
    } else {
        file.id.trim().to_string()
    };
    let name = if file.name.is_empty() {
        id.clone()
    } else {
        file.name.clone()
    };
    let mut deck = Deck::new(id, name);
    for (board, rows) in [
        (BoardKind::Avatar, &file.avatar),
        (BoardKind::Mainboard, &file.mainboard),
        (BoardKind::Sideboard, &file.sideboard),
        (BoardKind::Maybeboard, &file.maybeboard),
    ] {
        if !rows.is_empty() {
            deck = deck.with_board(board, merge_entries(rows));
        }
    }
    Ok(deck)
}

/// Every `*.json` deck in `dir`, sorted by file name. Duplicate ids are an error.
pub fn load_decks(dir: &Path) -> anyhow::Result<Vec<Deck>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut seen = HashSet::new();
    let mut decks = Vec::with_capacity(paths.len());
    for path in paths {
        let deck = load_deck(&path)?;
        if !seen.insert(deck.id.clone()) {
            bail!("duplicate deck id {} in {}", deck.id, path.display());
        }
        decks.push(deck);
    }
    Ok(decks)
}

/// Repeated rows for one card add up, keeping first-seen order.
fn merge_entries(rows: &[DeckEntryRow]) -> Vec<(String, u32)> {
    let mut merged: Vec<(String, u32)> = Vec::new();
    for row in rows.iter().filter(|row| row.count > 0) {
        match merged.iter_mut().find(|(card, _)| *card == row.card) {
            Some((_, count)) => *count += row.count,
            None => merged.push((row.card.clone(), row.count)),
        }
    }
    merged
}

pub(crate) fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

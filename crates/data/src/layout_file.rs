use crate::load::load_json;
use anyhow::Context;
use spellgrid_core::{CardCatalog, PersistedLayout, PlacementStore};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn save_layout(path: &Path, store: &PlacementStore) -> anyhow::Result<()> {
    let layout = store.to_persisted();
    let raw = serde_json::to_string_pretty(&layout).context("serialize layout")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), placements = store.len(), "layout saved");
    Ok(())
}

/// Seeds a store from a saved layout. Cards the catalog no longer knows are dropped.
pub fn load_layout(path: &Path, catalog: &CardCatalog) -> anyhow::Result<PlacementStore> {
    let layout: PersistedLayout = load_json(path)?;
    let store = PlacementStore::from_persisted(&layout, |card| {
        let known = catalog.contains(card);
        if !known {
            warn!(card, path = %path.display(), "saved placement for unknown card skipped");
        }
        known
    });
    Ok(store)
}

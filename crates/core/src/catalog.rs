use crate::CardRecord;
use std::collections::HashMap;
use tracing::debug;

/// Card attributes keyed by unique name. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: HashMap<String, CardRecord>,
}

impl CardCatalog {
    /// Builds a catalog; a later record with the same name replaces the earlier one.
    pub fn from_records(records: impl IntoIterator<Item = CardRecord>) -> Self {
        let mut cards = HashMap::new();
        for record in records {
            if cards.contains_key(&record.name) {
                debug!(card = %record.name, "duplicate catalog record replaced");
            }
            cards.insert(record.name.clone(), record);
        }
        Self { cards }
    }

    pub fn get(&self, name: &str) -> Option<&CardRecord> {
        self.cards.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardRecord> {
        self.cards.values()
    }

    /// All names in lexical order, for deterministic catalog layouts.
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cards.keys().cloned().collect();
        names.sort();
        names
    }
}

//! Authoritative store of every card placement.
//!
//! Placements are addressed by `(card, group, slot)`. For each `(card, group)`
//! pair the slots form a dense vector: removing a slot shifts the later ones
//! down, and a pair whose last slot is removed disappears from the store.

use crate::{GroupId, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlacementRef {
    pub card: String,
    pub group: GroupId,
    pub slot: usize,
}

impl PlacementRef {
    pub fn new(card: impl Into<String>, group: GroupId, slot: usize) -> Self {
        Self {
            card: card.into(),
            group,
            slot,
        }
    }
}

/// Borrowed view of one placement, as handed to readers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementView<'a> {
    pub card: &'a str,
    pub group: &'a GroupId,
    pub slot: usize,
    pub position: Point,
}

impl PlacementView<'_> {
    pub fn to_ref(&self) -> PlacementRef {
        PlacementRef::new(self.card, self.group.clone(), self.slot)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no placement for {card} in {group} at slot {slot}")]
    Missing {
        card: String,
        group: GroupId,
        slot: usize,
    },
    #[error("source and target group are both {0}")]
    SameGroup(GroupId),
}

impl PlacementError {
    fn missing(card: &str, group: &GroupId, slot: usize) -> Self {
        Self::Missing {
            card: card.to_string(),
            group: group.clone(),
            slot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedPlacement {
    pub group: GroupId,
    pub position: Point,
}

/// On-disk shape: card name to every `(group, position)` it occupies.
pub type PersistedLayout = BTreeMap<String, Vec<PersistedPlacement>>;

#[derive(Debug, Clone, Default)]
pub struct PlacementStore {
    groups: BTreeMap<GroupId, BTreeMap<String, Vec<Point>>>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new slot and returns its index.
    pub fn add_placement(&mut self, card: &str, group: &GroupId, position: Point) -> usize {
        let slots = self
            .groups
            .entry(group.clone())
            .or_default()
            .entry(card.to_string())
            .or_default();
        slots.push(position);
        slots.len() - 1
    }

    /// Removes one slot, compacting the rest. Returns the removed position.
    pub fn remove_placement(
        &mut self,
        card: &str,
        group: &GroupId,
        slot: usize,
    ) -> Result<Point, PlacementError> {
        let cards = self
            .groups
            .get_mut(group)
            .ok_or_else(|| PlacementError::missing(card, group, slot))?;
        let slots = cards
            .get_mut(card)
            .filter(|slots| slot < slots.len())
            .ok_or_else(|| PlacementError::missing(card, group, slot))?;
        let removed = slots.remove(slot);
        if slots.is_empty() {
            cards.remove(card);
        }
        if cards.is_empty() {
            self.groups.remove(group);
        }
        Ok(removed)
    }

    /// Moves one slot to another group, keeping its position. Returns the new slot.
    pub fn move_placement(
        &mut self,
        card: &str,
        from: &GroupId,
        to: &GroupId,
        slot: usize,
    ) -> Result<usize, PlacementError> {
        if from == to {
            return Err(PlacementError::SameGroup(from.clone()));
        }
        let position = self.remove_placement(card, from, slot)?;
        Ok(self.add_placement(card, to, position))
    }

    pub fn position(&self, placement: &PlacementRef) -> Option<Point> {
        self.slots(&placement.card, &placement.group)?
            .get(placement.slot)
            .copied()
    }

    pub fn set_position(
        &mut self,
        placement: &PlacementRef,
        position: Point,
    ) -> Result<(), PlacementError> {
        let slot = self
            .groups
            .get_mut(&placement.group)
            .and_then(|cards| cards.get_mut(&placement.card))
            .and_then(|slots| slots.get_mut(placement.slot))
            .ok_or_else(|| {
                PlacementError::missing(&placement.card, &placement.group, placement.slot)
            })?;
        *slot = position;
        Ok(())
    }

    pub fn contains(&self, placement: &PlacementRef) -> bool {
        self.position(placement).is_some()
    }

    pub fn slots(&self, card: &str, group: &GroupId) -> Option<&[Point]> {
        self.groups
            .get(group)?
            .get(card)
            .map(|slots| slots.as_slice())
    }

    /// Replaces every slot of `(card, group)`. An empty list removes the pair.
    pub fn replace_slots(&mut self, card: &str, group: &GroupId, positions: Vec<Point>) {
        if positions.is_empty() {
            if let Some(cards) = self.groups.get_mut(group) {
                cards.remove(card);
                if cards.is_empty() {
                    self.groups.remove(group);
                }
            }
            return;
        }
        self.groups
            .entry(group.clone())
            .or_default()
            .insert(card.to_string(), positions);
    }

    pub fn clear_group(&mut self, group: &GroupId) {
        self.groups.remove(group);
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.keys()
    }

    pub fn has_group(&self, group: &GroupId) -> bool {
        self.groups.contains_key(group)
    }

    /// Every placement of one group, ordered by card name then slot.
    pub fn placements<'a>(
        &'a self,
        group: &'a GroupId,
    ) -> impl Iterator<Item = PlacementView<'a>> + 'a {
        self.groups
            .get_key_value(group)
            .into_iter()
            .flat_map(|(group, cards)| {
                cards.iter().flat_map(move |(card, slots)| {
                    slots.iter().enumerate().map(move |(slot, position)| PlacementView {
                        card: card.as_str(),
                        group,
                        slot,
                        position: *position,
                    })
                })
            })
    }

    /// Every placement in the store, catalog group first.
    pub fn all_placements(&self) -> impl Iterator<Item = PlacementView<'_>> + '_ {
        self.groups.keys().flat_map(move |group| self.placements(group))
    }

    pub fn group_len(&self, group: &GroupId) -> usize {
        self.groups
            .get(group)
            .map(|cards| cards.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.groups
            .values()
            .flat_map(|cards| cards.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Shifts every placement of a group by the same offset.
    pub fn translate_group(&mut self, group: &GroupId, offset: Point) {
        if let Some(cards) = self.groups.get_mut(group) {
            for position in cards.values_mut().flat_map(|slots| slots.iter_mut()) {
                *position = *position + offset;
            }
        }
    }

    /// Copies in what `fresh` has and this store lacks. Stored slots keep their
    /// positions; a pair with fewer slots here takes the missing tail from
    /// `fresh`. Returns how many placements were added.
    pub fn fill_unplaced(&mut self, fresh: &PlacementStore) -> usize {
        let mut added = 0;
        for (group, cards) in &fresh.groups {
            for (card, slots) in cards {
                let kept = self.slots(card, group).map_or(0, <[Point]>::len);
                for position in slots.iter().skip(kept) {
                    self.add_placement(card, group, *position);
                    added += 1;
                }
            }
        }
        added
    }

    pub fn to_persisted(&self) -> PersistedLayout {
        let mut layout = PersistedLayout::new();
        for (group, cards) in &self.groups {
            for (card, slots) in cards {
                let entry = layout.entry(card.clone()).or_default();
                entry.extend(slots.iter().map(|position| PersistedPlacement {
                    group: group.clone(),
                    position: *position,
                }));
            }
        }
        layout
    }

    /// Builds a store from persisted entries, skipping cards `keep` rejects.
    pub fn from_persisted<F>(layout: &PersistedLayout, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        let mut store = Self::new();
        for (card, entries) in layout {
            if !keep(card) {
                continue;
            }
            for entry in entries {
                store.add_placement(card, &entry.group, entry.position);
            }
        }
        store
    }
}

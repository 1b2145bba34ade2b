//! Decks, their on-screen regions, and what happens when cards are dropped on them.

use crate::{
    BoardGridLayout, BoardKind, BoardReport, CardCatalog, DragSummary, EventBus, GridCellPolicy,
    GroupId, LayoutConfig, LayoutEvent, PlacementRef, PlacementStore, Point, Rect, Size,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Deck {
    pub id: String,
    pub name: String,
    /// Card name and copy count per board, in list order.
    #[serde(default)]
    pub boards: BTreeMap<BoardKind, Vec<(String, u32)>>,
}

impl Deck {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            boards: BTreeMap::new(),
        }
    }

    pub fn with_board(mut self, board: BoardKind, entries: Vec<(String, u32)>) -> Self {
        self.boards.insert(board, entries);
        self
    }

    pub fn entries(&self, board: BoardKind) -> &[(String, u32)] {
        self.boards.get(&board).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of copies on one board.
    pub fn copies(&self, board: BoardKind) -> u32 {
        self.entries(board).iter().map(|(_, count)| count).sum()
    }

    pub fn group(&self, board: BoardKind) -> GroupId {
        GroupId::board(self.id.as_str(), board)
    }

    /// Adds one copy to a board, appending the card when it is new there.
    pub fn add_copy(&mut self, board: BoardKind, card: &str) {
        let entries = self.boards.entry(board).or_default();
        match entries.iter_mut().find(|(name, _)| name == card) {
            Some((_, count)) => *count += 1,
            None => entries.push((card.to_string(), 1)),
        }
    }

    /// Takes one copy off a board. Returns false when the board had none.
    pub fn remove_copy(&mut self, board: BoardKind, card: &str) -> bool {
        let Some(entries) = self.boards.get_mut(&board) else {
            return false;
        };
        let Some(index) = entries.iter().position(|(name, _)| name == card) else {
            return false;
        };
        entries[index].1 = entries[index].1.saturating_sub(1);
        if entries[index].1 == 0 {
            entries.remove(index);
        }
        if entries.is_empty() {
            self.boards.remove(&board);
        }
        true
    }
}

/// Screen regions of one deck: mainboard on top, sideboard and maybeboard below.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckRegions {
    deck: String,
    origin: Point,
    mainboard: Rect,
    sideboard: Rect,
    maybeboard: Rect,
}

impl DeckRegions {
    pub fn at(deck: impl Into<String>, origin: Point, config: &LayoutConfig) -> Self {
        let origin = config.snap_to_unit(origin);
        let boards = &config.boards;
        let width = boards.mainboard.width;
        let mainboard = Rect::from_origin_size(origin, boards.mainboard);
        let sideboard = Rect::new(
            origin.x,
            mainboard.max_y,
            origin.x + width,
            mainboard.max_y + boards.sideboard.height,
        );
        let maybeboard = Rect::new(
            origin.x,
            sideboard.max_y,
            origin.x + width,
            sideboard.max_y + boards.maybeboard.height,
        );
        Self {
            deck: deck.into(),
            origin,
            mainboard,
            sideboard,
            maybeboard,
        }
    }

    /// Origin of the `index`-th deck, counting from zero, left to right.
    pub fn next_deck_origin(config: &LayoutConfig, index: usize) -> Point {
        let boards = &config.boards;
        let step = boards.mainboard.width + boards.deck_spacing;
        Point::new(
            boards.first_deck_origin.x + index as f32 * step,
            boards.first_deck_origin.y,
        )
    }

    pub fn deck(&self) -> &str {
        &self.deck
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Region of a bounded board. The avatar shares the mainboard region.
    pub fn region(&self, board: BoardKind) -> Rect {
        match board {
            BoardKind::Avatar | BoardKind::Mainboard => self.mainboard,
            BoardKind::Sideboard => self.sideboard,
            BoardKind::Maybeboard => self.maybeboard,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.mainboard.union(&self.sideboard).union(&self.maybeboard)
    }

    pub fn group(&self, board: BoardKind) -> GroupId {
        GroupId::board(self.deck.as_str(), board)
    }

    pub fn board_at(&self, point: Point) -> Option<BoardKind> {
        BoardKind::BOUNDED
            .into_iter()
            .find(|board| self.region(*board).contains(point))
    }

    /// Moves the regions and every placement of the deck by the same offset.
    pub fn translate(&mut self, offset: Point, store: &mut PlacementStore) {
        self.origin = self.origin + offset;
        for rect in [&mut self.mainboard, &mut self.sideboard, &mut self.maybeboard] {
            *rect = Rect::from_origin_size(
                rect.origin() + offset,
                Size::new(rect.width(), rect.height()),
            );
        }
        for board in BoardKind::ALL {
            store.translate_group(&self.group(board), offset);
        }
    }

    /// Writes the whole deck: avatar column first, then each bounded board.
    pub fn place_deck(
        &self,
        deck: &Deck,
        catalog: &CardCatalog,
        config: &LayoutConfig,
        store: &mut PlacementStore,
        events: &mut EventBus,
    ) -> Vec<BoardReport> {
        let policy = GridCellPolicy::new(*config);
        let layout = BoardGridLayout::new(*config);
        let inset = config.boards.inset;

        let avatar_group = self.group(BoardKind::Avatar);
        store.clear_group(&avatar_group);
        let mut cursor = Point::new(self.origin.x + inset, self.origin.y + inset);
        let mut column_width = 0.0f32;
        for (name, count) in deck.entries(BoardKind::Avatar) {
            let Some(card) = catalog.get(name) else {
                warn!(card = %name, deck = %self.deck, "avatar missing from catalog, skipped");
                events.push(LayoutEvent::ReferenceMissing {
                    card: name.clone(),
                    group: avatar_group.clone(),
                });
                continue;
            };
            let cell = policy.footprint(card).cell;
            for _ in 0..*count {
                store.add_placement(name, &avatar_group, cursor);
                cursor.y += cell.height;
            }
            column_width = column_width.max(cell.width);
        }

        let mut main_region = self.mainboard;
        main_region.min_x += column_width;

        let mut reports = Vec::with_capacity(BoardKind::BOUNDED.len());
        for board in BoardKind::BOUNDED {
            let region = if board == BoardKind::Mainboard {
                main_region
            } else {
                self.region(board)
            };
            reports.push(layout.layout(
                catalog,
                deck.entries(board),
                &self.group(board),
                region,
                store,
                events,
            ));
        }
        debug!(
            deck = %self.deck,
            origin_x = self.origin.x,
            origin_y = self.origin.y,
            "deck placed"
        );
        reports
    }
}

/// A slot whose identity changed while a drop was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChange {
    /// A copy was appended to a group; existing slots keep their index.
    Added(PlacementRef),
    /// `from` left its group and the slots above it shifted down by one.
    /// `to` is where the placement went, if it still exists.
    Removed {
        from: PlacementRef,
        to: Option<PlacementRef>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropOutcome {
    pub added: usize,
    pub moved: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Slot changes in the order they were applied.
    pub changes: Vec<SlotChange>,
}

impl DropOutcome {
    /// Where a reference taken before the drop points now. `None` when its
    /// placement was removed.
    pub fn retarget(&self, placement: &PlacementRef) -> Option<PlacementRef> {
        let mut current = placement.clone();
        for change in &self.changes {
            let SlotChange::Removed { from, to } = change else {
                continue;
            };
            if from.card != current.card || from.group != current.group {
                continue;
            }
            match current.slot.cmp(&from.slot) {
                Ordering::Less => {}
                Ordering::Equal => current = to.clone()?,
                Ordering::Greater => current.slot -= 1,
            }
        }
        Some(current)
    }
}

/// Applies deck membership changes for a finished drag.
///
/// The target board is the one under `summary.drop_point`. Copies dragged in
/// from outside the deck are added there while the dragged placement goes
/// back to where it started. Board placements dropped outside every region
/// leave their board. Slots are handled in descending order so that removals
/// never shift a slot that is still pending. Every change is mirrored into
/// the matching entry of `decks`, so a later `place_deck` keeps it.
pub fn apply_drop(
    store: &mut PlacementStore,
    decks: &mut [Deck],
    summary: &DragSummary,
    regions: &[DeckRegions],
    events: &mut EventBus,
) -> DropOutcome {
    let target = regions.iter().find_map(|deck| {
        deck.board_at(summary.drop_point)
            .map(|board| (deck.deck(), board, deck.group(board)))
    });

    let mut pending = summary.moved.clone();
    pending.sort();
    pending.reverse();

    let mut outcome = DropOutcome::default();
    for placement in &pending {
        let Some(position) = store.position(placement) else {
            debug!(
                card = %placement.card,
                group = %placement.group,
                slot = placement.slot,
                "dropped placement vanished"
            );
            events.push(LayoutEvent::StaleSelectionReference {
                placement: placement.clone(),
            });
            continue;
        };
        let card = placement.card.as_str();
        match &target {
            Some((_, _, group)) if *group == placement.group => outcome.unchanged += 1,
            Some((deck, board, group)) if placement.group.deck() == Some(*deck) => {
                let Ok(slot) = store.move_placement(card, &placement.group, group, placement.slot)
                else {
                    continue;
                };
                if let Some(entry) = deck_mut(decks, deck) {
                    if let Some(source) = placement.group.board_kind() {
                        entry.remove_copy(source, card);
                    }
                    entry.add_copy(*board, card);
                }
                outcome.changes.push(SlotChange::Removed {
                    from: placement.clone(),
                    to: Some(PlacementRef::new(card, group.clone(), slot)),
                });
                outcome.moved += 1;
            }
            Some((deck, board, group)) => {
                let slot = store.add_placement(card, group, position);
                // The source keeps its copy where it was.
                if let Some(original) = summary.originals.get(placement) {
                    if let Err(err) = store.set_position(placement, *original) {
                        debug!(%err, "source placement not restored");
                    }
                }
                if let Some(entry) = deck_mut(decks, deck) {
                    entry.add_copy(*board, card);
                }
                outcome
                    .changes
                    .push(SlotChange::Added(PlacementRef::new(card, group.clone(), slot)));
                outcome.added += 1;
            }
            None if placement.group.is_catalog() => outcome.unchanged += 1,
            None => {
                if store
                    .remove_placement(card, &placement.group, placement.slot)
                    .is_err()
                {
                    continue;
                }
                let source = placement.group.deck().zip(placement.group.board_kind());
                if let Some((deck, board)) = source {
                    if let Some(entry) = deck_mut(decks, deck) {
                        entry.remove_copy(board, card);
                    }
                }
                outcome.changes.push(SlotChange::Removed {
                    from: placement.clone(),
                    to: None,
                });
                outcome.removed += 1;
            }
        }
    }
    debug!(
        added = outcome.added,
        moved = outcome.moved,
        removed = outcome.removed,
        "drop applied"
    );
    outcome
}

fn deck_mut<'a>(decks: &'a mut [Deck], id: &str) -> Option<&'a mut Deck> {
    let found = decks.iter_mut().find(|deck| deck.id == id);
    if found.is_none() {
        debug!(deck = %id, "dropped on a deck without a list, membership not recorded");
    }
    found
}

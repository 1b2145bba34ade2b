//! Pointer-driven selection: click, shift/alt modifiers, rubber-band boxes,
//! rigid multi-card drags and per-card snapping on release.

use crate::{
    CardCatalog, CardShape, DropOutcome, EventBus, GridCellPolicy, ImagePipeline, LayoutConfig,
    LayoutEvent, PlacementRef, PlacementStore, Point, Rect,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
    };
    pub const ALT: Modifiers = Modifiers {
        shift: false,
        alt: true,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerState {
    Idle,
    Dragging {
        anchor: PlacementRef,
        /// Pointer position relative to the anchor's top-left corner.
        drag_offset: Point,
        original_positions: BTreeMap<PlacementRef, Point>,
    },
    BoxSelecting {
        start: Point,
        current: Point,
        /// Selection when the box was started.
        base: BTreeSet<PlacementRef>,
        modifiers: Modifiers,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    SingleSelected,
    MultiSelected,
    Dragging,
    BoxSelecting,
}

/// What a finished drag moved, for deck drop handling.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSummary {
    pub moved: Vec<PlacementRef>,
    /// Positions before the drag started.
    pub originals: BTreeMap<PlacementRef, Point>,
    pub drop_point: Point,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    policy: GridCellPolicy,
    selection: BTreeSet<PlacementRef>,
    anchor: Option<PlacementRef>,
    state: PointerState,
}

impl SelectionController {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
            selection: BTreeSet::new(),
            anchor: None,
            state: PointerState::Idle,
        }
    }

    pub fn selection(&self) -> &BTreeSet<PlacementRef> {
        &self.selection
    }

    pub fn anchor(&self) -> Option<&PlacementRef> {
        self.anchor.as_ref()
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn phase(&self) -> SelectionPhase {
        match &self.state {
            PointerState::Dragging { .. } => SelectionPhase::Dragging,
            PointerState::BoxSelecting { .. } => SelectionPhase::BoxSelecting,
            PointerState::Idle => match self.selection.len() {
                0 => SelectionPhase::Idle,
                1 => SelectionPhase::SingleSelected,
                _ => SelectionPhase::MultiSelected,
            },
        }
    }

    /// Placements currently following the pointer.
    pub fn dragged(&self) -> BTreeSet<PlacementRef> {
        match &self.state {
            PointerState::Dragging {
                original_positions, ..
            } => original_positions.keys().cloned().collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Current rubber-band rectangle, if one is being drawn.
    pub fn selection_box(&self) -> Option<Rect> {
        match &self.state {
            PointerState::BoxSelecting { start, current, .. } => {
                Some(Rect::from_corners(*start, *current))
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.selection.clear();
        self.anchor = None;
        self.state = PointerState::Idle;
    }

    /// Follows placements a drop moved and forgets the ones it removed, so no
    /// reference ends up naming a sibling copy. Returns how many were forgotten.
    pub fn retarget(&mut self, outcome: &DropOutcome) -> usize {
        let before = self.selection.len();
        self.selection = self
            .selection
            .iter()
            .filter_map(|placement| outcome.retarget(placement))
            .collect();
        self.anchor = self
            .anchor
            .take()
            .and_then(|anchor| outcome.retarget(&anchor));
        before - self.selection.len()
    }

    /// Drops references whose placement no longer exists. Returns how many went.
    pub fn prune_stale(&mut self, store: &PlacementStore, events: &mut EventBus) -> usize {
        let stale: Vec<PlacementRef> = self
            .selection
            .iter()
            .filter(|placement| !store.contains(placement))
            .cloned()
            .collect();
        for placement in &stale {
            report_stale(placement, events);
            self.selection.remove(placement);
        }
        if self
            .anchor
            .as_ref()
            .is_some_and(|anchor| !store.contains(anchor))
        {
            self.anchor = None;
        }
        stale.len()
    }

    /// Topmost loaded placement under `point`. Board groups sort after the
    /// catalog group, so they win over catalog cards they cover.
    pub fn hit_test(
        &self,
        store: &PlacementStore,
        catalog: &CardCatalog,
        images: &dyn ImagePipeline,
        point: Point,
    ) -> Option<PlacementRef> {
        store
            .all_placements()
            .filter(|view| {
                card_rect(&self.policy, catalog, images, view.card, view.position)
                    .is_some_and(|rect| rect.contains(point))
            })
            .last()
            .map(|view| view.to_ref())
    }

    pub fn pointer_down(
        &mut self,
        pointer: Point,
        modifiers: Modifiers,
        store: &PlacementStore,
        catalog: &CardCatalog,
        images: &dyn ImagePipeline,
        events: &mut EventBus,
    ) {
        let Some(hit) = self.hit_test(store, catalog, images, pointer) else {
            if !modifiers.shift && !modifiers.alt {
                self.selection.clear();
                self.anchor = None;
            }
            self.state = PointerState::BoxSelecting {
                start: pointer,
                current: pointer,
                base: self.selection.clone(),
                modifiers,
            };
            return;
        };

        if modifiers.alt {
            self.selection.remove(&hit);
            if self.anchor.as_ref() == Some(&hit) {
                self.anchor = None;
            }
            self.state = PointerState::Idle;
            return;
        }
        if modifiers.shift {
            self.selection.insert(hit.clone());
        } else if !self.selection.contains(&hit) {
            self.selection.clear();
            self.selection.insert(hit.clone());
        }
        self.anchor = Some(hit.clone());
        self.begin_drag(hit, pointer, store, events);
    }

    /// Snapshots every selected position; the anchor's sets the drag offset.
    fn begin_drag(
        &mut self,
        anchor: PlacementRef,
        pointer: Point,
        store: &PlacementStore,
        events: &mut EventBus,
    ) {
        let mut original_positions = BTreeMap::new();
        let mut stale = Vec::new();
        for placement in &self.selection {
            match store.position(placement) {
                Some(position) => {
                    original_positions.insert(placement.clone(), position);
                }
                None => stale.push(placement.clone()),
            }
        }
        for placement in &stale {
            report_stale(placement, events);
            self.selection.remove(placement);
        }
        let Some(anchor_position) = original_positions.get(&anchor).copied() else {
            self.state = PointerState::Idle;
            return;
        };
        debug!(selected = original_positions.len(), "drag started");
        self.state = PointerState::Dragging {
            anchor,
            drag_offset: pointer - anchor_position,
            original_positions,
        };
    }

    pub fn pointer_move(
        &mut self,
        pointer: Point,
        store: &mut PlacementStore,
        catalog: &CardCatalog,
        images: &dyn ImagePipeline,
        events: &mut EventBus,
    ) {
        let policy = self.policy;
        match &mut self.state {
            PointerState::Idle => {}
            PointerState::Dragging {
                anchor,
                drag_offset,
                original_positions,
            } => {
                let Some(anchor_start) = original_positions.get(anchor).copied() else {
                    return;
                };
                // Every card moves by one shared delta from its own start.
                let delta = (pointer - *drag_offset) - anchor_start;
                for (placement, original) in original_positions.iter() {
                    if store.set_position(placement, *original + delta).is_err() {
                        report_stale(placement, events);
                    }
                }
            }
            PointerState::BoxSelecting {
                start,
                current,
                base,
                modifiers,
            } => {
                *current = pointer;
                let area = Rect::from_corners(*start, *current);
                let hits: BTreeSet<PlacementRef> = store
                    .all_placements()
                    .filter(|view| {
                        card_rect(&policy, catalog, images, view.card, view.position)
                            .is_some_and(|rect| rect.intersects(&area))
                    })
                    .map(|view| view.to_ref())
                    .collect();
                self.selection = if modifiers.shift {
                    base.union(&hits).cloned().collect()
                } else if modifiers.alt {
                    base.difference(&hits).cloned().collect()
                } else {
                    hits
                };
            }
        }
    }

    /// Ends the gesture. A drag snaps every moved card by its own shape and
    /// returns what moved; a box selection just keeps its result.
    pub fn pointer_up(
        &mut self,
        pointer: Point,
        store: &mut PlacementStore,
        catalog: &CardCatalog,
        images: &dyn ImagePipeline,
        events: &mut EventBus,
    ) -> Option<DragSummary> {
        let state = std::mem::replace(&mut self.state, PointerState::Idle);
        let PointerState::Dragging {
            original_positions, ..
        } = state
        else {
            return None;
        };
        for placement in original_positions.keys() {
            let Some(position) = store.position(placement) else {
                report_stale(placement, events);
                continue;
            };
            let shape = catalog
                .get(&placement.card)
                .map(|card| images.footprint_hint(card))
                .unwrap_or(CardShape::Portrait);
            let snapped = self.policy.snap(position, shape);
            if store.set_position(placement, snapped).is_err() {
                report_stale(placement, events);
            }
        }
        debug!(moved = original_positions.len(), "drag finished");
        Some(DragSummary {
            moved: original_positions.keys().cloned().collect(),
            originals: original_positions,
            drop_point: pointer,
        })
    }
}

/// Footprint of a loaded card at `position`; `None` while its art is missing.
fn card_rect(
    policy: &GridCellPolicy,
    catalog: &CardCatalog,
    images: &dyn ImagePipeline,
    card: &str,
    position: Point,
) -> Option<Rect> {
    if !images.is_loaded(card) {
        return None;
    }
    let record = catalog.get(card)?;
    let shape = images.footprint_hint(record);
    Some(policy.footprint_for_shape(shape).rect_at(position))
}

fn report_stale(placement: &PlacementRef, events: &mut EventBus) {
    debug!(
        card = %placement.card,
        group = %placement.group,
        slot = placement.slot,
        "stale selection reference skipped"
    );
    events.push(LayoutEvent::StaleSelectionReference {
        placement: placement.clone(),
    });
}

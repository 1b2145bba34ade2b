use crate::{
    CardCatalog, CardRecord, EventBus, GridCellPolicy, GroupId, LayoutConfig, LayoutEvent,
    PlacementStore, Point, Rect,
};
use tracing::{debug, warn};

/// Cost used for sorting cards that have none.
const MISSING_COST: u32 = 999;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardReport {
    pub group: GroupId,
    /// Copies written into the store.
    pub placed: usize,
    /// True when at least one copy ended below the usable area.
    pub overflow: bool,
    /// Height actually used, measured from the first row.
    pub used_height: f32,
}

/// Packs a deck board into a bounded rectangle, row by row.
#[derive(Debug, Clone, Copy)]
pub struct BoardGridLayout {
    policy: GridCellPolicy,
}

impl BoardGridLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
        }
    }

    pub fn inset(&self) -> f32 {
        self.policy.config().boards.inset
    }

    /// Clears `group`, then writes one placement per copy inside `region`.
    pub fn layout(
        &self,
        catalog: &CardCatalog,
        entries: &[(String, u32)],
        group: &GroupId,
        region: Rect,
        store: &mut PlacementStore,
        events: &mut EventBus,
    ) -> BoardReport {
        store.clear_group(group);
        let copies = sorted_copies(catalog, entries, group, events);

        let inset = self.inset();
        let start = Point::new(region.min_x + inset, region.min_y + inset);
        let available_width = (region.width() - 2.0 * inset).max(0.0);
        let available_height = (region.height() - 2.0 * inset).max(0.0);

        let mut cursor = start;
        let mut row_height = 0.0f32;
        let mut used_height = 0.0f32;
        let mut overflow = false;

        for card in &copies {
            let cell = self.policy.footprint(card).cell;
            let row_started = cursor.x > start.x;
            if row_started && cursor.x - start.x + cell.width > available_width {
                cursor = Point::new(start.x, cursor.y + row_height);
                row_height = 0.0;
            }
            store.add_placement(&card.name, group, cursor);
            row_height = row_height.max(cell.height);
            used_height = used_height.max(cursor.y - start.y + cell.height);
            cursor.x += cell.width;

            if !overflow && used_height > available_height {
                overflow = true;
                warn!(
                    group = %group,
                    used_height,
                    available_height,
                    "board region overflow, placing past the bottom edge"
                );
                events.push(LayoutEvent::CapacityOverflow {
                    group: group.clone(),
                    used_height,
                    available_height,
                });
            }
        }

        debug!(group = %group, placed = copies.len(), used_height, "board packed");
        events.push(LayoutEvent::LayoutCompleted {
            group: group.clone(),
            placed: copies.len(),
        });
        BoardReport {
            group: group.clone(),
            placed: copies.len(),
            overflow,
            used_height,
        }
    }
}

/// One record per copy, stably sorted by type, element, cost and rarity.
fn sorted_copies<'a>(
    catalog: &'a CardCatalog,
    entries: &[(String, u32)],
    group: &GroupId,
    events: &mut EventBus,
) -> Vec<&'a CardRecord> {
    let mut copies = Vec::new();
    for (name, count) in entries {
        let Some(card) = catalog.get(name) else {
            warn!(card = %name, group = %group, "deck card missing from catalog, skipped");
            events.push(LayoutEvent::ReferenceMissing {
                card: name.clone(),
                group: group.clone(),
            });
            continue;
        };
        copies.extend(std::iter::repeat(card).take(*count as usize));
    }
    copies.sort_by_key(|card| sort_key(card));
    copies
}

fn sort_key(card: &CardRecord) -> (u8, &'static str, u32, u8) {
    (
        card.card_type.board_priority(),
        card.primary_element_name(),
        card.cost.unwrap_or(MISSING_COST),
        card.rarity_or_default().priority(),
    )
}

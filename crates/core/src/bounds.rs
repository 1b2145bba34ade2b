use crate::{
    CardCatalog, CardRecord, CardShape, ElementKey, GridCellPolicy, GroupId, LayoutConfig,
    PlacementStore, Point, Rect,
};
use std::collections::BTreeMap;

/// Derived bounding boxes; holds no placement state of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBoxIndex {
    policy: GridCellPolicy,
}

impl BoundingBoxIndex {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
        }
    }

    /// Box around every placement of `group`, grown by `padding`. `None` when empty.
    pub fn compute(
        &self,
        store: &PlacementStore,
        catalog: &CardCatalog,
        group: &GroupId,
        padding: f32,
    ) -> Option<Rect> {
        store
            .placements(group)
            .map(|view| self.card_rect(catalog.get(view.card), view.position))
            .reduce(|acc, rect| acc.union(&rect))
            .map(|rect| rect.expand(padding))
    }

    /// One box per element key, as drawn behind the catalog view.
    pub fn compute_by_element(
        &self,
        store: &PlacementStore,
        catalog: &CardCatalog,
        group: &GroupId,
        padding: f32,
    ) -> BTreeMap<ElementKey, Rect> {
        let mut boxes: BTreeMap<ElementKey, Rect> = BTreeMap::new();
        for view in store.placements(group) {
            let Some(card) = catalog.get(view.card) else {
                continue;
            };
            let rect = self.card_rect(Some(card), view.position);
            boxes
                .entry(card.element_key())
                .and_modify(|acc| *acc = acc.union(&rect))
                .or_insert(rect);
        }
        for rect in boxes.values_mut() {
            *rect = rect.expand(padding);
        }
        boxes
    }

    /// Unknown cards count as portrait.
    fn card_rect(&self, card: Option<&CardRecord>, position: Point) -> Rect {
        let footprint = match card {
            Some(record) => self.policy.footprint(record),
            None => self.policy.footprint_for_shape(CardShape::Portrait),
        };
        footprint.rect_at(position)
    }
}

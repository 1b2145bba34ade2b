use crate::{
    CardCatalog, CardRecord, ElementKey, EventBus, GridCellPolicy, GroupId, LayoutConfig,
    LayoutEvent, PlacementRef, PlacementStore, Point, Rarity, TypeKey,
};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

type RarityBands<'a> = Vec<(Rarity, Vec<&'a CardRecord>)>;
type TypeBlocks<'a> = Vec<(TypeKey, RarityBands<'a>)>;
type ElementBlocks<'a> = Vec<(ElementKey, TypeBlocks<'a>)>;

/// Packs the unbounded catalog view: element blocks of type blocks of rarity bands.
#[derive(Debug, Clone, Copy)]
pub struct HierarchicalGridLayout {
    policy: GridCellPolicy,
}

impl HierarchicalGridLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
        }
    }

    /// Computes positions and writes slot 0 of every laid-out card into `group`.
    pub fn layout(
        &self,
        catalog: &CardCatalog,
        names: &[String],
        group: &GroupId,
        origin: Point,
        store: &mut PlacementStore,
        events: &mut EventBus,
    ) -> BTreeMap<String, Point> {
        let positions = self.compute(catalog, names, group, origin, events);
        for (card, position) in &positions {
            let first = PlacementRef::new(card.as_str(), group.clone(), 0);
            if store.set_position(&first, *position).is_err() {
                store.add_placement(card, group, *position);
            }
        }
        events.push(LayoutEvent::LayoutCompleted {
            group: group.clone(),
            placed: positions.len(),
        });
        positions
    }

    /// Pure part of [`layout`](Self::layout): same input, same map.
    pub fn compute(
        &self,
        catalog: &CardCatalog,
        names: &[String],
        group: &GroupId,
        origin: Point,
        events: &mut EventBus,
    ) -> BTreeMap<String, Point> {
        let tree = self.bucket(catalog, names, group, events);
        let rules = &self.policy.config().catalog;
        let mut positions = BTreeMap::new();
        let mut x_offset = 0.0f32;

        for (element, types) in &tree {
            let blocks: Vec<TypeMetrics> = types
                .iter()
                .map(|(_, bands)| self.measure(bands))
                .collect();
            let mut band_heights = [0.0f32; Rarity::ORDER.len()];
            for block in &blocks {
                for (slot, height) in band_heights.iter_mut().enumerate() {
                    *height = height.max(block.band_heights[slot]);
                }
            }

            let mut local_x = 0.0f32;
            let mut element_extent = 0.0f32;
            for ((_, bands), block) in types.iter().zip(&blocks) {
                let type_x = origin.x + x_offset + local_x;
                let mut band_y = origin.y;
                for (slot, rarity) in Rarity::ORDER.iter().enumerate() {
                    let Some((_, cards)) = bands.iter().find(|(key, _)| key == rarity) else {
                        band_y += band_heights[slot];
                        continue;
                    };
                    let row_height = block.row_heights[slot];
                    for (index, card) in cards.iter().enumerate() {
                        let col = index % block.cols;
                        let row = index / block.cols;
                        positions.insert(
                            card.name.clone(),
                            Point::new(
                                type_x + col as f32 * block.col_width,
                                band_y + row as f32 * row_height,
                            ),
                        );
                    }
                    band_y += band_heights[slot];
                }
                local_x += block.cols as f32 * block.col_width + rules.type_gap;
                element_extent = element_extent.max(local_x);
            }
            debug!(
                element = %element,
                types = types.len(),
                extent = element_extent,
                "element block packed"
            );
            x_offset += element_extent + rules.element_gap;
        }
        positions
    }

    fn bucket<'a>(
        &self,
        catalog: &'a CardCatalog,
        names: &[String],
        group: &GroupId,
        events: &mut EventBus,
    ) -> ElementBlocks<'a> {
        let mut seen = HashSet::new();
        let mut tree: ElementBlocks<'a> = Vec::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                debug!(card = %name, "duplicate name in catalog layout input");
                continue;
            }
            let Some(card) = catalog.get(name) else {
                warn!(card = %name, group = %group, "card missing from catalog, skipped");
                events.push(LayoutEvent::ReferenceMissing {
                    card: name.clone(),
                    group: group.clone(),
                });
                continue;
            };
            let types = bucket_mut(&mut tree, card.element_key());
            let bands = bucket_mut(types, card.type_key());
            bucket_mut(bands, card.rarity_or_default()).push(card);
        }
        tree
    }

    fn measure(&self, bands: &RarityBands<'_>) -> TypeMetrics {
        let total: usize = bands.iter().map(|(_, cards)| cards.len()).sum();
        let cols = ((total as f64).sqrt().floor() as usize).max(1);
        let mut col_width = 0.0f32;
        let mut row_heights = [0.0f32; Rarity::ORDER.len()];
        let mut band_heights = [0.0f32; Rarity::ORDER.len()];
        for (slot, rarity) in Rarity::ORDER.iter().enumerate() {
            let Some((_, cards)) = bands.iter().find(|(key, _)| key == rarity) else {
                continue;
            };
            let mut row_height = 0.0f32;
            for card in cards {
                let cell = self.policy.footprint(card).cell;
                col_width = col_width.max(cell.width);
                row_height = row_height.max(cell.height);
            }
            let rows = cards.len().div_ceil(cols);
            row_heights[slot] = row_height;
            band_heights[slot] = rows as f32 * row_height;
        }
        TypeMetrics {
            cols,
            col_width,
            row_heights,
            band_heights,
        }
    }
}

#[derive(Debug)]
struct TypeMetrics {
    cols: usize,
    col_width: f32,
    row_heights: [f32; Rarity::ORDER.len()],
    band_heights: [f32; Rarity::ORDER.len()],
}

/// Insertion-ordered bucket lookup.
fn bucket_mut<K: PartialEq, V: Default>(buckets: &mut Vec<(K, V)>, key: K) -> &mut V {
    let index = match buckets.iter().position(|(existing, _)| *existing == key) {
        Some(index) => index,
        None => {
            buckets.push((key, V::default()));
            buckets.len() - 1
        }
    };
    &mut buckets[index].1
}

//! Category clusters: one circle per element, one circle per type inside it,
//! pushed apart until no two circles are closer than the minimum gap.

use crate::{
    CardCatalog, CardRecord, ClusterRule, ElementKey, EventBus, GridCellPolicy, GroupId,
    LayoutConfig, LayoutEvent, PlacementRef, PlacementStore, Point, RngState, TypeKey,
};
use std::collections::{BTreeMap, HashSet};
use std::f32::consts::TAU;
use tracing::{debug, warn};

/// Shortfall in pixels still counted as touching after a converged pass.
const OVERLAP_TOLERANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Point, radius: f32) -> Self {
        Self { center, radius }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparationOutcome {
    /// Passes actually run.
    pub iterations: usize,
    /// Pairs still closer than the required distance.
    pub remaining_overlaps: usize,
}

impl SeparationOutcome {
    pub fn converged(&self) -> bool {
        self.remaining_overlaps == 0
    }
}

/// Pushes every pair of circles closer than `r1 + r2 + min_gap` apart by half
/// the shortfall each, until a pass moves nothing or the budget runs out.
pub fn separate_circles(
    circles: &mut [Circle],
    rule: &ClusterRule,
    rng: &mut RngState,
) -> SeparationOutcome {
    let mut iterations = 0;
    while iterations < rule.max_iterations {
        iterations += 1;
        let mut moved = false;
        for i in 0..circles.len() {
            for j in (i + 1)..circles.len() {
                let delta = circles[j].center - circles[i].center;
                let distance = delta.length();
                let required = circles[i].radius + circles[j].radius + rule.min_gap;
                if distance >= required {
                    continue;
                }
                let direction = if distance <= rule.epsilon {
                    let angle = rng.angle();
                    Point::new(angle.cos(), angle.sin())
                } else {
                    delta.scale(1.0 / distance)
                };
                let push = (required - distance) * 0.5;
                circles[i].center = circles[i].center - direction.scale(push);
                circles[j].center = circles[j].center + direction.scale(push);
                if push > rule.epsilon {
                    moved = true;
                }
            }
        }
        if !moved {
            break;
        }
    }
    SeparationOutcome {
        iterations,
        remaining_overlaps: count_overlaps(circles, rule),
    }
}

fn count_overlaps(circles: &[Circle], rule: &ClusterRule) -> usize {
    let mut count = 0;
    for i in 0..circles.len() {
        for j in (i + 1)..circles.len() {
            let distance = (circles[j].center - circles[i].center).length();
            let required = circles[i].radius + circles[j].radius + rule.min_gap;
            if required - distance > OVERLAP_TOLERANCE {
                count += 1;
            }
        }
    }
    count
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    pub group: GroupId,
    pub placed: usize,
    /// Final element circles, in encounter order.
    pub elements: Vec<(ElementKey, Circle)>,
    pub separation: SeparationOutcome,
}

type TypeBuckets<'a> = Vec<(TypeKey, Vec<&'a CardRecord>)>;

/// Nested element/type circles with each type's cards gridded at its center.
#[derive(Debug, Clone, Copy)]
pub struct ClusterLayout {
    policy: GridCellPolicy,
}

impl ClusterLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
        }
    }

    fn rule(&self) -> &ClusterRule {
        &self.policy.config().cluster
    }

    fn radius(&self, count: usize) -> f32 {
        self.rule().sphere_scale * (count as f32).sqrt() * 0.5
    }

    pub fn layout(
        &self,
        catalog: &CardCatalog,
        names: &[String],
        group: &GroupId,
        center: Point,
        store: &mut PlacementStore,
        rng: &mut RngState,
        events: &mut EventBus,
    ) -> ClusterReport {
        let tree = bucket(catalog, names, group, events);

        // Elements level: the smallest group sits in the middle.
        let element_sizes: Vec<usize> = tree
            .iter()
            .map(|(_, types)| types.iter().map(|(_, cards)| cards.len()).sum())
            .collect();
        let central = index_of(&element_sizes, |a, b| a < b);
        let mut element_circles = self.ring(center, &element_sizes, central);
        let outer = separate_circles(&mut element_circles, self.rule(), rng);
        self.report_degenerate(outer, events);

        // Types level: the largest group sits in the middle of its element.
        let mut leaves: Vec<(&[&CardRecord], Circle)> = Vec::new();
        for ((_, types), element) in tree.iter().zip(&element_circles) {
            let sizes: Vec<usize> = types.iter().map(|(_, cards)| cards.len()).collect();
            let central = index_of(&sizes, |a, b| a > b);
            let circles = self.ring(element.center, &sizes, central);
            for ((_, cards), circle) in types.iter().zip(circles) {
                leaves.push((cards.as_slice(), circle));
            }
        }
        let mut leaf_circles: Vec<Circle> = leaves.iter().map(|(_, circle)| *circle).collect();
        let separation = separate_circles(&mut leaf_circles, self.rule(), rng);
        self.report_degenerate(separation, events);

        let mut placed = 0;
        for ((cards, _), circle) in leaves.iter().zip(&leaf_circles) {
            for (card, position) in self.grid_around(cards, circle.center) {
                let first = PlacementRef::new(card.name.as_str(), group.clone(), 0);
                if store.set_position(&first, position).is_err() {
                    store.add_placement(&card.name, group, position);
                }
                placed += 1;
            }
        }

        debug!(group = %group, placed, leaves = leaves.len(), "cluster layout done");
        events.push(LayoutEvent::LayoutCompleted {
            group: group.clone(),
            placed,
        });
        ClusterReport {
            group: group.clone(),
            placed,
            elements: tree
                .iter()
                .map(|(key, _)| *key)
                .zip(element_circles)
                .collect(),
            separation,
        }
    }

    /// Central circle at `center`, the rest on a regular polygon around it.
    fn ring(&self, center: Point, sizes: &[usize], central: usize) -> Vec<Circle> {
        let radii: Vec<f32> = sizes.iter().map(|count| self.radius(*count)).collect();
        let others = sizes.len().saturating_sub(1);
        let widest = radii
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != central)
            .map(|(_, radius)| *radius)
            .fold(0.0f32, f32::max);
        let central_radius = radii.get(central).copied().unwrap_or(0.0);
        let ring_radius = central_radius + widest + self.rule().min_gap;

        let mut step = 0;
        radii
            .iter()
            .enumerate()
            .map(|(index, radius)| {
                if index == central {
                    return Circle::new(center, *radius);
                }
                let angle = TAU * step as f32 / others as f32;
                step += 1;
                let offset = Point::new(angle.cos(), angle.sin()).scale(ring_radius);
                Circle::new(center + offset, *radius)
            })
            .collect()
    }

    /// Near-square grid of top-left corners centered on `center`.
    fn grid_around<'a>(
        &self,
        cards: &[&'a CardRecord],
        center: Point,
    ) -> Vec<(&'a CardRecord, Point)> {
        if cards.is_empty() {
            return Vec::new();
        }
        let cols = ((cards.len() as f32).sqrt().ceil() as usize).max(1);
        let rows = cards.len().div_ceil(cols);
        let mut cell_width = 0.0f32;
        let mut cell_height = 0.0f32;
        for card in cards {
            let cell = self.policy.footprint(card).cell;
            cell_width = cell_width.max(cell.width);
            cell_height = cell_height.max(cell.height);
        }
        let top_left = Point::new(
            center.x - cols as f32 * cell_width * 0.5,
            center.y - rows as f32 * cell_height * 0.5,
        );
        cards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                let col = (index % cols) as f32;
                let row = (index / cols) as f32;
                (
                    *card,
                    Point::new(top_left.x + col * cell_width, top_left.y + row * cell_height),
                )
            })
            .collect()
    }

    fn report_degenerate(&self, outcome: SeparationOutcome, events: &mut EventBus) {
        if outcome.converged() {
            return;
        }
        warn!(
            iterations = outcome.iterations,
            remaining_overlaps = outcome.remaining_overlaps,
            "circle separation did not converge, keeping best effort"
        );
        events.push(LayoutEvent::DegenerateCollisionResolution {
            iterations: outcome.iterations,
            remaining_overlaps: outcome.remaining_overlaps,
        });
    }
}

/// First index whose size wins against every other under `better`.
fn index_of(sizes: &[usize], better: impl Fn(usize, usize) -> bool) -> usize {
    let mut best = 0;
    for (index, size) in sizes.iter().enumerate().skip(1) {
        if better(*size, sizes[best]) {
            best = index;
        }
    }
    best
}

fn bucket<'a>(
    catalog: &'a CardCatalog,
    names: &[String],
    group: &GroupId,
    events: &mut EventBus,
) -> Vec<(ElementKey, TypeBuckets<'a>)> {
    let mut seen = HashSet::new();
    let mut tree: Vec<(ElementKey, TypeBuckets<'a>)> = Vec::new();
    let mut index: BTreeMap<ElementKey, usize> = BTreeMap::new();
    for name in names {
        if !seen.insert(name.as_str()) {
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
        let element = card.element_key();
        let slot = *index.entry(element).or_insert_with(|| {
            tree.push((element, Vec::new()));
            tree.len() - 1
        });
        let types = &mut tree[slot].1;
        match types.iter_mut().find(|(key, _)| *key == card.type_key()) {
            Some((_, cards)) => cards.push(card),
            None => types.push((card.type_key(), vec![card])),
        }
    }
    tree
}

use crate::{
    CardCatalog, DropOutcome, GridCellPolicy, GroupId, LayoutConfig, PlacementRef, PlacementStore,
    Point, Rect, SpringRule,
};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Overlapping pairs found this tick.
    pub overlaps: usize,
    /// Placements still carrying velocity after the tick.
    pub moving: usize,
}

/// Per-frame nudging of overlapping cards in one group.
#[derive(Debug, Clone)]
pub struct SpringSimulation {
    policy: GridCellPolicy,
    velocities: HashMap<PlacementRef, Point>,
}

impl SpringSimulation {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            policy: GridCellPolicy::new(config),
            velocities: HashMap::new(),
        }
    }

    fn rule(&self) -> &SpringRule {
        &self.policy.config().spring
    }

    pub fn velocity(&self, placement: &PlacementRef) -> Point {
        self.velocities.get(placement).copied().unwrap_or(Point::ZERO)
    }

    /// Re-keys velocities after a drop; removed placements lose theirs.
    pub fn retarget(&mut self, outcome: &DropOutcome) {
        self.velocities = self
            .velocities
            .drain()
            .filter_map(|(placement, velocity)| Some((outcome.retarget(&placement)?, velocity)))
            .collect();
    }

    /// Advances one tick of `dt` seconds. Placements in `dragged` follow the
    /// pointer and are neither pushed nor integrated.
    pub fn step(
        &mut self,
        store: &mut PlacementStore,
        catalog: &CardCatalog,
        group: &GroupId,
        dragged: &BTreeSet<PlacementRef>,
        dt: f32,
    ) -> StepReport {
        let bodies: Vec<(PlacementRef, Rect)> = store
            .placements(group)
            .filter_map(|view| {
                let card = catalog.get(view.card)?;
                Some((view.to_ref(), self.policy.footprint(card).rect_at(view.position)))
            })
            .collect();
        self.velocities
            .retain(|placement, _| placement.group != *group || store.contains(placement));

        let stiffness = self.rule().stiffness;
        let mut report = StepReport::default();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let (a, rect_a) = &bodies[i];
                let (b, rect_b) = &bodies[j];
                let Some((dx, dy)) = rect_a.overlap(rect_b) else {
                    continue;
                };
                report.overlaps += 1;
                // Resolve along the axis of least penetration.
                let (ca, cb) = (rect_a.center(), rect_b.center());
                let impulse = if dx < dy {
                    Point::new(direction(cb.x - ca.x, i, j) * dx * stiffness, 0.0)
                } else {
                    Point::new(0.0, direction(cb.y - ca.y, i, j) * dy * stiffness)
                };
                if !dragged.contains(a) {
                    let velocity = self.velocities.entry(a.clone()).or_default();
                    *velocity = *velocity - impulse;
                }
                if !dragged.contains(b) {
                    let velocity = self.velocities.entry(b.clone()).or_default();
                    *velocity = *velocity + impulse;
                }
            }
        }

        let rule = *self.rule();
        for (placement, _) in &bodies {
            if dragged.contains(placement) {
                self.velocities.remove(placement);
                continue;
            }
            let Some(velocity) = self.velocities.get_mut(placement) else {
                continue;
            };
            let mut next = velocity.scale(rule.damping);
            let speed = next.length();
            if speed > rule.max_speed {
                next = next.scale(rule.max_speed / speed);
            }
            if next.length() < rule.rest_speed {
                self.velocities.remove(placement);
                continue;
            }
            *velocity = next;
            let Some(position) = store.position(placement) else {
                continue;
            };
            if store.set_position(placement, position + next.scale(dt)).is_ok() {
                report.moving += 1;
            }
        }
        report
    }
}

/// Sign of the push from the first body toward the second; ties split by order.
fn direction(delta: f32, first: usize, second: usize) -> f32 {
    if delta > 0.0 || (delta == 0.0 && first < second) {
        1.0
    } else {
        -1.0
    }
}

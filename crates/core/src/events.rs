use crate::{GroupId, PlacementRef};
use serde::{Deserialize, Serialize};

/// Non-fatal diagnostics raised while laying out or dragging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LayoutEvent {
    ReferenceMissing {
        card: String,
        group: GroupId,
    },
    CapacityOverflow {
        group: GroupId,
        used_height: f32,
        available_height: f32,
    },
    StaleSelectionReference {
        placement: PlacementRef,
    },
    DegenerateCollisionResolution {
        iterations: usize,
        remaining_overlaps: usize,
    },
    LayoutCompleted {
        group: GroupId,
        placed: usize,
    },
}

impl LayoutEvent {
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::LayoutCompleted { .. })
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<LayoutEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: LayoutEvent) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LayoutEvent> + '_ {
        self.queue.drain(..)
    }

    pub fn events(&self) -> &[LayoutEvent] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

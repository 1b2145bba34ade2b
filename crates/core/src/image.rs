use crate::{CardRecord, CardShape};
use std::collections::HashSet;

/// Seam to the asynchronous art pipeline. Layout only needs the shape.
pub trait ImagePipeline {
    fn is_loaded(&self, card: &str) -> bool;

    fn footprint_hint(&self, card: &CardRecord) -> CardShape {
        CardShape::of(card.card_type)
    }
}

/// Treats every card as ready; used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllLoaded;

impl ImagePipeline for AllLoaded {
    fn is_loaded(&self, _card: &str) -> bool {
        true
    }
}

impl ImagePipeline for HashSet<String> {
    fn is_loaded(&self, card: &str) -> bool {
        self.contains(card)
    }
}

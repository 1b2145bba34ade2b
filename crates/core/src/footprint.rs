use crate::{CardRecord, CardType, LayoutConfig, Point, Rect, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardShape {
    Portrait,
    /// Rendered rotated by 90 degrees.
    Site,
}

impl CardShape {
    pub fn of(card_type: CardType) -> Self {
        if card_type == CardType::Site {
            Self::Site
        } else {
            Self::Portrait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub shape: CardShape,
    /// Occupied size in grid units.
    pub units: (u32, u32),
    /// Occupied size in pixels.
    pub cell: Size,
    /// Unrotated sprite size.
    pub sprite: Size,
}

impl Footprint {
    pub fn rect_at(&self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, self.cell)
    }
}

/// Maps card shapes to footprints and snap units.
#[derive(Debug, Clone, Copy)]
pub struct GridCellPolicy {
    config: LayoutConfig,
}

impl GridCellPolicy {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn footprint(&self, card: &CardRecord) -> Footprint {
        self.footprint_for_shape(CardShape::of(card.card_type))
    }

    pub fn footprint_for_shape(&self, shape: CardShape) -> Footprint {
        let grid = &self.config.grid;
        match shape {
            CardShape::Portrait => Footprint {
                shape,
                units: grid.portrait_units,
                cell: self.config.portrait_size(),
                sprite: grid.sprite,
            },
            CardShape::Site => Footprint {
                shape,
                units: grid.site_units,
                cell: self.config.site_size(),
                sprite: grid.sprite,
            },
        }
    }

    pub fn snap_unit(&self, shape: CardShape) -> Size {
        match shape {
            CardShape::Portrait => self.config.grid.portrait_snap,
            CardShape::Site => self.config.grid.site_snap,
        }
    }

    /// Rounds each axis to the nearest multiple of the shape's snap unit.
    pub fn snap(&self, position: Point, shape: CardShape) -> Point {
        let unit = self.snap_unit(shape);
        Point::new(
            snap_axis(position.x, unit.width),
            snap_axis(position.y, unit.height),
        )
    }
}

impl Default for GridCellPolicy {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

fn snap_axis(value: f32, unit: f32) -> f32 {
    if unit <= 0.0 {
        return value;
    }
    (value / unit).round() * unit
}

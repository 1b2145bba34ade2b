use crate::{Point, Size};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridRule {
    /// Side of one grid cell in pixels.
    pub unit: f32,
    /// Portrait footprint in grid units.
    pub portrait_units: (u32, u32),
    /// Rotated site footprint in grid units.
    pub site_units: (u32, u32),
    /// Sprite size before any rotation.
    pub sprite: Size,
    pub portrait_snap: Size,
    pub site_snap: Size,
}

impl Default for GridRule {
    fn default() -> Self {
        Self {
            unit: 55.0,
            portrait_units: (2, 3),
            site_units: (3, 2),
            sprite: Size::new(110.0, 165.0),
            portrait_snap: Size::new(55.0, 55.0),
            site_snap: Size::new(82.5, 55.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogRule {
    pub type_gap: f32,
    pub element_gap: f32,
    /// Padding around the whole catalog bounding box.
    pub region_padding: f32,
}

impl Default for CatalogRule {
    fn default() -> Self {
        Self {
            type_gap: 55.0,
            element_gap: 220.0,
            region_padding: 110.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardRule {
    pub mainboard: Size,
    pub sideboard: Size,
    pub maybeboard: Size,
    /// Distance between a region edge and the first packed card.
    pub inset: f32,
    /// Where the first deck lands; later decks go to its right.
    pub first_deck_origin: Point,
    pub deck_spacing: f32,
}

impl Default for BoardRule {
    fn default() -> Self {
        Self {
            mainboard: Size::new(2475.0, 1980.0),
            sideboard: Size::new(2475.0, 990.0),
            maybeboard: Size::new(2475.0, 990.0),
            inset: 110.0,
            first_deck_origin: Point::new(0.0, 2035.0),
            deck_spacing: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterRule {
    /// Circle diameter per sqrt(card count).
    pub sphere_scale: f32,
    pub min_gap: f32,
    pub max_iterations: usize,
    /// Movement below this counts as "no movement" for convergence.
    pub epsilon: f32,
}

impl Default for ClusterRule {
    fn default() -> Self {
        Self {
            sphere_scale: 200.0,
            min_gap: 55.0,
            max_iterations: 1000,
            epsilon: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpringRule {
    pub stiffness: f32,
    /// Fraction of velocity kept after each tick.
    pub damping: f32,
    pub max_speed: f32,
    pub rest_speed: f32,
}

impl Default for SpringRule {
    fn default() -> Self {
        Self {
            stiffness: 8.0,
            damping: 0.85,
            max_speed: 600.0,
            rest_speed: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: GridRule,
    pub catalog: CatalogRule,
    pub boards: BoardRule,
    pub cluster: ClusterRule,
    pub spring: SpringRule,
    /// Padding added around per-group bounding boxes.
    pub bounds_padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid: GridRule::default(),
            catalog: CatalogRule::default(),
            boards: BoardRule::default(),
            cluster: ClusterRule::default(),
            spring: SpringRule::default(),
            bounds_padding: 40.0,
        }
    }
}

impl LayoutConfig {
    pub fn portrait_size(&self) -> Size {
        let (w, h) = self.grid.portrait_units;
        Size::new(w as f32 * self.grid.unit, h as f32 * self.grid.unit)
    }

    pub fn site_size(&self) -> Size {
        let (w, h) = self.grid.site_units;
        Size::new(w as f32 * self.grid.unit, h as f32 * self.grid.unit)
    }

    /// Snaps a point onto the square grid, used for deck origins.
    pub fn snap_to_unit(&self, point: Point) -> Point {
        let unit = self.grid.unit;
        Point::new(
            (point.x / unit).round() * unit,
            (point.y / unit).round() * unit,
        )
    }
}

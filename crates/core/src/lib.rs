//! Placement and layout engine. Keep this crate free of IO and platform concerns.

pub mod board_layout;
pub mod bounds;
pub mod cards;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod deck;
pub mod events;
pub mod footprint;
pub mod geometry;
pub mod grid_layout;
pub mod group;
pub mod image;
pub mod placement;
pub mod rng;
pub mod selection;
pub mod spring;

pub use board_layout::*;
pub use bounds::*;
pub use cards::*;
pub use catalog::*;
pub use cluster::*;
pub use config::*;
pub use deck::*;
pub use events::*;
pub use footprint::*;
pub use geometry::*;
pub use grid_layout::*;
pub use group::*;
pub use image::*;
pub use placement::*;
pub use rng::*;
pub use selection::*;
pub use spring::*;

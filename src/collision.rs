//! # Collision Resolution
//!
//! Constrains observer movement to the open passages of the occupied cell.
//!
//! Each axis is clamped independently against the walls of the cell the
//! observer is currently in. There is no diagonal sliding correction, so a
//! fast observer can shave a convex corner; that is accepted.

use crate::generation::{MazeGenerator, RandomSource};
use crate::grid::{CellGeometry, CellStore, Direction, WorldPos};
use log::trace;
use serde::{Deserialize, Serialize};

/// Per-axis wall clamping against the occupied cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionResolver {
    /// Distance kept between the observer and a wall plane
    pub wall_margin: f64,
    /// Radius generated around the occupied cell before clamping
    pub generation_radius: i32,
}

impl CollisionResolver {
    /// Creates a resolver with an explicit margin and generation radius.
    pub fn new(wall_margin: f64, generation_radius: i32) -> Self {
        Self {
            wall_margin,
            generation_radius,
        }
    }

    /// Furthest local offset from the cell center allowed towards a wall.
    pub fn half_extent(&self, geometry: CellGeometry) -> f64 {
        geometry.half_size() - self.wall_margin
    }

    /// Clamps `attempted` against the walls of the cell containing `current`.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::{CellGeometry, CollisionResolver, GenerationConfig, MazeGenerator, WorldPos};
    ///
    /// let mut generator = MazeGenerator::new(3, CellGeometry::new(12.0), GenerationConfig::new());
    /// let resolver = CollisionResolver::default();
    /// let resolved = resolver.resolve(&mut generator, WorldPos::new(0.0, 0.0), WorldPos::new(0.5, 0.5));
    /// assert_eq!(resolved, WorldPos::new(0.5, 0.5));
    /// ```
    pub fn resolve<S: CellStore, R: RandomSource>(
        &self,
        generator: &mut MazeGenerator<S, R>,
        current: WorldPos,
        attempted: WorldPos,
    ) -> WorldPos {
        let geometry = generator.grid().geometry();
        let coord = geometry.world_to_cell(current);
        generator.ensure_area(coord, self.generation_radius.max(2));

        let passages = generator.ensure_generated(coord).passages();
        let center = geometry.cell_center(coord);
        let half = self.half_extent(geometry);
        let local = attempted - center;

        let clamp = |value: f64, positive: Direction, negative: Direction| -> f64 {
            let mut value = value;
            if !passages.is_open(positive) && value > half {
                value = half;
            }
            if !passages.is_open(negative) && value < -half {
                value = -half;
            }
            value
        };

        let clamped = WorldPos::new(
            clamp(local.x, Direction::East, Direction::West),
            clamp(local.z, Direction::South, Direction::North),
        );
        if clamped != local {
            trace!("clamped movement in {} to {:?}", coord, clamped);
        }
        center + clamped
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_WALL_MARGIN,
            crate::config::DEFAULT_COLLISION_RADIUS,
        )
    }
}

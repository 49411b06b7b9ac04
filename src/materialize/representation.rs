//! # Cell Representations
//!
//! Disposable, render-facing descriptions of generated cells.

use crate::grid::{Cell, CellCoord, CellGeometry, Direction, Passages, WorldPos};
use serde::{Deserialize, Serialize};

/// Wall dimensions shared by every representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentationStyle {
    /// Height of a wall segment in world units
    pub wall_height: f64,
    /// Thickness of a wall segment in world units
    pub wall_thickness: f64,
}

impl Default for RepresentationStyle {
    fn default() -> Self {
        Self {
            wall_height: crate::config::DEFAULT_WALL_HEIGHT,
            wall_thickness: crate::config::DEFAULT_WALL_THICKNESS,
        }
    }
}

/// One wall box, placed inside a cell against a closed side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    /// The closed side this wall blocks
    pub side: Direction,
    /// Box center relative to the cell center: `[x, y, z]`
    pub offset: [f64; 3],
    /// Box extent along each axis: `[x, y, z]`
    pub size: [f64; 3],
}

impl WallSegment {
    /// Builds the wall blocking `side` of a cell.
    pub fn new(side: Direction, geometry: CellGeometry, style: &RepresentationStyle) -> Self {
        let inset = geometry.half_size() - style.wall_thickness / 2.0;
        let y = style.wall_height / 2.0;
        let (dx, dz) = side.delta();
        let offset = [dx as f64 * inset, y, dz as f64 * inset];
        let size = match side {
            Direction::North | Direction::South => {
                [geometry.cell_size, style.wall_height, style.wall_thickness]
            }
            Direction::East | Direction::West => {
                [style.wall_thickness, style.wall_height, geometry.cell_size]
            }
        };
        Self { side, offset, size }
    }
}

/// The materialized form of one generated cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRepresentation {
    /// Cell this representation belongs to
    pub coord: CellCoord,
    /// World-space center of the cell
    pub center: WorldPos,
    /// Passages the walls were derived from
    pub passages: Passages,
    /// One wall per closed side; open sides have none
    pub walls: Vec<WallSegment>,
}

impl CellRepresentation {
    /// Derives the representation from the cell's passages.
    pub fn build(cell: &Cell, geometry: CellGeometry, style: &RepresentationStyle) -> Self {
        Self {
            coord: cell.coord(),
            center: geometry.cell_center(cell.coord()),
            passages: cell.passages(),
            walls: cell
                .passages()
                .closed()
                .map(|side| WallSegment::new(side, geometry, style))
                .collect(),
        }
    }

    /// The wall on `side`, if that side is closed.
    pub fn wall(&self, side: Direction) -> Option<&WallSegment> {
        self.walls.iter().find(|wall| wall.side == side)
    }
}

//! # Grid Module
//!
//! Lattice coordinates, passage directions and the cell record of the infinite maze.
//!
//! This module contains the fundamental building blocks of the maze:
//! - Integer cell coordinates and the four axis directions
//! - Passage sets and the per-cell generation/visited state
//! - The mapping between world space and cell indices
//! - Cell storage backends (see [`store`])

pub mod store;

pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one cell of the infinite lattice.
///
/// # Examples
///
/// ```
/// use infinimaze::{CellCoord, Direction};
///
/// let coord = CellCoord::new(2, -3);
/// assert_eq!(coord.neighbor(Direction::North), CellCoord::new(2, -4));
/// assert_eq!(coord.manhattan_distance(CellCoord::origin()), 5);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    /// Creates a new coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Returns the origin cell (0, 0), where generation starts.
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Returns the axis-adjacent coordinate in `direction`.
    pub fn neighbor(self, direction: Direction) -> Self {
        let (dx, dz) = direction.delta();
        Self::new(self.x + dx, self.z + dz)
    }

    /// Calculates the Manhattan distance to another coordinate.
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.z - other.z).unsigned_abs()
    }

    /// Calculates the Chebyshev (square window) distance to another coordinate.
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.z - other.z).unsigned_abs())
    }

    /// Returns the direction leading from `self` to an axis-adjacent `other`.
    ///
    /// Returns None if the two coordinates are not neighbors.
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| self.neighbor(direction) == other)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// The four passage directions. North points towards negative z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All directions in canonical order. The generator shuffles this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a coordinate delta `(dx, dz)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::Direction;
    ///
    /// assert_eq!(Direction::North.delta(), (0, -1));
    /// assert_eq!(Direction::East.delta(), (1, 0));
    /// ```
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Returns the reverse direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::South => 0b0010,
            Direction::East => 0b0100,
            Direction::West => 0b1000,
        }
    }
}

/// The set of open sides of a cell.
///
/// Passages are only ever opened; there is deliberately no way to close one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Passages(u8);

impl Passages {
    /// An empty passage set (all four sides walled).
    pub fn none() -> Self {
        Self(0)
    }

    /// Builds a passage set from a list of open directions.
    pub fn from_directions(directions: &[Direction]) -> Self {
        let mut passages = Self::none();
        for &direction in directions {
            passages.open(direction);
        }
        passages
    }

    /// Checks whether the side facing `direction` is open.
    pub fn is_open(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Opens the side facing `direction`.
    pub fn open(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Number of open sides.
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether every side is walled.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the open directions in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| self.is_open(direction))
    }

    /// Iterates the walled directions in canonical order.
    pub fn closed(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| !self.is_open(direction))
    }
}

/// A single lattice unit of the maze.
///
/// State only moves forward: a cell can become generated or visited and gain
/// passages, never the reverse. Stored cells are only reachable through shared
/// references, so every change goes through the owning [`CellStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coord: CellCoord,
    generated: bool,
    visited: bool,
    passages: Passages,
}

impl Cell {
    /// Creates an ungenerated, unvisited, fully walled cell.
    pub fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            generated: false,
            visited: false,
            passages: Passages::none(),
        }
    }

    /// Where this cell sits on the lattice.
    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Whether the passages of this cell are finalized.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Whether an observer has occupied this cell.
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Open connections to the axis neighbors.
    pub fn passages(&self) -> Passages {
        self.passages
    }

    /// Checks whether the side facing `direction` is open.
    pub fn has_passage(&self, direction: Direction) -> bool {
        self.passages.is_open(direction)
    }

    /// Flags the cell generated. Returns true if it was not before.
    pub fn mark_generated(&mut self) -> bool {
        !std::mem::replace(&mut self.generated, true)
    }

    /// Flags the cell visited. Returns true if it was not before.
    pub fn mark_visited(&mut self) -> bool {
        !std::mem::replace(&mut self.visited, true)
    }

    /// Opens the side facing `direction`.
    pub fn open(&mut self, direction: Direction) {
        self.passages.open(direction);
    }
}

/// A position on the horizontal world plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub z: f64,
}

impl WorldPos {
    /// Creates a new world position.
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Euclidean length of this position taken as a vector.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Calculates the Euclidean distance to another position.
    pub fn distance(self, other: WorldPos) -> f64 {
        (self - other).length()
    }
}

impl std::ops::Add for WorldPos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.z + other.z)
    }
}

impl std::ops::Sub for WorldPos {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.z - other.z)
    }
}

/// Fixed lattice spacing between world space and cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellGeometry {
    /// Side length of one cell in world units
    pub cell_size: f64,
}

impl CellGeometry {
    /// Creates the geometry for a given cell size.
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    /// Rounds a world position to the nearest cell index.
    ///
    /// Halfway points round towards positive infinity on both axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::{CellCoord, CellGeometry, WorldPos};
    ///
    /// let geometry = CellGeometry::new(12.0);
    /// assert_eq!(geometry.world_to_cell(WorldPos::new(17.0, -5.0)), CellCoord::new(1, 0));
    /// assert_eq!(geometry.world_to_cell(WorldPos::new(-6.0, 6.0)), CellCoord::new(0, 1));
    /// ```
    pub fn world_to_cell(&self, pos: WorldPos) -> CellCoord {
        CellCoord::new(
            round_half_up(pos.x / self.cell_size),
            round_half_up(pos.z / self.cell_size),
        )
    }

    /// Returns the world-space center of a cell.
    pub fn cell_center(&self, coord: CellCoord) -> WorldPos {
        WorldPos::new(
            coord.x as f64 * self.cell_size,
            coord.z as f64 * self.cell_size,
        )
    }

    /// Half the side length of a cell.
    pub fn half_size(&self) -> f64 {
        self.cell_size / 2.0
    }
}

impl Default for CellGeometry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CELL_SIZE)
    }
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

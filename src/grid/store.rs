//! # Cell Storage
//!
//! Backing stores for the unbounded cell mapping.
//!
//! The generator, materializer and collision resolver only talk to the
//! [`CellStore`] trait, so the container behind the maze can be swapped without
//! touching algorithm code. Two stores are provided: a plain hash map and a
//! chunked dense layout.

use super::{Cell, CellCoord, CellGeometry, Direction};
use log::trace;
use std::collections::HashMap;

/// Capability interface over the cell mapping.
///
/// Cells are never removed. Generation state, visits and passages only move
/// forward, and only through the marking methods below. Lookups hand out
/// shared references, so the generated flag a store reports and the flag on
/// the cell itself cannot drift apart.
pub trait CellStore {
    /// Returns the cell at `coord`, creating an ungenerated one if absent.
    fn get_or_create(&mut self, coord: CellCoord) -> &Cell;

    /// Non-creating lookup.
    fn get(&self, coord: CellCoord) -> Option<&Cell>;

    /// Flags the cell (created if needed) as generated. Idempotent.
    fn mark_generated(&mut self, coord: CellCoord);

    /// Flags the cell (created if needed) as visited. Idempotent.
    fn mark_visited(&mut self, coord: CellCoord);

    /// Opens one side of an existing cell. Returns false if the cell is absent.
    fn open_passage(&mut self, coord: CellCoord, direction: Direction) -> bool;

    /// Number of cells that exist, generated or not.
    fn len(&self) -> usize;

    /// Number of generated cells.
    fn generated_count(&self) -> usize;

    /// All existing coordinates, sorted.
    fn coords(&self) -> Vec<CellCoord>;

    /// Whether `coord` has completed generation.
    fn is_generated(&self, coord: CellCoord) -> bool {
        self.get(coord).is_some_and(Cell::is_generated)
    }

    /// Whether no cell exists yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens the passage from `from` towards `direction` and the reciprocal
    /// passage on the neighbor.
    ///
    /// Silently does nothing and returns false when either endpoint is absent.
    fn connect(&mut self, from: CellCoord, direction: Direction) -> bool {
        let to = from.neighbor(direction);
        if self.get(from).is_none() || self.get(to).is_none() {
            trace!("skipping connect {} -> {}: endpoint missing", from, to);
            return false;
        }
        self.open_passage(from, direction);
        self.open_passage(to, direction.opposite());
        true
    }
}

/// Hash map backed store.
#[derive(Debug, Clone, Default)]
pub struct HashGrid {
    cells: HashMap<CellCoord, Cell>,
    generated_count: usize,
}

impl HashGrid {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, coord: CellCoord) -> &mut Cell {
        self.cells.entry(coord).or_insert_with(|| Cell::new(coord))
    }
}

impl CellStore for HashGrid {
    fn get_or_create(&mut self, coord: CellCoord) -> &Cell {
        self.slot(coord)
    }

    fn get(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    fn mark_generated(&mut self, coord: CellCoord) {
        if self.slot(coord).mark_generated() {
            self.generated_count += 1;
        }
    }

    fn mark_visited(&mut self, coord: CellCoord) {
        self.slot(coord).mark_visited();
    }

    fn open_passage(&mut self, coord: CellCoord, direction: Direction) -> bool {
        match self.cells.get_mut(&coord) {
            Some(cell) => {
                cell.open(direction);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn generated_count(&self) -> usize {
        self.generated_count
    }

    fn coords(&self) -> Vec<CellCoord> {
        let mut coords: Vec<_> = self.cells.keys().copied().collect();
        coords.sort();
        coords
    }
}

/// Side length of a [`ChunkedGrid`] chunk, in cells.
pub const CHUNK_SIZE: i32 = 16;

const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

type Chunk = Box<[Option<Cell>]>;

/// Dense store that allocates cells in square chunks.
///
/// Neighboring cells share an allocation, which keeps the frontier of a
/// steadily walking observer in a handful of chunks.
#[derive(Debug, Clone, Default)]
pub struct ChunkedGrid {
    chunks: HashMap<(i32, i32), Chunk>,
    cell_count: usize,
    generated_count: usize,
}

impl ChunkedGrid {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn split(coord: CellCoord) -> ((i32, i32), usize) {
        let chunk = (
            coord.x.div_euclid(CHUNK_SIZE),
            coord.z.div_euclid(CHUNK_SIZE),
        );
        let local = coord.z.rem_euclid(CHUNK_SIZE) * CHUNK_SIZE + coord.x.rem_euclid(CHUNK_SIZE);
        (chunk, local as usize)
    }

    fn slot(&mut self, coord: CellCoord) -> &mut Cell {
        let (chunk, local) = Self::split(coord);
        let slots = self
            .chunks
            .entry(chunk)
            .or_insert_with(|| vec![None; CHUNK_AREA].into_boxed_slice());
        let slot = &mut slots[local];
        if slot.is_none() {
            self.cell_count += 1;
        }
        slot.get_or_insert_with(|| Cell::new(coord))
    }
}

impl CellStore for ChunkedGrid {
    fn get_or_create(&mut self, coord: CellCoord) -> &Cell {
        self.slot(coord)
    }

    fn get(&self, coord: CellCoord) -> Option<&Cell> {
        let (chunk, local) = Self::split(coord);
        self.chunks.get(&chunk)?[local].as_ref()
    }

    fn mark_generated(&mut self, coord: CellCoord) {
        if self.slot(coord).mark_generated() {
            self.generated_count += 1;
        }
    }

    fn mark_visited(&mut self, coord: CellCoord) {
        self.slot(coord).mark_visited();
    }

    fn open_passage(&mut self, coord: CellCoord, direction: Direction) -> bool {
        let (chunk, local) = Self::split(coord);
        let cell = self
            .chunks
            .get_mut(&chunk)
            .and_then(|slots| slots[local].as_mut());
        match cell {
            Some(cell) => {
                cell.open(direction);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.cell_count
    }

    fn generated_count(&self) -> usize {
        self.generated_count
    }

    fn coords(&self) -> Vec<CellCoord> {
        let mut coords: Vec<_> = self
            .chunks
            .values()
            .flat_map(|slots| slots.iter().flatten().map(Cell::coord))
            .collect();
        coords.sort();
        coords
    }
}

/// The maze grid: a cell store plus the lattice geometry.
///
/// Construction seeds the origin cell as generated, with no passages yet.
/// Every later cell connects back to it through the generator.
#[derive(Debug, Clone)]
pub struct MazeGrid<S: CellStore = HashGrid> {
    store: S,
    geometry: CellGeometry,
}

impl MazeGrid<HashGrid> {
    /// Creates a hash map backed grid.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::{CellCoord, CellGeometry, CellStore, MazeGrid};
    ///
    /// let grid = MazeGrid::new(CellGeometry::new(12.0));
    /// assert!(grid.store().is_generated(CellCoord::origin()));
    /// assert_eq!(grid.store().len(), 1);
    /// ```
    pub fn new(geometry: CellGeometry) -> Self {
        Self::with_store(HashGrid::new(), geometry)
    }
}

impl<S: CellStore> MazeGrid<S> {
    /// Wraps an existing store and seeds the origin.
    pub fn with_store(mut store: S, geometry: CellGeometry) -> Self {
        store.mark_generated(CellCoord::origin());
        Self { store, geometry }
    }

    /// Read access to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The lattice geometry.
    pub fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    /// Returns the cell, creating a default one when absent.
    pub fn get_or_create(&mut self, coord: CellCoord) -> &Cell {
        self.store.get_or_create(coord)
    }

    /// Flags the cell (created if needed) as generated.
    pub fn mark_generated(&mut self, coord: CellCoord) {
        self.store.mark_generated(coord);
    }

    /// Flags the cell (created if needed) as visited.
    pub fn mark_visited(&mut self, coord: CellCoord) {
        self.store.mark_visited(coord);
    }

    /// Non-creating lookup.
    pub fn get_existing(&self, coord: CellCoord) -> Option<&Cell> {
        self.store.get(coord)
    }

    /// Opens a passage both ways. No-op if either endpoint is absent.
    pub fn connect(&mut self, from: CellCoord, direction: Direction) -> bool {
        self.store.connect(from, direction)
    }

    /// Whether `coord` exists and is generated.
    pub fn is_generated(&self, coord: CellCoord) -> bool {
        self.store.is_generated(coord)
    }
}

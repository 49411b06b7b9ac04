//! # Materialize Module
//!
//! Decides which cells have a live representation around the observer.
//!
//! Generation always runs ahead of visibility: the generation footprint is
//! larger than the view window, so a walking observer never sees the frontier
//! being carved. Representation membership is reconciled against the freshly
//! computed window on every update rather than tracked incrementally.

pub mod representation;

pub use representation::*;

use crate::grid::{CellCoord, CellStore, MazeGrid};
use log::{debug, trace};
use std::collections::HashMap;

/// A bounded set of cell coordinates around a center.
///
/// # Examples
///
/// ```
/// use infinimaze::{CellCoord, Footprint};
///
/// let window = Footprint::window(CellCoord::origin(), 1);
/// assert_eq!(window.cells().len(), 9);
///
/// let generation = Footprint::generation(CellCoord::origin(), 8, 4);
/// assert!(generation.contains(CellCoord::new(8, 4)));
/// assert!(!generation.contains(CellCoord::new(8, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    center: CellCoord,
    radius: i32,
    manhattan_limit: Option<i32>,
}

impl Footprint {
    /// The square `radius` window cut by a Manhattan bound of `radius + margin`.
    pub fn generation(center: CellCoord, radius: i32, margin: i32) -> Self {
        Self {
            center,
            radius,
            manhattan_limit: Some(radius + margin),
        }
    }

    /// The exact square window `|dx| <= radius, |dz| <= radius`.
    pub fn window(center: CellCoord, radius: i32) -> Self {
        Self {
            center,
            radius,
            manhattan_limit: None,
        }
    }

    /// The center cell.
    pub fn center(&self) -> CellCoord {
        self.center
    }

    /// Whether `coord` lies inside the footprint.
    pub fn contains(&self, coord: CellCoord) -> bool {
        if self.radius < 0 {
            return false;
        }
        let radius = self.radius as u32;
        if coord.chebyshev_distance(self.center) > radius {
            return false;
        }
        match self.manhattan_limit {
            Some(limit) => i64::from(coord.manhattan_distance(self.center)) <= i64::from(limit),
            None => true,
        }
    }

    /// All coordinates in the footprint, ring by ring from the center.
    ///
    /// Ties within a ring are ordered by x, then z. This is not the plain
    /// x-major scan: walking outwards, every cell borders one listed before it,
    /// so generating in this order never starts a frontier walk.
    ///
    /// Rings are emitted directly, without sorting.
    pub fn cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        if self.radius < 0 {
            return cells;
        }
        let widest = 2 * self.radius;
        let last_ring = self.manhattan_limit.map_or(widest, |limit| limit.min(widest));
        for ring in 0..=last_ring {
            let reach = ring.min(self.radius);
            for dx in -reach..=reach {
                let dz = ring - dx.abs();
                if dz > self.radius {
                    continue;
                }
                let x = self.center.x + dx;
                cells.push(CellCoord::new(x, self.center.z - dz));
                if dz != 0 {
                    cells.push(CellCoord::new(x, self.center.z + dz));
                }
            }
        }
        cells
    }
}

/// Representations created and destroyed by one window update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowUpdate {
    /// Cells that gained a representation, sorted
    pub created: Vec<CellCoord>,
    /// Cells whose representation was destroyed, sorted
    pub evicted: Vec<CellCoord>,
    /// Live cells rebuilt because their passages changed, sorted
    pub rebuilt: Vec<CellCoord>,
}

impl WindowUpdate {
    /// Whether the update changed nothing.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.evicted.is_empty() && self.rebuilt.is_empty()
    }
}

/// Keeps the set of live cell representations in sync with the view window.
#[derive(Debug, Clone, Default)]
pub struct AreaMaterializer {
    style: RepresentationStyle,
    live: HashMap<CellCoord, CellRepresentation>,
}

impl AreaMaterializer {
    /// Creates a materializer with no live representations.
    pub fn new(style: RepresentationStyle) -> Self {
        Self {
            style,
            live: HashMap::new(),
        }
    }

    /// Reconciles live representations with the window around `center`.
    ///
    /// Every generated cell inside the window without a representation gets
    /// one and stale ones are rebuilt. Every representation outside the window
    /// is destroyed. Lookups never create cells. Calling twice with the same
    /// window on an unchanged grid is a no-op.
    pub fn update_visible<S: CellStore>(
        &mut self,
        grid: &MazeGrid<S>,
        center: CellCoord,
        radius: i32,
    ) -> WindowUpdate {
        let window = Footprint::window(center, radius);
        let geometry = grid.geometry();
        let mut update = WindowUpdate::default();

        for coord in window.cells() {
            let Some(cell) = grid.get_existing(coord).filter(|cell| cell.is_generated()) else {
                continue;
            };
            // Neighbors generated later can still open a side
            let stale = self
                .live
                .get(&coord)
                .map(|repr| repr.passages != cell.passages());
            match stale {
                Some(true) => {
                    self.live
                        .insert(coord, CellRepresentation::build(cell, geometry, &self.style));
                    update.rebuilt.push(coord);
                }
                Some(false) => {}
                None => {
                    self.live
                        .insert(coord, CellRepresentation::build(cell, geometry, &self.style));
                    update.created.push(coord);
                }
            }
        }

        self.live.retain(|&coord, _| {
            let keep = window.contains(coord);
            if !keep {
                update.evicted.push(coord);
            }
            keep
        });

        update.created.sort();
        update.evicted.sort();
        update.rebuilt.sort();
        if !update.is_empty() {
            debug!(
                "window around {}: {} created, {} evicted, {} rebuilt, {} live",
                center,
                update.created.len(),
                update.evicted.len(),
                update.rebuilt.len(),
                self.live.len()
            );
        } else {
            trace!("window around {} unchanged", center);
        }
        update
    }

    /// The representation of `coord`, if live.
    pub fn get(&self, coord: CellCoord) -> Option<&CellRepresentation> {
        self.live.get(&coord)
    }

    /// Whether `coord` currently has a representation.
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.live.contains_key(&coord)
    }

    /// Number of live representations.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Coordinates of the live representations, sorted.
    pub fn coords(&self) -> Vec<CellCoord> {
        let mut coords: Vec<_> = self.live.keys().copied().collect();
        coords.sort();
        coords
    }

    /// Iterates the live representations in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CellRepresentation> {
        self.live.values()
    }

    /// Destroys every representation.
    pub fn clear(&mut self) -> Vec<CellCoord> {
        let mut evicted: Vec<_> = self.live.drain().map(|(coord, _)| coord).collect();
        evicted.sort();
        evicted
    }

    /// The wall dimensions used for new representations.
    pub fn style(&self) -> &RepresentationStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationConfig, MazeGenerator};
    use crate::grid::CellGeometry;
    use std::collections::BTreeSet;

    fn generator(seed: u64) -> MazeGenerator {
        MazeGenerator::new(seed, CellGeometry::new(12.0), GenerationConfig::new())
    }

    fn expected_window<S: CellStore>(
        grid: &MazeGrid<S>,
        center: CellCoord,
        radius: i32,
    ) -> Vec<CellCoord> {
        let mut coords: Vec<_> = Footprint::window(center, radius)
            .cells()
            .into_iter()
            .filter(|&coord| grid.is_generated(coord))
            .collect();
        coords.sort();
        coords
    }

    #[test]
    fn test_generation_footprint_shape() {
        let footprint = Footprint::generation(CellCoord::new(2, -1), 8, 4);
        // Corners beyond the Manhattan bound are cut
        assert!(!footprint.contains(CellCoord::new(10, 7)));
        assert!(footprint.contains(CellCoord::new(10, 3)));
        assert!(!footprint.contains(CellCoord::new(11, -1)));
        // 17 x 17 square minus the four corner triangles of 10 cells each
        assert_eq!(footprint.cells().len(), 17 * 17 - 4 * 10);
    }

    #[test]
    fn test_footprint_ring_order() {
        let cells = Footprint::window(CellCoord::new(5, 5), 2).cells();
        assert_eq!(cells[0], CellCoord::new(5, 5));
        let distances: Vec<_> = cells
            .iter()
            .map(|coord| coord.manhattan_distance(CellCoord::new(5, 5)))
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_ring_order_matches_sorted_scan() {
        let center = CellCoord::new(-3, 7);
        for footprint in [
            Footprint::window(center, 3),
            Footprint::generation(center, 6, 2),
            Footprint::generation(center, 5, 20),
        ] {
            let mut scan = Vec::new();
            for x in (center.x - 6)..=(center.x + 6) {
                for z in (center.z - 6)..=(center.z + 6) {
                    let coord = CellCoord::new(x, z);
                    if footprint.contains(coord) {
                        scan.push(coord);
                    }
                }
            }
            scan.sort_by_key(|&coord| (coord.manhattan_distance(center), coord.x, coord.z));

            let cells = footprint.cells();
            assert_eq!(cells, scan);

            // Each later cell touches one emitted before it
            for (index, coord) in cells.iter().enumerate().skip(1) {
                assert!(cells[..index]
                    .iter()
                    .any(|earlier| earlier.manhattan_distance(*coord) == 1));
            }
        }
    }

    #[test]
    fn test_negative_radius_is_empty() {
        let footprint = Footprint::window(CellCoord::origin(), -1);
        assert!(footprint.cells().is_empty());
        assert!(!footprint.contains(CellCoord::origin()));
    }

    #[test]
    fn test_update_visible_matches_generated_window() {
        let mut generator = generator(8);
        generator.ensure_area(CellCoord::origin(), 8);
        let mut materializer = AreaMaterializer::default();

        let update = materializer.update_visible(generator.grid(), CellCoord::origin(), 5);
        let expected = expected_window(generator.grid(), CellCoord::origin(), 5);
        assert_eq!(update.created, expected);
        assert!(update.evicted.is_empty());
        assert_eq!(materializer.coords(), expected);
    }

    #[test]
    fn test_unchanged_window_has_no_churn() {
        let mut generator = generator(8);
        generator.ensure_area(CellCoord::origin(), 6);
        let mut materializer = AreaMaterializer::default();

        materializer.update_visible(generator.grid(), CellCoord::origin(), 4);
        let again = materializer.update_visible(generator.grid(), CellCoord::origin(), 4);
        assert!(again.is_empty());
    }

    #[test]
    fn test_far_window_evicts_everything() {
        let mut generator = generator(1);
        generator.ensure_area(CellCoord::origin(), 8);
        let mut materializer = AreaMaterializer::default();

        let first = materializer.update_visible(generator.grid(), CellCoord::origin(), 5);
        assert!(!first.created.is_empty());

        let cells_before = generator.grid().store().len();
        let second = materializer.update_visible(generator.grid(), CellCoord::new(20, 20), 5);
        assert_eq!(second.evicted, first.created);

        let first_window: BTreeSet<_> = first.created.iter().copied().collect();
        assert!(materializer
            .coords()
            .iter()
            .all(|coord| !first_window.contains(coord)));
        assert_eq!(
            materializer.coords(),
            expected_window(generator.grid(), CellCoord::new(20, 20), 5)
        );
        // Windowing never forces cells into existence
        assert_eq!(generator.grid().store().len(), cells_before);
    }

    #[test]
    fn test_reentry_recreates_representation() {
        let mut generator = generator(4);
        generator.ensure_area(CellCoord::origin(), 4);
        let mut materializer = AreaMaterializer::default();

        materializer.update_visible(generator.grid(), CellCoord::origin(), 2);
        assert!(materializer.contains(CellCoord::origin()));
        materializer.update_visible(generator.grid(), CellCoord::new(50, 0), 2);
        assert!(!materializer.contains(CellCoord::origin()));

        let update = materializer.update_visible(generator.grid(), CellCoord::origin(), 2);
        assert!(update.created.contains(&CellCoord::origin()));
    }

    #[test]
    fn test_opened_passage_rebuilds_walls() {
        let mut grid = MazeGrid::new(CellGeometry::new(12.0));
        let east = CellCoord::new(1, 0);
        grid.mark_generated(east);
        let mut materializer = AreaMaterializer::default();

        materializer.update_visible(&grid, CellCoord::origin(), 1);
        assert_eq!(materializer.get(CellCoord::origin()).map(|r| r.walls.len()), Some(4));

        grid.connect(CellCoord::origin(), crate::grid::Direction::East);
        let update = materializer.update_visible(&grid, CellCoord::origin(), 1);
        assert_eq!(update.rebuilt, vec![CellCoord::origin(), east]);
        assert!(update.created.is_empty());
        assert_eq!(materializer.get(east).map(|r| r.walls.len()), Some(3));
    }

    #[test]
    fn test_clear() {
        let mut generator = generator(4);
        generator.ensure_area(CellCoord::origin(), 3);
        let mut materializer = AreaMaterializer::default();
        let update = materializer.update_visible(generator.grid(), CellCoord::origin(), 1);

        assert_eq!(materializer.clear(), update.created);
        assert!(materializer.is_empty());
    }
}

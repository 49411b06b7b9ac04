//! Property tests for the maze invariants.

use infinimaze::{
    seeded_rng, utils, AreaMaterializer, CellCoord, CellGeometry, CellStore, CollisionResolver,
    Direction, GenerationConfig, HashGrid, MazeGenerator, MazeGrid, RepresentationStyle, WorldPos,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn generator(seed: u64) -> MazeGenerator {
    MazeGenerator::new(seed, CellGeometry::new(12.0), GenerationConfig::new())
}

/// Open directions of every generated cell.
fn passage_map<S: CellStore>(grid: &MazeGrid<S>) -> BTreeMap<CellCoord, Vec<Direction>> {
    grid.store()
        .coords()
        .into_iter()
        .filter_map(|coord| {
            grid.get_existing(coord)
                .filter(|cell| cell.is_generated())
                .map(|cell| (coord, cell.passages().iter().collect()))
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_generation_is_deterministic(seed in any::<u64>(), radius in 0i32..7) {
        let mut first = generator(seed);
        let mut second = generator(seed);
        first.ensure_area(CellCoord::origin(), radius);
        second.ensure_area(CellCoord::origin(), radius);

        prop_assert_eq!(passage_map(first.grid()), passage_map(second.grid()));
    }

    #[test]
    fn test_passages_are_symmetric(seed in any::<u64>(), radius in 0i32..7) {
        let mut generator = generator(seed);
        generator.ensure_area(CellCoord::origin(), radius);
        let grid = generator.grid();

        for coord in grid.store().coords() {
            let cell = grid.get_existing(coord).unwrap();
            for direction in Direction::ALL {
                let reciprocal = grid
                    .get_existing(coord.neighbor(direction))
                    .is_some_and(|neighbor| neighbor.has_passage(direction.opposite()));
                prop_assert_eq!(cell.has_passage(direction), reciprocal, "{} {:?}", coord, direction);
            }
        }
    }

    #[test]
    fn test_generation_is_monotonic(
        seed in any::<u64>(),
        radius in 1i32..6,
        pick in any::<prop::sample::Index>(),
    ) {
        let mut generator = generator(seed);
        generator.ensure_area(CellCoord::origin(), radius);
        let before = passage_map(generator.grid());

        // Re-center on an already generated cell so the next area grows outwards
        let centers: Vec<CellCoord> = before.keys().copied().collect();
        let center = centers[pick.index(centers.len())];
        generator.ensure_area(center, radius + 1);
        generator.mark_visited(center);
        let after = passage_map(generator.grid());

        for (coord, directions) in &before {
            let now = after.get(coord);
            prop_assert!(now.is_some(), "{} lost its generated flag", coord);
            for direction in directions {
                prop_assert!(now.unwrap().contains(direction), "{} closed {:?}", coord, direction);
            }
        }
    }

    #[test]
    fn test_generated_cells_reach_origin(seed in any::<u64>(), radius in 0i32..8) {
        let mut generator = generator(seed);
        generator.ensure_area(CellCoord::origin(), radius);
        let store = generator.grid().store();

        let reachable = utils::reachable_from(store, CellCoord::origin());
        for coord in store.coords() {
            if store.is_generated(coord) {
                prop_assert!(reachable.contains(&coord), "{} is cut off from the origin", coord);
            }
        }
    }

    #[test]
    fn test_window_matches_generated_square(
        seed in any::<u64>(),
        cx in -9i32..=9,
        cz in -9i32..=9,
        radius in 0i32..6,
    ) {
        let mut generator = generator(seed);
        generator.ensure_area(CellCoord::origin(), 6);
        let grid = generator.grid();

        let mut materializer = AreaMaterializer::new(RepresentationStyle::default());
        materializer.update_visible(grid, CellCoord::origin(), 3);
        let center = CellCoord::new(cx, cz);
        materializer.update_visible(grid, center, radius);

        let expected: Vec<CellCoord> = grid
            .store()
            .coords()
            .into_iter()
            .filter(|&coord| grid.is_generated(coord))
            .filter(|coord| coord.chebyshev_distance(center) <= radius as u32)
            .collect();
        prop_assert_eq!(materializer.coords(), expected);

        let cells_before = grid.store().len();
        let repeat = materializer.update_visible(grid, center, radius);
        prop_assert!(repeat.is_empty());
        prop_assert_eq!(grid.store().len(), cells_before);
    }

    #[test]
    fn test_collision_contains_north_only_cell(x in -12.0f64..12.0, z in -12.0f64..12.0) {
        let geometry = CellGeometry::new(12.0);
        let mut grid = MazeGrid::with_store(HashGrid::new(), geometry);
        for cx in -2..=2 {
            for cz in -2..=2 {
                let coord = CellCoord::new(cx, cz);
                grid.mark_generated(coord);
            }
        }
        grid.connect(CellCoord::origin(), Direction::North);
        let mut generator = MazeGenerator::with_parts(grid, seeded_rng(0), GenerationConfig::new());

        let resolver = CollisionResolver::default();
        let half = resolver.half_extent(geometry);
        let resolved = resolver.resolve(&mut generator, WorldPos::new(0.0, 0.0), WorldPos::new(x, z));

        prop_assert_eq!(resolved.x, x.clamp(-half, half));
        prop_assert_eq!(resolved.z, z.min(half));
        prop_assert_eq!(generator.grid().store().generated_count(), 25);
    }
}

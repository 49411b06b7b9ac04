//! # Maze Carving
//!
//! Lazy, seeded generation of the infinite maze.
//!
//! A cell is carved the first time something asks for it:
//! 1. One guaranteed passage, to a random generated neighbor if there is one,
//!    otherwise to a freshly generated first neighbor (the frontier walk)
//! 2. Extra loop passages to generated neighbors and occasional eager growth
//!    into untouched neighbors
//! 3. Dead-end mitigation when only a single passage ended up open
//!
//! The natural formulation recurses. Here every pending generation is an
//! explicit [`Frame`] on a heap allocated stack, resumed at the exact point the
//! recursive call would return to, so the random draws happen in the same order
//! and arbitrarily long frontier walks cannot exhaust the call stack.

use super::{pick_index, seeded_rng, shuffle, GenerationConfig, RandomSource};
use crate::grid::{Cell, CellCoord, CellGeometry, CellStore, Direction, HashGrid, MazeGrid};
use crate::materialize::Footprint;
use log::{debug, trace, warn};
use rand::rngs::StdRng;

/// Result of a budgeted area generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaProgress {
    /// Cells generated by this call, including cascades
    pub generated: usize,
    /// Whether every cell of the footprint is now generated
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    /// Waiting for the first shuffled neighbor to finish generating
    AwaitGuaranteed,
    /// Loop pass, positioned at the next neighbor index
    Loops(usize),
    /// Waiting for an eagerly expanded neighbor at this index
    AwaitEager(usize),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    coord: CellCoord,
    order: [Direction; 4],
    step: Step,
}

impl Frame {
    fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            order: Direction::ALL,
            step: Step::Start,
        }
    }
}

/// Owns the maze grid and the random source, and carves cells on demand.
#[derive(Debug, Clone)]
pub struct MazeGenerator<S: CellStore = HashGrid, R: RandomSource = StdRng> {
    grid: MazeGrid<S>,
    rng: R,
    config: GenerationConfig,
}

impl MazeGenerator<HashGrid, StdRng> {
    /// Creates a hash map backed generator seeded with `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::{CellCoord, CellGeometry, GenerationConfig, MazeGenerator};
    ///
    /// let mut generator = MazeGenerator::new(1, CellGeometry::new(12.0), GenerationConfig::new());
    /// let cell = generator.ensure_generated(CellCoord::new(1, 0));
    /// assert!(cell.is_generated());
    /// assert!(cell.passages().count() >= 1);
    /// ```
    pub fn new(seed: u64, geometry: CellGeometry, config: GenerationConfig) -> Self {
        Self::with_parts(MazeGrid::new(geometry), seeded_rng(seed), config)
    }
}

impl<S: CellStore, R: RandomSource> MazeGenerator<S, R> {
    /// Assembles a generator from an explicit grid and random source.
    pub fn with_parts(grid: MazeGrid<S>, rng: R, config: GenerationConfig) -> Self {
        Self { grid, rng, config }
    }

    /// The grid being carved.
    pub fn grid(&self) -> &MazeGrid<S> {
        &self.grid
    }

    /// The carving parameters.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Guarantees the passages of `coord` are finalized.
    ///
    /// Idempotent: an already generated cell is returned untouched and no
    /// random value is drawn.
    pub fn ensure_generated(&mut self, coord: CellCoord) -> &Cell {
        self.generate(coord);
        self.grid.get_or_create(coord)
    }

    /// Generates every cell of the generation footprint around `center`.
    ///
    /// The footprint is the `radius` square cut by a Manhattan bound of
    /// `radius + lookahead_margin`. Cells are visited ring by ring outwards, so
    /// each one already borders a generated cell once the center is generated.
    /// Returns the number of newly generated cells.
    pub fn ensure_area(&mut self, center: CellCoord, radius: i32) -> usize {
        let before = self.grid.store().generated_count();
        let footprint = Footprint::generation(center, radius, self.config.lookahead_margin);
        for coord in footprint.cells() {
            self.generate(coord);
        }
        let generated = self.grid.store().generated_count() - before;
        if generated > 0 {
            debug!(
                "generated {} cells around {} (radius {})",
                generated, center, radius
            );
        }
        generated
    }

    /// Like [`ensure_area`](Self::ensure_area) but stops starting new cells
    /// once `budget` cells were generated by this call.
    ///
    /// A single cell can cascade past the budget. Calling again with the same
    /// center resumes where the previous call stopped, producing exactly the
    /// maze an unbudgeted call would have.
    pub fn ensure_area_within(
        &mut self,
        center: CellCoord,
        radius: i32,
        budget: usize,
    ) -> AreaProgress {
        let before = self.grid.store().generated_count();
        let footprint = Footprint::generation(center, radius, self.config.lookahead_margin);
        for coord in footprint.cells() {
            if self.grid.is_generated(coord) {
                continue;
            }
            let generated = self.grid.store().generated_count() - before;
            if generated >= budget {
                trace!("generation budget of {} spent around {}", budget, center);
                return AreaProgress {
                    generated,
                    complete: false,
                };
            }
            self.generate(coord);
        }
        AreaProgress {
            generated: self.grid.store().generated_count() - before,
            complete: true,
        }
    }

    /// Flags `coord` as occupied by an observer. One-way.
    pub fn mark_visited(&mut self, coord: CellCoord) {
        self.grid.mark_visited(coord);
    }

    fn generate(&mut self, target: CellCoord) {
        if self.grid.is_generated(target) {
            return;
        }
        let mut stack = vec![Frame::new(target)];
        let mut warned = false;

        while let Some(frame) = stack.last_mut() {
            let coord = frame.coord;
            match frame.step {
                Step::Start => {
                    if self.grid.is_generated(coord) {
                        stack.pop();
                        continue;
                    }
                    self.grid.get_or_create(coord);
                    shuffle(&mut frame.order, &mut self.rng);
                    let order = frame.order;

                    let connected: Vec<Direction> = order
                        .into_iter()
                        .filter(|&direction| self.grid.is_generated(coord.neighbor(direction)))
                        .collect();

                    if connected.is_empty() {
                        frame.step = Step::AwaitGuaranteed;
                        stack.push(Frame::new(coord.neighbor(order[0])));
                        if !warned && stack.len() > self.config.deep_walk_warning {
                            warn!(
                                "frontier walk from {} is {} cells deep",
                                target,
                                stack.len()
                            );
                            warned = true;
                        }
                    } else {
                        let chosen = connected[pick_index(connected.len(), &mut self.rng)];
                        self.grid.connect(coord, chosen);
                        self.grid.mark_generated(coord);
                        frame.step = Step::Loops(0);
                    }
                }
                Step::AwaitGuaranteed => {
                    self.grid.connect(coord, frame.order[0]);
                    self.grid.mark_generated(coord);
                    frame.step = Step::Loops(0);
                }
                Step::Loops(index) if index < frame.order.len() => {
                    let direction = frame.order[index];
                    let neighbor = coord.neighbor(direction);
                    frame.step = Step::Loops(index + 1);

                    match self.grid.get_existing(neighbor).map(Cell::is_generated) {
                        Some(true) => {
                            if !self.has_passage(coord, direction)
                                && self.rng.next_unit() < self.config.loop_chance
                            {
                                self.grid.connect(coord, direction);
                            }
                        }
                        Some(false) => {}
                        None => {
                            if self.rng.next_unit() < self.config.eager_expansion_chance {
                                frame.step = Step::AwaitEager(index);
                                stack.push(Frame::new(neighbor));
                            }
                        }
                    }
                }
                Step::Loops(_) => {
                    let order = frame.order;
                    stack.pop();
                    self.mitigate_dead_end(coord, order);
                }
                Step::AwaitEager(index) => {
                    self.grid.connect(coord, frame.order[index]);
                    frame.step = Step::Loops(index + 1);
                }
            }
        }
    }

    fn mitigate_dead_end(&mut self, coord: CellCoord, order: [Direction; 4]) {
        let open = self
            .grid
            .get_existing(coord)
            .map_or(0, |cell| cell.passages().count());
        if open != 1 {
            return;
        }
        let options: Vec<Direction> = order
            .into_iter()
            .filter(|&direction| {
                self.grid.is_generated(coord.neighbor(direction))
                    && !self.has_passage(coord, direction)
            })
            .collect();
        if !options.is_empty() {
            let chosen = options[pick_index(options.len(), &mut self.rng)];
            self.grid.connect(coord, chosen);
        }
    }

    fn has_passage(&self, coord: CellCoord, direction: Direction) -> bool {
        self.grid
            .get_existing(coord)
            .is_some_and(|cell| cell.has_passage(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::grid::ChunkedGrid;

    /// Replays `values` cyclically.
    struct Cycle {
        values: Vec<f64>,
        next: usize,
    }

    impl Cycle {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl RandomSource for Cycle {
        fn next_unit(&mut self) -> f64 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }

    fn scripted(values: &[f64], config: GenerationConfig) -> MazeGenerator<HashGrid, Cycle> {
        MazeGenerator::with_parts(
            MazeGrid::new(CellGeometry::new(10.0)),
            Cycle::new(values),
            config,
        )
    }

    fn passages_of<S: CellStore, R: RandomSource>(
        generator: &MazeGenerator<S, R>,
        x: i32,
        z: i32,
    ) -> Vec<Direction> {
        generator
            .grid()
            .get_existing(CellCoord::new(x, z))
            .map(|cell| cell.passages().iter().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_origin_connects_to_first_neighbor() {
        let mut generator =
            MazeGenerator::new(1, CellGeometry::new(12.0), GenerationConfig::new());

        let origin = generator.ensure_generated(CellCoord::origin());
        assert!(origin.is_generated());
        assert!(origin.passages().is_empty());

        let east = generator.ensure_generated(CellCoord::new(1, 0)).clone();
        assert!(east.is_generated());
        assert!(east.has_passage(Direction::West));

        let origin = generator.grid().get_existing(CellCoord::origin()).cloned();
        assert!(origin.is_some_and(|cell| cell.has_passage(Direction::East)));
    }

    #[test]
    fn test_ensure_generated_is_idempotent() {
        let mut generator = scripted(&[0.5], GenerationConfig::new());
        generator.ensure_generated(CellCoord::new(0, 1));
        let draws = generator.rng.next;
        let cells = generator.grid().store().len();

        generator.ensure_generated(CellCoord::new(0, 1));
        assert_eq!(generator.rng.next, draws);
        assert_eq!(generator.grid().store().len(), cells);
    }

    #[test]
    fn test_frontier_cell_walks_back_to_generated_territory() {
        // First three draws put West first; afterwards every draw is 0.99
        let mut generator = scripted(
            &[0.0, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99, 0.99],
            GenerationConfig::new(),
        );
        generator.ensure_generated(CellCoord::new(2, 0));

        assert_eq!(passages_of(&generator, 2, 0), vec![Direction::West]);
        assert_eq!(
            passages_of(&generator, 1, 0),
            vec![Direction::East, Direction::West]
        );
        assert_eq!(passages_of(&generator, 0, 0), vec![Direction::East]);
        assert!(generator.grid().is_generated(CellCoord::new(1, 0)));
    }

    #[test]
    fn test_walk_reenters_pending_cell() {
        // (2, 0) shuffles East first and walks to (3, 0), which shuffles West
        // first and asks for (2, 0) again while its first frame is pending.
        // The nested frame shuffles West first and reaches the origin.
        let mut script = vec![0.99, 0.0, 0.99];
        script.extend([0.0, 0.99, 0.99]);
        script.extend([0.0, 0.99, 0.99]);
        script.extend([0.0, 0.99, 0.99]);
        script.resize(22, 0.5);
        let mut generator = scripted(&script, GenerationConfig::for_testing());
        generator.ensure_generated(CellCoord::new(2, 0));

        assert_eq!(passages_of(&generator, 0, 0), vec![Direction::East]);
        assert_eq!(
            passages_of(&generator, 1, 0),
            vec![Direction::East, Direction::West]
        );
        assert_eq!(
            passages_of(&generator, 2, 0),
            vec![Direction::East, Direction::West]
        );
        assert_eq!(passages_of(&generator, 3, 0), vec![Direction::West]);

        // The pending outer frame finishes without generating (2, 0) twice
        assert_eq!(generator.grid().store().generated_count(), 4);
        assert_eq!(generator.grid().store().len(), 4);
        assert_eq!(generator.rng.next, 22);
        let reachable = utils::reachable_from(generator.grid().store(), CellCoord::origin());
        assert!(reachable.contains(&CellCoord::new(3, 0)));
    }

    #[test]
    fn test_generated_area_draws_nothing_again() {
        let mut generator = scripted(&[0.3, 0.7, 0.1, 0.9], GenerationConfig::for_testing());
        generator.ensure_area(CellCoord::origin(), 3);
        let draws = generator.rng.next;

        assert_eq!(generator.ensure_area(CellCoord::origin(), 3), 0);
        let progress = generator.ensure_area_within(CellCoord::origin(), 3, 1);
        assert!(progress.complete);
        assert_eq!(generator.rng.next, draws);
    }

    #[test]
    fn test_dead_end_gets_extra_passage() {
        let mut generator = scripted(&[0.99], GenerationConfig::for_testing());
        generator.ensure_generated(CellCoord::new(1, 0));
        generator.ensure_generated(CellCoord::new(1, 1));
        assert_eq!(passages_of(&generator, 1, 1), vec![Direction::North]);

        // (0, 1) picks East as its guaranteed passage, then mitigation opens North
        generator.ensure_generated(CellCoord::new(0, 1));
        assert_eq!(
            passages_of(&generator, 0, 1),
            vec![Direction::North, Direction::East]
        );
        assert!(passages_of(&generator, 0, 0).contains(&Direction::South));
    }

    #[test]
    fn test_eager_expansion_connects_new_cell() {
        let mut config = GenerationConfig::new();
        config.loop_chance = 0.0;
        config.eager_expansion_chance = 0.5;
        // (1, 0) shuffles to [W, S, E, N]; the 0.0 drawn for North passes the eager check
        let mut generator = scripted(&[0.0, 0.99, 0.99, 0.99, 0.6, 0.6, 0.0, 0.99], config);
        generator.ensure_generated(CellCoord::new(1, 0));

        assert_eq!(
            passages_of(&generator, 1, 0),
            vec![Direction::North, Direction::West]
        );
        assert_eq!(passages_of(&generator, 1, -1), vec![Direction::South]);
        assert!(generator.grid().is_generated(CellCoord::new(1, -1)));
    }

    #[test]
    fn test_long_frontier_walk_does_not_recurse() {
        // Every frame shuffles West to the front, forcing a straight walk home
        let mut generator = scripted(&[0.0, 0.99, 0.99], GenerationConfig::for_testing());
        let far = CellCoord::new(100_000, 0);
        generator.ensure_generated(far);

        assert_eq!(generator.grid().store().generated_count(), 100_001);
        let reachable = utils::reachable_from(generator.grid().store(), CellCoord::origin());
        assert!(reachable.contains(&far));
    }

    #[test]
    fn test_same_seed_same_maze_across_stores() {
        let geometry = CellGeometry::new(10.0);
        let mut hashed = MazeGenerator::new(99, geometry, GenerationConfig::new());
        let mut chunked = MazeGenerator::with_parts(
            MazeGrid::with_store(ChunkedGrid::new(), geometry),
            seeded_rng(99),
            GenerationConfig::new(),
        );
        hashed.ensure_area(CellCoord::origin(), 6);
        chunked.ensure_area(CellCoord::origin(), 6);

        let coords = hashed.grid().store().coords();
        assert_eq!(coords, chunked.grid().store().coords());
        for coord in coords {
            assert_eq!(
                hashed.grid().get_existing(coord),
                chunked.grid().get_existing(coord)
            );
        }
    }

    #[test]
    fn test_ensure_area_covers_footprint() {
        let mut generator =
            MazeGenerator::new(5, CellGeometry::new(10.0), GenerationConfig::new());
        let generated = generator.ensure_area(CellCoord::origin(), 3);
        assert!(generated >= 48);

        for coord in Footprint::generation(CellCoord::origin(), 3, 4).cells() {
            assert!(generator.grid().is_generated(coord), "{} not generated", coord);
        }
        assert_eq!(generator.ensure_area(CellCoord::origin(), 3), 0);
    }

    #[test]
    fn test_budgeted_area_matches_unbudgeted() {
        let geometry = CellGeometry::new(10.0);
        let mut whole = MazeGenerator::new(17, geometry, GenerationConfig::new());
        let mut sliced = MazeGenerator::new(17, geometry, GenerationConfig::new());
        let center = CellCoord::origin();

        whole.ensure_area(center, 8);

        let first = sliced.ensure_area_within(center, 8, 10);
        assert!(!first.complete);
        assert!(first.generated >= 10);

        let mut calls = 1;
        while !sliced.ensure_area_within(center, 8, 10).complete {
            calls += 1;
            assert!(calls < 1_000, "budgeted generation never completed");
        }

        let coords = whole.grid().store().coords();
        assert_eq!(coords, sliced.grid().store().coords());
        for coord in coords {
            assert_eq!(
                whole.grid().get_existing(coord),
                sliced.grid().get_existing(coord)
            );
        }
    }

    #[test]
    fn test_mark_visited() {
        let mut generator =
            MazeGenerator::new(3, CellGeometry::new(10.0), GenerationConfig::new());
        let coord = CellCoord::new(4, 4);
        assert!(generator.grid().get_existing(coord).is_none());
        generator.mark_visited(coord);
        let cell = generator.grid().get_existing(coord);
        assert!(cell.is_some_and(|cell| cell.is_visited() && !cell.is_generated()));
    }
}

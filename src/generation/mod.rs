//! # Generation Module
//!
//! Procedural maze generation: the random source, tuning parameters and the
//! on-demand carving algorithm.
//!
//! Every stochastic decision in the maze draws from a single [`RandomSource`]
//! owned by the generator, so a fixed seed reproduces an identical maze.

pub mod maze;

pub use maze::*;

use crate::grid::{CellCoord, CellStore};
use crate::{MazeError, MazeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Tuning parameters for maze carving.
///
/// None of these have a derivation; they control how loopy and how bushy the
/// maze grows and are exposed so they can be tweaked per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Probability of opening an extra passage to an already generated neighbor
    pub loop_chance: f64,
    /// Probability of eagerly generating an untouched neighbor
    pub eager_expansion_chance: f64,
    /// Extra Manhattan distance generated beyond the requested radius
    pub lookahead_margin: i32,
    /// Pending frame depth at which a frontier walk is reported as deep
    pub deep_walk_warning: usize,
}

impl GenerationConfig {
    /// Creates the default tuning.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert!(config.loop_chance > config.eager_expansion_chance);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            loop_chance: 0.28,
            eager_expansion_chance: 0.12,
            lookahead_margin: 4,
            deep_walk_warning: 10_000,
        }
    }

    /// Creates a tree-like tuning: no loops and no eager growth.
    ///
    /// Only the guaranteed connection and dead-end mitigation carve passages.
    pub fn for_testing() -> Self {
        Self {
            loop_chance: 0.0,
            eager_expansion_chance: 0.0,
            lookahead_margin: 4,
            deep_walk_warning: 1_000,
        }
    }

    /// Checks that the probabilities and margin are usable.
    pub fn validate(&self) -> MazeResult<()> {
        for (name, value) in [
            ("loop_chance", self.loop_chance),
            ("eager_expansion_chance", self.eager_expansion_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MazeError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.lookahead_margin < 0 {
            return Err(MazeError::InvalidConfig(format!(
                "lookahead_margin must not be negative, got {}",
                self.lookahead_margin
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A reproducible stream of uniform values in `[0, 1)`.
pub trait RandomSource {
    /// Advances the stream and returns the next value.
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Creates the default seeded random source.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Small 32-bit generator (Mulberry32).
///
/// Kept for bit-exact reproduction of mazes seeded with the legacy stream.
///
/// # Examples
///
/// ```
/// use infinimaze::{Mulberry32, RandomSource};
///
/// let mut rng = Mulberry32::new(1);
/// assert_eq!(rng.next_unit(), 0.6270739405881613);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates the stream for `seed`. Only the low 32 bits are used.
    pub fn new(seed: u64) -> Self {
        Self { state: seed as u32 }
    }

    /// Returns the next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RandomSource for Mulberry32 {
    fn next_unit(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

/// Fisher-Yates shuffle drawing one value per position, last to second.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = pick_index(i + 1, rng);
        items.swap(i, j);
    }
}

/// Picks a uniform index in `0..len`. `len` must be non-zero.
pub fn pick_index<R: RandomSource + ?Sized>(len: usize, rng: &mut R) -> usize {
    let index = (rng.next_unit() * len as f64).floor() as usize;
    index.min(len - 1)
}

/// Utility functions over generated mazes.
pub mod utils {
    use super::*;
    use pathfinding::prelude::{bfs, bfs_reach};
    use std::collections::HashSet;

    fn open_neighbors<S: CellStore>(store: &S, coord: CellCoord) -> Vec<CellCoord> {
        store
            .get(coord)
            .map(|cell| {
                cell.passages()
                    .iter()
                    .map(|direction| coord.neighbor(direction))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every coordinate reachable from `start` by walking open passages.
    pub fn reachable_from<S: CellStore>(store: &S, start: CellCoord) -> HashSet<CellCoord> {
        bfs_reach(start, |&coord| open_neighbors(store, coord)).collect()
    }

    /// Shortest passage route from `start` to the first cell accepted by `goal`.
    ///
    /// The route includes both endpoints. Only existing cells are walked.
    pub fn find_route<S, F>(store: &S, start: CellCoord, mut goal: F) -> Option<Vec<CellCoord>>
    where
        S: CellStore,
        F: FnMut(CellCoord) -> bool,
    {
        bfs(
            &start,
            |&coord| open_neighbors(store, coord),
            |&coord| goal(coord),
        )
    }
}

//! # Explore Module
//!
//! Automatic observer that walks the maze on its own.
//!
//! The wanderer plans a passage route to the nearest generated cell it has not
//! visited yet, then steers from cell center to cell center. Movement goes
//! through [`MazeWorld::advance`] like any other observer, so walls still clamp
//! it and the maze keeps growing ahead of it.

use crate::generation::{utils, RandomSource};
use crate::grid::{CellCoord, CellStore, MazeGrid, WorldPos};
use crate::world::{MazeWorld, Observer, TickReport};
use log::{debug, trace};

/// Distance covered per tick when no speed is given, in world units.
pub const DEFAULT_WANDER_SPEED: f64 = 1.5;

/// Route-following state for an automatic observer.
#[derive(Debug, Clone)]
pub struct Wanderer {
    /// Distance covered per tick
    pub speed: f64,
    /// Remaining cells to walk through, next one first
    route: Vec<CellCoord>,
    /// Unvisited cell the current route leads to
    target: Option<CellCoord>,
}

impl Wanderer {
    /// Creates a wanderer moving `speed` world units per tick.
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            route: Vec::new(),
            target: None,
        }
    }

    /// The cell the wanderer is heading for.
    pub fn target(&self) -> Option<CellCoord> {
        self.target
    }

    /// Remaining route, next cell first.
    pub fn route(&self) -> &[CellCoord] {
        &self.route
    }

    /// Plans a route from `from` to the nearest generated, unvisited cell.
    ///
    /// Returns whether a route was found. The route excludes `from` itself.
    pub fn plan<S: CellStore>(&mut self, grid: &MazeGrid<S>, from: CellCoord) -> bool {
        let store = grid.store();
        let route = utils::find_route(store, from, |coord| {
            coord != from
                && store
                    .get(coord)
                    .is_some_and(|cell| cell.is_generated() && !cell.is_visited())
        });

        match route {
            Some(mut route) => {
                route.remove(0);
                self.target = route.last().copied();
                debug!(
                    "wanderer at {} heading for {:?}, {} cells away",
                    from,
                    self.target,
                    route.len()
                );
                self.route = route;
                true
            }
            None => {
                self.route.clear();
                self.target = None;
                false
            }
        }
    }

    /// Where the observer should try to move this tick.
    ///
    /// Replans when the route is used up or the observer left it.
    pub fn next_position<S: CellStore>(
        &mut self,
        grid: &MazeGrid<S>,
        observer: &mut Observer,
    ) -> WorldPos {
        let geometry = grid.geometry();
        let cell = observer.cell(geometry);

        if self.route.first() == Some(&cell) {
            self.route.remove(0);
        }
        let on_route = self.route.first().is_some_and(|&next| {
            cell.direction_to(next).is_some_and(|direction| {
                grid.get_existing(cell)
                    .is_some_and(|current| current.has_passage(direction))
            })
        });
        if !on_route && !self.plan(grid, cell) {
            return observer.position;
        }

        let Some(&next) = self.route.first() else {
            return observer.position;
        };
        let heading = geometry.cell_center(next) - observer.position;
        let distance = heading.length();
        if distance <= f64::EPSILON {
            return observer.position;
        }

        observer.face(heading);
        let step = self.speed.min(distance) / distance;
        trace!("wanderer stepping from {} towards {}", cell, next);
        observer.position + WorldPos::new(heading.x * step, heading.z * step)
    }

    /// Moves the observer one tick along the route.
    pub fn step<S: CellStore, R: RandomSource>(
        &mut self,
        world: &mut MazeWorld<S, R>,
        observer: &mut Observer,
    ) -> TickReport {
        let attempted = self.next_position(world.grid(), observer);
        world.advance(observer, attempted)
    }
}

impl Default for Wanderer {
    fn default() -> Self {
        Self::new(DEFAULT_WANDER_SPEED)
    }
}

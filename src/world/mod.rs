//! # World Module
//!
//! The maze core as one facade: generator, materializer, collision resolver
//! and minimap projector sharing a single grid.
//!
//! External collaborators (renderer, input layer, minimap) call into
//! [`MazeWorld`] once per frame. Every operation is synchronous and infallible
//! once the world is constructed.

pub mod settings;

pub use settings::*;

use crate::collision::CollisionResolver;
use crate::generation::{seeded_rng, MazeGenerator, RandomSource};
use crate::grid::{Cell, CellCoord, CellGeometry, CellStore, HashGrid, MazeGrid, WorldPos};
use crate::materialize::{AreaMaterializer, WindowUpdate};
use crate::minimap::{MinimapProjector, MinimapSnapshot};
use crate::MazeResult;
use log::{debug, trace};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Position and heading of whoever walks the maze.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observer {
    /// Position on the world plane
    pub position: WorldPos,
    /// Heading in radians; zero faces north (negative z)
    pub yaw: f64,
}

impl Observer {
    /// Creates an observer.
    pub fn new(position: WorldPos, yaw: f64) -> Self {
        Self { position, yaw }
    }

    /// Unit vector the observer is facing.
    pub fn forward(&self) -> WorldPos {
        WorldPos::new(-self.yaw.sin(), -self.yaw.cos())
    }

    /// Turns the observer to face along `direction` (need not be normalized).
    pub fn face(&mut self, direction: WorldPos) {
        if direction.length() > f64::EPSILON {
            self.yaw = (-direction.x).atan2(-direction.z);
        }
    }

    /// The cell the observer occupies.
    pub fn cell(&self, geometry: CellGeometry) -> CellCoord {
        geometry.world_to_cell(self.position)
    }
}

/// What one call to [`MazeWorld::advance`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Cell occupied after movement
    pub cell: CellCoord,
    /// Position after collision resolution
    pub position: WorldPos,
    /// Cells generated this tick
    pub generated: usize,
    /// Whether the generation footprint is fully carved
    pub generation_complete: bool,
    /// Representation churn this tick
    pub window: WindowUpdate,
}

/// The maze core behind one observer.
#[derive(Debug, Clone)]
pub struct MazeWorld<S: CellStore = HashGrid, R: RandomSource = StdRng> {
    config: MazeConfig,
    generator: MazeGenerator<S, R>,
    materializer: AreaMaterializer,
    resolver: CollisionResolver,
    projector: MinimapProjector,
}

impl MazeWorld<HashGrid, StdRng> {
    /// Builds a hash map backed world from a validated configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::{MazeConfig, MazeWorld, Observer};
    ///
    /// let mut world = MazeWorld::new(MazeConfig::for_testing(1)).unwrap();
    /// let mut observer = Observer::default();
    /// world.prime(&observer);
    ///
    /// let report = world.advance(&mut observer, infinimaze::WorldPos::new(1.0, 0.0));
    /// assert!(world.grid().get_existing(report.cell).is_some_and(|cell| cell.is_visited()));
    /// ```
    pub fn new(config: MazeConfig) -> MazeResult<Self> {
        config.validate()?;
        let geometry = CellGeometry::new(config.cell_size);
        let generator = MazeGenerator::with_parts(
            MazeGrid::new(geometry),
            seeded_rng(config.seed),
            config.generation.clone(),
        );
        Self::with_generator(config, generator)
    }
}

impl<S: CellStore, R: RandomSource> MazeWorld<S, R> {
    /// Builds a world around an existing generator.
    ///
    /// The generator's grid geometry and carving parameters take precedence
    /// over the matching configuration fields.
    pub fn with_generator(config: MazeConfig, generator: MazeGenerator<S, R>) -> MazeResult<Self> {
        config.validate()?;
        Ok(Self {
            materializer: AreaMaterializer::new(config.style.clone()),
            resolver: config.collision.clone(),
            projector: MinimapProjector::new(config.minimap_radius),
            generator,
            config,
        })
    }

    /// The configuration this world was built with.
    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// The generator owning the grid.
    pub fn generator(&self) -> &MazeGenerator<S, R> {
        &self.generator
    }

    /// Read-only view of the grid.
    pub fn grid(&self) -> &MazeGrid<S> {
        self.generator.grid()
    }

    /// The live representations.
    pub fn materializer(&self) -> &AreaMaterializer {
        &self.materializer
    }

    /// Non-creating cell lookup for read-only collaborators.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.grid().get_existing(coord)
    }

    /// Generates the footprint around `center`. See [`MazeGenerator::ensure_area`].
    pub fn ensure_area(&mut self, center: CellCoord, radius: i32) -> usize {
        self.generator.ensure_area(center, radius)
    }

    /// Reconciles representations with the window around `center`.
    pub fn update_visible(&mut self, center: CellCoord, radius: i32) -> WindowUpdate {
        self.materializer
            .update_visible(self.generator.grid(), center, radius)
    }

    /// Constrains a movement from `current` to `attempted`.
    pub fn resolve(&mut self, current: WorldPos, attempted: WorldPos) -> WorldPos {
        self.resolver.resolve(&mut self.generator, current, attempted)
    }

    /// Snapshot of the generated cells around the observer.
    pub fn minimap(&self, observer: &Observer) -> MinimapSnapshot {
        let center = observer.cell(self.grid().geometry());
        self.projector.project(self.grid(), center, observer.yaw)
    }

    /// Prepares the neighborhood of a freshly placed observer.
    ///
    /// Generates the full footprint regardless of the tick budget, fills the
    /// view window and marks the occupied cell visited.
    ///
    /// An observer placed away from generated territory starts a frontier
    /// random walk back to it. The walk length is heavy-tailed, so a far
    /// placement can carve a very long corridor in this one call.
    pub fn prime(&mut self, observer: &Observer) -> WindowUpdate {
        let cell = observer.cell(self.grid().geometry());
        let generated = self
            .generator
            .ensure_area(cell, self.config.generation_radius);
        let window = self.update_visible(cell, self.config.visible_radius);
        self.generator.mark_visited(cell);
        debug!(
            "primed maze at {}: {} cells generated, {} representations",
            cell,
            generated,
            self.materializer.len()
        );
        window
    }

    /// Runs one tick: collision, generation ahead of view, windowing, visit.
    pub fn advance(&mut self, observer: &mut Observer, attempted: WorldPos) -> TickReport {
        let position = self.resolve(observer.position, attempted);
        observer.position = position;
        let cell = observer.cell(self.grid().geometry());

        let radius = self.config.generation_radius;
        let (generated, generation_complete) = match self.config.tick_generation_budget {
            Some(budget) => {
                let progress = self.generator.ensure_area_within(cell, radius, budget);
                (progress.generated, progress.complete)
            }
            None => (self.generator.ensure_area(cell, radius), true),
        };

        let window = self.update_visible(cell, self.config.visible_radius);
        self.generator.mark_visited(cell);
        trace!(
            "tick at {}: {} generated, {} created, {} evicted",
            cell,
            generated,
            window.created.len(),
            window.evicted.len()
        );

        TickReport {
            cell,
            position,
            generated,
            generation_complete,
            window,
        }
    }
}

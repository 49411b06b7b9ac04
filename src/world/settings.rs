//! # Maze Settings
//!
//! Runtime configuration for a [`MazeWorld`](super::MazeWorld), loadable from JSON.

use crate::collision::CollisionResolver;
use crate::config;
use crate::generation::GenerationConfig;
use crate::materialize::RepresentationStyle;
use crate::{MazeError, MazeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration of one maze session.
///
/// Missing JSON fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Seed of the random source
    pub seed: u64,
    /// Side length of a cell in world units
    pub cell_size: f64,
    /// Radius generated around the observer every tick
    pub generation_radius: i32,
    /// Radius of the representation window
    pub visible_radius: i32,
    /// Radius scanned by the minimap
    pub minimap_radius: i32,
    /// Upper bound on cells generated per tick, unbounded when absent
    pub tick_generation_budget: Option<usize>,
    /// Carving parameters
    pub generation: GenerationConfig,
    /// Wall clamping parameters
    pub collision: CollisionResolver,
    /// Wall dimensions of representations
    pub style: RepresentationStyle,
}

impl MazeConfig {
    /// Creates the default configuration for `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use infinimaze::MazeConfig;
    ///
    /// let config = MazeConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.visible_radius < config.generation_radius);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cell_size: config::DEFAULT_CELL_SIZE,
            generation_radius: config::DEFAULT_GENERATION_RADIUS,
            visible_radius: config::DEFAULT_VISIBLE_RADIUS,
            minimap_radius: config::DEFAULT_MINIMAP_RADIUS,
            tick_generation_budget: None,
            generation: GenerationConfig::new(),
            collision: CollisionResolver::default(),
            style: RepresentationStyle::default(),
        }
    }

    /// Small radii for fast tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            generation_radius: 5,
            visible_radius: 3,
            minimap_radius: 4,
            ..Self::new(seed)
        }
    }

    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> MazeResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> MazeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> MazeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the configuration for values the maze cannot work with.
    pub fn validate(&self) -> MazeResult<()> {
        self.generation.validate()?;

        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MazeError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.visible_radius < 0 || self.minimap_radius < 0 {
            return Err(MazeError::InvalidConfig(
                "radii must not be negative".to_string(),
            ));
        }
        if self.visible_radius >= self.generation_radius {
            return Err(MazeError::InvalidConfig(format!(
                "visible_radius ({}) must be smaller than generation_radius ({})",
                self.visible_radius, self.generation_radius
            )));
        }
        if self.collision.generation_radius < 2 {
            return Err(MazeError::InvalidConfig(format!(
                "collision generation_radius must be at least 2, got {}",
                self.collision.generation_radius
            )));
        }
        let half = self.cell_size / 2.0;
        if !(0.0..half).contains(&self.collision.wall_margin) {
            return Err(MazeError::InvalidConfig(format!(
                "wall_margin must be within [0, {}), got {}",
                half, self.collision.wall_margin
            )));
        }
        if self.tick_generation_budget == Some(0) {
            return Err(MazeError::InvalidConfig(
                "tick_generation_budget must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self::new(config::DEFAULT_SEED)
    }
}

//! # Infinimaze
//!
//! An unbounded, seeded maze that grows lazily around a moving observer.
//!
//! ## Architecture Overview
//!
//! The maze has no edges. Cells come into existence the first time anything
//! asks about them and keep their passages forever after. Around that core
//! sit a few independent services:
//!
//! - **Grid**: Sparse cell storage keyed by integer coordinates
//! - **Generation**: Deterministic carving of cells on demand, with loops and dead-end mitigation
//! - **Materialization**: A bounded window of render-facing cell representations
//! - **Collision**: Per-axis clamping of observer movement against closed sides
//! - **Minimap**: Read-only top-down snapshots of the generated neighborhood
//! - **World**: A facade that runs all of the above once per tick
//!
//! ## Determinism
//!
//! Generation consumes a single random stream. Two mazes built from the same
//! seed and driven by the same sequence of requests are identical.

pub mod collision;
pub mod explore;
pub mod generation;
pub mod grid;
pub mod materialize;
pub mod minimap;
pub mod world;

// Core module re-exports
pub use collision::*;
pub use explore::*;
pub use generation::*;
pub use grid::*;
pub use materialize::*;
pub use minimap::*;
pub use world::*;

/// Core error type for the maze engine.
///
/// Carving, windowing and collision never fail. Errors only come from loading
/// and validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum MazeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration values cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type used throughout the crate.
pub type MazeResult<T> = Result<T, MazeError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maze configuration constants.
pub mod config {
    /// Seed used when none is given
    pub const DEFAULT_SEED: u64 = 1;

    /// Side length of a cell in world units
    pub const DEFAULT_CELL_SIZE: f64 = 12.0;

    /// Distance kept between the observer and a wall plane
    pub const DEFAULT_WALL_MARGIN: f64 = 1.1;

    /// Radius generated around the occupied cell before collision checks
    pub const DEFAULT_COLLISION_RADIUS: i32 = 2;

    /// Radius generated around the observer every tick
    pub const DEFAULT_GENERATION_RADIUS: i32 = 14;

    /// Radius of the representation window
    pub const DEFAULT_VISIBLE_RADIUS: i32 = 12;

    /// Radius scanned by the minimap
    pub const DEFAULT_MINIMAP_RADIUS: i32 = 10;

    /// Wall height in world units
    pub const DEFAULT_WALL_HEIGHT: f64 = 4.0;

    /// Wall thickness in world units
    pub const DEFAULT_WALL_THICKNESS: f64 = 0.8;
}

//! # Infinimaze Main Entry Point
//!
//! Builds a maze world, lets an automatic observer walk it headlessly for a
//! number of ticks, then prints the minimap and a short summary.

use clap::Parser;
use infinimaze::{
    CellStore, MazeConfig, MazeError, MazeResult, MazeWorld, MinimapLayout, Observer, Wanderer,
};
use log::{info, LevelFilter};
use std::path::PathBuf;
use std::str::FromStr;

/// Command line arguments for the maze demo.
#[derive(Parser, Debug)]
#[command(name = "infinimaze")]
#[command(about = "Walks an infinite seeded maze and prints what it found")]
#[command(version)]
struct Args {
    /// Random seed for maze generation (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2000)]
    steps: usize,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum cells generated per tick
    #[arg(long)]
    budget: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> MazeResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Infinimaze v{}", infinimaze::VERSION);

    let config = load_config(&args)?;
    run_headless(config, args.steps)
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> MazeResult<()> {
    let level = LevelFilter::from_str(log_level)
        .map_err(|_| MazeError::InvalidConfig(format!("unknown log level: {}", log_level)))?;

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .init();

    Ok(())
}

/// Reads the configuration file if given and applies command line overrides.
fn load_config(args: &Args) -> MazeResult<MazeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            MazeConfig::load(path)?
        }
        None => MazeConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.budget.is_some() {
        config.tick_generation_budget = args.budget;
    }
    config.validate()?;
    Ok(config)
}

/// Runs the wanderer for `steps` ticks and prints the result.
fn run_headless(config: MazeConfig, steps: usize) -> MazeResult<()> {
    info!(
        "Generating maze with seed {} (generation radius {}, visible radius {})",
        config.seed, config.generation_radius, config.visible_radius
    );

    let mut world = MazeWorld::new(config)?;
    let mut observer = Observer::default();
    let mut wanderer = Wanderer::default();
    world.prime(&observer);

    let mut created = 0;
    let mut evicted = 0;
    let mut rebuilt = 0;
    for _ in 0..steps {
        let report = wanderer.step(&mut world, &mut observer);
        created += report.window.created.len();
        evicted += report.window.evicted.len();
        rebuilt += report.window.rebuilt.len();
    }

    let store = world.grid().store();
    let visited = store
        .coords()
        .into_iter()
        .filter(|&coord| store.get(coord).is_some_and(|cell| cell.is_visited()))
        .count();
    let snapshot = world.minimap(&observer);

    println!("{}", snapshot.to_ascii());
    println!();
    println!("ticks:           {}", steps);
    println!("observer cell:   {}", snapshot.center);
    println!(
        "position:        ({:.2}, {:.2})",
        observer.position.x, observer.position.z
    );
    println!("cells known:     {}", store.len());
    println!("cells generated: {}", store.generated_count());
    println!("cells visited:   {}", visited);
    println!("representations: {}", world.materializer().len());
    println!(
        "window churn:    +{} / -{} / ~{}",
        created, evicted, rebuilt
    );

    let layout = MinimapLayout::new(220.0, world.config().minimap_radius);
    info!(
        "Minimap layout: {:.1}px per cell, {} cells drawn",
        layout.cell_pixel,
        snapshot.cells.len()
    );

    Ok(())
}

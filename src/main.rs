use std::error::Error;
use std::num::TryFromIntError;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use climatic_region::{ClassificationGrid, ClassificationService, EngineConfig, load_config_from_path};

#[derive(Parser, Debug)]
#[command(name = "climatic", about = "Deterministic region-cached classification")]
struct Args {
    /// Engine config (TOML); built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// World seed, overrides the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Default the log filter to debug (RUST_LOG still wins).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dominant and blended classification of one block.
    Block {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
    },
    /// Dominant classification of one tile.
    Tile {
        #[arg(allow_negative_numbers = true)]
        tile_x: i32,
        #[arg(allow_negative_numbers = true)]
        tile_z: i32,
    },
    /// Print the blended grid of an area.
    Area {
        /// Block x, or tile x with --aligned.
        #[arg(allow_negative_numbers = true)]
        x: i32,
        /// Block z, or tile z with --aligned.
        #[arg(allow_negative_numbers = true)]
        z: i32,
        size_x: usize,
        size_z: usize,
        #[arg(long)]
        aligned: bool,
    },
    /// List the trees of the registry.
    Trees,
    /// Classify a square around the origin and report cache counters.
    Stats {
        #[arg(default_value_t = 1024)]
        size: usize,
    },
}

fn print_grid(grid: &ClassificationGrid) {
    println!(
        "origin ({}, {}) size {}x{}",
        grid.origin_x, grid.origin_z, grid.size_x, grid.size_z
    );
    for row in grid.rows() {
        let line: String = row.iter().map(|id| format!("{:>6}", id.to_string())).collect();
        println!("{line}");
    }
}

/// Block offset that centres a `size` square on the origin.
fn centred_origin(size: usize) -> Result<i32, TryFromIntError> {
    i32::try_from(size / 2).map(|half| -half)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let mut config = match &args.config {
        Some(path) => {
            let config = load_config_from_path(path)?;
            log::info!("loaded config from {}", path.display());
            config
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;
    let service = ClassificationService::from_config(config)?;
    log::debug!(
        "root={} seed={} trees={}",
        service.config().root,
        seed,
        service.registry().names().count()
    );

    match args.command {
        Command::Block { x, z } => {
            println!("dominant {}", service.classify(seed, x, z));
            println!("blended  {}", service.classify_block(seed, x, z));
        }
        Command::Tile { tile_x, tile_z } => {
            println!("{}", service.classify_tile(seed, tile_x, tile_z));
        }
        Command::Area {
            x,
            z,
            size_x,
            size_z,
            aligned,
        } => {
            let grid = if aligned {
                service.classify_area(seed, x, z, size_x, size_z)
            } else {
                service.classify_unaligned_area(seed, x, z, size_x, size_z)
            };
            print_grid(&grid);
        }
        Command::Trees => {
            let root = &service.config().root;
            for name in service.registry().names() {
                let mark = if name == root { " (root)" } else { "" };
                println!("{name}{mark}");
            }
        }
        Command::Stats { size } => {
            let origin = centred_origin(size)?;
            let start = Instant::now();
            let grid = service.classify_unaligned_area(seed, origin, origin, size, size);
            let elapsed = start.elapsed();
            let stats = service.cache_stats();
            println!(
                "classified {} blocks in {:.1} ms",
                grid.ids().len(),
                elapsed.as_secs_f64() * 1000.0
            );
            log::info!(target: "perf", "ms={:.1} area={}x{}", elapsed.as_secs_f64() * 1000.0, size, size);
            println!(
                "hits={} misses={} builds={} evictions={} entries={}",
                stats.hits, stats.misses, stats.builds, stats.evictions, stats.entries
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_origin_rejects_sizes_beyond_i32() {
        assert_eq!(centred_origin(1024), Ok(-512));
        assert_eq!(centred_origin(1), Ok(0));
        assert!(centred_origin(usize::MAX).is_err());
    }
}

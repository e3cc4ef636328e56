use anyhow::{bail, Context, Result};
use clap::Parser;
use herding_core::{builtin_levels, GameStore, LevelConfig, SimConfig, World};
use std::fs;
use std::path::PathBuf;

/// Runs herding levels headless and prints sampled metrics as JSON.
#[derive(Parser, Debug)]
#[command(name = "herding", version, about)]
struct Args {
    /// Built-in level number (1-based). Ignored when --level-file is given.
    #[arg(long, default_value_t = 1)]
    level: usize,

    /// Path to a level definition JSON file.
    #[arg(long)]
    level_file: Option<PathBuf>,

    /// Path to a simulation config JSON file; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Helper dogs spawned next to the shepherd.
    #[arg(long, default_value_t = 0)]
    dogs: usize,

    /// Fixed-delta ticks to simulate.
    #[arg(long, default_value_t = 3600)]
    steps: usize,

    /// Tick delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Sample metrics every N ticks.
    #[arg(long, default_value_t = 60)]
    sample_every: usize,

    /// Park the shepherd on the goal center so attentive sheep drift in.
    #[arg(long)]
    drive_to_goal: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<SimConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    config.seed = args.seed;

    let level = match &args.level_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading level {}", path.display()))?;
            LevelConfig::from_json(&text)
                .with_context(|| format!("parsing level {}", path.display()))?
        }
        None => {
            let levels = builtin_levels();
            if args.level == 0 || args.level > levels.len() {
                bail!("level must be 1..={}", levels.len());
            }
            levels[args.level - 1].clone()
        }
    };

    let mut world = World::try_new(config, GameStore::default())?;
    world.load_level(&level);
    for _ in 0..args.dogs {
        world.spawn_dog();
    }
    if args.drive_to_goal {
        let goal_center = world.goal().center();
        world.set_shepherd_target(Some(goal_center));
    }

    let summary = world.try_run_headless(args.steps, args.dt, args.sample_every)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

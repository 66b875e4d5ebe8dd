mod bot;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use rooftop_city::{City, CityPiece, PieceKind};
use rooftop_common::Aabb;
use rooftop_input::InputFrame;
use rooftop_kernel::{GameConfig, GameWorld};
use rooftop_render::{CameraMode, DebugTextRenderer, RenderView, Renderer};
use rooftop_tools::GameInspector;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::bot::AimBot;

#[derive(Parser)]
#[command(name = "rooftop-cli", about = "Headless tooling for Rooftop Gallery")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a city and report its contents
    City {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Dump every piece as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Play a headless round with an aim bot
    Simulate {
        #[arg(short, long)]
        seed: Option<u64>,
        /// Simulated round length
        #[arg(long, default_value = "60")]
        seconds: f32,
        /// Game configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the final frame as text
        #[arg(long)]
        frame: bool,
    },
    /// Record a scripted input log, replay it and compare state hashes
    Replay {
        #[arg(short, long, default_value = "42")]
        seed: u64,
        #[arg(short, long, default_value = "600")]
        ticks: usize,
    },
    /// Print or validate game configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default configuration as YAML
    Default,
    /// Validate a configuration file
    Check { path: PathBuf },
}

#[derive(Serialize)]
struct CityDump<'a> {
    seed: u64,
    bounds: Aabb,
    spawn_point: Vec3,
    target_anchors: &'a [Vec3],
    pieces: &'a [CityPiece],
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Deterministic input log: walk back and forth, hop, sweep the view, fire in bursts.
fn scripted_frames(ticks: usize) -> Vec<InputFrame> {
    (0..ticks)
        .map(|i| InputFrame {
            move_axis: Vec2::new(if i % 240 < 120 { 0.0 } else { 0.5 }, if i % 160 < 80 { 1.0 } else { -1.0 }),
            run: i % 300 > 200,
            jump: i % 110 == 0,
            fire: i % 45 < 12,
            look_delta: Vec2::new(((i % 64) as f32 - 32.0) * 0.4, ((i % 40) as f32 - 20.0) * 0.15),
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("rooftop-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", rooftop_common::crate_info());
            println!("city: {}", rooftop_city::crate_info());
            println!("input: {}", rooftop_input::crate_info());
            println!("kernel: {}", rooftop_kernel::crate_info());
            println!("assets: {}", rooftop_assets::crate_info());
            println!("render: {}", rooftop_render::crate_info());
            println!("tools: {}", rooftop_tools::crate_info());
        }
        Commands::City { seed, json } => {
            let config = GameConfig::default().city;
            let city = City::generate(&config, seed)?;
            if json {
                let dump = CityDump {
                    seed,
                    bounds: city.bounds,
                    spawn_point: city.spawn_point,
                    target_anchors: &city.target_anchors,
                    pieces: &city.pieces,
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!("City seed={seed} ({}x{} blocks)", config.blocks_x, config.blocks_z);
                for kind in PieceKind::ALL {
                    println!("  {:<9} {}", kind.name(), city.count(kind));
                }
                let size = city.bounds.size();
                println!("  extent    {:.1} x {:.1} x {:.1} m", size.x, size.y, size.z);
                println!("  anchors   {}", city.target_anchors.len());
                println!(
                    "  grid      {} cells, {} placements",
                    city.grid.cell_count(),
                    city.grid.total_placements()
                );
            }
        }
        Commands::Simulate {
            seed,
            seconds,
            config,
            frame,
        } => {
            let config = load_config(config.as_deref(), seed)?;
            let ticks = (seconds / config.tick_rate).round() as u64;
            let mut world = GameWorld::new(config)?;
            let bot = AimBot;

            println!("Simulating {ticks} ticks ({seconds:.0}s) seed={}", world.seed());
            for _ in 0..ticks {
                let input = bot.frame(&world);
                world.step(&input);
                for event in world.drain_events() {
                    tracing::debug!(tick = world.tick(), ?event, "game event");
                }
            }
            println!("{}", GameInspector::summary(&world));
            if frame {
                let view = RenderView::for_avatar(&world, CameraMode::FirstPerson);
                print!("{}", DebugTextRenderer { verbose: true }.render(&world, &view));
            }
        }
        Commands::Replay { seed, ticks } => {
            let config = load_config(None, Some(seed))?;
            let frames = scripted_frames(ticks);
            println!("Deterministic replay: seed={seed}, ticks={ticks}");

            let mut live = GameWorld::new(config.clone())?;
            for input in &frames {
                live.step(input);
            }
            let replayed = GameWorld::replay(config, &frames)?;

            let (a, b) = (live.state_hash(), replayed.state_hash());
            println!("Live:   tick={} score={} hash={a:#018x}", live.tick(), live.stats().score);
            println!("Replay: tick={} score={} hash={b:#018x}", replayed.tick(), replayed.stats().score);
            if a != b {
                bail!("replay diverged from the live run");
            }
            println!("Match: OK");
        }
        Commands::Config { action } => match action {
            ConfigAction::Default => print!("{}", GameConfig::default().to_yaml()?),
            ConfigAction::Check { path } => {
                let config = GameConfig::load(&path)?;
                println!(
                    "{}: OK (seed={}, {}x{} blocks, {} targets)",
                    path.display(),
                    config.seed,
                    config.city.blocks_x,
                    config.city.blocks_z,
                    config.targets.count
                );
            }
        },
    }

    Ok(())
}

//! # Ragdoll CLI
//!
//! Entry point for headless rollouts and checkpoint inspection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use phenotype::Topology;
use rl::{AgentConfig, BodySchema, Mode};
use tracing_subscriber::EnvFilter;

use ragdoll::catalog::{Catalog, TrainingStatus};
use ragdoll::rollout::{self, RandomPolicy};
use ragdoll::scene;
use ragdoll::selector::ModelSelector;

/// Ragdoll locomotion environments.
#[derive(Debug, Parser)]
#[command(name = "ragdoll", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run episodes with a random policy.
    Rollout(RolloutArgs),
    /// List trained checkpoints in step order.
    Checkpoints(CheckpointsArgs),
    /// Print observation and action layout of a character.
    Topology(TopologyArgs),
}

#[derive(Debug, Args)]
struct CharacterArgs {
    /// Built-in character: duck-rabbit or chair.
    #[arg(long, default_value = "duck-rabbit")]
    character: String,

    /// Topology JSON file, used instead of a built-in character.
    #[arg(long, value_name = "FILE")]
    topology: Option<PathBuf>,
}

impl CharacterArgs {
    fn load(&self) -> Result<Topology> {
        match &self.topology {
            Some(path) => Topology::load(path),
            None => Topology::builtin(&self.character),
        }
    }
}

#[derive(Debug, Args)]
struct RolloutArgs {
    #[command(flatten)]
    character: CharacterArgs,

    /// walk, getup or climb.
    #[arg(long, default_value = "walk")]
    mode: Mode,

    #[arg(long, default_value_t = 3)]
    episodes: u32,

    /// Step cap per episode.
    #[arg(long, default_value_t = 1000)]
    max_steps: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Agent configuration JSON. Its mode overrides `--mode`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckpointsArgs {
    /// Trainer status file (training_status.json).
    #[arg(long, value_name = "FILE", conflicts_with = "dir")]
    status: Option<PathBuf>,

    /// Directory to scan for *.onnx files instead.
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    #[arg(long, default_value = "DuckRabbit")]
    behaviour: String,

    /// Slider position in [0, 1] picking the current checkpoint.
    #[arg(long)]
    slider: Option<f32>,
}

#[derive(Debug, Args)]
struct TopologyArgs {
    #[command(flatten)]
    character: CharacterArgs,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Rollout(args) => run_rollout(&args),
        Command::Checkpoints(args) => list_checkpoints(&args),
        Command::Topology(args) => print_topology(&args),
    }
}

fn run_rollout(args: &RolloutArgs) -> Result<()> {
    let topology = args.character.load()?;
    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => AgentConfig::new(args.mode, topology.max_walking_speed),
    };
    config.max_steps = args.max_steps;
    config.seed = args.seed;

    let mut env = scene::build_env(&topology, config)?;
    let mut policy = RandomPolicy::new(args.seed.wrapping_add(1));
    let summaries = rollout::run(&mut env, &mut policy, args.episodes, args.max_steps)?;

    for summary in &summaries {
        let cause = summary
            .termination
            .map_or_else(|| "budget".to_owned(), |t| format!("{t:?}"));
        println!(
            "episode {:>3}  steps {:>5}  return {:>10.4}  end {cause}",
            summary.episode, summary.steps, summary.total_reward
        );
    }
    Ok(())
}

fn list_checkpoints(args: &CheckpointsArgs) -> Result<()> {
    let catalog = match (&args.status, &args.dir) {
        (Some(status_path), _) => {
            let status = TrainingStatus::load(status_path)?;
            let base = status_path.parent().unwrap_or_else(|| Path::new("."));
            Catalog::from_training_status(&status, &args.behaviour, base)?
        }
        (None, Some(dir)) => Catalog::discover(dir)?,
        (None, None) => anyhow::bail!("pass --status or --dir"),
    };

    let mut selector = ModelSelector::new(catalog);
    if let Some(value) = args.slider {
        selector.select_by_slider(value);
    }

    for (index, entry) in selector.catalog().iter().enumerate() {
        let marker = if index == selector.current_index() { '*' } else { ' ' };
        let reward = entry.reward.map_or_else(|| "-".to_owned(), |r| format!("{r:.3}"));
        println!("{marker} {index:>3}  {:>10}  reward {reward:>9}  {}", entry.number, entry.path.display());
    }
    if selector.catalog().is_empty() {
        println!("no checkpoints found");
    }
    Ok(())
}

fn print_topology(args: &TopologyArgs) -> Result<()> {
    let topology = args.character.load()?;
    let registry = topology.build_registry()?;
    let schema = BodySchema::compile(&topology, &registry)?;

    println!("{} ({} parts, root {})", schema.name, schema.parts.len(), topology.root);
    for mode in [Mode::Walk, Mode::Getup, Mode::Climb] {
        println!("  observation {mode:?}: {}", schema.observation_size(mode));
    }
    println!(
        "  action: {} ({} rotation + {} strength)",
        schema.action_size(),
        schema.rotation_slots(),
        schema.strength_slots()
    );

    let mut slot = 0;
    for joint in &schema.joints {
        let axes: Vec<String> = joint.axes.iter().map(|a| format!("{a:?}").to_lowercase()).collect();
        println!("  [{slot:>2}..{:>2}) {} {}", slot + axes.len(), joint.name, axes.join(""));
        slot += axes.len();
    }
    for joint in &schema.joints {
        println!("  [{slot:>2}]     {} strength", joint.name);
        slot += 1;
    }
    Ok(())
}

//! Playbook CLI
//!
//! Wire-file inspection, headless playback, cache maintenance, and remote
//! store operations.

mod headless;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pb_client::{ClientConfig, PlayApi};
use pb_core::{from_wire, ActorRoster, PlayCache, PlayGateway, WirePlay};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pb_cli")]
#[command(about = "Inspect, simulate, and sync tactics-board plays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a wire-format play file
    Inspect {
        /// Input wire JSON file
        #[arg(long)]
        file: PathBuf,
    },

    /// Run a wire-format play headlessly and print actor trajectories
    Simulate {
        /// Input wire JSON file
        #[arg(long)]
        file: PathBuf,

        /// Tracked player count (the ball is always tracked)
        #[arg(long, default_value = "5")]
        players: u32,

        /// Scheduler ticks per second
        #[arg(long, default_value = "60")]
        fps: u32,
    },

    /// Show what the local cache holds for one play id
    CacheStat {
        /// Cache directory
        #[arg(long)]
        dir: PathBuf,

        /// Play id
        #[arg(long)]
        id: i64,
    },

    /// Remove every cached play
    CacheClear {
        /// Cache directory
        #[arg(long)]
        dir: PathBuf,
    },

    /// List a team's plays on the remote store
    List {
        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        token: Option<String>,

        /// Team id
        #[arg(long)]
        team: i64,
    },

    /// Download one play into a wire JSON file
    Fetch {
        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        token: Option<String>,

        /// Play id
        #[arg(long)]
        id: i64,

        /// Output wire JSON file
        #[arg(long)]
        out: PathBuf,
    },

    /// Upload a wire JSON file as a new play
    Push {
        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        token: Option<String>,

        /// Team id
        #[arg(long)]
        team: i64,

        /// Play name
        #[arg(long)]
        name: String,

        /// Input wire JSON file
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Simulate { file, players, fps } => simulate(&file, players, fps),
        Commands::CacheStat { dir, id } => cache_stat(&dir, id),
        Commands::CacheClear { dir } => cache_clear(&dir),
        Commands::List { base_url, token, team } => list(base_url, token, team).await,
        Commands::Fetch { base_url, token, id, out } => fetch(base_url, token, id, &out).await,
        Commands::Push { base_url, token, team, name, file } => {
            push(base_url, token, team, &name, &file).await
        }
    }
}

fn read_wire_file(path: &Path) -> Result<WirePlay> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("{} is not a wire-format play", path.display()))
}

fn api(base_url: Option<String>, token: Option<String>) -> Result<PlayApi> {
    let mut config = ClientConfig::default();
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    config.auth_token = token;
    PlayApi::new(&config).map_err(|err| anyhow::anyhow!(err.user_message()))
}

fn inspect(file: &Path) -> Result<()> {
    let wire = read_wire_file(file)?;
    let Some(play) = from_wire(&wire) else {
        bail!("{} holds no steps", file.display());
    };

    println!("{}", file.display());
    println!("  steps:    {}", play.step_count());
    println!("  playable: {}", play.has_playable_content());
    for (index, step) in play.steps().iter().enumerate() {
        let blocks = step.block_flags.values().filter(|b| **b).count();
        println!(
            "  step {:>2}: duration {:.2}s, {} actors, {} blocking",
            index,
            step.duration,
            step.positions.len(),
            blocks
        );
    }
    Ok(())
}

fn simulate(file: &Path, players: u32, fps: u32) -> Result<()> {
    if fps == 0 {
        bail!("--fps must be at least 1");
    }
    let wire = read_wire_file(file)?;
    let Some(play) = from_wire(&wire) else {
        bail!("{} holds no steps", file.display());
    };

    let roster = ActorRoster::new(players);
    headless::run(&play, &roster, fps)
}

fn cache_stat(dir: &Path, id: i64) -> Result<()> {
    let cache = PlayCache::new(dir);
    if !cache.exists(id) {
        println!("play {}: not cached", id);
        return Ok(());
    }

    match cache.try_load(id) {
        Some(wire) => println!("play {}: {} steps cached", id, wire.steps.len()),
        None => println!("play {}: cache entry unreadable", id),
    }
    Ok(())
}

fn cache_clear(dir: &Path) -> Result<()> {
    PlayCache::new(dir)
        .clear_all()
        .context("Failed to clear play cache")?;
    println!("cache cleared: {}", dir.display());
    Ok(())
}

async fn list(base_url: Option<String>, token: Option<String>, team: i64) -> Result<()> {
    let api = api(base_url, token)?;
    let summaries = api
        .list(team)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    if summaries.is_empty() {
        println!("team {} has no plays", team);
        return Ok(());
    }
    for summary in summaries {
        println!("{:>6}  {:<32} {}", summary.id, summary.name, summary.created_at);
    }
    Ok(())
}

async fn fetch(
    base_url: Option<String>,
    token: Option<String>,
    id: i64,
    out: &Path,
) -> Result<()> {
    let api = api(base_url, token)?;
    let detail = api
        .fetch(id)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    let json = serde_json::to_string_pretty(&detail.data)?;
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "fetched play {} ({}, {} steps) -> {}",
        detail.id,
        detail.name,
        detail.data.steps.len(),
        out.display()
    );
    Ok(())
}

async fn push(
    base_url: Option<String>,
    token: Option<String>,
    team: i64,
    name: &str,
    file: &Path,
) -> Result<()> {
    let wire = read_wire_file(file)?;
    let api = api(base_url, token)?;
    let detail = api
        .create(team, name, &wire)
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    println!("uploaded play {} (ID: {})", detail.name, detail.id);
    Ok(())
}

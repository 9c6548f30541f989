//! # Simulator
//!
//! A headless host for the module core. It plays the part of the game client: loads persisted
//! module state, joins a world, enables the auto clicker, holds the attack button for a number of
//! ticks, disconnects and writes the state back.
//!
//! HUD notifications are drained once per tick and logged, the way a render thread would pick
//! them up.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use hotbar::Client;
use hotbar::domain::config::HostConfig;
use hotbar::domain::events::{Notification, PlayerInfo, WorldInfo};
use hotbar::domain::input::{CrosshairTarget, InputState};
use hotbar::events::EventReceiverExt;
use hotbar::features::autoclicker::NAME;
use hotbar::kernel::config::load_config;
use hotbar::kernel::registry::ModuleSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Parser)]
#[command(name = "hotbar-sim", version, about = "Drive the module core through a scripted session")]
pub struct Args {
    /// Ticks to simulate while attack is held.
    #[arg(long, default_value_t = 200)]
    pub ticks: u64,

    /// Host configuration file; built-in defaults apply when omitted.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Module state file (JSON). Loaded on start when present, written on exit.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Seed for the modules' random sources.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Log directory; overrides `[logging] directory`.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// What the crosshair points at while attacking.
    #[arg(long, value_enum, default_value_t = Target::Entity)]
    pub target: Target,

    /// Play in creative mode.
    #[arg(long)]
    pub creative: bool,

    /// Pace ticks at the configured rate instead of running flat out.
    #[arg(long)]
    pub realtime: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    None,
    Block,
    Entity,
}

impl From<Target> for CrosshairTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::None => Self::None,
            Target::Block => Self::Block,
            Target::Entity => Self::Entity,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub ticks: u64,
    pub clicks: u32,
    /// Rendered HUD notifications, in publication order.
    pub notifications: Vec<String>,
}

/// Reads the host configuration named by `--config`, or the defaults.
pub fn host_config(args: &Args) -> anyhow::Result<HostConfig> {
    match &args.config {
        Some(path) => load_config(Some(path))
            .with_context(|| format!("Configuration at {} is malformed", path.display())),
        None => Ok(HostConfig::default()),
    }
}

/// Plays the scripted session.
pub async fn run(args: &Args, config: &HostConfig) -> anyhow::Result<Summary> {
    let mut client = Client::init(config, args.seed)?;
    if let Some(path) = args.state.as_deref().filter(|path| path.exists()) {
        client.load(&read_state(path)?)?;
    }
    let mut notifications = client.subscribe::<Notification>()?;
    let mut summary = Summary::default();

    client.join_world(WorldInfo::new("overworld"), PlayerInfo::new("player").creative(args.creative))?;
    let enabled = client.modules().get(NAME).is_some_and(|module| module.state().enabled);
    if !enabled {
        client.set_enabled(NAME, true)?;
    }
    client.set_input(InputState { attack_pressed: true, use_pressed: false, crosshair: args.target.into() })?;

    let mut pace = tokio::time::interval(Duration::from_secs(1) / config.tick.rate_hz);
    for _ in 0..args.ticks {
        if args.realtime {
            pace.tick().await;
        }
        let report = client.tick()?;
        if report.clicks() > 0 {
            debug!(tick = report.tick, clicks = report.clicks(), "Clicked");
        }
        summary.ticks = report.tick;
        summary.clicks += report.clicks();
        collect(notifications.drain(), &mut summary);
    }

    client.set_input(InputState::default())?;
    client.disconnect()?;
    let snapshots = client.shutdown()?;
    collect(notifications.drain(), &mut summary);

    if let Some(path) = &args.state {
        write_state(path, &snapshots)?;
    }
    info!(ticks = summary.ticks, clicks = summary.clicks, "Session finished");
    Ok(summary)
}

fn collect(drained: Vec<Arc<Notification>>, summary: &mut Summary) {
    for notification in drained {
        info!(target: "hotbar::hud", "{notification}");
        summary.notifications.push(notification.to_string());
    }
}

fn read_state(path: &Path) -> anyhow::Result<Vec<ModuleSnapshot>> {
    let raw = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parsing module state in {}", path.display()))
}

fn write_state(path: &Path, snapshots: &[ModuleSnapshot]) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(snapshots)?;
    fs::write(path, raw).with_context(|| format!("Writing {}", path.display()))?;
    debug!(path = %path.display(), modules = snapshots.len(), "Module state saved");
    Ok(())
}

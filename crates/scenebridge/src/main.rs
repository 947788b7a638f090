//! sacn-ledfx-bridge
//!
//! Watches one DMX channel of an sACN universe and switches LedFx scenes
//! according to its value.

mod app;
mod cli;
mod display;
mod logging_setup;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use scenebridge_control::{LedFxClient, ReceiverConfig, SacnReceiver};
use scenebridge_core::{BridgeConfig, SceneMap};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{info, warn};

use cli::Cli;
use display::{HeadlessView, TerminalPanel};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BridgeConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let panel = !cli.daemon && !cli.list_scenes && std::io::stdout().is_terminal();
    apply_cli_overrides(&mut config, &cli, panel);
    let _log_guard = logging_setup::init(&config.log)?;

    info!("Starting sacn-ledfx-bridge {}", env!("CARGO_PKG_VERSION"));
    if !cli.config.exists() {
        warn!("Config file {:?} not found, running with defaults", cli.config);
    }

    if cli.list_scenes {
        return list_scenes(&config).await;
    }

    let mut receiver_config = ReceiverConfig::new(vec![config.universe]);
    if let Some(interface) = cli.interface {
        receiver_config = receiver_config.with_interface(interface);
    }
    let receiver = SacnReceiver::bind(receiver_config)
        .await
        .context("Failed to start sACN receiver")?;

    let (quit_tx, quit_rx) = unbounded_channel();

    if panel {
        let log_file = config
            .log
            .file_output
            .then(|| config.log.current_log_path());
        let mut view = TerminalPanel::new(config.universe, config.channel, log_file)
            .context("Failed to initialize terminal")?;
        display::spawn_input_task(quit_tx);
        app::run(config, receiver, &mut view, quit_rx).await
    } else {
        spawn_signal_task(quit_tx);
        app::run(config, receiver, &mut HeadlessView::default(), quit_rx).await
    }
}

/// Fold command line flags into the loaded configuration
fn apply_cli_overrides(config: &mut BridgeConfig, cli: &Cli, panel: bool) {
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if panel {
        config.log.disable_console();
    }
}

async fn list_scenes(config: &BridgeConfig) -> Result<()> {
    let client = LedFxClient::from_config(config).context("Invalid LedFx address")?;
    let scenes = client
        .list_scenes()
        .await
        .with_context(|| format!("Failed to fetch scenes from {}", client.base_url()))?;

    if scenes.is_empty() {
        println!("No scenes defined in LedFx.");
    }
    for (i, id) in scenes.iter().enumerate() {
        println!("{}. {}", i + 1, id);
    }

    let map = SceneMap::from_config(config);
    for (i, name) in map.scenes().iter().enumerate() {
        if !scenes.contains(name) {
            println!(
                "Warning: value {} maps to '{}', which LedFx does not define",
                i + 1,
                name
            );
        }
    }
    Ok(())
}

fn spawn_signal_task(quit_tx: UnboundedSender<()>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = quit_tx.send(());
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}

//! Engine binary for the Idlestead kernel.
//!
//! This is the main entry point that wires together content, the save
//! file, the production scheduler, the battle ticker, and auto-save. It
//! runs until Ctrl-C (or the configured tick limit) and saves on the way
//! out.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `idlestead-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load content tables (built-in or YAML)
//! 4. Warn about protected nodes that can never be damaged
//! 5. Restore the save, or start a new game
//! 6. Apply offline progress and register today's login
//! 7. Start the battle ticker and auto-save timers
//! 8. Run the scheduler until stopped
//! 9. Stop timers, write the final save, and log the result

mod error;
mod progress_log;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use idlestead_core::config::{KernelConfig, LoggingConfig};
use idlestead_core::control::SchedulerControl;
use idlestead_core::game::Game;
use idlestead_core::runner::{self, TimerHandle};
use idlestead_save::{FileSaveStore, SaveStore};
use idlestead_world::{ContentTables, EncounterGraph};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress_log::ProgressLog;

/// Config file looked up relative to the working directory.
const CONFIG_PATH: &str = "idlestead-config.yaml";

/// Ticks between full progress lines.
const PROGRESS_EVERY: u64 = 60;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any startup step fails, or if the final save
/// cannot be written.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await?;
    Ok(())
}

/// Run the full startup, scheduler, and shutdown sequence.
#[allow(clippy::too_many_lines)]
async fn run() -> Result<(), EngineError> {
    // 1. Load configuration.
    let (config, from_file) = load_config(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("idlestead-engine starting");
    if !from_file {
        info!(path = CONFIG_PATH, "Config file not found, using defaults");
    }
    info!(
        tick_ms = config.timing.tick_ms,
        speed = ?config.timing.speed,
        battle_tick_ms = config.timing.battle_tick_ms,
        autosave_secs = config.timing.autosave_secs,
        save_path = %config.persistence.save_path,
        "Configuration loaded"
    );

    // 3. Load content tables.
    let content = Arc::new(load_content(&config)?);
    info!(
        maps = content.maps.len(),
        world_nodes = content.world_nodes.len(),
        buildings = content.buildings.len(),
        research = content.research.len(),
        "Content loaded"
    );

    // 4. Stranded protected nodes.
    report_stranded_nodes(&content);

    // 5. Restore or create the game. An unreadable save stops startup so
    //    the first auto-save cannot overwrite it.
    let store = Arc::new(FileSaveStore::new(&config.persistence.save_path));
    let now = Utc::now();
    let mut game = match store.load().await? {
        Some(payload) => {
            info!(
                saved_at = %payload.meta.saved_at,
                playtime_secs = payload.meta.playtime_secs,
                "Save found"
            );
            Game::restore(Arc::clone(&content), &config, &payload)?
        }
        None => {
            info!("No save found, starting a new game");
            Game::new(Arc::clone(&content), &config, now)?
        }
    };

    // 6. Offline progress.
    let offline = game.apply_offline_progress(now);
    info!(
        seconds = offline.seconds,
        resources = offline.produced.len(),
        "Offline progress credited"
    );
    let login = game.check_login(now.date_naive());
    info!(
        new_day = login.new_day,
        streak = game.daily().login_streak(),
        streak_reset = login.streak_reset,
        "Login checked"
    );

    let game = Arc::new(Mutex::new(game));
    let control = Arc::new(SchedulerControl::new(&config.timing));

    // 7. Timers.
    let mut timers: Vec<TimerHandle> = Vec::new();
    if config.timing.battle_tick_ms > 0 {
        timers.push(runner::start_battle_ticker(
            Arc::clone(&game),
            Duration::from_millis(config.timing.battle_tick_ms),
        ));
    }
    if config.timing.autosave_secs > 0 {
        timers.push(runner::start_autosave(
            Arc::clone(&game),
            Arc::clone(&control),
            Arc::clone(&store),
            Duration::from_secs(config.timing.autosave_secs),
        ));
    } else {
        info!("Auto-save disabled");
    }
    spawn_shutdown_listener(Arc::clone(&control));
    info!(timers = timers.len(), "Timers started, entering scheduler");

    // 8. Run the scheduler.
    let mut callback = ProgressLog::new(PROGRESS_EVERY);
    let result = runner::run_scheduler(&game, &control, &mut callback).await?;

    // 9. Shut down.
    control.request_stop();
    for timer in timers {
        timer.join().await;
    }
    runner::save_now(&game, &control, store.as_ref()).await?;
    info!(path = %store.path().display(), "Final save written");

    runner::log_scheduler_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "idlestead-engine shutdown complete"
    );

    Ok(())
}

/// Load the kernel configuration from `path`.
///
/// Returns the config and whether it came from the file.
fn load_config(path: &Path) -> Result<(KernelConfig, bool), EngineError> {
    if path.exists() {
        let config = KernelConfig::from_file(path)?;
        Ok((config, true))
    } else {
        let mut config = KernelConfig::default();
        config.persistence.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Built-in content, or the YAML file named by `persistence.content_path`.
fn load_content(config: &KernelConfig) -> Result<ContentTables, EngineError> {
    match config.persistence.content_path {
        Some(ref path) => {
            info!(path = %path, "Loading content from file");
            Ok(ContentTables::from_file(Path::new(path))?)
        }
        None => Ok(ContentTables::builtin()),
    }
}

/// Warn once per map about protected nodes no clear order can unlock.
fn report_stranded_nodes(content: &ContentTables) {
    for map in &content.maps {
        let stranded = EncounterGraph::new(map).stranded_protected_nodes();
        if !stranded.is_empty() {
            warn!(
                map_id = %map.id,
                nodes = ?stranded,
                "protected nodes can never be damaged on this map"
            );
        }
    }
}

/// Request a stop on Ctrl-C.
fn spawn_shutdown_listener(control: Arc<SchedulerControl>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                control.request_stop();
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for Ctrl-C, run until the tick limit");
            }
        }
    });
}

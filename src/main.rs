mod audio;
mod config;
mod controller;
mod indicator;
mod input;
mod logging;
mod model;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use audio::RodioBackend;
use config::Config;
use controller::{Jukebox, Timing};
use indicator::{IndicatorDriver, LogIndicator};
use model::{CreditLedger, TrackCatalog};

// All timed activities suspend on the single-threaded runtime; the
// coordinator is the only writer of playback and credit state.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Jukebox Starting ===");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "jukebox.json".to_string());
    let config = Config::load(Path::new(&config_path))?;
    tracing::info!(
        music_directory = %config.music_directory.display(),
        free_play = config.free_play,
        "configuration loaded"
    );
    tracing::info!(
        coin_pin = config.coin_pin,
        "coin acceptor configured (line protocol stands in for GPIO on this build)"
    );

    // No output device at startup is fatal.
    let backend = RodioBackend::new()?;

    let catalog = TrackCatalog::new(config.music_directory.clone());
    let ledger = CreditLedger::new(config.free_play);
    let indicator: Arc<dyn IndicatorDriver> =
        Arc::new(LogIndicator::new(config.indicator_color.clone()));
    let timing = Timing {
        poll_interval: config.poll_interval(),
        credit_pulse: config.credit_pulse(),
    };

    let (jukebox, handle) = Jukebox::new(Box::new(backend), catalog, ledger, indicator, timing);

    input::spawn_input_task(handle);

    let result = jukebox.run().await;

    if let Err(err) = &result {
        tracing::error!(error = ?err, "jukebox terminated");
    }
    tracing::info!("Jukebox shut down");
    result
}

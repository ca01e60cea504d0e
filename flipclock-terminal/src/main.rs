/// Flipclock Terminal - 3D flip clock rendered as ASCII
///
/// Controls:
///   - Up/Down: Spin the clock (in config mode: change digit style)
///   - Enter/Space: Cycle solid / x-ray / wireframe
///   - Tab: Enter or leave config mode
///   - P/T/Z: Punch, twist and shake taps
///   - WASD / Left/Right: Tilt the simulated accelerometer, R levels it
///   - N: Switch the simulated accelerometer off and on
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use flipclock_core::{DigitSkin, World, WorldConfig};
use flipclock_terminal::{FileSettingsStore, TerminalApp};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "flipclock-terminal", version, about = "3D flip clock in the terminal")]
struct Args {
    /// Settings file, created on exit if missing
    #[arg(long, default_value = "flipclock.conf")]
    settings: PathBuf,

    #[arg(long, default_value_t = 1.25)]
    zoom: f32,

    /// World updates per digit flip
    #[arg(long, default_value_t = 50)]
    flip_steps: usize,

    /// Digit style: segment, curvy or pixel
    #[arg(long, default_value_t = DigitSkin::Curvy)]
    skin: DigitSkin,

    /// World update interval in milliseconds
    #[arg(long, default_value_t = 35)]
    update_ms: u64,

    /// Frame interval in milliseconds
    #[arg(long, default_value_t = 33)]
    frame_ms: u64,

    /// Seconds without input before exiting, 0 to never exit
    #[arg(long, default_value_t = 90)]
    inactivity_limit: u32,

    /// Log output file; the terminal itself is busy drawing
    #[arg(long, default_value = "flipclock.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = WorldConfig {
        update_interval: Duration::from_millis(args.update_ms),
        flip_steps: args.flip_steps,
        zoom: args.zoom,
        user_inactivity_limit: args.inactivity_limit,
        skin: args.skin,
        ..WorldConfig::default()
    };

    let store = FileSettingsStore::open(&args.settings).unwrap_or_else(|err| {
        log::warn!("{}; starting from default settings", err);
        FileSettingsStore::empty(&args.settings)
    });

    let world = World::initialize(config, &store).context("initializing clock world")?;

    // Run the terminal app
    let app = TerminalApp::new(world, store, Duration::from_millis(args.frame_ms))?;
    app.run()?;

    log::info!("Exited cleanly");
    Ok(())
}

use ::rand as external_rand;
use clap::Parser;
use external_rand::rngs::StdRng;
use external_rand::SeedableRng;
use tracing_subscriber::EnvFilter;

mod cell;
mod colony;
mod config;
mod error;
mod food;
mod simulation;
mod types;

use config::*;
use simulation::Simulation;

#[cfg(feature = "ui")]
mod controls;
#[cfg(feature = "ui")]
mod visualization;

mod api;

#[cfg(feature = "ui")]
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in headless mode (HTTP API server)
    #[arg(long)]
    headless: bool,

    /// Port for headless API server
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Configuration file path (YAML or JSON). If not specified, searches for config.yaml, config.yml, or config.json in current directory.
    #[arg(short, long)]
    config: Option<String>,

    /// Seed for the branching random stream; overrides the config file
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Load configuration from file or use default
fn load_config(args: &Args) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = if let Some(path) = args.config.as_deref() {
        // User specified a config file
        SimulationConfig::from_file(path)
            .map_err(|e| format!("Failed to load config from {}: {}", path, e))?
    } else {
        // Try default paths
        SimulationConfig::from_default_paths()
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn make_rng(config: &SimulationConfig) -> StdRng {
    match config.seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded random stream");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

#[cfg(not(feature = "ui"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Headless mode only
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;
    headless_main(args.port, config).await
}

#[cfg(feature = "ui")]
#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();
    let args = Args::parse();

    // Load configuration
    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    if args.headless {
        // Run headless mode even with UI feature enabled
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Error starting runtime: {}", e);
                std::process::exit(1);
            }
        };
        rt.block_on(async {
            if let Err(e) = headless_main(args.port, config).await {
                tracing::error!("Error running headless mode: {}", e);
                std::process::exit(1);
            }
        });
    } else {
        // Run UI mode
        ui_main(config).await;
    }
}

#[cfg(feature = "ui")]
async fn ui_main(config: SimulationConfig) {
    use controls::handle_controls;
    use visualization::{draw_colonies, draw_food, draw_stats_and_help};

    let mut rng = make_rng(&config);
    let tick_interval = config.tick_interval_ms.max(1) as f32 / 1000.0;
    let mut sim = Simulation::with_config(config);
    let mut since_last_tick = 0.0f32;

    loop {
        let requests = handle_controls(&mut sim);

        clear_background(BLACK);

        // Ticks are paced by wall time; the speed multiplier scales how many
        // run per elapsed interval
        since_last_tick += get_frame_time();
        while since_last_tick >= tick_interval {
            since_last_tick -= tick_interval;
            sim.advance(&mut rng);
        }
        if sim.paused || sim.is_complete() {
            since_last_tick = 0.0;
        }

        draw_colonies(&sim.colonies);
        draw_food(&sim.food);

        draw_stats_and_help(&sim.stats(), sim.paused, sim.speed_multiplier, sim.is_complete());

        if requests.screenshot {
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let filename = format!("slimemold_screenshot_{}.png", timestamp);

            match capture_screenshot(&filename) {
                Ok(_) => tracing::info!(file = %filename, "screenshot saved"),
                Err(e) => tracing::error!(file = %filename, "failed to save screenshot: {}", e),
            }
        }

        next_frame().await;
    }
}

#[cfg(feature = "ui")]
fn window_conf() -> Conf {
    // Try to load config to set window size, fall back to defaults if not available
    let config = SimulationConfig::from_default_paths();

    Conf {
        window_title: "Slime Mold Model".to_owned(),
        window_width: config.view_width as i32,
        window_height: config.view_height as i32,
        ..Default::default()
    }
}

#[cfg(feature = "ui")]
/// Capture a screenshot of the current screen
fn capture_screenshot(filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    // RGBA bytes, row by row, origin at the bottom-left
    let screen_image = get_screen_data();

    let width = screen_image.width as u32;
    let height = screen_image.height as u32;
    let bytes = &screen_image.bytes;

    let mut img = image::RgbaImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize * 4;
            if idx + 3 < bytes.len() {
                let pixel = [bytes[idx], bytes[idx + 1], bytes[idx + 2], bytes[idx + 3]];
                // Flip vertically: OpenGL has origin at bottom-left, images at top-left
                img.put_pixel(x, height - 1 - y, image::Rgba(pixel));
            }
        }
    }

    img.save(filename)?;

    Ok(())
}

/// Headless mode - runs HTTP API server
async fn headless_main(
    port: u16,
    config: SimulationConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use api::run_server;
    use api::ApiState;

    let rng = make_rng(&config);
    let sim = Simulation::with_config(config);

    let api_state = ApiState::new(sim, rng);

    run_server(api_state, port).await?;

    Ok(())
}

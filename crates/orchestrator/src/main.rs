//! Headless N-body runner.
//!
//! Usage: `nbody [config.json]`. Windowed embeddings drive the same
//! pipeline through `orchestrator::create_simulation` and draw with
//! `kernel::PointRenderer` between frames.

use orchestrator::SimulationConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG: &str = "configs/nbody-1k.json";
const DEFAULT_MAX_FRAMES: u64 = 100;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orchestrator=info,kernel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = match SimulationConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("invalid configuration {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let mut runner = match orchestrator::create_simulation_from_config(&config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!("initialization failed: {e}");
            std::process::exit(1);
        }
    };

    let max_frames = config.max_frames.unwrap_or(DEFAULT_MAX_FRAMES);
    if let Err(e) = runner.run(max_frames) {
        tracing::error!("run failed: {e}");
        std::process::exit(1);
    }
}

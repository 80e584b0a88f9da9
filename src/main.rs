use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use maze_traverse::adapters::inbound::KinematicSimulator;
use maze_traverse::adapters::outbound::{init_combined_logger, FilesystemMazeSource, BUILTIN_LAYOUT};
use maze_traverse::application::{run_batch, ReconstructionService, TrajectoryService};
use maze_traverse::domains::maze::MazeLayoutSource;
use maze_traverse::domains::navigation::{Simulator, SimulatorFactory};
use maze_traverse::{Config, DomainResult};

const DEFAULT_CONFIG: &str = "config.toml";
const DEFAULT_LAYOUT_NAME: &str = "default";

async fn resolve_layout(config: &Config) -> anyhow::Result<String> {
    if let Some(path) = &config.maze.layout_path {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading maze layout {}", path.display()));
    }
    let source = FilesystemMazeSource::new(None);
    match source.load_layout(DEFAULT_LAYOUT_NAME) {
        Ok(layout) => Ok(layout),
        Err(e) => {
            warn!(error = %e, "falling back to the built-in maze layout");
            Ok(BUILTIN_LAYOUT.to_string())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::load(&config_path)?;

    // Installed without the log bridge so `log` records reach fast_log.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_env_filter(filter).finish(),
    )?;

    info!("Starting maze-traverse");
    let logger = init_combined_logger(&config.logging);
    let layout = resolve_layout(&config).await?;

    let maze = config.maze.clone();
    let simulator = config.simulator.clone();
    let factory: Arc<dyn SimulatorFactory> =
        Arc::new(move |_index: usize| -> DomainResult<Box<dyn Simulator>> {
            let sim = KinematicSimulator::new(&layout, &maze, simulator.clone())?;
            Ok(Box::new(sim))
        });

    let service = TrajectoryService::new(&config, logger.clone());
    let report = run_batch(&service, factory, &config.batch).await?;
    for failure in &report.failures {
        logger.error(&failure.to_string());
    }

    let reconstruction = ReconstructionService::new(&config.reconstruction, logger.clone());
    let cloud = reconstruction.reconstruct_all(&report.trajectories)?;
    let summary = reconstruction.depth_summary(&report.trajectories)?;
    if let Some(bounds) = cloud.bounds() {
        info!(
            points = cloud.len(),
            min = ?bounds.min,
            max = ?bounds.max,
            "point cloud assembled"
        );
    }
    if let Some(linear) = summary.linear {
        info!(
            frames = summary.frames,
            min = linear.min,
            max = linear.max,
            mean = linear.mean,
            skipped = summary.histogram.skipped,
            "linear depth"
        );
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "maze-traverse finished"
    );
    Ok(())
}

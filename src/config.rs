use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domains::maze::{GoalPolicy, PathShape, DEFAULT_CELL_SIZE, DEFAULT_WALL_SYMBOL};
use crate::domains::navigation::{Action, AlignedMotion, ReplanPolicy};
use crate::domains::reconstruction::{DepthConvention, DepthStrategy, ViewConvention};

/// Prefix for environment overrides, e.g.
/// `MAZE_TRAVERSE__NAVIGATION__PROXIMITY_THRESHOLD=25`.
pub const ENV_PREFIX: &str = "MAZE_TRAVERSE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub maze: MazeConfig,
    pub planner: PlannerConfig,
    pub navigation: NavigationConfig,
    pub recording: RecordingConfig,
    pub reconstruction: ReconstructionConfig,
    pub batch: BatchConfig,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub wall_symbol: char,
    /// World units per grid cell.
    pub cell_size: f64,
    pub layout_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub goal_policy: GoalPolicy,
    /// Hop distance used by `GoalPolicy::FixedDistance`.
    pub goal_distance: u32,
    pub path_shape: PathShape,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub replan_policy: ReplanPolicy,
    /// A waypoint counts as reached once the agent is this close (world units).
    pub proximity_threshold: f64,
    pub warmup_ticks: u32,
    pub warmup_action: Action,
    pub alignment_tolerance_deg: f64,
    pub aligned_motion: AlignedMotion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Ticks recorded after the warm-up period.
    pub length: u32,
    /// Simulator steps per issued action.
    pub action_repeat: u32,
    pub record_camera: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Output grid is `resolution x resolution`; `None` keeps the native size.
    pub resolution: Option<usize>,
    pub strategy: DepthStrategy,
    pub view_convention: ViewConvention,
    pub depth_convention: DepthConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub trajectories: usize,
    pub parallelism: usize,
}

/// Settings of the built-in kinematic grid simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Yaw change per simulator step for turning actions (degrees).
    pub turn_step_deg: f64,
    /// Distance per simulator step for forward actions (world units).
    pub move_step: f64,
    /// Side of the square rendered camera image; 0 disables the camera.
    pub image_size: usize,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layered load: built-in defaults, then the TOML file when it exists,
    /// then `MAZE_TRAVERSE__*` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("loading configuration from {}", path.display()))?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.maze.cell_size <= 0.0 {
            anyhow::bail!("maze.cell_size must be positive, got {}", self.maze.cell_size);
        }
        if self.navigation.proximity_threshold <= 0.0 {
            anyhow::bail!(
                "navigation.proximity_threshold must be positive, got {}",
                self.navigation.proximity_threshold
            );
        }
        if self.recording.action_repeat == 0 {
            anyhow::bail!("recording.action_repeat must be at least 1");
        }
        if self.batch.parallelism == 0 {
            anyhow::bail!("batch.parallelism must be at least 1");
        }
        if !(self.simulator.near > 0.0 && self.simulator.far > self.simulator.near) {
            anyhow::bail!(
                "simulator clip planes must satisfy 0 < near < far, got {} and {}",
                self.simulator.near,
                self.simulator.far
            );
        }
        if matches!(self.reconstruction.resolution, Some(r) if r < 2) {
            anyhow::bail!("reconstruction.resolution must be at least 2");
        }
        Ok(())
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            wall_symbol: DEFAULT_WALL_SYMBOL,
            cell_size: DEFAULT_CELL_SIZE,
            layout_path: None,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            goal_policy: GoalPolicy::Frontier,
            goal_distance: 1,
            path_shape: PathShape::OneWay,
            seed: None,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            replan_policy: ReplanPolicy::Resampling,
            proximity_threshold: 10.0,
            warmup_ticks: 40,
            warmup_action: Action::TurnLeft,
            alignment_tolerance_deg: 10.0,
            aligned_motion: AlignedMotion::Blend,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            length: 100,
            action_repeat: 4,
            record_camera: true,
        }
    }
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            strategy: DepthStrategy::RawNdc,
            view_convention: ViewConvention::ModelView,
            depth_convention: DepthConvention::Standard,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            trajectories: 64,
            parallelism: 4,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            turn_step_deg: 5.0,
            move_step: 2.5,
            image_size: 16,
            fov_deg: 90.0,
            near: 1.0,
            far: 2000.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

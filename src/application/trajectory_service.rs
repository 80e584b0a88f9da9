use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::common::{AggregateRoot, DomainError, DomainResult, EventEnvelope};
use crate::config::{Config, MazeConfig, NavigationConfig, PlannerConfig, RecordingConfig};
use crate::domains::logger::DynLogger;
use crate::domains::maze::{MazeGrid, PathPlanner};
use crate::domains::navigation::{FrameRecord, Simulator, TrajectoryDriver, TrajectoryEvent};

/// Aggregate type recorded in event envelopes.
pub const TRAJECTORY_AGGREGATE: &str = "Trajectory";

/// Output of one episode: the recorded frames plus the driver's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: String,
    pub index: usize,
    pub records: Vec<FrameRecord>,
    pub events: Vec<TrajectoryEvent>,
    pub flagged_ticks: usize,
}

impl Trajectory {
    pub fn envelopes(&self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.events
            .iter()
            .map(|e| EventEnvelope::new(e, TRAJECTORY_AGGREGATE))
            .collect()
    }

    pub fn waypoints_reached(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TrajectoryEvent::WaypointReached { .. }))
            .count()
    }
}

/// Runs single episodes against a simulator port.
#[derive(Clone)]
pub struct TrajectoryService {
    maze: MazeConfig,
    planner: PlannerConfig,
    navigation: NavigationConfig,
    recording: RecordingConfig,
    logger: DynLogger,
}

impl TrajectoryService {
    pub fn new(config: &Config, logger: DynLogger) -> Self {
        Self {
            maze: config.maze.clone(),
            planner: config.planner.clone(),
            navigation: config.navigation.clone(),
            recording: config.recording.clone(),
            logger,
        }
    }

    /// Ticks per episode, warm-up included.
    pub fn total_ticks(&self) -> u32 {
        self.navigation.warmup_ticks + self.recording.length
    }

    /// Trajectories of one batch share the configured seed offset by their
    /// index, so they stay reproducible without being identical.
    fn planner_config(&self, index: usize) -> PlannerConfig {
        let mut config = self.planner.clone();
        config.seed = config.seed.map(|s| s.wrapping_add(index as u64));
        config
    }

    #[instrument(skip(self, sim))]
    pub fn run_episode(&self, sim: &mut dyn Simulator, index: usize) -> DomainResult<Trajectory> {
        sim.reset()?;
        let layout = sim.maze_layout()?;
        let grid = MazeGrid::from_config(&layout, &self.maze)?;
        let planner = PathPlanner::new(grid, &self.planner_config(index));

        let id = Uuid::new_v4().to_string();
        let mut driver = TrajectoryDriver::new(
            id.clone(),
            planner,
            &self.navigation,
            self.recording.record_camera,
        );

        let first = sim.observe()?;
        driver.start(&first.pose)?;
        self.logger.info(&format!(
            "trajectory {} ({}) started with {} waypoints",
            index,
            id,
            driver.path().len()
        ));

        let total = self.total_ticks();
        let mut records = Vec::with_capacity(self.recording.length as usize);
        let mut pending = Some(first);
        for tick in 0..total {
            if !sim.is_running() {
                return Err(DomainError::Simulator(format!(
                    "simulator stopped at tick {} of {}",
                    tick, total
                )));
            }
            let observation = match pending.take() {
                Some(o) => o,
                None => sim.observe()?,
            };
            let decision = driver.step(observation)?;
            sim.act(decision.action, self.recording.action_repeat)?;
            if let Some(record) = decision.record {
                records.push(record);
            }
        }

        let events = driver.uncommitted_events().to_vec();
        driver.mark_events_as_committed();
        let trajectory = Trajectory {
            id,
            index,
            records,
            events,
            flagged_ticks: driver.flagged_ticks(),
        };

        debug!(events = trajectory.events.len(), "episode events collected");
        if trajectory.flagged_ticks > 0 {
            self.logger.warn(&format!(
                "trajectory {} has {} frames with unstable poses",
                index, trajectory.flagged_ticks
            ));
        }
        self.logger.info(&format!(
            "trajectory {} finished: {} frames, {} waypoints reached",
            index,
            trajectory.records.len(),
            trajectory.waypoints_reached()
        ));
        Ok(trajectory)
    }
}

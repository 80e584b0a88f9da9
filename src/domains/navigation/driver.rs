use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::action::Action;
use super::controller::TurnController;
use super::events::TrajectoryEvent;
use super::pose::AgentPose;
use super::record::{FrameRecord, Observation};
use crate::common::{AggregateRoot, DomainError, DomainResult};
use crate::config::NavigationConfig;
use crate::domains::maze::{PathPlanner, Position2D, WaypointPath};

/// What happens once the last waypoint of a path is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplanPolicy {
    /// Wrap around and follow the same path again.
    Cyclic,
    /// Plan a fresh path from the current cell.
    Resampling,
}

/// Outcome of a single tick.
#[derive(Debug, Clone)]
pub struct TickDecision {
    pub tick: u32,
    pub action: Action,
    pub record: Option<FrameRecord>,
}

/// Per-episode navigation state: active path, active waypoint and tick
/// counter. State changes go through [`TrajectoryEvent`]s.
#[derive(Debug, Clone)]
pub struct TrajectoryDriver {
    id: String,
    planner: PathPlanner,
    controller: TurnController,
    config: NavigationConfig,
    record_camera: bool,
    path: WaypointPath,
    active_index: usize,
    tick: u32,
    started: bool,
    flagged_ticks: usize,
    version: u64,
    uncommitted_events: Vec<TrajectoryEvent>,
}

impl TrajectoryDriver {
    pub fn new(
        id: String,
        planner: PathPlanner,
        config: &NavigationConfig,
        record_camera: bool,
    ) -> Self {
        Self {
            id,
            planner,
            controller: TurnController::from_config(config),
            config: config.clone(),
            record_camera,
            path: WaypointPath::default(),
            active_index: 0,
            tick: 0,
            started: false,
            flagged_ticks: 0,
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &WaypointPath {
        &self.path
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_waypoint(&self) -> Option<Position2D> {
        self.path.get(self.active_index).copied()
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn flagged_ticks(&self) -> usize {
        self.flagged_ticks
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    /// Plan the first path from the agent's starting cell.
    pub fn start(&mut self, pose: &AgentPose) -> DomainResult<()> {
        let start = pose.position_2d();
        let start_cell = self.planner.grid().to_grid(start)?;
        let path = self.planner.plan_path(start_cell)?;
        info!(
            trajectory = %self.id,
            x = start_cell.x,
            y = start_cell.y,
            waypoints = path.len(),
            "episode started"
        );

        self.raise(TrajectoryEvent::EpisodeStarted {
            trajectory_id: self.id.clone(),
            start,
            start_cell,
            timestamp: Utc::now(),
        })?;
        self.raise(TrajectoryEvent::PathPlanned {
            trajectory_id: self.id.clone(),
            tick: self.tick,
            path,
            timestamp: Utc::now(),
        })
    }

    /// Decide the action for one tick and build its frame record.
    pub fn step(&mut self, observation: Observation) -> DomainResult<TickDecision> {
        if !self.started {
            return Err(DomainError::InvalidInput {
                reason: format!("trajectory {} stepped before start", self.id),
            });
        }

        let tick = self.tick;
        self.tick += 1;

        if tick < self.config.warmup_ticks {
            return Ok(TickDecision {
                tick,
                action: self.config.warmup_action,
                record: None,
            });
        }

        let pose = observation.pose;
        self.advance(&pose, tick)?;

        let target = self.active_waypoint().ok_or_else(|| DomainError::InvalidInput {
            reason: format!("trajectory {} has no active waypoint", self.id),
        })?;
        let action = self.controller.steer(pose.position_2d(), pose.yaw(), target);
        debug!(
            trajectory = %self.id,
            tick,
            index = self.active_index,
            action = action.name(),
            "tick"
        );

        let record = self.record(tick, action, target, observation)?;
        Ok(TickDecision {
            tick,
            action,
            record: Some(record),
        })
    }

    fn advance(&mut self, pose: &AgentPose, tick: u32) -> DomainResult<()> {
        let Some(target) = self.active_waypoint() else {
            return Ok(());
        };
        if pose.position_2d().distance(&target) > self.config.proximity_threshold {
            return Ok(());
        }

        let index = self.active_index;
        let next_index = match self.config.replan_policy {
            ReplanPolicy::Cyclic => (index + 1) % self.path.len(),
            ReplanPolicy::Resampling => index + 1,
        };
        self.raise(TrajectoryEvent::WaypointReached {
            trajectory_id: self.id.clone(),
            tick,
            index,
            next_index,
            timestamp: Utc::now(),
        })?;

        if next_index >= self.path.len() {
            let cell = self.planner.grid().to_grid(pose.position_2d())?;
            let path = self.planner.plan_path(cell)?;
            debug!(trajectory = %self.id, tick, waypoints = path.len(), "path exhausted, replanned");
            self.raise(TrajectoryEvent::PathPlanned {
                trajectory_id: self.id.clone(),
                tick,
                path,
                timestamp: Utc::now(),
            })?;
        }
        Ok(())
    }

    fn record(
        &mut self,
        tick: u32,
        action: Action,
        target: Position2D,
        observation: Observation,
    ) -> DomainResult<FrameRecord> {
        let (pose, color, camera) = observation.into_parts()?;
        let (color, camera) = match camera {
            Some(frame) if self.record_camera => (color, Some(frame)),
            Some(frame) => (Some(frame.color), None),
            None => (color, None),
        };

        let orientation = match pose.orientation() {
            Ok(q) => Some([q.w, q.i, q.j, q.k]),
            Err(err @ DomainError::NumericInstability { .. }) => {
                warn!(trajectory = %self.id, tick, error = %err, "pose flagged");
                self.raise(TrajectoryEvent::PoseFlagged {
                    trajectory_id: self.id.clone(),
                    tick,
                    reason: err.to_string(),
                    timestamp: Utc::now(),
                })?;
                None
            }
            Err(err) => return Err(err),
        };

        Ok(FrameRecord {
            tick,
            action,
            action_index: action.index(),
            position: [pose.position.x, pose.position.y, pose.position.z],
            rotation: pose.rotation,
            orientation,
            pose_unstable: orientation.is_none(),
            waypoint: Some(target),
            color,
            camera,
        })
    }
}

impl AggregateRoot for TrajectoryDriver {
    type Event = TrajectoryEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) -> DomainResult<()> {
        match event {
            TrajectoryEvent::EpisodeStarted { .. } => {
                self.started = true;
            }
            TrajectoryEvent::PathPlanned { path, .. } => {
                if path.is_empty() {
                    return Err(DomainError::InvalidInput {
                        reason: "planned path has no waypoints".to_string(),
                    });
                }
                self.path = path.clone();
                self.active_index = 0;
            }
            TrajectoryEvent::WaypointReached { next_index, .. } => {
                self.active_index = *next_index;
            }
            TrajectoryEvent::PoseFlagged { .. } => {
                self.flagged_ticks += 1;
            }
        }
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
    }
}

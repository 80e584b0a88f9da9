use crate::common::DomainEvent;
use crate::domains::maze::{GridCoord, Position2D, WaypointPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrajectoryEvent {
    EpisodeStarted {
        trajectory_id: String,
        start: Position2D,
        start_cell: GridCoord,
        timestamp: DateTime<Utc>,
    },
    PathPlanned {
        trajectory_id: String,
        tick: u32,
        path: WaypointPath,
        timestamp: DateTime<Utc>,
    },
    WaypointReached {
        trajectory_id: String,
        tick: u32,
        index: usize,
        next_index: usize,
        timestamp: DateTime<Utc>,
    },
    PoseFlagged {
        trajectory_id: String,
        tick: u32,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for TrajectoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TrajectoryEvent::EpisodeStarted { .. } => "EpisodeStarted",
            TrajectoryEvent::PathPlanned { .. } => "PathPlanned",
            TrajectoryEvent::WaypointReached { .. } => "WaypointReached",
            TrajectoryEvent::PoseFlagged { .. } => "PoseFlagged",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TrajectoryEvent::EpisodeStarted { trajectory_id, .. } => trajectory_id,
            TrajectoryEvent::PathPlanned { trajectory_id, .. } => trajectory_id,
            TrajectoryEvent::WaypointReached { trajectory_id, .. } => trajectory_id,
            TrajectoryEvent::PoseFlagged { trajectory_id, .. } => trajectory_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TrajectoryEvent::EpisodeStarted { timestamp, .. } => *timestamp,
            TrajectoryEvent::PathPlanned { timestamp, .. } => *timestamp,
            TrajectoryEvent::WaypointReached { timestamp, .. } => *timestamp,
            TrajectoryEvent::PoseFlagged { timestamp, .. } => *timestamp,
        }
    }
}

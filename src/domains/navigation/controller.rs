use serde::{Deserialize, Serialize};
use tracing::trace;

use super::action::Action;
use crate::config::NavigationConfig;
use crate::domains::maze::Position2D;

/// What the controller does once the heading is within tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignedMotion {
    /// Keep turning toward the target while moving forward.
    Blend,
    /// Move straight forward.
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    pub fn in_place(self) -> Action {
        match self {
            TurnDirection::Left => Action::TurnLeft,
            TurnDirection::Right => Action::TurnRight,
        }
    }

    pub fn with_forward(self) -> Action {
        match self {
            TurnDirection::Left => Action::TurnLeftForward,
            TurnDirection::Right => Action::TurnRightForward,
        }
    }
}

/// Wrap an angle into (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Bearing of the displacement `from -> to` in degrees, in (-180, 180].
/// A zero displacement yields 90.
pub fn bearing_degrees(from: Position2D, to: Position2D) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 {
        return if dy >= 0.0 { 90.0 } else { -90.0 };
    }

    let angle = (dy / dx).abs().atan().to_degrees();
    if dx > 0.0 && dy >= 0.0 {
        angle
    } else if dx > 0.0 {
        -angle
    } else if dy >= 0.0 {
        180.0 - angle
    } else {
        -180.0 + angle
    }
}

/// The two 180-degree half-ranges of headings around a target bearing.
/// Headings in `right` reach the target faster by increasing yaw.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRanges {
    pub right: Vec<(f64, f64)>,
    pub left: Vec<(f64, f64)>,
}

impl TurnRanges {
    pub fn around(target: f64) -> Self {
        let target = normalize_degrees(target);
        let ranges = if target > 0.0 {
            Self {
                right: vec![(target - 180.0, target)],
                left: vec![(target, 180.0), (-180.0, target - 180.0)],
            }
        } else {
            Self {
                right: vec![(-180.0, target), (target + 180.0, 180.0)],
                left: vec![(target, target + 180.0)],
            }
        };
        debug_assert!((ranges.right_span() - 180.0).abs() < 1e-9);
        debug_assert!((ranges.left_span() - 180.0).abs() < 1e-9);
        ranges
    }

    pub fn right_span(&self) -> f64 {
        self.right.iter().map(|(l, r)| r - l).sum()
    }

    pub fn left_span(&self) -> f64 {
        self.left.iter().map(|(l, r)| r - l).sum()
    }

    /// Right ranges win on shared boundaries.
    pub fn classify(&self, yaw: f64) -> TurnDirection {
        let yaw = normalize_degrees(yaw);
        if self.right.iter().any(|(l, r)| *l <= yaw && yaw <= *r) {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }
}

/// Stateless mapping from (yaw, bearing) to an [`Action`]. Angles are in
/// degrees with 0 along world +X and 90 along world +Y; turning right
/// increases yaw.
#[derive(Debug, Clone, Copy)]
pub struct TurnController {
    tolerance_deg: f64,
    aligned_motion: AlignedMotion,
}

impl TurnController {
    pub fn new(tolerance_deg: f64, aligned_motion: AlignedMotion) -> Self {
        Self {
            tolerance_deg,
            aligned_motion,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.alignment_tolerance_deg, config.aligned_motion)
    }

    pub fn is_aligned(&self, yaw: f64, bearing: f64) -> bool {
        let yaw = normalize_degrees(yaw);
        let bearing = normalize_degrees(bearing);
        [yaw, yaw - 360.0, yaw + 360.0]
            .iter()
            .any(|y| (y - bearing).abs() < self.tolerance_deg)
    }

    pub fn decide(&self, yaw: f64, bearing: f64) -> Action {
        let direction = TurnRanges::around(bearing).classify(yaw);
        let action = if self.is_aligned(yaw, bearing) {
            match self.aligned_motion {
                AlignedMotion::Blend => direction.with_forward(),
                AlignedMotion::Forward => Action::Forward,
            }
        } else {
            direction.in_place()
        };
        trace!(yaw, bearing, action = action.name(), "turn decision");
        action
    }

    pub fn steer(&self, position: Position2D, yaw: f64, target: Position2D) -> Action {
        self.decide(yaw, bearing_degrees(position, target))
    }
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new(10.0, AlignedMotion::Blend)
    }
}

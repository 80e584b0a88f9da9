use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::action::Action;
use super::pose::{AgentPose, Rotation};
use crate::common::{DomainError, DomainResult};
use crate::domains::maze::Position2D;
use crate::domains::reconstruction::{resample_color, CameraFrame, ColorBuffer, DepthBuffer};

/// Raw per-tick observation supplied by the simulator layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub pose: AgentPose,
    pub color: Option<ColorBuffer>,
    pub depth: Option<DepthBuffer>,
    pub projection: Option<Matrix4<f64>>,
    pub view: Option<Matrix4<f64>>,
}

impl Observation {
    pub fn pose_only(pose: AgentPose) -> Self {
        Self {
            pose,
            color: None,
            depth: None,
            projection: None,
            view: None,
        }
    }

    /// Split into the colour image and, when every camera buffer is
    /// present, a complete [`CameraFrame`] that takes the colour image with
    /// it. A colour image of a different size is resampled to the depth
    /// grid. Buffers whose length does not match their shape are rejected.
    pub fn into_parts(
        self,
    ) -> DomainResult<(AgentPose, Option<ColorBuffer>, Option<CameraFrame>)> {
        match (self.color, self.depth, self.projection, self.view) {
            (Some(color), Some(depth), Some(projection), Some(view)) => {
                depth.validate()?;
                color.validate()?;
                let color = if (color.width, color.height) == (depth.width, depth.height) {
                    color
                } else if color.pixels.is_empty() {
                    return Err(DomainError::InvalidInput {
                        reason: "empty color buffer next to a depth buffer".to_string(),
                    });
                } else {
                    warn!(
                        color_width = color.width,
                        color_height = color.height,
                        depth_width = depth.width,
                        depth_height = depth.height,
                        "color resampled to depth resolution"
                    );
                    resample_color(&color, depth.width, depth.height)
                };
                let frame = CameraFrame::new(projection, view, depth, color)?;
                Ok((self.pose, None, Some(frame)))
            }
            (color, depth, projection, view) => {
                if depth.is_some() || projection.is_some() || view.is_some() {
                    warn!(
                        depth = depth.is_some(),
                        projection = projection.is_some(),
                        view = view.is_some(),
                        "incomplete camera observation, frame not recorded"
                    );
                }
                Ok((self.pose, color, None))
            }
        }
    }
}

/// One recorded tick past the warm-up period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub tick: u32,
    pub action: Action,
    pub action_index: u8,
    pub position: [f64; 3],
    pub rotation: Rotation,
    /// `(w, x, y, z)`; `None` when the conversion was numerically unstable.
    pub orientation: Option<[f64; 4]>,
    pub pose_unstable: bool,
    pub waypoint: Option<Position2D>,
    pub color: Option<ColorBuffer>,
    pub camera: Option<CameraFrame>,
}

impl FrameRecord {
    pub fn color(&self) -> Option<&ColorBuffer> {
        self.camera
            .as_ref()
            .map(|c| &c.color)
            .or(self.color.as_ref())
    }
}

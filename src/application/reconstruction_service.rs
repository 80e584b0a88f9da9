use serde::{Deserialize, Serialize};
use tracing::info;

use super::trajectory_service::Trajectory;
use crate::common::DomainResult;
use crate::config::ReconstructionConfig;
use crate::domains::logger::DynLogger;
use crate::domains::navigation::FrameRecord;
use crate::domains::reconstruction::{
    linearize, CameraFrame, DepthConvention, DepthStats, LogDepthHistogram, PointCloud,
    Reconstructor, DEFAULT_HISTOGRAM_BINS,
};

/// Raw and linearized depth statistics over a set of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSummary {
    pub frames: usize,
    pub raw: Option<DepthStats>,
    pub linear: Option<DepthStats>,
    pub histogram: LogDepthHistogram,
}

/// Turns recorded trajectories into colored point clouds.
#[derive(Clone)]
pub struct ReconstructionService {
    reconstructor: Reconstructor,
    depth_convention: DepthConvention,
    logger: DynLogger,
}

fn camera_frames<'a>(records: &'a [FrameRecord]) -> Vec<&'a CameraFrame> {
    records.iter().filter_map(|r| r.camera.as_ref()).collect()
}

impl ReconstructionService {
    pub fn new(config: &ReconstructionConfig, logger: DynLogger) -> Self {
        Self {
            reconstructor: Reconstructor::new(config),
            depth_convention: config.depth_convention,
            logger,
        }
    }

    pub fn reconstruct_trajectory(&self, trajectory: &Trajectory) -> DomainResult<PointCloud> {
        let frames = camera_frames(&trajectory.records);
        let cloud = self.reconstructor.reconstruct_frames(&frames)?;
        info!(
            trajectory = %trajectory.id,
            frames = frames.len(),
            points = cloud.len(),
            "trajectory reconstructed"
        );
        Ok(cloud)
    }

    /// Concatenate the clouds of several trajectories, in order.
    pub fn reconstruct_all(&self, trajectories: &[Trajectory]) -> DomainResult<PointCloud> {
        let mut cloud = PointCloud::new();
        for trajectory in trajectories {
            let mut part = self.reconstruct_trajectory(trajectory)?;
            cloud.append(&mut part);
        }
        self.logger.info(&format!(
            "reconstructed {} points from {} trajectories",
            cloud.len(),
            trajectories.len()
        ));
        Ok(cloud)
    }

    pub fn depth_summary(&self, trajectories: &[Trajectory]) -> DomainResult<DepthSummary> {
        let frames: Vec<&CameraFrame> = trajectories
            .iter()
            .flat_map(|t| camera_frames(&t.records))
            .collect();
        let linear = frames
            .iter()
            .map(|f| linearize(&f.depth, &f.projection, self.depth_convention))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(DepthSummary {
            frames: frames.len(),
            raw: DepthStats::of_buffers(frames.iter().map(|f| &f.depth)),
            linear: DepthStats::of_buffers(linear.iter()),
            histogram: LogDepthHistogram::of_buffers(linear.iter(), DEFAULT_HISTOGRAM_BINS),
        })
    }
}

use std::borrow::Borrow;

use nalgebra::{Matrix4, Point3, Vector4};
use rayon::prelude::*;
use tracing::debug;

use super::camera::CameraFrame;
use super::cloud::PointCloud;
use super::depth::{extract_clip_planes, ClipPlanes};
use super::resample::{resample_color, resample_depth};
use super::{DepthConvention, DepthStrategy, ViewConvention};
use crate::common::{DomainError, DomainResult};
use crate::config::ReconstructionConfig;

/// Points of a single frame, row-major over the output grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePoints {
    pub points: Vec<Point3<f64>>,
    pub colors: Vec<[f32; 3]>,
    /// Grid samples whose unprojection was not finite.
    pub dropped: usize,
}

/// Grid coordinate `i` of `n` samples of `linspace(0, 1, n)`.
fn linspace_at(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

fn normalize_rgb(rgb: [u8; 3]) -> [f32; 3] {
    rgb.map(|c| f32::from(c) / 255.0)
}

#[derive(Debug, Clone)]
pub struct Reconstructor {
    resolution: Option<usize>,
    strategy: DepthStrategy,
    view_convention: ViewConvention,
    depth_convention: DepthConvention,
}

impl Reconstructor {
    pub fn new(config: &ReconstructionConfig) -> Self {
        Self {
            resolution: config.resolution,
            strategy: config.strategy,
            view_convention: config.view_convention,
            depth_convention: config.depth_convention,
        }
    }

    pub fn strategy(&self) -> DepthStrategy {
        self.strategy
    }

    pub fn reconstruct_frame(&self, frame: &CameraFrame) -> DomainResult<FramePoints> {
        frame.validate()?;
        if frame.depth.pixel_count() == 0 || frame.color.pixels.is_empty() {
            return Err(DomainError::InvalidInput {
                reason: "empty camera buffers".to_string(),
            });
        }
        let (width, height) = match self.resolution {
            Some(r) => (r, r),
            None => (frame.depth.width, frame.depth.height),
        };
        let depth = resample_depth(&frame.depth, width, height);
        let color = resample_color(&frame.color, width, height);

        let inverse_projection =
            frame
                .projection
                .try_inverse()
                .ok_or_else(|| DomainError::DegenerateProjection {
                    a: frame.projection[(2, 2)],
                    b: frame.projection[(2, 3)],
                })?;
        let to_world = frame.camera_to_world(self.view_convention)?;
        let planes = match self.strategy {
            DepthStrategy::RawNdc => None,
            DepthStrategy::Linearized => Some(extract_clip_planes(&frame.projection)?),
        };

        let mut out = FramePoints {
            points: Vec::with_capacity(width * height),
            colors: Vec::with_capacity(width * height),
            dropped: 0,
        };
        for row in 0..height {
            let y = 2.0 * linspace_at(row, height) - 1.0;
            for col in 0..width {
                let x = 2.0 * linspace_at(col, width) - 1.0;
                let idx = row * width + col;
                let d = f64::from(depth.values[idx]);
                let point = match planes {
                    None => self.unproject_raw(&inverse_projection, &to_world, x, y, d),
                    Some(planes) => {
                        self.unproject_linear(&inverse_projection, &to_world, &planes, x, y, d)
                    }
                };
                match point {
                    Some(p) => {
                        out.points.push(p);
                        out.colors.push(normalize_rgb(color.pixels[idx]));
                    }
                    None => out.dropped += 1,
                }
            }
        }

        if out.dropped > 0 {
            debug!(dropped = out.dropped, kept = out.points.len(), "non-finite points dropped");
        }
        Ok(out)
    }

    fn unproject_raw(
        &self,
        inverse_projection: &Matrix4<f64>,
        to_world: &Matrix4<f64>,
        x: f64,
        y: f64,
        depth: f64,
    ) -> Option<Point3<f64>> {
        let z = match self.depth_convention {
            DepthConvention::Standard => 2.0 * depth - 1.0,
            DepthConvention::Reversed => 1.0 - 2.0 * depth,
        };
        let world = to_world * (inverse_projection * Vector4::new(x, y, z, 1.0));
        dehomogenize(&world)
    }

    fn unproject_linear(
        &self,
        inverse_projection: &Matrix4<f64>,
        to_world: &Matrix4<f64>,
        planes: &ClipPlanes,
        x: f64,
        y: f64,
        depth: f64,
    ) -> Option<Point3<f64>> {
        let on_near = dehomogenize(&(inverse_projection * Vector4::new(x, y, -1.0, 1.0)))?;
        let view_depth = planes.linearize_value(depth, self.depth_convention);
        // view space looks down -z
        let scale = view_depth / -on_near.z;
        let view = on_near.coords * scale;
        let world = to_world * view.push(1.0);
        dehomogenize(&world)
    }

    /// Reconstruct every frame in parallel and concatenate in frame order.
    pub fn reconstruct_frames<F>(&self, frames: &[F]) -> DomainResult<PointCloud>
    where
        F: Borrow<CameraFrame> + Sync,
    {
        let per_frame: Vec<FramePoints> = frames
            .par_iter()
            .map(|frame| self.reconstruct_frame(frame.borrow()))
            .collect::<DomainResult<_>>()?;

        let total = per_frame.iter().map(|f| f.points.len()).sum();
        let mut cloud = PointCloud::with_capacity(total);
        for frame in per_frame {
            cloud.points.extend(frame.points);
            cloud.colors.extend(frame.colors);
        }
        Ok(cloud)
    }
}

fn dehomogenize(v: &Vector4<f64>) -> Option<Point3<f64>> {
    let p = Point3::new(v.x / v.w, v.y / v.w, v.z / v.w);
    (p.x.is_finite() && p.y.is_finite() && p.z.is_finite()).then_some(p)
}

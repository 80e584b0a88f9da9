use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use super::camera::DepthBuffer;
use super::DepthConvention;
use crate::common::{DomainError, DomainResult};

const DEGENERATE_EPS: f64 = 1e-9;

/// Near and far plane distances of a perspective projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipPlanes {
    pub near: f64,
    pub far: f64,
}

/// Read near/far from `P[2,2]` (A) and `P[2,3]` (B):
/// `far = B / (A + 1)`, `near = B / (A - 1)`.
pub fn extract_clip_planes(projection: &Matrix4<f64>) -> DomainResult<ClipPlanes> {
    let a = projection[(2, 2)];
    let b = projection[(2, 3)];
    let degenerate = (a - 1.0).abs() < DEGENERATE_EPS || (a + 1.0).abs() < DEGENERATE_EPS;
    if degenerate || !a.is_finite() || !b.is_finite() {
        return Err(DomainError::DegenerateProjection { a, b });
    }
    Ok(ClipPlanes {
        near: b / (a - 1.0),
        far: b / (a + 1.0),
    })
}

impl ClipPlanes {
    /// Map a [0, 1] depth to its NDC z under `convention`.
    pub fn ndc(&self, depth: f64, convention: DepthConvention) -> f64 {
        let ndc = 2.0 * depth - 1.0;
        match convention {
            DepthConvention::Standard => ndc,
            DepthConvention::Reversed => -ndc,
        }
    }

    pub fn linearize_value(&self, depth: f64, convention: DepthConvention) -> f64 {
        let ndc = self.ndc(depth, convention);
        let (n, f) = (self.near, self.far);
        (2.0 * n * f) / (f + n - ndc * (f - n))
    }
}

/// Linearize every pixel of `depth`; output has the same shape.
pub fn linearize(
    depth: &DepthBuffer,
    projection: &Matrix4<f64>,
    convention: DepthConvention,
) -> DomainResult<DepthBuffer> {
    let planes = extract_clip_planes(projection)?;
    let values = depth
        .values
        .iter()
        .map(|&d| planes.linearize_value(f64::from(d), convention) as f32)
        .collect();
    DepthBuffer::new(depth.width, depth.height, values)
}

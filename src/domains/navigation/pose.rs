use nalgebra::{Matrix3, Quaternion, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::common::{DomainError, DomainResult};
use crate::domains::maze::Position2D;

/// Euler orientation in degrees, in the simulator's (pitch, yaw, roll) order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    pub const fn from_yaw(yaw: f64) -> Self {
        Self::new(0.0, yaw, 0.0)
    }

    pub fn to_matrix(&self) -> Matrix3<f64> {
        Rotation3::from_euler_angles(
            self.roll.to_radians(),
            self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
        .into_inner()
    }
}

/// Agent pose sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentPose {
    pub position: Vector3<f64>,
    pub rotation: Rotation,
}

impl AgentPose {
    pub fn new(position: Vector3<f64>, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        Self::new(Vector3::new(x, y, 0.0), Rotation::from_yaw(yaw))
    }

    pub fn position_2d(&self) -> Position2D {
        Position2D::new(self.position.x, self.position.y)
    }

    pub fn yaw(&self) -> f64 {
        self.rotation.yaw
    }

    pub fn orientation(&self) -> DomainResult<UnitQuaternion<f64>> {
        quaternion_from_matrix(&self.rotation.to_matrix())
    }
}

/// Rotation matrix to unit quaternion, branching on the largest diagonal
/// term. Non-finite or zero-norm results are reported instead of returned.
pub fn quaternion_from_matrix(m: &Matrix3<f64>) -> DomainResult<UnitQuaternion<f64>> {
    let trace = m[(0, 0)] + m[(1, 1)] + m[(2, 2)];

    let (w, x, y, z) = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        (
            0.25 * s,
            (m[(2, 1)] - m[(1, 2)]) / s,
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(1, 0)] - m[(0, 1)]) / s,
        )
    } else if m[(0, 0)] > m[(1, 1)] && m[(0, 0)] > m[(2, 2)] {
        let s = (1.0 + m[(0, 0)] - m[(1, 1)] - m[(2, 2)]).sqrt() * 2.0;
        (
            (m[(2, 1)] - m[(1, 2)]) / s,
            0.25 * s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
        )
    } else if m[(1, 1)] > m[(2, 2)] {
        let s = (1.0 + m[(1, 1)] - m[(0, 0)] - m[(2, 2)]).sqrt() * 2.0;
        (
            (m[(0, 2)] - m[(2, 0)]) / s,
            (m[(0, 1)] + m[(1, 0)]) / s,
            0.25 * s,
            (m[(1, 2)] + m[(2, 1)]) / s,
        )
    } else {
        let s = (1.0 + m[(2, 2)] - m[(0, 0)] - m[(1, 1)]).sqrt() * 2.0;
        (
            (m[(1, 0)] - m[(0, 1)]) / s,
            (m[(0, 2)] + m[(2, 0)]) / s,
            (m[(1, 2)] + m[(2, 1)]) / s,
            0.25 * s,
        )
    };

    let q = Quaternion::new(w, x, y, z);
    let norm = q.norm();
    if !(w.is_finite() && x.is_finite() && y.is_finite() && z.is_finite()) || !(norm > 1e-12) {
        return Err(DomainError::NumericInstability {
            matrix: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        });
    }
    Ok(UnitQuaternion::from_quaternion(q))
}

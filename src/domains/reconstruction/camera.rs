use nalgebra::{Matrix4, Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use super::ViewConvention;
use crate::common::{DomainError, DomainResult};
use crate::domains::navigation::quaternion_from_matrix;

/// Normalized depth buffer with values in [0, 1] (or view-space depth
/// after linearization), row-major: `values[y * width + x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DepthBufferData")]
pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

#[derive(Deserialize)]
struct DepthBufferData {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl TryFrom<DepthBufferData> for DepthBuffer {
    type Error = DomainError;

    fn try_from(data: DepthBufferData) -> DomainResult<Self> {
        Self::new(data.width, data.height, data.values)
    }
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize, values: Vec<f32>) -> DomainResult<Self> {
        let buffer = Self {
            width,
            height,
            values,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Fields are public; check the value count still matches the shape.
    pub fn validate(&self) -> DomainResult<()> {
        if self.values.len() != self.pixel_count() {
            return Err(DomainError::InvalidInput {
                reason: format!(
                    "depth buffer has {} values, expected {}x{}",
                    self.values.len(),
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values.get(y * self.width + x).copied()
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// 8-bit RGB image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorBufferData")]
pub struct ColorBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 3]>,
}

#[derive(Deserialize)]
struct ColorBufferData {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
}

impl TryFrom<ColorBufferData> for ColorBuffer {
    type Error = DomainError;

    fn try_from(data: ColorBufferData) -> DomainResult<Self> {
        Self::new(data.width, data.height, data.pixels)
    }
}

impl ColorBuffer {
    pub fn new(width: usize, height: usize, pixels: Vec<[u8; 3]>) -> DomainResult<Self> {
        let buffer = Self {
            width,
            height,
            pixels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.pixels.len() != self.width * self.height {
            return Err(DomainError::InvalidInput {
                reason: format!(
                    "color buffer has {} pixels, expected {}x{}",
                    self.pixels.len(),
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgb; width * height],
        }
    }

    /// Interleaved `H x W x 3` bytes, as most simulators hand them out.
    pub fn from_interleaved(width: usize, height: usize, data: &[u8]) -> DomainResult<Self> {
        if data.len() != width * height * 3 {
            return Err(DomainError::InvalidInput {
                reason: format!(
                    "interleaved color data has {} bytes, expected {}",
                    data.len(),
                    width * height * 3
                ),
            });
        }
        let pixels = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Everything needed to unproject one tick's image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CameraFrameData")]
pub struct CameraFrame {
    pub projection: Matrix4<f64>,
    pub view: Matrix4<f64>,
    pub depth: DepthBuffer,
    pub color: ColorBuffer,
}

#[derive(Deserialize)]
struct CameraFrameData {
    projection: Matrix4<f64>,
    view: Matrix4<f64>,
    depth: DepthBuffer,
    color: ColorBuffer,
}

impl TryFrom<CameraFrameData> for CameraFrame {
    type Error = DomainError;

    fn try_from(data: CameraFrameData) -> DomainResult<Self> {
        Self::new(data.projection, data.view, data.depth, data.color)
    }
}

impl CameraFrame {
    pub fn new(
        projection: Matrix4<f64>,
        view: Matrix4<f64>,
        depth: DepthBuffer,
        color: ColorBuffer,
    ) -> DomainResult<Self> {
        let frame = Self {
            projection,
            view,
            depth,
            color,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Both buffers consistent with their shapes and with each other.
    pub fn validate(&self) -> DomainResult<()> {
        self.depth.validate()?;
        self.color.validate()?;
        if self.depth.width != self.color.width || self.depth.height != self.color.height {
            return Err(DomainError::InvalidInput {
                reason: format!(
                    "depth {}x{} and color {}x{} differ in size",
                    self.depth.width, self.depth.height, self.color.width, self.color.height
                ),
            });
        }
        Ok(())
    }

    /// View-to-world transform under the given convention.
    pub fn camera_to_world(&self, convention: ViewConvention) -> DomainResult<Matrix4<f64>> {
        match convention {
            ViewConvention::ViewToWorld => Ok(self.view),
            ViewConvention::ModelView => self.view.try_inverse().ok_or_else(|| {
                DomainError::InvalidInput {
                    reason: "view matrix is not invertible".to_string(),
                }
            }),
        }
    }

    /// Camera position and orientation in world space.
    pub fn camera_pose(
        &self,
        convention: ViewConvention,
    ) -> DomainResult<(Point3<f64>, UnitQuaternion<f64>)> {
        let to_world = self.camera_to_world(convention)?;
        let position = Point3::new(to_world[(0, 3)], to_world[(1, 3)], to_world[(2, 3)]);
        let rotation = to_world.fixed_view::<3, 3>(0, 0).into_owned();
        Ok((position, quaternion_from_matrix(&rotation)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_depth_buffer_is_rejected() {
        let mut depth = DepthBuffer::filled(4, 4, 0.5);
        depth.values.pop();
        assert!(matches!(depth.validate(), Err(DomainError::InvalidInput { .. })));

        let frame = CameraFrame {
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            depth,
            color: ColorBuffer::filled(4, 4, [0, 0, 0]),
        };
        assert!(frame.validate().is_err());
    }

    #[test]
    fn deserialization_checks_buffer_lengths() {
        let bad = r#"{"width":2,"height":2,"values":[0.1,0.2,0.3]}"#;
        assert!(serde_json::from_str::<DepthBuffer>(bad).is_err());

        let good = r#"{"width":2,"height":1,"pixels":[[1,2,3],[4,5,6]]}"#;
        let color: ColorBuffer = serde_json::from_str(good).unwrap();
        assert_eq!(color.get(1, 0), Some([4, 5, 6]));

        let frame = CameraFrame::new(
            Matrix4::identity(),
            Matrix4::identity(),
            DepthBuffer::filled(2, 1, 0.5),
            color,
        )
        .unwrap();
        let json = serde_json::to_string(&frame).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["color"]["width"] = serde_json::json!(1);
        value["color"]["pixels"] = serde_json::json!([[1, 2, 3]]);
        assert!(serde_json::from_value::<CameraFrame>(value).is_err());
    }
}

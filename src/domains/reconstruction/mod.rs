pub mod camera;
pub mod cloud;
pub mod depth;
pub mod resample;
pub mod stats;
pub mod unproject;

pub use camera::*;
pub use cloud::*;
pub use depth::*;
pub use resample::*;
pub use stats::*;
pub use unproject::*;

use serde::{Deserialize, Serialize};

/// How the depth buffer feeds the unprojection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthStrategy {
    /// Raw buffer value mapped straight to NDC z.
    #[default]
    RawNdc,
    /// Buffer linearized to view-space depth first, then placed along the
    /// pixel's view ray.
    Linearized,
}

/// Meaning of the per-frame 4x4 "view" matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewConvention {
    /// World to view (model-view); inverted before use.
    #[default]
    ModelView,
    /// Already view to world.
    ViewToWorld,
}

/// Orientation of the [0, 1] depth range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthConvention {
    /// 0 at the near plane, 1 at the far plane.
    #[default]
    Standard,
    /// Near and far swapped, as some renderers store it.
    Reversed,
}

use maze_traverse::config::ReconstructionConfig;
use maze_traverse::domains::reconstruction::*;
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

const RES: usize = 6;
const NEAR: f64 = 1.0;
const FAR: f64 = 100.0;

fn projection() -> Matrix4<f64> {
    Matrix4::new_perspective(1.0, 75f64.to_radians(), NEAR, FAR)
}

fn world_to_view() -> Matrix4<f64> {
    let eye = Point3::new(1.0, 2.0, 3.0);
    let target = eye + Vector3::new(1.0, 0.5, -0.2);
    Matrix4::look_at_rh(&eye, &target, &Vector3::z())
}

fn ndc(i: usize) -> f64 {
    2.0 * i as f64 / (RES - 1) as f64 - 1.0
}

/// World points placed on the pixel grid at varying depths, and the depth
/// buffer obtained by projecting them back.
fn synthetic_scene() -> (Vec<Point3<f64>>, DepthBuffer) {
    let p = projection();
    let v = world_to_view();
    let to_world = v.try_inverse().unwrap();
    let mut points = Vec::new();
    let mut depth = Vec::new();
    for row in 0..RES {
        for col in 0..RES {
            let view_depth = 2.0 + (row * RES + col) as f64 * 0.5;
            let view = Vector4::new(
                ndc(col) * view_depth / p[(0, 0)],
                ndc(row) * view_depth / p[(1, 1)],
                -view_depth,
                1.0,
            );
            let world = to_world * view;
            points.push(Point3::new(world.x, world.y, world.z));

            let clip = p * v * world;
            depth.push(((clip.z / clip.w + 1.0) * 0.5) as f32);
        }
    }
    (points, DepthBuffer::new(RES, RES, depth).unwrap())
}

fn frame(view: Matrix4<f64>, depth: DepthBuffer) -> CameraFrame {
    CameraFrame::new(projection(), view, depth, ColorBuffer::filled(RES, RES, [255, 0, 51])).unwrap()
}

fn reconstructor(strategy: DepthStrategy, view_convention: ViewConvention) -> Reconstructor {
    Reconstructor::new(&ReconstructionConfig {
        resolution: None,
        strategy,
        view_convention,
        depth_convention: DepthConvention::Standard,
    })
}

fn assert_points_close(actual: &[Point3<f64>], expected: &[Point3<f64>], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).norm() < tolerance, "{:?} vs {:?}", a, e);
    }
}

#[test]
fn test_raw_ndc_round_trip_with_model_view() {
    let (expected, depth) = synthetic_scene();
    let result = reconstructor(DepthStrategy::RawNdc, ViewConvention::ModelView)
        .reconstruct_frame(&frame(world_to_view(), depth))
        .unwrap();
    assert_eq!(result.dropped, 0);
    assert_points_close(&result.points, &expected, 1e-2);
}

#[test]
fn test_linearized_round_trip_with_model_view() {
    let (expected, depth) = synthetic_scene();
    let result = reconstructor(DepthStrategy::Linearized, ViewConvention::ModelView)
        .reconstruct_frame(&frame(world_to_view(), depth))
        .unwrap();
    assert_points_close(&result.points, &expected, 1e-2);
}

#[test]
fn test_view_to_world_convention_uses_matrix_directly() {
    let (expected, depth) = synthetic_scene();
    let to_world = world_to_view().try_inverse().unwrap();
    for strategy in [DepthStrategy::RawNdc, DepthStrategy::Linearized] {
        let result = reconstructor(strategy, ViewConvention::ViewToWorld)
            .reconstruct_frame(&frame(to_world, depth.clone()))
            .unwrap();
        assert_points_close(&result.points, &expected, 1e-2);
    }
}

#[test]
fn test_colors_follow_points_row_major() {
    let (_, depth) = synthetic_scene();
    let result = reconstructor(DepthStrategy::RawNdc, ViewConvention::ModelView)
        .reconstruct_frame(&frame(world_to_view(), depth))
        .unwrap();
    assert_eq!(result.colors.len(), RES * RES);
    assert!(result.colors.iter().all(|c| *c == [1.0, 0.0, 0.2]));
}

#[test]
fn test_non_finite_depth_is_dropped_and_counted() {
    let (_, mut depth) = synthetic_scene();
    depth.values[3] = f32::NAN;
    let result = reconstructor(DepthStrategy::RawNdc, ViewConvention::ModelView)
        .reconstruct_frame(&frame(world_to_view(), depth))
        .unwrap();
    assert_eq!(result.dropped, 1);
    assert_eq!(result.points.len(), RES * RES - 1);
}

#[test]
fn test_output_resolution_resamples_buffers() {
    let depth = DepthBuffer::filled(RES, RES, 0.9);
    let reconstructor = Reconstructor::new(&ReconstructionConfig {
        resolution: Some(10),
        ..ReconstructionConfig::default()
    });
    let result = reconstructor
        .reconstruct_frame(&frame(world_to_view(), depth))
        .unwrap();
    assert_eq!(result.points.len(), 100);
}

#[test]
fn test_frames_concatenate_in_order() {
    let (expected, depth) = synthetic_scene();
    let frames = vec![frame(world_to_view(), depth.clone()), frame(world_to_view(), depth)];
    let cloud = reconstructor(DepthStrategy::RawNdc, ViewConvention::ModelView)
        .reconstruct_frames(&frames)
        .unwrap();
    assert_eq!(cloud.len(), 2 * RES * RES);
    assert_points_close(&cloud.points[..RES * RES], &expected, 1e-2);
    assert_points_close(&cloud.points[RES * RES..], &expected, 1e-2);
    assert!(cloud.bounds().is_some());
}

#[test]
fn test_camera_pose_from_model_view() {
    let (_, depth) = synthetic_scene();
    let (position, _) = frame(world_to_view(), depth)
        .camera_pose(ViewConvention::ModelView)
        .unwrap();
    assert!((position - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-9);
}

#[test]
fn test_malformed_buffers_are_rejected_not_indexed() {
    let (_, depth) = synthetic_scene();
    let mut short = frame(world_to_view(), depth.clone());
    short.depth.values.pop();
    let result = reconstructor(DepthStrategy::RawNdc, ViewConvention::ModelView)
        .reconstruct_frame(&short);
    assert!(matches!(result, Err(maze_traverse::DomainError::InvalidInput { .. })));

    let mut short_color = frame(world_to_view(), depth);
    short_color.color.pixels.truncate(RES);
    let result = reconstructor(DepthStrategy::Linearized, ViewConvention::ModelView)
        .reconstruct_frames(&[short_color]);
    assert!(result.is_err());
}

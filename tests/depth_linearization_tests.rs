use approx::assert_relative_eq;
use maze_traverse::domains::reconstruction::*;
use maze_traverse::DomainError;
use nalgebra::Matrix4;

fn gl_projection(near: f64, far: f64) -> Matrix4<f64> {
    Matrix4::new_perspective(4.0 / 3.0, 60f64.to_radians(), near, far)
}

// Pins the plane naming: with a standard GL matrix `near` really is the
// near plane, and depth 0 maps to it.
#[test]
fn test_gl_planes_extract_in_named_order() {
    let projection = gl_projection(0.1, 100.0);
    let planes = extract_clip_planes(&projection).unwrap();
    assert_relative_eq!(planes.near, 0.1, epsilon = 1e-9);
    assert_relative_eq!(planes.far, 100.0, epsilon = 1e-6);

    assert_relative_eq!(planes.linearize_value(0.0, DepthConvention::Standard), 0.1, epsilon = 1e-9);
    assert_relative_eq!(planes.linearize_value(1.0, DepthConvention::Standard), 100.0, epsilon = 1e-6);
}

#[test]
fn test_linearize_inverts_the_projection() {
    let projection = gl_projection(0.5, 50.0);
    let planes = extract_clip_planes(&projection).unwrap();
    for view_depth in [0.5, 1.0, 3.0, 12.5, 49.0] {
        let clip = projection * nalgebra::Vector4::new(0.0, 0.0, -view_depth, 1.0);
        let depth = (clip.z / clip.w + 1.0) * 0.5;
        let linear = planes.linearize_value(depth, DepthConvention::Standard);
        assert_relative_eq!(linear, view_depth, max_relative = 1e-9);
    }
}

#[test]
fn test_linearize_is_monotonic() {
    let planes = extract_clip_planes(&gl_projection(1.0, 1000.0)).unwrap();
    let mut previous = f64::NEG_INFINITY;
    for i in 0..=1000 {
        let z = planes.linearize_value(i as f64 / 1000.0, DepthConvention::Standard);
        assert!(z >= previous, "depth decreased at step {}", i);
        previous = z;
    }
}

#[test]
fn test_linearize_keeps_buffer_shape() {
    let depth = DepthBuffer::new(3, 2, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]).unwrap();
    let linear = linearize(&depth, &gl_projection(1.0, 10.0), DepthConvention::Standard).unwrap();
    assert_eq!(linear.width, 3);
    assert_eq!(linear.height, 2);
    assert_relative_eq!(linear.values[0], 1.0, epsilon = 1e-5);
    assert_relative_eq!(linear.values[5], 10.0, epsilon = 1e-4);
}

#[test]
fn test_degenerate_projection_is_rejected() {
    let mut projection = gl_projection(1.0, 10.0);
    projection[(2, 2)] = -1.0;
    let depth = DepthBuffer::filled(1, 1, 0.5);
    assert!(matches!(
        linearize(&depth, &projection, DepthConvention::Standard),
        Err(DomainError::DegenerateProjection { a, .. }) if a == -1.0
    ));
}

#[test]
fn test_depth_statistics_and_histogram() {
    let buffers = [
        DepthBuffer::new(2, 1, vec![1.0, 10.0]).unwrap(),
        DepthBuffer::new(2, 1, vec![100.0, 0.0]).unwrap(),
    ];
    let stats = DepthStats::of_buffers(buffers.iter()).unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.max, 100.0);

    let hist = LogDepthHistogram::of_buffers(buffers.iter(), DEFAULT_HISTOGRAM_BINS);
    assert_eq!(hist.counts.len(), DEFAULT_HISTOGRAM_BINS);
    assert_eq!(hist.total(), 3);
    assert_eq!(hist.skipped, 1);
}

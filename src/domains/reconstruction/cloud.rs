use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds3 {
    pub fn extent(&self) -> nalgebra::Vector3<f64> {
        self.max - self.min
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// Colored world-space points. Append-only; frames and trajectories are
/// concatenated without deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point3<f64>>,
    /// RGB in [0, 1].
    pub colors: Vec<[f32; 3]>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: Point3<f64>, color: [f32; 3]) {
        self.points.push(point);
        self.colors.push(color);
    }

    pub fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (Point3<f64>, [f32; 3])>,
    {
        for (point, color) in iter {
            self.push(point, color);
        }
    }

    pub fn append(&mut self, other: &mut PointCloud) {
        self.points.append(&mut other.points);
        self.colors.append(&mut other.colors);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point3<f64>, &[f32; 3])> {
        self.points.iter().zip(self.colors.iter())
    }

    pub fn bounds(&self) -> Option<Bounds3> {
        let first = self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Bounds3 { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_every_point() {
        let mut cloud = PointCloud::new();
        cloud.push(Point3::new(1.0, -2.0, 3.0), [1.0, 0.0, 0.0]);
        cloud.push(Point3::new(-1.0, 4.0, 0.5), [0.0, 1.0, 0.0]);
        let bounds = cloud.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, 0.5));
        assert_eq!(bounds.max, Point3::new(1.0, 4.0, 3.0));
        assert!(cloud.points.iter().all(|p| bounds.contains(p)));
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut a = PointCloud::new();
        a.push(Point3::origin(), [0.0; 3]);
        let mut b = a.clone();
        a.append(&mut b);
        assert_eq!(a.len(), 2);
        assert!(b.is_empty());
    }
}

//! Oriented point container: positions plus unit normals, no connectivity.
//!
//! The cloud is read-only during estimation and may be shared across
//! concurrently running estimator instances. Triangles copy vertex data out
//! of the cloud at generation time, so the cloud may be mutated or dropped
//! once generation has completed.

use nalgebra::{Point3, Vector3};

use crate::{CurvatureError, Result};

#[derive(Debug, Clone, Default)]
pub struct OrientedPointCloud {
    pub points: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
}

impl OrientedPointCloud {
    /// Build a cloud from matching position and normal arrays.
    pub fn new(points: Vec<Point3<f64>>, normals: Vec<Vector3<f64>>) -> Result<Self> {
        if normals.len() != points.len() {
            return Err(CurvatureError::InvalidInput(format!(
                "Normal count {} does not match point count {}",
                normals.len(),
                points.len()
            )));
        }
        Ok(Self { points, normals })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy out the position/normal pair at `index`, failing fast when the
    /// index falls outside the cloud.
    pub fn get(&self, index: usize) -> Result<(Point3<f64>, Vector3<f64>)> {
        match (self.points.get(index), self.normals.get(index)) {
            (Some(p), Some(n)) => Ok((*p, *n)),
            _ => Err(CurvatureError::OutOfRange {
                index,
                min: 0,
                max: self.points.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_mismatch_is_rejected() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let normals = vec![Vector3::new(0.0, 0.0, 1.0)];
        let err = OrientedPointCloud::new(points, normals).unwrap_err();
        assert!(err.to_string().contains("Normal count"));
    }

    #[test]
    fn get_is_bounds_checked() {
        let cloud = OrientedPointCloud::new(
            vec![Point3::new(1.0, 2.0, 3.0)],
            vec![Vector3::new(0.0, 0.0, 1.0)],
        )
        .unwrap();

        let (p, n) = cloud.get(0).unwrap();
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));

        match cloud.get(1) {
            Err(CurvatureError::OutOfRange { index: 1, max: 1, .. }) => {}
            other => panic!("expected OutOfRange, got {:?}", other.map(|_| ())),
        }
    }
}

//! Radius neighbor search over an oriented point cloud.
//!
//! Produces the candidate id lists fed into
//! [`CncEstimator::compute_with_ids`](crate::CncEstimator::compute_with_ids).
//! Backed by an rstar R-tree built once per cloud; queries are read-only and
//! safe to run from many threads.

use nalgebra::Point3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::point_cloud::OrientedPointCloud;

struct IndexedPoint {
    id: usize,
    position: [f64; 3],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

pub struct RadiusIndex {
    tree: RTree<IndexedPoint>,
}

impl RadiusIndex {
    pub fn build(cloud: &OrientedPointCloud) -> Self {
        let wrappers: Vec<IndexedPoint> = cloud
            .points
            .iter()
            .enumerate()
            .map(|(id, p)| IndexedPoint {
                id,
                position: [p.x, p.y, p.z],
            })
            .collect();
        Self {
            tree: RTree::bulk_load(wrappers),
        }
    }

    /// Ids of every point within `radius` of `center`, the query point itself
    /// included when it belongs to the cloud. Order is unspecified.
    pub fn within_radius(&self, center: &Point3<f64>, radius: f64) -> Vec<usize> {
        let query = [center.x, center.y, center.z];
        self.tree
            .locate_within_distance(query, radius * radius)
            .map(|p| p.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn radius_query_returns_expected_ids() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.0, 0.9, 0.0),
            Point3::new(5.0, 0.0, 0.0),
        ];
        let normals = vec![Vector3::z(); 4];
        let cloud = OrientedPointCloud::new(points, normals).unwrap();

        let index = RadiusIndex::build(&cloud);
        let mut ids = index.within_radius(&Point3::origin(), 1.0);
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);

        assert!(index
            .within_radius(&Point3::new(10.0, 0.0, 0.0), 1.0)
            .is_empty());
    }
}

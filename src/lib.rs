//! Corrected Normal Current (CNC) curvature estimation for oriented point clouds.
//!
//! Estimates principal curvatures and curvature directions at a point of a
//! discrete point cloud (positions and normals, no connectivity). A local
//! neighborhood is turned into a small set of "ghost" triangles, per-triangle
//! corrected-normal-current measures are integrated in closed form from the
//! linearly interpolated normal field, and the accumulated anisotropic measure
//! is diagonalized into principal curvatures and directions.
//!
//! The crate provides:
//! - [`OrientedPointCloud`]: the read-only point container (positions + normals)
//! - [`NeighborRange`]: a validated, optionally indirected candidate-index range
//! - [`Triangle`]: the closed-form mu0/mu1/mu2/muXY measures for one triangle
//! - [`TriangleGeneration`]: the four neighborhood-to-triangle strategies
//! - [`CncEstimator`]: generation, accumulation, and finalization at one point
//! - [`RadiusIndex`] and [`estimate_curvatures`]: radius search and a
//!   rayon-parallel whole-cloud driver
//!
//! # Example
//!
//! ```ignore
//! use cnc_curvature::{CncEstimator, OrientedPointCloud, TriangleGeneration};
//!
//! let cloud = OrientedPointCloud::new(points, normals)?;
//! let mut fit = CncEstimator::new(TriangleGeneration::AvgHexagram);
//! fit.set_eval_point(cloud.points[0], cloud.normals[0]);
//! fit.compute_with_ids(&neighbor_ids, &cloud)?;
//! let (k1, k2) = (fit.kmin(), fit.kmax());
//! ```

pub mod batch;
pub mod estimator;
pub mod generate;
pub mod point_cloud;
pub mod range;
pub mod search;
pub mod triangle;

pub use batch::{estimate_curvatures, PointCurvature};
pub use estimator::{curvatures_from_tensor, CncEstimator, FitStatus};
pub use generate::{GenerationConfig, TriangleGeneration};
pub use point_cloud::OrientedPointCloud;
pub use range::NeighborRange;
pub use search::RadiusIndex;
pub use triangle::Triangle;

pub type Result<T> = std::result::Result<T, CurvatureError>;

#[derive(Debug, thiserror::Error)]
pub enum CurvatureError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An index slot fell outside its validated bound. This is a fail-fast
    /// precondition violation, never silently clamped.
    #[error("Index {index} out of range [{min}, {max})")]
    OutOfRange {
        index: usize,
        min: usize,
        max: usize,
    },

    /// Too few usable candidates to run the requested generation strategy.
    #[error("Degenerate neighborhood: needed {needed} candidates, got {got}")]
    DegenerateNeighborhood { needed: usize, got: usize },
}

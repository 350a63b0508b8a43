//! Neighborhood-to-triangle generation strategies.
//!
//! All four strategies consume the same inputs: a [`NeighborRange`] over
//! candidate indices, the point cloud, and the evaluation point. They differ
//! in how they trade bias, variance, and determinism:
//!
//! - `Uniform`: up to `max_triangles` random draws of 3 distinct candidates;
//!   draws with a repeated index are rejected, so fewer triangles may come out.
//! - `Independent`: one random permutation of the candidates, chunked into
//!   disjoint triples; no point is reused across triangles.
//! - `Hexagram`: deterministic; picks one nearest neighbor per 60-degree
//!   sector of a tangent-plane star and builds 2 interleaved triangles.
//! - `AvgHexagram`: deterministic; averages every neighbor assigned to each
//!   sector instead of picking one, trading local detail for noise reduction.
//!
//! Random draws use the thread-local generator, so concurrently running
//! estimator instances never share mutable RNG state.

use std::f64::consts::FRAC_PI_3;

use nalgebra::{Point3, Vector3};
use rand::seq::SliceRandom;

use crate::point_cloud::OrientedPointCloud;
use crate::range::NeighborRange;
use crate::triangle::Triangle;
use crate::{CurvatureError, Result};

/// The closed family of generation strategies, chosen at estimator
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangleGeneration {
    #[default]
    Uniform,
    Independent,
    Hexagram,
    AvgHexagram,
}

/// Strategy parameters shared by the estimator.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    /// Draw-attempt budget for `Uniform`, triangle cap for `Independent`.
    pub max_triangles: usize,
    /// Hexagram-family blend weight between the evaluation normal (0.0) and
    /// the average neighbor normal (1.0).
    pub normal_blend: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_triangles: 100,
            normal_blend: 0.5,
        }
    }
}

/// Run one strategy, appending the produced triangles to `out` and returning
/// their count.
pub(crate) fn generate(
    method: TriangleGeneration,
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    eval_position: &Point3<f64>,
    eval_normal: &Vector3<f64>,
    out: &mut Vec<Triangle>,
) -> Result<usize> {
    match method {
        TriangleGeneration::Uniform => generate_uniform(config, range, cloud, out),
        TriangleGeneration::Independent => generate_independent(config, range, cloud, out),
        TriangleGeneration::Hexagram => {
            generate_hexagram(config, range, cloud, eval_position, eval_normal, out)
        }
        TriangleGeneration::AvgHexagram => {
            generate_avg_hexagram(config, range, cloud, eval_position, eval_normal, out)
        }
    }
}

fn generate_uniform(
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    out: &mut Vec<Triangle>,
) -> Result<usize> {
    if range.len() < 3 {
        return Err(CurvatureError::DegenerateNeighborhood {
            needed: 3,
            got: range.len(),
        });
    }

    let mut rng = rand::thread_rng();
    let mut produced = 0;
    for _ in 0..config.max_triangles {
        let i1 = range.sample(&mut rng)?;
        let i2 = range.sample(&mut rng)?;
        let i3 = range.sample(&mut rng)?;
        if i1 == i2 || i1 == i3 || i2 == i3 {
            continue;
        }

        let (p1, n1) = cloud.get(i1)?;
        let (p2, n2) = cloud.get(i2)?;
        let (p3, n3) = cloud.get(i3)?;
        out.push(Triangle::new([p1, p2, p3], [n1, n2, n3]));
        produced += 1;
    }
    Ok(produced)
}

fn generate_independent(
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    out: &mut Vec<Triangle>,
) -> Result<usize> {
    if range.len() < 3 {
        return Err(CurvatureError::DegenerateNeighborhood {
            needed: 3,
            got: range.len(),
        });
    }

    let mut ids: Vec<usize> = range.iter().collect();
    ids.shuffle(&mut rand::thread_rng());

    let cap = config.max_triangles.min(ids.len() / 3);
    for triple in ids.chunks_exact(3).take(cap) {
        let (p1, n1) = cloud.get(triple[0])?;
        let (p2, n2) = cloud.get(triple[1])?;
        let (p3, n3) = cloud.get(triple[2])?;
        out.push(Triangle::new([p1, p2, p3], [n1, n2, n3]));
    }
    Ok(cap)
}

/// Tangent-plane star geometry shared by the hexagram strategies: an
/// orthonormal tangent pair `(u, v)` around the blended normal and 6 target
/// offsets at 60-degree increments, scaled by the average neighbor distance.
struct SectorFrame {
    targets: [Vector3<f64>; 6],
    avg_distance2: f64,
}

fn sector_frame(
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    eval_position: &Point3<f64>,
    eval_normal: &Vector3<f64>,
) -> Result<SectorFrame> {
    let mut avg_distance = 0.0;
    let mut avg_normal = Vector3::zeros();
    let mut count = 0usize;

    for id in range.iter() {
        let (p, n) = cloud.get(id)?;
        // The evaluation point may appear among its own candidates; it must
        // not count as a neighbor.
        if p == *eval_position {
            continue;
        }
        avg_distance += (p - eval_position).norm();
        avg_normal += n;
        count += 1;
    }

    if count == 0 {
        return Err(CurvatureError::DegenerateNeighborhood {
            needed: 1,
            got: 0,
        });
    }
    avg_distance /= count as f64;

    let norm = avg_normal.norm();
    let avg_normal = if norm > f64::EPSILON {
        avg_normal / norm
    } else {
        *eval_normal
    };

    let mut axis = (1.0 - config.normal_blend) * eval_normal + config.normal_blend * avg_normal;
    let norm = axis.norm();
    axis = if norm > f64::EPSILON {
        axis / norm
    } else {
        *eval_normal
    };

    // World axis least aligned with the blended normal, used to seed the
    // tangent pair.
    let seed = if axis.x.abs() > axis.y.abs() {
        if axis.x.abs() > axis.z.abs() {
            Vector3::y()
        } else {
            Vector3::x()
        }
    } else if axis.y.abs() > axis.z.abs() {
        Vector3::z()
    } else {
        Vector3::x()
    };
    let u = axis.cross(&seed).normalize();
    let v = axis.cross(&u).normalize();

    let mut targets = [Vector3::zeros(); 6];
    for (j, target) in targets.iter_mut().enumerate() {
        let (sin, cos) = (j as f64 * FRAC_PI_3).sin_cos();
        *target = avg_distance * (cos * u + sin * v);
    }

    Ok(SectorFrame {
        targets,
        avg_distance2: avg_distance * avg_distance,
    })
}

fn push_star_triangles(
    vertices: &[(Point3<f64>, Vector3<f64>); 6],
    out: &mut Vec<Triangle>,
) -> usize {
    // Alternating sectors form the two interleaved triangles of the star.
    for base in 0..2 {
        out.push(Triangle::new(
            [
                vertices[base].0,
                vertices[base + 2].0,
                vertices[base + 4].0,
            ],
            [
                vertices[base].1,
                vertices[base + 2].1,
                vertices[base + 4].1,
            ],
        ));
    }
    2
}

fn generate_hexagram(
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    eval_position: &Point3<f64>,
    eval_normal: &Vector3<f64>,
    out: &mut Vec<Triangle>,
) -> Result<usize> {
    let frame = sector_frame(config, range, cloud, eval_position, eval_normal)?;

    // Each sector starts at the evaluation point itself with the average
    // neighbor distance as the beat-this bound; the first-seen strictly
    // closer neighbor wins, which keeps tie-breaking stable.
    let mut best = [(*eval_position, *eval_normal); 6];
    let mut best_d2 = [frame.avg_distance2; 6];

    for id in range.iter() {
        let (p, n) = cloud.get(id)?;
        if p == *eval_position {
            continue;
        }
        let d = p - eval_position;
        for j in 0..6 {
            let d2 = (d - frame.targets[j]).norm_squared();
            if d2 < best_d2[j] {
                best[j] = (p, n);
                best_d2[j] = d2;
            }
        }
    }

    Ok(push_star_triangles(&best, out))
}

fn generate_avg_hexagram(
    config: &GenerationConfig,
    range: &NeighborRange,
    cloud: &OrientedPointCloud,
    eval_position: &Point3<f64>,
    eval_normal: &Vector3<f64>,
    out: &mut Vec<Triangle>,
) -> Result<usize> {
    let frame = sector_frame(config, range, cloud, eval_position, eval_normal)?;

    let mut position_sums = [Vector3::zeros(); 6];
    let mut normal_sums = [Vector3::zeros(); 6];
    let mut counts = [0usize; 6];

    for id in range.iter() {
        let (p, n) = cloud.get(id)?;
        if p == *eval_position {
            continue;
        }
        let d = p - eval_position;

        // Nearest sector target, no distance threshold: every neighbor is
        // assigned to exactly one sector.
        let mut sector = 0;
        let mut sector_d2 = f64::INFINITY;
        for j in 0..6 {
            let d2 = (d - frame.targets[j]).norm_squared();
            if d2 < sector_d2 {
                sector = j;
                sector_d2 = d2;
            }
        }

        position_sums[sector] += p.coords;
        normal_sums[sector] += n;
        counts[sector] += 1;
    }

    let mut vertices = [(*eval_position, *eval_normal); 6];
    for j in 0..6 {
        if counts[j] > 0 {
            let inv = 1.0 / counts[j] as f64;
            vertices[j] = (Point3::from(position_sums[j] * inv), normal_sums[j] * inv);
        }
    }

    Ok(push_star_triangles(&vertices, out))
}

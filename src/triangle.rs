//! Ghost triangle and its corrected-normal-current measures.
//!
//! Each measure is the exact integral of a quantity of the linearly
//! interpolated normal field over the triangle; no sampling happens inside a
//! single triangle. With vertices `A, B, C`, vertex normals `uA, uB, uC` and
//! the (unnormalized) average normal `uM = (uA + uB + uC) / 3`:
//!
//! - `mu0 = 1/2 <uM | (B-A) x (C-A)>` is a signed area. Its sign tells
//!   whether the winding is consistent with the interpolated field.
//! - `mu1 = 1/2 <uM | (uC-uB) x A + (uA-uC) x B + (uB-uA) x C>` integrates
//!   the total curvature density `k1 + k2`, so the mean curvature of a patch
//!   is `sum(mu1) / (2 sum(mu0))`.
//! - `mu2 = 1/2 <uA | uB x uC>` integrates the Gaussian curvature density:
//!   `sum(mu2) / sum(mu0) = k1 * k2`.
//! - `mu_xy` is the 3x3 anisotropic measure whose symmetrized, area-normalized
//!   form has eigenvalues `(-k2, -k1)` in the tangent plane.
//!
//! Every formula takes a `swapped` flag that evaluates it under the odd vertex
//! permutation `(A, C, B)`. Finalization uses it to re-accumulate triangles
//! whose signed area came out negative; skipping that step biases estimates
//! near orientation flips.

use nalgebra::{Matrix3, Point3, Vector3};

/// An immutable triple of (position, normal) vertex pairs.
///
/// Equality compares the three positions only: geometric identity is what
/// matters for deduplication and debugging, normals are excluded.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub positions: [Point3<f64>; 3],
    pub normals: [Vector3<f64>; 3],
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.positions == other.positions
    }
}

impl Triangle {
    pub fn new(positions: [Point3<f64>; 3], normals: [Vector3<f64>; 3]) -> Self {
        Self { positions, normals }
    }

    /// Vertex data in evaluation order: `(A, B, C)` plain, `(A, C, B)` swapped.
    fn ordered(&self, swapped: bool) -> ([Vector3<f64>; 3], [Vector3<f64>; 3]) {
        let (b, c) = if swapped { (2, 1) } else { (1, 2) };
        (
            [
                self.positions[0].coords,
                self.positions[b].coords,
                self.positions[c].coords,
            ],
            [self.normals[0], self.normals[b], self.normals[c]],
        )
    }

    /// Signed area-like measure.
    pub fn mu0(&self, swapped: bool) -> f64 {
        let ([a, b, c], [ua, ub, uc]) = self.ordered(swapped);
        let um = (ua + ub + uc) / 3.0;
        0.5 * um.dot(&(b - a).cross(&(c - a)))
    }

    /// Mean-curvature measure (integrates `k1 + k2` over the triangle).
    pub fn mu1(&self, swapped: bool) -> f64 {
        let ([a, b, c], [ua, ub, uc]) = self.ordered(swapped);
        let um = (ua + ub + uc) / 3.0;
        0.5 * um.dot(&((uc - ub).cross(&a) + (ua - uc).cross(&b) + (ub - ua).cross(&c)))
    }

    /// Gaussian-curvature measure (the signed area swept by the normals).
    pub fn mu2(&self, swapped: bool) -> f64 {
        let (_, [ua, ub, uc]) = self.ordered(swapped);
        0.5 * ua.dot(&ub.cross(&uc))
    }

    /// Anisotropic tensor measure.
    ///
    /// Entry `(i, j)` is `1/2 <uM | (uC-uA)[j] e_i x (B-A) - (uB-uA)[j] e_i x (C-A)>`,
    /// written below through `<uM | e_i x w> = (w x uM)[i]` as a pair of outer
    /// products.
    pub fn mu_xy(&self, swapped: bool) -> Matrix3<f64> {
        let ([a, b, c], [ua, ub, uc]) = self.ordered(swapped);
        let um = (ua + ub + uc) / 3.0;
        let ab = b - a;
        let ac = c - a;
        let uab = ub - ua;
        let uac = uc - ua;
        0.5 * (ab.cross(&um) * uac.transpose() - ac.cross(&um) * uab.transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_triangle() -> Triangle {
        let n = Vector3::new(0.0, 0.0, 1.0);
        Triangle::new(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            [n, n, n],
        )
    }

    /// Octant triangle on the unit sphere with exact outward normals.
    fn sphere_triangle() -> Triangle {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        Triangle::new([a, b, c], [a.coords, b.coords, c.coords])
    }

    #[test]
    fn mu0_is_signed_area_on_a_flat_patch() {
        let tri = flat_triangle();
        assert!((tri.mu0(false) - 0.5).abs() < 1e-15);

        // Reversed winding against the same normals flips the sign.
        let flipped = Triangle::new(
            [tri.positions[0], tri.positions[2], tri.positions[1]],
            tri.normals,
        );
        assert!((flipped.mu0(false) + 0.5).abs() < 1e-15);
    }

    #[test]
    fn swapped_flag_matches_explicit_odd_permutation() {
        let tri = sphere_triangle();
        let perm = Triangle::new(
            [tri.positions[0], tri.positions[2], tri.positions[1]],
            [tri.normals[0], tri.normals[2], tri.normals[1]],
        );
        assert_eq!(tri.mu0(true), perm.mu0(false));
        assert_eq!(tri.mu1(true), perm.mu1(false));
        assert_eq!(tri.mu2(true), perm.mu2(false));
        assert_eq!(tri.mu_xy(true), perm.mu_xy(false));
        assert!((tri.mu0(true) + tri.mu0(false)).abs() < 1e-15);
    }

    #[test]
    fn curvature_measures_vanish_on_a_flat_patch() {
        let tri = flat_triangle();
        assert!(tri.mu1(false).abs() < 1e-15);
        assert!(tri.mu2(false).abs() < 1e-15);
        assert!(tri.mu_xy(false).norm() < 1e-15);
    }

    #[test]
    fn unit_sphere_ratios_recover_curvatures() {
        // For vertex data on a sphere of radius R with exact normals the
        // interpolated field satisfies u = p / R, which makes
        // mu1 = (2/R) mu0 and mu2 = (1/R^2) mu0 exact identities.
        let tri = sphere_triangle();
        let mu0 = tri.mu0(false);
        assert!(mu0 > 0.0);
        assert!((tri.mu1(false) / mu0 - 2.0).abs() < 1e-12);
        assert!((tri.mu2(false) / mu0 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn equality_ignores_normals() {
        let tri = flat_triangle();
        let other = Triangle::new(tri.positions, [Vector3::new(1.0, 0.0, 0.0); 3]);
        assert_eq!(tri, other);

        let moved = Triangle::new(
            [
                Point3::new(0.0, 0.0, 1.0),
                tri.positions[1],
                tri.positions[2],
            ],
            tri.normals,
        );
        assert_ne!(tri, moved);
    }
}

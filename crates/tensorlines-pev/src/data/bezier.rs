//! Bernstein-Bezier polynomials on the product of two barycentric triangles
//!
//! A `ProductBezier` represents a polynomial over `dir_tri x pos_tri` in the
//! Bernstein basis of a (runtime) degree pair:
//! - construction from samples at the uniform domain-point lattice (a square
//!   collocation solve)
//! - evaluation at a pair of barycentric coordinates
//! - exact 4-way midpoint subdivision of either factor
//! - coefficient extrema, which bound the polynomial over the whole domain
//!   (convex-hull property), and the derived root-exclusion sign test
//!
//! Subdivision goes through per-degree matrices built once from the polar
//! form (blossom) of the Bernstein basis. All matrix entries are dyadic
//! rationals, so the tables are exact in f64 and child coefficients are
//! affine combinations of the parent's.

use nalgebra::{DMatrix, DVector, Vector3};
use once_cell::sync::Lazy;

use crate::error::{PevError, PevResult};

/// Highest per-factor degree with a precomputed subdivision table
pub const MAX_DEGREE: usize = 3;

/// Number of Bernstein coefficients of a triangular patch of the given degree
pub fn lattice_size(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

/// Multi-indices `(i0, i1, i2)` with `i0 + i1 + i2 = degree`, in the fixed
/// lexicographic order used for coefficient storage
pub fn multi_indices(degree: usize) -> Vec<[usize; 3]> {
    let mut indices = Vec::with_capacity(lattice_size(degree));
    for i0 in (0..=degree).rev() {
        for i1 in (0..=degree - i0).rev() {
            indices.push([i0, i1, degree - i0 - i1]);
        }
    }
    indices
}

/// Position of a multi-index in the `multi_indices` enumeration
fn lattice_index(degree: usize, mi: &[usize; 3]) -> usize {
    let block = degree - mi[0];
    block * (block + 1) / 2 + block - mi[1]
}

/// Uniform domain points `(i0/d, i1/d, i2/d)`; the centroid for degree 0
pub fn domain_points(degree: usize) -> Vec<Vector3<f64>> {
    if degree == 0 {
        return vec![Vector3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)];
    }
    multi_indices(degree)
        .iter()
        .map(|mi| {
            Vector3::new(
                mi[0] as f64 / degree as f64,
                mi[1] as f64 / degree as f64,
                mi[2] as f64 / degree as f64,
            )
        })
        .collect()
}

fn factorial(n: usize) -> f64 {
    (1..=n).product::<usize>() as f64
}

/// Bernstein basis value `B_mi(bary)` of the given degree
fn bernstein(degree: usize, mi: &[usize; 3], bary: &Vector3<f64>) -> f64 {
    let multinomial = factorial(degree) / (factorial(mi[0]) * factorial(mi[1]) * factorial(mi[2]));
    multinomial
        * bary.x.powi(mi[0] as i32)
        * bary.y.powi(mi[1] as i32)
        * bary.z.powi(mi[2] as i32)
}

/// Corners of the k-th midpoint child in parent barycentric coordinates
///
/// The ordering must match `BarycentricTriangle::split` exactly, so that the
/// restriction of a polynomial to a child triangle equals the k-th
/// subdivision of the polynomial.
fn child_vertices(child: usize) -> [Vector3<f64>; 3] {
    let e0 = Vector3::new(1.0, 0.0, 0.0);
    let e1 = Vector3::new(0.0, 1.0, 0.0);
    let e2 = Vector3::new(0.0, 0.0, 1.0);
    let m01 = Vector3::new(0.5, 0.5, 0.0);
    let m12 = Vector3::new(0.0, 0.5, 0.5);
    let m20 = Vector3::new(0.5, 0.0, 0.5);
    match child {
        0 => [e0, m01, m20],
        1 => [m01, e1, m12],
        2 => [m20, m12, e2],
        3 => [m12, m20, m01],
        _ => panic!("midpoint subdivision has exactly 4 children, got index {child}"),
    }
}

/// Subdivision matrix mapping parent coefficients to the k-th child's
///
/// Row `beta` is the polar form of the patch at the child's corners, each
/// repeated `beta_i` times, applied to unit coefficient vectors. One
/// de Casteljau contraction per blossom argument.
fn subdivision_matrix(degree: usize, child: usize) -> DMatrix<f64> {
    let indices = multi_indices(degree);
    let n = indices.len();
    let corners = child_vertices(child);
    let mut table = DMatrix::zeros(n, n);

    for (row, beta) in indices.iter().enumerate() {
        let mut args = Vec::with_capacity(degree);
        for (corner, &count) in corners.iter().zip(beta.iter()) {
            for _ in 0..count {
                args.push(*corner);
            }
        }

        let mut coeffs: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let mut unit = vec![0.0; n];
                unit[i] = 1.0;
                unit
            })
            .collect();

        let mut level = degree;
        for arg in &args {
            let lower = multi_indices(level - 1);
            let mut contracted = Vec::with_capacity(lower.len());
            for alpha in &lower {
                let mut acc = vec![0.0; n];
                for (axis, weight) in [arg.x, arg.y, arg.z].into_iter().enumerate() {
                    let mut upper = *alpha;
                    upper[axis] += 1;
                    let source = &coeffs[lattice_index(level, &upper)];
                    for (a, s) in acc.iter_mut().zip(source) {
                        *a += weight * *s;
                    }
                }
                contracted.push(acc);
            }
            coeffs = contracted;
            level -= 1;
        }

        for (col, weight) in coeffs[0].iter().enumerate() {
            table[(row, col)] = *weight;
        }
    }
    table
}

static SPLIT_TABLES: Lazy<Vec<[DMatrix<f64>; 4]>> = Lazy::new(|| {
    (0..=MAX_DEGREE)
        .map(|degree| {
            [
                subdivision_matrix(degree, 0),
                subdivision_matrix(degree, 1),
                subdivision_matrix(degree, 2),
                subdivision_matrix(degree, 3),
            ]
        })
        .collect()
});

fn split_table(degree: usize, child: usize) -> &'static DMatrix<f64> {
    &SPLIT_TABLES[degree][child]
}

/// A polynomial on the product of two triangular barycentric domains,
/// in the Bernstein basis of degrees `(dir_degree, pos_degree)`
///
/// Coefficients are stored direction-major: the coefficient of the basis
/// product `B_i(dir) * B_j(pos)` lives at `i * lattice_size(pos_degree) + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBezier {
    dir_degree: usize,
    pos_degree: usize,
    coeffs: Vec<f64>,
}

impl ProductBezier {
    /// Wrap an existing coefficient vector
    pub fn from_coefficients(
        dir_degree: usize,
        pos_degree: usize,
        coeffs: Vec<f64>,
    ) -> PevResult<Self> {
        Self::check_degrees(dir_degree, pos_degree)?;
        let expected = lattice_size(dir_degree) * lattice_size(pos_degree);
        if coeffs.len() != expected {
            return Err(PevError::InvalidArgument(format!(
                "degrees ({dir_degree}, {pos_degree}) require {expected} coefficients, got {}",
                coeffs.len()
            )));
        }
        Ok(Self {
            dir_degree,
            pos_degree,
            coeffs,
        })
    }

    /// Recover Bernstein coefficients from values sampled at the product
    /// domain-point lattice, in the same direction-major order
    ///
    /// The collocation system is square and nonsingular for the uniform
    /// lattice (it is the Kronecker product of two nonsingular per-factor
    /// systems), so a failed solve indicates corrupted input.
    pub fn from_samples(
        dir_degree: usize,
        pos_degree: usize,
        samples: &[f64],
    ) -> PevResult<Self> {
        Self::check_degrees(dir_degree, pos_degree)?;
        let dir_indices = multi_indices(dir_degree);
        let pos_indices = multi_indices(pos_degree);
        let n = dir_indices.len() * pos_indices.len();
        if samples.len() != n {
            return Err(PevError::InvalidArgument(format!(
                "degrees ({dir_degree}, {pos_degree}) require {n} samples, got {}",
                samples.len()
            )));
        }

        let dir_points = domain_points(dir_degree);
        let pos_points = domain_points(pos_degree);
        let mut system = DMatrix::zeros(n, n);
        let mut row = 0;
        for dir_point in &dir_points {
            for pos_point in &pos_points {
                let mut col = 0;
                for dir_index in &dir_indices {
                    let dir_basis = bernstein(dir_degree, dir_index, dir_point);
                    for pos_index in &pos_indices {
                        system[(row, col)] =
                            dir_basis * bernstein(pos_degree, pos_index, pos_point);
                        col += 1;
                    }
                }
                row += 1;
            }
        }

        let rhs = DVector::from_column_slice(samples);
        let solution = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| PevError::Numerical("singular Bernstein collocation system".into()))?;
        Ok(Self {
            dir_degree,
            pos_degree,
            coeffs: solution.as_slice().to_vec(),
        })
    }

    fn check_degrees(dir_degree: usize, pos_degree: usize) -> PevResult<()> {
        if dir_degree > MAX_DEGREE || pos_degree > MAX_DEGREE {
            return Err(PevError::InvalidArgument(format!(
                "per-factor degree is limited to {MAX_DEGREE}, got ({dir_degree}, {pos_degree})"
            )));
        }
        Ok(())
    }

    pub fn degrees(&self) -> (usize, usize) {
        (self.dir_degree, self.pos_degree)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Evaluate at a pair of barycentric coordinates
    pub fn eval(&self, dir_bary: &Vector3<f64>, pos_bary: &Vector3<f64>) -> f64 {
        let n_pos = lattice_size(self.pos_degree);
        let mut value = 0.0;
        for (i, dir_index) in multi_indices(self.dir_degree).iter().enumerate() {
            let dir_basis = bernstein(self.dir_degree, dir_index, dir_bary);
            for (j, pos_index) in multi_indices(self.pos_degree).iter().enumerate() {
                value +=
                    self.coeffs[i * n_pos + j] * dir_basis * bernstein(self.pos_degree, pos_index, pos_bary);
            }
        }
        value
    }

    /// The k-th midpoint child in the directional factor
    pub fn split_dir(&self, child: usize) -> Self {
        let table = split_table(self.dir_degree, child);
        let n_dir = lattice_size(self.dir_degree);
        let n_pos = lattice_size(self.pos_degree);
        let mut coeffs = vec![0.0; self.coeffs.len()];
        for bi in 0..n_dir {
            for ai in 0..n_dir {
                let weight = table[(bi, ai)];
                if weight == 0.0 {
                    continue;
                }
                for j in 0..n_pos {
                    coeffs[bi * n_pos + j] += weight * self.coeffs[ai * n_pos + j];
                }
            }
        }
        Self {
            dir_degree: self.dir_degree,
            pos_degree: self.pos_degree,
            coeffs,
        }
    }

    /// The k-th midpoint child in the spatial factor
    pub fn split_pos(&self, child: usize) -> Self {
        let table = split_table(self.pos_degree, child);
        let n_dir = lattice_size(self.dir_degree);
        let n_pos = lattice_size(self.pos_degree);
        let mut coeffs = vec![0.0; self.coeffs.len()];
        for i in 0..n_dir {
            for bj in 0..n_pos {
                for aj in 0..n_pos {
                    let weight = table[(bj, aj)];
                    if weight == 0.0 {
                        continue;
                    }
                    coeffs[i * n_pos + bj] += weight * self.coeffs[i * n_pos + aj];
                }
            }
        }
        Self {
            dir_degree: self.dir_degree,
            pos_degree: self.pos_degree,
            coeffs,
        }
    }

    /// Lower convex-hull bound over the whole domain
    pub fn coeff_min(&self) -> f64 {
        self.coeffs.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Upper convex-hull bound over the whole domain
    pub fn coeff_max(&self) -> f64 {
        self.coeffs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sign of the polynomial over the whole domain: `+1` or `-1` when the
    /// coefficient hull is bounded away from zero, `0` otherwise
    ///
    /// A nonzero result proves the polynomial has no root in the domain.
    pub fn sign(&self) -> i8 {
        if self.coeff_min() > 0.0 {
            1
        } else if self.coeff_max() < 0.0 {
            -1
        } else {
            0
        }
    }
}

//! Barycentric triangles: ordered vertex triples with linear interpolation
//! over barycentric coordinates and 4-way midpoint subdivision.
//!
//! The vertex type is generic so the same shape serves both geometry
//! (`Triangle`, 3-vector vertices) and linearly interpolated tensor fields
//! (`TensorInterp`, 3x3 matrix vertices).

use std::ops::{Add, Index, Mul};

use nalgebra::{Matrix3, Vector3};

/// An ordered vertex triple interpolated linearly in barycentric coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycentricTriangle<V> {
    verts: [V; 3],
}

impl<V> BarycentricTriangle<V>
where
    V: Copy + Add<Output = V> + Mul<f64, Output = V>,
{
    pub fn new(verts: [V; 3]) -> Self {
        Self { verts }
    }

    /// Interpolate at barycentric coordinates `(b0, b1, b2)`
    ///
    /// The caller guarantees `b0 + b1 + b2 = 1` when the interpretation
    /// requires it; no normalization is performed.
    pub fn eval(&self, bary: &Vector3<f64>) -> V {
        self.verts[0] * bary.x + self.verts[1] * bary.y + self.verts[2] * bary.z
    }

    /// Value at the barycenter `(1/3, 1/3, 1/3)`
    pub fn centroid(&self) -> V {
        self.eval(&Vector3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0))
    }

    /// Split into four sub-triangles at the edge midpoints
    ///
    /// The first three children keep one original vertex each; the fourth is
    /// the inverted midpoint triangle in the center.
    pub fn split(&self) -> [Self; 4] {
        let [a, b, c] = self.verts;
        let m01 = (a + b) * 0.5;
        let m12 = (b + c) * 0.5;
        let m20 = (c + a) * 0.5;
        [
            Self::new([a, m01, m20]),
            Self::new([m01, b, m12]),
            Self::new([m20, m12, c]),
            Self::new([m12, m20, m01]),
        ]
    }
}

impl<V> Index<usize> for BarycentricTriangle<V> {
    type Output = V;

    fn index(&self, index: usize) -> &V {
        &self.verts[index]
    }
}

/// A 2-simplex in 3-space, spatial or directional
pub type Triangle = BarycentricTriangle<Vector3<f64>>;

/// A linearly interpolated 3x3 tensor field over a triangle
pub type TensorInterp = BarycentricTriangle<Matrix3<f64>>;

impl Triangle {
    /// Length of the reference edge, used as the termination proxy
    pub fn diameter(&self) -> f64 {
        (self.verts[1] - self.verts[0]).norm()
    }
}

/// A candidate region in the product of the directional and spatial domains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriPair {
    pub dir_tri: Triangle,
    pub pos_tri: Triangle,
}

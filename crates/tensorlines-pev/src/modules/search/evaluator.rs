//! The interface shared by the problem-specific evaluators

use nalgebra::{Matrix3, Vector3};

use crate::data::bezier::ProductBezier;
use crate::data::triangle::TriPair;

/// Outcome of one evaluator decision step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// The region is still indeterminate and must be subdivided
    Split,
    /// Both triangles are below their terminal diameters and no residual
    /// component can be bounded away from zero
    Accept,
    /// Some residual component has a definite sign; no root in this region
    Discard,
}

/// Capability set required by the breadth-first root search
///
/// Implementations are value objects: `split` returns four fresh children
/// and leaves the parent untouched.
pub trait Evaluator: Clone {
    /// Decide Accept / Split / Discard for the current region
    fn eval(&self) -> SearchResult;

    /// Subdivide into four children, alternating between the directional and
    /// the spatial factor
    fn split(&self) -> [Self; 4];

    /// Number of subdivisions that produced this region
    fn split_level(&self) -> u64;

    /// The candidate region in the product domain
    fn tris(&self) -> &TriPair;

    /// Parallelity residual at the region's centroid pair, used to pick a
    /// cluster representative
    fn residual(&self) -> f64;

    /// Cheap conditioning proxy for diagnostic labeling
    fn condition(&self) -> f64;
}

/// Cross-product magnitude of the normalized tensor image against the
/// direction; 0 when the image vanishes (a zero vector is parallel to
/// everything)
///
/// Both operands are normalized so the residual is scale-free.
pub(crate) fn parallelity_residual(tensor: &Matrix3<f64>, dir: &Vector3<f64>) -> f64 {
    match (tensor * dir).try_normalize(0.0) {
        Some(image) => image.cross(dir).norm(),
        None => 0.0,
    }
}

/// Largest-to-smallest absolute coefficient ratio over a set of polynomials
pub(crate) fn coefficient_condition<'a>(polys: impl Iterator<Item = &'a ProductBezier>) -> f64 {
    let mut max_abs = 0.0f64;
    let mut min_abs = f64::INFINITY;
    for poly in polys {
        for coeff in poly.coefficients() {
            let abs = coeff.abs();
            max_abs = max_abs.max(abs);
            min_abs = min_abs.min(abs);
        }
    }
    if min_abs == 0.0 {
        f64::INFINITY
    } else {
        max_abs / min_abs
    }
}

//! Evaluator for the parallel-eigenvector problem
//!
//! The residual is the pair of vectors `(S(x)*r) x r` and `(T(x)*r) x r` over
//! the product of a directional and a spatial triangle. With linearly
//! interpolated tensors each Euclidean component is quadratic in the
//! direction and linear in the position, so six (2, 1) Bernstein polynomials
//! represent the residual exactly.

use crate::data::bezier::{domain_points, ProductBezier};
use crate::data::triangle::{TensorInterp, TriPair, Triangle};
use crate::error::PevResult;

use super::evaluator::{coefficient_condition, parallelity_residual, Evaluator, SearchResult};

/// Sample the three components of `(M(x)*r) x r` on the product lattice and
/// convert them to Bernstein coefficients
///
/// `interp` must already be restricted to the position triangle the lattice
/// refers to. The direction `r` is the unnormalized interpolant of
/// `dir_tri`; the residual is homogeneous in `r`, so signs are unaffected.
pub(crate) fn cross_residual_polys(
    interp: &TensorInterp,
    dir_tri: &Triangle,
    dir_degree: usize,
) -> PevResult<[ProductBezier; 3]> {
    let dir_points = domain_points(dir_degree);
    let pos_points = domain_points(1);
    let n = dir_points.len() * pos_points.len();
    let mut samples = [
        Vec::with_capacity(n),
        Vec::with_capacity(n),
        Vec::with_capacity(n),
    ];
    for dir_point in &dir_points {
        let r = dir_tri.eval(dir_point);
        for pos_point in &pos_points {
            let value = (interp.eval(pos_point) * r).cross(&r);
            samples[0].push(value.x);
            samples[1].push(value.y);
            samples[2].push(value.z);
        }
    }
    Ok([
        ProductBezier::from_samples(dir_degree, 1, &samples[0])?,
        ProductBezier::from_samples(dir_degree, 1, &samples[1])?,
        ProductBezier::from_samples(dir_degree, 1, &samples[2])?,
    ])
}

/// Search state for one candidate region of the parallel-eigenvector problem
#[derive(Debug, Clone)]
pub struct PevEvaluator {
    tris: TriPair,
    s: TensorInterp,
    t: TensorInterp,
    s_poly: [ProductBezier; 3],
    t_poly: [ProductBezier; 3],
    spatial_tolerance: f64,
    direction_tolerance: f64,
    last_split_dir: bool,
    level: u64,
}

impl PevEvaluator {
    /// Build the search state for a region
    ///
    /// `s` and `t` must be the tensor fields restricted to `tris.pos_tri`;
    /// at the seeding stage `pos_tri` is the identity barycentric triangle
    /// and the fields are the caller's vertex samples.
    pub fn new(
        tris: TriPair,
        s: TensorInterp,
        t: TensorInterp,
        spatial_tolerance: f64,
        direction_tolerance: f64,
    ) -> PevResult<Self> {
        let s_poly = cross_residual_polys(&s, &tris.dir_tri, 2)?;
        let t_poly = cross_residual_polys(&t, &tris.dir_tri, 2)?;
        Ok(Self {
            tris,
            s,
            t,
            s_poly,
            t_poly,
            spatial_tolerance,
            direction_tolerance,
            last_split_dir: false,
            level: 0,
        })
    }

    fn polys(&self) -> impl Iterator<Item = &ProductBezier> + '_ {
        self.s_poly.iter().chain(self.t_poly.iter())
    }
}

impl Evaluator for PevEvaluator {
    fn eval(&self) -> SearchResult {
        for poly in self.polys() {
            if poly.sign() != 0 {
                return SearchResult::Discard;
            }
        }
        let d_pos = self.tris.pos_tri.diameter();
        let d_dir = self.tris.dir_tri.diameter();
        if d_pos <= self.spatial_tolerance && d_dir <= self.direction_tolerance {
            SearchResult::Accept
        } else {
            SearchResult::Split
        }
    }

    fn split(&self) -> [Self; 4] {
        let d_pos = self.tris.pos_tri.diameter();
        if self.last_split_dir && d_pos > self.spatial_tolerance {
            let pos_children = self.tris.pos_tri.split();
            let s_children = self.s.split();
            let t_children = self.t.split();
            std::array::from_fn(|k| Self {
                tris: TriPair {
                    dir_tri: self.tris.dir_tri,
                    pos_tri: pos_children[k],
                },
                s: s_children[k],
                t: t_children[k],
                s_poly: std::array::from_fn(|i| self.s_poly[i].split_pos(k)),
                t_poly: std::array::from_fn(|i| self.t_poly[i].split_pos(k)),
                spatial_tolerance: self.spatial_tolerance,
                direction_tolerance: self.direction_tolerance,
                last_split_dir: false,
                level: self.level + 1,
            })
        } else {
            let dir_children = self.tris.dir_tri.split();
            std::array::from_fn(|k| Self {
                tris: TriPair {
                    dir_tri: dir_children[k],
                    pos_tri: self.tris.pos_tri,
                },
                s: self.s,
                t: self.t,
                s_poly: std::array::from_fn(|i| self.s_poly[i].split_dir(k)),
                t_poly: std::array::from_fn(|i| self.t_poly[i].split_dir(k)),
                spatial_tolerance: self.spatial_tolerance,
                direction_tolerance: self.direction_tolerance,
                last_split_dir: true,
                level: self.level + 1,
            })
        }
    }

    fn split_level(&self) -> u64 {
        self.level
    }

    fn tris(&self) -> &TriPair {
        &self.tris
    }

    fn residual(&self) -> f64 {
        let dir = self.tris.dir_tri.centroid().normalize();
        parallelity_residual(&self.s.centroid(), &dir)
            + parallelity_residual(&self.t.centroid(), &dir)
    }

    fn condition(&self) -> f64 {
        coefficient_condition(self.polys())
    }
}

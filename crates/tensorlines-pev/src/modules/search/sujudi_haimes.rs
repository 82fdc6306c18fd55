//! Evaluator for the tensor-field Sujudi-Haimes problem
//!
//! The first residual is the eigenvector condition `(T(x)*r) x r` of the
//! field itself, as in the parallel-eigenvector problem. The second replaces
//! the second tensor with the directional derivative
//! `Tx(x)*rx + Ty(x)*ry + Tz(x)*rz`, which makes each component cubic in the
//! direction and linear in the position, so it needs the (3, 1) Bernstein
//! representation.

use nalgebra::{Matrix3, Vector3};

use crate::data::bezier::{domain_points, ProductBezier};
use crate::data::triangle::{TensorInterp, TriPair, Triangle};
use crate::error::PevResult;

use super::evaluator::{coefficient_condition, parallelity_residual, Evaluator, SearchResult};
use super::pev::cross_residual_polys;

/// Directional derivative tensor at fixed position and direction
fn derivative_tensor(dt: &[Matrix3<f64>; 3], r: &Vector3<f64>) -> Matrix3<f64> {
    dt[0] * r.x + dt[1] * r.y + dt[2] * r.z
}

/// Sample `((Tx(x)*rx + Ty(x)*ry + Tz(x)*rz)*r) x r` on the (3, 1) lattice
fn derivative_residual_polys(
    dt: &[TensorInterp; 3],
    dir_tri: &Triangle,
) -> PevResult<[ProductBezier; 3]> {
    let dir_points = domain_points(3);
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
            let tensors = [dt[0].eval(pos_point), dt[1].eval(pos_point), dt[2].eval(pos_point)];
            let value = (derivative_tensor(&tensors, &r) * r).cross(&r);
            samples[0].push(value.x);
            samples[1].push(value.y);
            samples[2].push(value.z);
        }
    }
    Ok([
        ProductBezier::from_samples(3, 1, &samples[0])?,
        ProductBezier::from_samples(3, 1, &samples[1])?,
        ProductBezier::from_samples(3, 1, &samples[2])?,
    ])
}

/// Search state for one candidate region of the Sujudi-Haimes problem
#[derive(Debug, Clone)]
pub struct SujudiHaimesEvaluator {
    tris: TriPair,
    t: TensorInterp,
    dt: [TensorInterp; 3],
    t_poly: [ProductBezier; 3],
    dt_poly: [ProductBezier; 3],
    spatial_tolerance: f64,
    direction_tolerance: f64,
    min_ev: f64,
    last_split_dir: bool,
    level: u64,
}

impl SujudiHaimesEvaluator {
    /// Build the search state for a region
    ///
    /// `t` and the three derivative fields must be restricted to
    /// `tris.pos_tri`.
    pub fn new(
        tris: TriPair,
        t: TensorInterp,
        dt: [TensorInterp; 3],
        spatial_tolerance: f64,
        direction_tolerance: f64,
        min_ev: f64,
    ) -> PevResult<Self> {
        let t_poly = cross_residual_polys(&t, &tris.dir_tri, 2)?;
        let dt_poly = derivative_residual_polys(&dt, &tris.dir_tri)?;
        Ok(Self {
            tris,
            t,
            dt,
            t_poly,
            dt_poly,
            spatial_tolerance,
            direction_tolerance,
            min_ev,
            last_split_dir: false,
            level: 0,
        })
    }

    fn polys(&self) -> impl Iterator<Item = &ProductBezier> + '_ {
        self.t_poly.iter().chain(self.dt_poly.iter())
    }

    fn center_direction(&self) -> Vector3<f64> {
        self.tris.dir_tri.centroid().normalize()
    }
}

impl Evaluator for SujudiHaimesEvaluator {
    fn eval(&self) -> SearchResult {
        for poly in self.polys() {
            if poly.sign() != 0 {
                return SearchResult::Discard;
            }
        }
        let d_pos = self.tris.pos_tri.diameter();
        let d_dir = self.tris.dir_tri.diameter();
        if d_pos <= self.spatial_tolerance && d_dir <= self.direction_tolerance {
            // the direction is an eigenvector, but near-null magnitudes are
            // not relevant field structure
            let dir = self.center_direction();
            let eigenvalue = (self.t.centroid() * dir).dot(&dir);
            if eigenvalue.abs() < self.min_ev {
                SearchResult::Discard
            } else {
                SearchResult::Accept
            }
        } else {
            SearchResult::Split
        }
    }

    fn split(&self) -> [Self; 4] {
        let d_pos = self.tris.pos_tri.diameter();
        if self.last_split_dir && d_pos > self.spatial_tolerance {
            let pos_children = self.tris.pos_tri.split();
            let t_children = self.t.split();
            let dt_children = [self.dt[0].split(), self.dt[1].split(), self.dt[2].split()];
            std::array::from_fn(|k| Self {
                tris: TriPair {
                    dir_tri: self.tris.dir_tri,
                    pos_tri: pos_children[k],
                },
                t: t_children[k],
                dt: [dt_children[0][k], dt_children[1][k], dt_children[2][k]],
                t_poly: std::array::from_fn(|i| self.t_poly[i].split_pos(k)),
                dt_poly: std::array::from_fn(|i| self.dt_poly[i].split_pos(k)),
                spatial_tolerance: self.spatial_tolerance,
                direction_tolerance: self.direction_tolerance,
                min_ev: self.min_ev,
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
                t: self.t,
                dt: self.dt,
                t_poly: std::array::from_fn(|i| self.t_poly[i].split_dir(k)),
                dt_poly: std::array::from_fn(|i| self.dt_poly[i].split_dir(k)),
                spatial_tolerance: self.spatial_tolerance,
                direction_tolerance: self.direction_tolerance,
                min_ev: self.min_ev,
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
        let dir = self.center_direction();
        let tensors = [
            self.dt[0].centroid(),
            self.dt[1].centroid(),
            self.dt[2].centroid(),
        ];
        parallelity_residual(&self.t.centroid(), &dir)
            + parallelity_residual(&derivative_tensor(&tensors, &dir), &dir)
    }

    fn condition(&self) -> f64 {
        coefficient_condition(self.polys())
    }
}

//! Eigenvalue classification of cluster representatives and output assembly
//!
//! For each representative we estimate the eigenvalues along the found
//! direction (Rayleigh quotients), decompose both tensors, and record which
//! of the real eigenvalues the direction belongs to together with an
//! imaginary-pair flag. A failed decomposition drops the representative and
//! processing continues.

use nalgebra::linalg::Schur;
use nalgebra::{Complex, Matrix3, Normed, Vector3};

use crate::data::point::{PEVPoint, PointList};
use crate::data::triangle::{TensorInterp, Triangle};
use crate::modules::cluster::ClusterRepr;
use crate::modules::search::evaluator::Evaluator;

const SCHUR_EPSILON: f64 = 1e-12;
const SCHUR_MAX_ITERATIONS: usize = 250;

fn complex_eigenvalues(tensor: &Matrix3<f64>) -> Option<Vector3<Complex<f64>>> {
    Schur::try_new(*tensor, SCHUR_EPSILON, SCHUR_MAX_ITERATIONS)
        .map(|schur| schur.complex_eigenvalues())
}

/// The eigenvalue closest to the real estimate, by distance on the complex
/// plane
fn closest_eigenvalue(eigenvalues: &Vector3<Complex<f64>>, estimate: f64) -> Complex<f64> {
    let target = Complex::new(estimate, 0.0);
    let mut best = eigenvalues[0];
    let mut best_distance = f64::INFINITY;
    for eigenvalue in eigenvalues.iter() {
        let distance = (*eigenvalue - target).norm();
        if distance < best_distance {
            best_distance = distance;
            best = *eigenvalue;
        }
    }
    best
}

/// Count the real eigenvalues with strictly greater absolute real part than
/// the matched one; complex pairs contribute nothing
fn eigenvalue_rank(eigenvalues: &Vector3<Complex<f64>>, matched: &Complex<f64>) -> u8 {
    let mut rank = 0;
    for eigenvalue in eigenvalues.iter() {
        if eigenvalue.im != 0.0 {
            continue;
        }
        if eigenvalue.re.abs() > matched.re.abs() {
            rank += 1;
        }
    }
    rank
}

fn has_imaginary(eigenvalues: &Vector3<Complex<f64>>) -> bool {
    eigenvalues.iter().any(|eigenvalue| eigenvalue.im != 0.0)
}

/// Assemble labeled output points from cluster representatives
///
/// The two closures produce the tensors whose eigenvector the direction is
/// supposed to be, given the spatial barycentric center and the unit
/// direction; the Sujudi-Haimes variant composes its directional derivative
/// in the second one.
pub(crate) fn label_points<E, FS, FT>(
    representatives: &[ClusterRepr<E>],
    tri: &Triangle,
    s_at: FS,
    t_at: FT,
) -> PointList
where
    E: Evaluator,
    FS: Fn(&Vector3<f64>, &Vector3<f64>) -> Matrix3<f64>,
    FT: Fn(&Vector3<f64>, &Vector3<f64>) -> Matrix3<f64>,
{
    let mut points = PointList::with_capacity(representatives.len());
    for representative in representatives {
        let pos_tri = &representative.eval.tris().pos_tri;
        let dir_tri = &representative.eval.tris().dir_tri;

        let center = pos_tri.centroid();
        let dir = dir_tri.centroid().normalize();

        let s = s_at(&center, &dir);
        let t = t_at(&center, &dir);

        // eigenvalue estimates along the found direction
        let s_eigenvalue = (s * dir).dot(&dir);
        let t_eigenvalue = (t * dir).dot(&dir);

        let (Some(s_eigenvalues), Some(t_eigenvalues)) =
            (complex_eigenvalues(&s), complex_eigenvalues(&t))
        else {
            continue;
        };

        let s_closest = closest_eigenvalue(&s_eigenvalues, s_eigenvalue);
        let t_closest = closest_eigenvalue(&t_eigenvalues, t_eigenvalue);

        points.push(PEVPoint {
            position: tri.eval(&center),
            s_rank: eigenvalue_rank(&s_eigenvalues, &s_closest),
            t_rank: eigenvalue_rank(&t_eigenvalues, &t_closest),
            eigenvector: dir,
            s_eigenvalue,
            t_eigenvalue,
            s_has_imag: has_imaginary(&s_eigenvalues),
            t_has_imag: has_imaginary(&t_eigenvalues),
            cluster_size: representative.cluster_size,
            pos_uncertainty: pos_tri.diameter(),
            dir_uncertainty: dir_tri.diameter(),
            condition: representative.eval.condition(),
        });
    }
    points
}

/// Labeling for the parallel-eigenvector problem: both tensors come straight
/// from the interpolated fields
pub(crate) fn label_pev_points<E: Evaluator>(
    representatives: &[ClusterRepr<E>],
    s_interp: &TensorInterp,
    t_interp: &TensorInterp,
    tri: &Triangle,
) -> PointList {
    label_points(
        representatives,
        tri,
        |center, _| s_interp.eval(center),
        |center, _| t_interp.eval(center),
    )
}

/// Labeling for the Sujudi-Haimes problem: the second tensor is the
/// directional derivative along the found direction
pub(crate) fn label_sujudi_haimes_points<E: Evaluator>(
    representatives: &[ClusterRepr<E>],
    t_interp: &TensorInterp,
    dt: &[TensorInterp; 3],
    tri: &Triangle,
) -> PointList {
    label_points(
        representatives,
        tri,
        |center, _| t_interp.eval(center),
        |center, dir| {
            dt[0].eval(center) * dir.x + dt[1].eval(center) * dir.y + dt[2].eval(center) * dir.z
        },
    )
}

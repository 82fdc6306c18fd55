//! Breadth-first adaptive root search and the public entry points
//!
//! The driver tiles the directional domain with four seed triangles covering
//! the upper hemisphere (the residuals are even in the direction, so one
//! hemisphere suffices), runs the generic search per seed, clusters the
//! accepted regions, reduces each cluster to its best representative, and
//! labels the results with eigenvalue context.

use std::collections::VecDeque;

use log::warn;
use nalgebra::{Matrix3, Vector3};

use crate::constants::{FLOAT_TOLERANCE, LEGACY_QUEUE_CAP, QUEUE_CAP};
use crate::data::options::{LegacyPevOptions, PevOptions, SearchStats};
use crate::data::point::PointList;
use crate::data::triangle::{TensorInterp, TriPair, Triangle};
use crate::error::{PevError, PevResult};
use crate::modules::cluster::{cluster_candidates, select_representatives};
use crate::modules::context::{label_pev_points, label_sujudi_haimes_points};

use super::evaluator::{Evaluator, SearchResult};
use super::pev::PevEvaluator;
use super::sujudi_haimes::SujudiHaimesEvaluator;

/// Breadth-first adaptive refinement over the product domain
///
/// Pops are counted in `stats.num_splits`. When the queue reaches
/// `queue_cap` the search stops and returns the candidates accepted so far;
/// the overflow is a diagnostic, not an error.
pub fn root_search<E: Evaluator>(start: E, queue_cap: usize, stats: &mut SearchStats) -> Vec<E> {
    let mut work = VecDeque::new();
    work.push_back(start);
    let mut accepted = Vec::new();

    loop {
        if work.len() >= queue_cap {
            warn!("subdivision queue reached {queue_cap} entries, returning partial results");
            break;
        }
        let Some(evaluator) = work.pop_front() else {
            break;
        };
        stats.num_splits += 1;
        stats.max_level = stats.max_level.max(evaluator.split_level());

        match evaluator.eval() {
            SearchResult::Split => work.extend(evaluator.split()),
            SearchResult::Accept => accepted.push(evaluator),
            SearchResult::Discard => {}
        }
    }
    accepted
}

/// Four triangles covering the upper hemisphere of unit directions
fn hemisphere_seeds() -> [Triangle; 4] {
    [
        Triangle::new([
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]),
        Triangle::new([
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]),
        Triangle::new([
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]),
        Triangle::new([
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]),
    ]
}

/// The identity barycentric triangle used as the initial spatial domain
fn identity_triangle() -> Triangle {
    Triangle::new([
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ])
}

fn parallel_eigenvector_search(
    s: &TensorInterp,
    t: &TensorInterp,
    spatial_tolerance: f64,
    direction_tolerance: f64,
    queue_cap: usize,
    stats: &mut SearchStats,
) -> PevResult<Vec<PevEvaluator>> {
    let pos_tri = identity_triangle();
    let mut candidates = Vec::new();
    for dir_tri in hemisphere_seeds() {
        let start = PevEvaluator::new(
            TriPair { dir_tri, pos_tri },
            *s,
            *t,
            spatial_tolerance,
            direction_tolerance,
        )?;
        candidates.extend(root_search(start, queue_cap, stats));
    }
    Ok(candidates)
}

fn sujudi_haimes_search(
    t: &TensorInterp,
    dt: &[TensorInterp; 3],
    tolerance: f64,
    min_ev: f64,
    stats: &mut SearchStats,
) -> PevResult<Vec<SujudiHaimesEvaluator>> {
    let pos_tri = identity_triangle();
    let mut candidates = Vec::new();
    // pre-split once for tighter bounds in the cubic derivative residual
    for seed in hemisphere_seeds() {
        for dir_tri in seed.split() {
            let start = SujudiHaimesEvaluator::new(
                TriPair { dir_tri, pos_tri },
                *t,
                *dt,
                tolerance,
                tolerance,
                min_ev,
            )?;
            candidates.extend(root_search(start, QUEUE_CAP, stats));
        }
    }
    Ok(candidates)
}

fn validate_tensors(label: &str, tensors: &[Matrix3<f64>; 3]) -> PevResult<()> {
    for tensor in tensors {
        if !tensor.iter().all(|entry| entry.is_finite()) {
            return Err(PevError::InvalidArgument(format!(
                "tensor field {label} contains non-finite entries"
            )));
        }
    }
    Ok(())
}

fn validate_spatial_triangle(x: &[Vector3<f64>; 3]) -> PevResult<()> {
    for vertex in x {
        if !vertex.iter().all(|entry| entry.is_finite()) {
            return Err(PevError::InvalidArgument(
                "spatial triangle contains non-finite vertices".into(),
            ));
        }
    }
    let doubled_area = (x[1] - x[0]).cross(&(x[2] - x[0])).norm();
    if doubled_area <= FLOAT_TOLERANCE {
        return Err(PevError::InvalidArgument(
            "spatial triangle is degenerate".into(),
        ));
    }
    Ok(())
}

fn validate_tolerance(name: &str, value: f64) -> PevResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PevError::InvalidArgument(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn validate_nonnegative(name: &str, value: f64) -> PevResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PevError::InvalidArgument(format!(
            "{name} must be nonnegative, got {value}"
        )));
    }
    Ok(())
}

/// Find parallel-eigenvector points of two linearly interpolated tensor
/// fields on a triangle
///
/// `s` and `t` are the vertex samples of the two fields, `x` the spatial
/// triangle in global coordinates. Returns the located points in cluster
/// discovery order, deterministic for identical inputs.
pub fn find_parallel_eigenvectors(
    s: &[Matrix3<f64>; 3],
    t: &[Matrix3<f64>; 3],
    x: &[Vector3<f64>; 3],
    opts: &PevOptions,
) -> PevResult<PointList> {
    let mut stats = SearchStats::default();
    find_parallel_eigenvectors_with_stats(s, t, x, opts, &mut stats)
}

/// Like `find_parallel_eigenvectors` with the spatial triangle defaulted to
/// the identity basis, so positions come back in barycentric coordinates
pub fn find_parallel_eigenvectors_barycentric(
    s: &[Matrix3<f64>; 3],
    t: &[Matrix3<f64>; 3],
    opts: &PevOptions,
) -> PevResult<PointList> {
    find_parallel_eigenvectors(
        s,
        t,
        &[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ],
        opts,
    )
}

/// `find_parallel_eigenvectors` with side-channel counters
pub fn find_parallel_eigenvectors_with_stats(
    s: &[Matrix3<f64>; 3],
    t: &[Matrix3<f64>; 3],
    x: &[Vector3<f64>; 3],
    opts: &PevOptions,
    stats: &mut SearchStats,
) -> PevResult<PointList> {
    validate_tensors("S", s)?;
    validate_tensors("T", t)?;
    validate_spatial_triangle(x)?;
    validate_tolerance("tolerance", opts.tolerance)?;
    validate_nonnegative("cluster_epsilon", opts.cluster_epsilon)?;

    let s_interp = TensorInterp::new(*s);
    let t_interp = TensorInterp::new(*t);
    let tri = Triangle::new(*x);

    let candidates = parallel_eigenvector_search(
        &s_interp,
        &t_interp,
        opts.tolerance,
        opts.tolerance,
        QUEUE_CAP,
        stats,
    )?;
    let clusters = cluster_candidates(candidates, opts.cluster_epsilon);
    let representatives = select_representatives(clusters, None, stats);
    Ok(label_pev_points(&representatives, &s_interp, &t_interp, &tri))
}

/// Legacy variant with per-factor terminal diameters and a parallelity
/// threshold; clusters above the threshold are dropped and counted in
/// `stats.num_false_positives`
pub fn find_parallel_eigenvectors_legacy(
    s: &[Matrix3<f64>; 3],
    t: &[Matrix3<f64>; 3],
    x: &[Vector3<f64>; 3],
    opts: &LegacyPevOptions,
    stats: &mut SearchStats,
) -> PevResult<PointList> {
    validate_tensors("S", s)?;
    validate_tensors("T", t)?;
    validate_spatial_triangle(x)?;
    validate_tolerance("spatial_epsilon", opts.spatial_epsilon)?;
    validate_tolerance("direction_epsilon", opts.direction_epsilon)?;
    validate_nonnegative("cluster_epsilon", opts.cluster_epsilon)?;
    validate_nonnegative("parallelity_epsilon", opts.parallelity_epsilon)?;

    let s_interp = TensorInterp::new(*s);
    let t_interp = TensorInterp::new(*t);
    let tri = Triangle::new(*x);

    let candidates = parallel_eigenvector_search(
        &s_interp,
        &t_interp,
        opts.spatial_epsilon,
        opts.direction_epsilon,
        LEGACY_QUEUE_CAP,
        stats,
    )?;
    let clusters = cluster_candidates(candidates, opts.cluster_epsilon);
    let representatives =
        select_representatives(clusters, Some(opts.parallelity_epsilon), stats);
    Ok(label_pev_points(&representatives, &s_interp, &t_interp, &tri))
}

/// Find tensor Sujudi-Haimes points: locations where a direction is a real
/// eigenvector of both `t` and the directional derivative of `t` along it
///
/// `dt[i]` holds the vertex samples of the derivative field in the i-th
/// Euclidean coordinate.
pub fn find_tensor_sujudi_haimes(
    t: &[Matrix3<f64>; 3],
    dt: &[[Matrix3<f64>; 3]; 3],
    x: &[Vector3<f64>; 3],
    opts: &PevOptions,
) -> PevResult<PointList> {
    let mut stats = SearchStats::default();
    find_tensor_sujudi_haimes_with_stats(t, dt, x, opts, &mut stats)
}

/// Like `find_tensor_sujudi_haimes` with the spatial triangle defaulted to
/// the identity basis
pub fn find_tensor_sujudi_haimes_barycentric(
    t: &[Matrix3<f64>; 3],
    dt: &[[Matrix3<f64>; 3]; 3],
    opts: &PevOptions,
) -> PevResult<PointList> {
    find_tensor_sujudi_haimes(
        t,
        dt,
        &[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ],
        opts,
    )
}

/// `find_tensor_sujudi_haimes` with side-channel counters
pub fn find_tensor_sujudi_haimes_with_stats(
    t: &[Matrix3<f64>; 3],
    dt: &[[Matrix3<f64>; 3]; 3],
    x: &[Vector3<f64>; 3],
    opts: &PevOptions,
    stats: &mut SearchStats,
) -> PevResult<PointList> {
    validate_tensors("T", t)?;
    validate_tensors("Tx", &dt[0])?;
    validate_tensors("Ty", &dt[1])?;
    validate_tensors("Tz", &dt[2])?;
    validate_spatial_triangle(x)?;
    validate_tolerance("tolerance", opts.tolerance)?;
    validate_nonnegative("cluster_epsilon", opts.cluster_epsilon)?;
    validate_nonnegative("min_ev", opts.min_ev)?;

    let t_interp = TensorInterp::new(*t);
    let dt_interp = [
        TensorInterp::new(dt[0]),
        TensorInterp::new(dt[1]),
        TensorInterp::new(dt[2]),
    ];
    let tri = Triangle::new(*x);

    let candidates = sujudi_haimes_search(&t_interp, &dt_interp, opts.tolerance, opts.min_ev, stats)?;
    let clusters = cluster_candidates(candidates, opts.cluster_epsilon);
    let representatives = select_representatives(clusters, None, stats);
    Ok(label_sujudi_haimes_points(
        &representatives,
        &t_interp,
        &dt_interp,
        &tri,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::point::PEVPoint;
    use approx::assert_abs_diff_eq;

    fn identity_basis() -> [Vector3<f64>; 3] {
        [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]
    }

    fn constant(m: Matrix3<f64>) -> [Matrix3<f64>; 3] {
        [m, m, m]
    }

    fn loose_options() -> PevOptions {
        PevOptions {
            tolerance: 0.4,
            cluster_epsilon: 0.25,
            min_ev: 0.0,
        }
    }

    fn axis_index(dir: &Vector3<f64>) -> usize {
        let abs = dir.map(f64::abs);
        if abs.x >= abs.y && abs.x >= abs.z {
            0
        } else if abs.y >= abs.z {
            1
        } else {
            2
        }
    }

    // law 6: a returned point really is a near-eigenvector of both fields
    fn assert_parallel(point: &PEVPoint, s: &Matrix3<f64>, t: &Matrix3<f64>, bound: f64) {
        let dir = point.eigenvector;
        let s_term = (s * dir).normalize().cross(&dir).norm();
        let t_term = (t * dir).normalize().cross(&dir).norm();
        assert!(
            s_term + t_term < bound,
            "parallelity residual {} above {bound}",
            s_term + t_term
        );
    }

    #[test]
    fn test_identity_fields_form_one_cluster() {
        let field = constant(Matrix3::identity());
        let opts = PevOptions {
            tolerance: 0.8,
            cluster_epsilon: 10.0,
            min_ev: 0.0,
        };
        let mut stats = SearchStats::default();
        let points = find_parallel_eigenvectors_with_stats(
            &field,
            &field,
            &identity_basis(),
            &opts,
            &mut stats,
        )
        .unwrap();

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.s_rank, 0);
        assert_eq!(point.t_rank, 0);
        assert_abs_diff_eq!(point.s_eigenvalue, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(point.t_eigenvalue, 1.0, epsilon = 1e-12);
        assert!(!point.s_has_imag);
        assert!(!point.t_has_imag);
        assert!(point.cluster_size >= 4);
        assert!(point.pos_uncertainty <= opts.tolerance);
        assert!(point.dir_uncertainty <= opts.tolerance);
        assert_abs_diff_eq!(point.eigenvector.norm(), 1.0, epsilon = 1e-12);
        assert!(stats.num_splits > 0);
        assert!(stats.max_level >= 2);
    }

    #[test]
    fn test_commuting_diagonal_fields_find_shared_axes() {
        let s = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let t = Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0));
        let points =
            find_parallel_eigenvectors(&constant(s), &constant(t), &identity_basis(), &loose_options())
                .unwrap();
        assert!(!points.is_empty());

        // (s eigenvalue, s rank, t eigenvalue, t rank) per axis
        let expected = [(1.0, 2u8, 3.0, 0u8), (2.0, 1, 1.0, 2), (3.0, 0, 2.0, 1)];
        for point in &points {
            let axis = axis_index(&point.eigenvector);
            assert!(point.eigenvector[axis].abs() > 0.9);
            let (s_ev, s_rank, t_ev, t_rank) = expected[axis];
            assert!((point.s_eigenvalue - s_ev).abs() < 0.35);
            assert!((point.t_eigenvalue - t_ev).abs() < 0.35);
            assert_eq!(point.s_rank, s_rank);
            assert_eq!(point.t_rank, t_rank);
            assert!(!point.s_has_imag);
            assert!(!point.t_has_imag);
            assert_parallel(point, &s, &t, 0.5);
        }
    }

    #[test]
    fn test_identical_inputs_yield_identical_points() {
        let s = constant(Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0)));
        let t = constant(Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0)));
        let first =
            find_parallel_eigenvectors(&s, &t, &identity_basis(), &loose_options()).unwrap();
        let second =
            find_parallel_eigenvectors(&s, &t, &identity_basis(), &loose_options()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_positions_map_through_spatial_triangle() {
        let s = constant(Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0)));
        let t = constant(Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0)));
        let x = [
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(12.0, 0.0, 0.0),
            Vector3::new(10.0, 2.0, 0.0),
        ];
        let points = find_parallel_eigenvectors(&s, &t, &x, &loose_options()).unwrap();
        assert!(!points.is_empty());
        for point in &points {
            assert!(point.position.x >= 10.0 - 1e-9 && point.position.x <= 12.0 + 1e-9);
            assert!(point.position.y >= -1e-9 && point.position.y <= 2.0 + 1e-9);
            assert_abs_diff_eq!(point.position.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_complex_pair_field_sets_imaginary_flag() {
        let angle = 30.0f64.to_radians();
        let s = Matrix3::new(
            angle.cos(),
            -angle.sin(),
            0.0,
            angle.sin(),
            angle.cos(),
            0.0,
            0.0,
            0.0,
            2.0,
        );
        let t = Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0));
        let opts = PevOptions {
            tolerance: 0.4,
            cluster_epsilon: 0.3,
            min_ev: 0.0,
        };
        let points =
            find_parallel_eigenvectors(&constant(s), &constant(t), &identity_basis(), &opts)
                .unwrap();
        assert!(!points.is_empty());
        for point in &points {
            assert!(point.eigenvector.z.abs() > 0.9);
            assert!(point.s_has_imag);
            assert!(!point.t_has_imag);
            assert!((point.s_eigenvalue - 2.0).abs() < 0.35);
            assert_eq!(point.s_rank, 0);
            assert_eq!(point.t_rank, 1);
        }
    }

    #[test]
    fn test_everywhere_parallel_fields_overflow_gracefully() {
        let field = constant(Matrix3::identity());
        let opts = PevOptions {
            tolerance: 1e-12,
            cluster_epsilon: 1e-4,
            min_ev: 0.0,
        };
        let mut stats = SearchStats::default();
        let points = find_parallel_eigenvectors_with_stats(
            &field,
            &field,
            &identity_basis(),
            &opts,
            &mut stats,
        )
        .unwrap();
        assert!(points.is_empty());
        assert!(stats.num_splits > 1000);
    }

    #[test]
    fn test_legacy_parallelity_threshold() {
        let s = constant(Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0)));
        let t = constant(Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0)));

        let strict = LegacyPevOptions {
            spatial_epsilon: 0.4,
            direction_epsilon: 0.4,
            cluster_epsilon: 0.25,
            parallelity_epsilon: 1e-6,
        };
        let mut stats = SearchStats::default();
        let points =
            find_parallel_eigenvectors_legacy(&s, &t, &identity_basis(), &strict, &mut stats)
                .unwrap();
        assert!(points.is_empty());
        assert!(stats.num_false_positives > 0);

        let lenient = LegacyPevOptions {
            parallelity_epsilon: 10.0,
            ..strict
        };
        let mut stats = SearchStats::default();
        let points =
            find_parallel_eigenvectors_legacy(&s, &t, &identity_basis(), &lenient, &mut stats)
                .unwrap();
        assert!(!points.is_empty());
        assert_eq!(stats.num_false_positives, 0);
    }

    #[test]
    fn test_sujudi_haimes_finds_axes_of_scaled_derivative() {
        let t = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        // derivative proportional to the field in every coordinate: the
        // second residual vanishes exactly where the first does
        let dt = [constant(t), constant(t), constant(t)];
        let opts = PevOptions {
            tolerance: 0.4,
            cluster_epsilon: 0.25,
            min_ev: 0.5,
        };
        let mut stats = SearchStats::default();
        let points = find_tensor_sujudi_haimes_with_stats(
            &constant(t),
            &dt,
            &identity_basis(),
            &opts,
            &mut stats,
        )
        .unwrap();
        assert!(!points.is_empty());
        assert!(stats.num_splits > 0);

        let expected = [1.0, 2.0, 3.0];
        for point in &points {
            let axis = axis_index(&point.eigenvector);
            assert!(point.eigenvector[axis].abs() > 0.9);
            assert!((point.s_eigenvalue - expected[axis]).abs() < 0.35);
            assert!(point.s_eigenvalue.abs() >= opts.min_ev);
            assert!(!point.s_has_imag);
        }
    }

    #[test]
    fn test_sujudi_haimes_min_ev_filters_everything() {
        let t = Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0));
        let dt = [constant(t), constant(t), constant(t)];
        let opts = PevOptions {
            tolerance: 0.4,
            cluster_epsilon: 0.25,
            min_ev: 10.0,
        };
        let points =
            find_tensor_sujudi_haimes(&constant(t), &dt, &identity_basis(), &opts).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let field = constant(Matrix3::identity());
        let opts = PevOptions::default();

        // collinear spatial triangle
        let collinear = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
        ];
        let result = find_parallel_eigenvectors(&field, &field, &collinear, &opts);
        assert!(matches!(result, Err(PevError::InvalidArgument(_))));

        // non-finite tensor entries
        let mut bad = Matrix3::identity();
        bad[(0, 0)] = f64::NAN;
        let result =
            find_parallel_eigenvectors(&constant(bad), &field, &identity_basis(), &opts);
        assert!(matches!(result, Err(PevError::InvalidArgument(_))));

        // nonpositive tolerance
        let bad_opts = PevOptions {
            tolerance: 0.0,
            ..opts
        };
        let result = find_parallel_eigenvectors(&field, &field, &identity_basis(), &bad_opts);
        assert!(matches!(result, Err(PevError::InvalidArgument(_))));

        // negative cluster distance
        let bad_opts = PevOptions {
            cluster_epsilon: -1.0,
            ..opts
        };
        let result = find_parallel_eigenvectors(&field, &field, &identity_basis(), &bad_opts);
        assert!(matches!(result, Err(PevError::InvalidArgument(_))));

        // negative eigenvalue floor
        let bad_opts = PevOptions {
            min_ev: -1.0,
            ..opts
        };
        let dt = [field, field, field];
        let result = find_tensor_sujudi_haimes(&field, &dt, &identity_basis(), &bad_opts);
        assert!(matches!(result, Err(PevError::InvalidArgument(_))));
    }

    #[test]
    fn test_barycentric_variant_matches_identity_basis() {
        let s = constant(Matrix3::from_diagonal(&Vector3::new(1.0, 2.0, 3.0)));
        let t = constant(Matrix3::from_diagonal(&Vector3::new(3.0, 1.0, 2.0)));
        let explicit =
            find_parallel_eigenvectors(&s, &t, &identity_basis(), &loose_options()).unwrap();
        let defaulted = find_parallel_eigenvectors_barycentric(&s, &t, &loose_options()).unwrap();
        assert_eq!(explicit, defaulted);
    }
}

//! Agglomerative clustering of accepted candidate regions and per-cluster
//! representative selection
//!
//! Accepted regions of one root come in bunches of nearly identical
//! triangles. Clusters are merged while any cross-pair of spatial centroids
//! is within `cluster_epsilon`, iterating until a full pass changes nothing.
//! Clusters are identified by their position in the working list, never by
//! floating-point equality.

use crate::data::options::SearchStats;
use crate::modules::search::evaluator::Evaluator;

/// Representative solution in a cluster of similar solutions
#[derive(Debug, Clone)]
pub struct ClusterRepr<E> {
    pub cluster_size: usize,
    pub eval: E,
}

fn centroid_distance<E: Evaluator>(a: &E, b: &E) -> f64 {
    (a.tris().pos_tri.centroid() - b.tris().pos_tri.centroid()).norm()
}

fn has_close_elements<E: Evaluator>(first: &[E], second: &[E], epsilon: f64) -> bool {
    for a in first {
        for b in second {
            if centroid_distance(a, b) <= epsilon {
                return true;
            }
        }
    }
    false
}

/// Group candidates whose spatial centroids chain within `epsilon`
///
/// Quadratic in the number of candidates, which stays small in practice
/// (tens of accepted regions per root).
pub fn cluster_candidates<E: Evaluator>(candidates: Vec<E>, epsilon: f64) -> Vec<Vec<E>> {
    let mut classes: Vec<Vec<E>> = candidates.into_iter().map(|c| vec![c]).collect();

    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < classes.len() {
            let mut j = i + 1;
            while j < classes.len() {
                if has_close_elements(&classes[i], &classes[j], epsilon) {
                    let merged = classes.remove(j);
                    classes[i].extend(merged);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
    }
    classes
}

/// Pick the candidate with the smallest parallelity residual from each
/// cluster (first minimum wins)
///
/// With `max_residual` set (legacy mode), clusters whose best candidate still
/// exceeds the threshold are dropped and counted as false positives.
pub fn select_representatives<E: Evaluator>(
    clusters: Vec<Vec<E>>,
    max_residual: Option<f64>,
    stats: &mut SearchStats,
) -> Vec<ClusterRepr<E>> {
    let mut result = Vec::with_capacity(clusters.len());
    for mut cluster in clusters {
        let mut best = 0;
        let mut best_residual = f64::INFINITY;
        for (i, candidate) in cluster.iter().enumerate() {
            let residual = candidate.residual();
            if residual < best_residual {
                best_residual = residual;
                best = i;
            }
        }
        if let Some(threshold) = max_residual {
            if best_residual > threshold {
                stats.num_false_positives += 1;
                continue;
            }
        }
        let cluster_size = cluster.len();
        result.push(ClusterRepr {
            cluster_size,
            eval: cluster.swap_remove(best),
        });
    }
    result
}

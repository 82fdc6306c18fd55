//! Tensorlines Parallel-Eigenvector Search Library
//!
//! This library locates parallel-eigenvector (PEV) points inside a triangular
//! patch of two linearly interpolated 3x3 tensor fields, and the tensor
//! Sujudi-Haimes variant where the second tensor is the directional
//! derivative of the first. It provides:
//! - Bernstein-Bezier polynomials on the product of two barycentric
//!   triangles, with exact midpoint subdivision and convex-hull bounds
//! - A breadth-first adaptive root search with a sign-test discard rule
//! - Clustering of accepted regions and per-cluster representatives
//! - Eigenvalue classification (rank and imaginary flags) of the results

pub mod constants;
pub mod data;
pub mod error;
pub mod modules;

pub use nalgebra;

// Re-export to public API
pub use data::{
    BarycentricTriangle, LegacyPevOptions, PEVPoint, PevOptions, PointList, ProductBezier,
    SearchStats, TensorInterp, TriPair, Triangle,
};
pub use error::{PevError, PevResult};
pub use modules::cluster::{cluster_candidates, select_representatives, ClusterRepr};
pub use modules::search::{
    // entry points
    find_parallel_eigenvectors,
    find_parallel_eigenvectors_barycentric,
    find_parallel_eigenvectors_legacy,
    find_parallel_eigenvectors_with_stats,
    find_tensor_sujudi_haimes,
    find_tensor_sujudi_haimes_barycentric,
    find_tensor_sujudi_haimes_with_stats,
    // search building blocks
    root_search,
    Evaluator,
    PevEvaluator,
    SearchResult,
    SujudiHaimesEvaluator,
};

//! Search options and the optional out-parameter counters

use serde::{Deserialize, Serialize};

/// Options for the parallel-eigenvector and Sujudi-Haimes searches
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PevOptions {
    /// Terminal diameter for both the spatial and the directional triangle
    pub tolerance: f64,
    /// Maximum centroid distance for merging accepted regions into a cluster
    pub cluster_epsilon: f64,
    /// Minimum absolute eigenvalue to consider a direction relevant
    /// (Sujudi-Haimes only)
    pub min_ev: f64,
}

impl Default for PevOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            cluster_epsilon: 1e-4,
            min_ev: 0.0,
        }
    }
}

/// Options for the legacy per-factor-epsilon entry point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LegacyPevOptions {
    /// Terminal diameter for the spatial triangle
    pub spatial_epsilon: f64,
    /// Terminal diameter for the directional triangle
    pub direction_epsilon: f64,
    pub cluster_epsilon: f64,
    /// Maximum acceptable parallelity residual of a cluster representative;
    /// clusters above it are dropped and counted as false positives
    pub parallelity_epsilon: f64,
}

impl Default for LegacyPevOptions {
    fn default() -> Self {
        Self {
            spatial_epsilon: 1e-6,
            direction_epsilon: 1e-6,
            cluster_epsilon: 1e-4,
            parallelity_epsilon: 1e-3,
        }
    }
}

/// Side-channel counters filled in by the `_with_stats` entry points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Evaluator pops processed across all seeds
    pub num_splits: u64,
    /// Deepest subdivision level reached
    pub max_level: u64,
    /// Clusters rejected by the legacy parallelity threshold
    pub num_false_positives: u64,
}

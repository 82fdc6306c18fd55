//! Output record for a located parallel-eigenvector point

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parallel-eigenvector point with classification context
///
/// Positions are in the caller's global coordinates; the eigenvector is a
/// unit direction. Ranks order the matched eigenvalue among the real
/// eigenvalues by absolute real part (0 = largest, 2 = smallest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PEVPoint {
    pub position: Vector3<f64>,
    pub s_rank: u8,
    pub t_rank: u8,
    pub eigenvector: Vector3<f64>,
    pub s_eigenvalue: f64,
    pub t_eigenvalue: f64,
    /// Whether the first tensor has any eigenvalue with nonzero imaginary part
    pub s_has_imag: bool,
    pub t_has_imag: bool,
    /// Number of accepted candidate regions merged into this point
    pub cluster_size: usize,
    /// Diameter of the accepted spatial triangle
    pub pos_uncertainty: f64,
    /// Diameter of the accepted directional triangle
    pub dir_uncertainty: f64,
    /// Coefficient-ratio conditioning proxy of the winning candidate
    pub condition: f64,
}

/// Ordered list of located points, in cluster discovery order
pub type PointList = Vec<PEVPoint>;

impl fmt::Display for PEVPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4}, {:.4}, {:.4}) dir ({:.4}, {:.4}, {:.4}) eigenvalues {:.4}/{:.4} ranks {}/{} cluster {}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.eigenvector.x,
            self.eigenvector.y,
            self.eigenvector.z,
            self.s_eigenvalue,
            self.t_eigenvalue,
            self.s_rank,
            self.t_rank,
            self.cluster_size
        )
    }
}

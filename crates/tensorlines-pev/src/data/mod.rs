//! Data structure definitions for the parallel-eigenvector search
//!
//! This module contains the fundamental data structures:
//!
//! 1. `BarycentricTriangle`: an ordered vertex triple interpolated linearly in
//!    barycentric coordinates (`Triangle` for 3-vectors, `TensorInterp` for
//!    3x3 tensors)
//! 2. `TriPair`: a candidate region in the directional x spatial product domain
//! 3. `ProductBezier`: a Bernstein-form polynomial on a product of two
//!    triangles, with exact midpoint subdivision and convex-hull bounds
//! 4. `PEVPoint` / `PointList`: the output records
//! 5. `PevOptions` / `LegacyPevOptions` / `SearchStats`: search configuration
//!    and side-channel counters
//! 6. `macros`: `tri!([(x, y, z), ...])` for creating triangles

pub mod bezier;
pub mod macros;
pub mod options;
pub mod point;
pub mod triangle;

pub use bezier::ProductBezier;
pub use options::{LegacyPevOptions, PevOptions, SearchStats};
pub use point::{PEVPoint, PointList};
pub use triangle::{BarycentricTriangle, TensorInterp, TriPair, Triangle};

#[doc(inline)]
pub use crate::tri;

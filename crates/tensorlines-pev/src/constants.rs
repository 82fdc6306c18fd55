//! Constants used throughout the library

/// Tolerance used for floating point comparisons
///
/// Used in:
/// - degenerate spatial triangle detection (`find_parallel_eigenvectors` and
///   the other entry points reject triangles with smaller doubled area)
pub const FLOAT_TOLERANCE: f64 = 1e-10;

/// Hard cap on the breadth-first subdivision queue
///
/// Exceeding the cap is a diagnostic, not an error: the search stops and
/// returns whatever candidates it has accepted so far.
pub const QUEUE_CAP: usize = 16 * 16 * 16;

/// Queue cap used by the legacy per-factor-epsilon entry point
pub const LEGACY_QUEUE_CAP: usize = 10_000;

//! This module provides convenient macros for creating triangles.

/// Macro for creating a spatial or directional `Triangle` from coordinate tuples
#[macro_export]
macro_rules! tri {
    ([$($v:expr),* $(,)?]) => {{
        let verts = [$($crate::nalgebra::Vector3::new(
            $v.0 as f64,
            $v.1 as f64,
            $v.2 as f64,
        )),*];
        assert_eq!(verts.len(), 3, "a triangle requires exactly 3 vertices");
        $crate::data::Triangle::new(verts)
    }};
}

//! Point and vector math shared by the drawing tools.
//!
//! Every function is pure and total over finite inputs, except
//! [`angle_between`] which requires both vectors to have a non-zero length.

use glam::Vec3;

use crate::util::next_cyclic;

/// Returns the vector pointing from `a` to `b`.
pub fn vector_between(a: Vec3, b: Vec3) -> Vec3 {
    b - a
}

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    magnitude(vector_between(a, b))
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

pub fn magnitude(v: Vec3) -> f32 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Moves `point` by `offset`.
pub fn translate(point: Vec3, offset: Vec3) -> Vec3 {
    point + offset
}

pub fn scale_vector(v: Vec3, factor: f32) -> Vec3 {
    v * factor
}

/// Angle in radians between two vectors, in `[0, π]`.
///
/// Both vectors must have a non-zero length; a zero-length input yields NaN.
pub fn angle_between(v1: Vec3, v2: Vec3) -> f32 {
    let cos = v1.dot(v2) / (magnitude(v1) * magnitude(v2));
    // NaN passes through clamp unchanged.
    cos.clamp(-1.0, 1.0).acos()
}

/// Returns the vertex that follows `current`, wrapping around to the first.
pub fn next_vertex(vertices: &[Vec3], current: Vec3) -> Option<Vec3> {
    next_cyclic(vertices, &current).copied()
}

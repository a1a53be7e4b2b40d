//! Scalar measures on 2D points: signed areas, centroids, winding numbers
//! and point-on-segment tests.
//!
//! Everything here operates on the crate [`Scalar`] — single or double
//! precision consistently, never mixed.

use crate::Scalar;

#[cfg(not(feature = "single-precision"))]
const TAU: Scalar = std::f64::consts::TAU;
#[cfg(feature = "single-precision")]
const TAU: Scalar = std::f32::consts::TAU;

/// Doubled signed area of the triangle `(a, b, c)` via the shoelace
/// (cross-product) formula. Positive for counterclockwise orientation.
#[inline]
#[must_use]
pub fn signed_area2(a: [Scalar; 2], b: [Scalar; 2], c: [Scalar; 2]) -> Scalar {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Centroid of the triangle `(a, b, c)`.
#[inline]
#[must_use]
pub fn centroid(a: [Scalar; 2], b: [Scalar; 2], c: [Scalar; 2]) -> [Scalar; 2] {
    [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0]
}

/// Winding number of the segment soup around `query`, in full turns.
///
/// Sums, over every segment `(v0, v1)`, the signed angle the segment
/// subtends at `query` (via `atan2` of the doubled signed area and the dot
/// product of the two edge vectors), divided by 2π. For closed,
/// consistently oriented loops this is the usual winding number: ≈0
/// outside, ±1 (or more, when nested) inside.
///
/// Segments referencing out-of-range point indices are skipped; the
/// caller validates indices before the engine ever runs.
#[must_use]
pub fn winding_number(
    query: [Scalar; 2],
    points: &[[Scalar; 2]],
    segments: &[[crate::Index; 2]],
) -> Scalar {
    let mut total: Scalar = 0.0;
    for segment in segments {
        let (Some(&a), Some(&b)) = (
            usize::try_from(segment[0]).ok().and_then(|i| points.get(i)),
            usize::try_from(segment[1]).ok().and_then(|i| points.get(i)),
        ) else {
            continue;
        };
        let u = [a[0] - query[0], a[1] - query[1]];
        let v = [b[0] - query[0], b[1] - query[1]];
        let cross = u[0] * v[1] - u[1] * v[0];
        let dot = u[0] * v[0] + u[1] * v[1];
        total += cross.atan2(dot);
    }
    total / TAU
}

/// Whether `p` lies on the segment `[a, b]`, within an absolute deviation
/// of `tol` from the supporting line and inside the endpoint range.
#[must_use]
pub fn point_on_segment(p: [Scalar; 2], a: [Scalar; 2], b: [Scalar; 2], tol: Scalar) -> bool {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    if len2 == 0.0 {
        return (ap[0] * ap[0] + ap[1] * ap[1]).sqrt() <= tol;
    }
    let cross = ab[0] * ap[1] - ab[1] * ap[0];
    if cross.abs() > tol * len2.sqrt() {
        return false;
    }
    let t = (ap[0] * ab[0] + ap[1] * ab[1]) / len2;
    (-tol..=1.0 + tol).contains(&t)
}

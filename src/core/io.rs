//! The fixed-layout engine boundary.
//!
//! [`TriangulateIo`] mirrors the classic `triangulateio` aggregate
//! field-for-field: raw pointer/count pairs for every geometry channel.
//! The wrapper builds one of these per direction (input, output, Voronoi
//! output) and the engine reads/writes them through
//! [`crate::backend::triangulate`].
//!
//! Two reference kinds meet in this layout and must never be conflated:
//!
//! - **Input pointers** are borrowed views over caller memory. They are
//!   never freed here; the [`Engine`](crate::Engine) lifetime parameter
//!   keeps them live.
//! - **Output pointers** are engine-allocated and exclusively owned by
//!   the wrapper. [`OwnedIo`] is the scope guard that releases them on
//!   replacement and on drop — with two exceptions: `hole_list` and
//!   `region_list` in an output bundle are pointer mirrors of the input
//!   channels, not fresh allocations, and are skipped.

use std::ptr;
use std::slice;

use crate::{Index, Scalar};

/// C-compatible exchange aggregate for one direction of an engine call.
///
/// All pointers start null and all counts start zero; a null pointer with
/// a zero count is the canonical "absent channel" encoding. Coordinates
/// are row-major `[x0, y0, x1, y1, ...]`, triangles are index triples,
/// segments and edges are index pairs.
#[derive(Debug)]
#[repr(C)]
pub struct TriangulateIo {
    /// Point coordinates, `2 * number_of_points` scalars.
    pub point_list: *mut Scalar,
    /// Per-point attributes, `number_of_point_attributes` per point.
    pub point_attribute_list: *mut Scalar,
    /// Per-point markers, one per point.
    pub point_marker_list: *mut Index,
    pub number_of_points: Index,
    pub number_of_point_attributes: Index,

    /// Triangle corner indices, `number_of_corners` per triangle.
    pub triangle_list: *mut Index,
    /// Per-triangle attributes.
    pub triangle_attribute_list: *mut Scalar,
    /// Per-triangle maximum-area constraints, one per triangle.
    pub triangle_area_list: *mut Scalar,
    /// Neighbor triangle indices, three per triangle, `-1` = boundary.
    pub neighbor_list: *mut Index,
    pub number_of_triangles: Index,
    pub number_of_corners: Index,
    pub number_of_triangle_attributes: Index,

    /// Segment endpoint indices, two per segment.
    pub segment_list: *mut Index,
    /// Per-segment markers, one per segment.
    pub segment_marker_list: *mut Index,
    pub number_of_segments: Index,

    /// Hole seed coordinates, two scalars per hole.
    pub hole_list: *mut Scalar,
    pub number_of_holes: Index,

    /// Region seed tuples (x, y, attribute, max-area), four per region.
    pub region_list: *mut Scalar,
    pub number_of_regions: Index,

    /// Edge endpoint indices, two per edge (output only).
    pub edge_list: *mut Index,
    /// Per-edge markers, one per edge (output only).
    pub edge_marker_list: *mut Index,
    /// Infinite-ray directions for Voronoi edges, two scalars per edge.
    pub norm_list: *mut Scalar,
    pub number_of_edges: Index,
}

impl TriangulateIo {
    /// A bundle with every pointer null and every count zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            point_list: ptr::null_mut(),
            point_attribute_list: ptr::null_mut(),
            point_marker_list: ptr::null_mut(),
            number_of_points: 0,
            number_of_point_attributes: 0,
            triangle_list: ptr::null_mut(),
            triangle_attribute_list: ptr::null_mut(),
            triangle_area_list: ptr::null_mut(),
            neighbor_list: ptr::null_mut(),
            number_of_triangles: 0,
            number_of_corners: 0,
            number_of_triangle_attributes: 0,
            segment_list: ptr::null_mut(),
            segment_marker_list: ptr::null_mut(),
            number_of_segments: 0,
            hole_list: ptr::null_mut(),
            number_of_holes: 0,
            region_list: ptr::null_mut(),
            number_of_regions: 0,
            edge_list: ptr::null_mut(),
            edge_marker_list: ptr::null_mut(),
            norm_list: ptr::null_mut(),
            number_of_edges: 0,
        }
    }
}

impl Default for TriangulateIo {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// BORROWED VIEWS
// =============================================================================

/// Reinterprets `(ptr, count)` as `count` scalar/index pairs.
///
/// A null pointer or non-positive count yields the empty slice, never a
/// null-pointer fault.
///
/// # Safety
///
/// If non-null, `ptr` must point to at least `2 * count` contiguous,
/// initialized values live for the caller-chosen lifetime `'a`.
pub(crate) unsafe fn view_pairs<'a, T>(ptr: *const T, count: Index) -> &'a [[T; 2]] {
    if ptr.is_null() || count <= 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(ptr.cast::<[T; 2]>(), count as usize) }
}

/// Reinterprets `(ptr, count)` as `count` index triples.
///
/// # Safety
///
/// If non-null, `ptr` must point to at least `3 * count` contiguous,
/// initialized values live for `'a`.
pub(crate) unsafe fn view_triples<'a, T>(ptr: *const T, count: Index) -> &'a [[T; 3]] {
    if ptr.is_null() || count <= 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(ptr.cast::<[T; 3]>(), count as usize) }
}

/// Reinterprets `(ptr, count)` as a flat slice of `count` values.
///
/// # Safety
///
/// If non-null, `ptr` must point to at least `count` contiguous,
/// initialized values live for `'a`.
pub(crate) unsafe fn view_flat<'a, T>(ptr: *const T, count: Index) -> &'a [T] {
    if ptr.is_null() || count <= 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(ptr, count as usize) }
}

// =============================================================================
// OWNED OUTPUT BUFFERS
// =============================================================================

/// Leaks a vector into a raw engine-output pointer.
///
/// The empty vector becomes the null pointer. The returned pointer must be
/// released with [`free_list`] using the exact original length.
pub(crate) fn leak_list<T>(values: Vec<T>) -> *mut T {
    if values.is_empty() {
        return ptr::null_mut();
    }
    Box::into_raw(values.into_boxed_slice()) as *mut T
}

/// Releases a pointer produced by [`leak_list`].
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by [`leak_list`] for a vector
/// of exactly `len` elements, not released before.
pub(crate) unsafe fn free_list<T>(ptr: *mut T, len: usize) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
    }
}

/// Scope guard for an engine-allocated output bundle.
///
/// Dropping (or replacing) an `OwnedIo` releases every list the engine
/// allocated into it, keyed by the recorded counts. `hole_list` and
/// `region_list` are input mirrors and deliberately left alone.
#[derive(Debug, Default)]
pub(crate) struct OwnedIo {
    pub io: TriangulateIo,
}

impl OwnedIo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drop for OwnedIo {
    fn drop(&mut self) {
        let io = &mut self.io;
        let np = io.number_of_points.max(0) as usize;
        let npa = io.number_of_point_attributes.max(0) as usize;
        let nt = io.number_of_triangles.max(0) as usize;
        let nc = io.number_of_corners.max(0) as usize;
        let nta = io.number_of_triangle_attributes.max(0) as usize;
        let ns = io.number_of_segments.max(0) as usize;
        let ne = io.number_of_edges.max(0) as usize;

        unsafe {
            free_list(io.point_list, 2 * np);
            free_list(io.point_attribute_list, npa * np);
            free_list(io.point_marker_list, np);
            free_list(io.triangle_list, nc * nt);
            free_list(io.triangle_attribute_list, nta * nt);
            free_list(io.triangle_area_list, nt);
            free_list(io.neighbor_list, 3 * nt);
            free_list(io.segment_list, 2 * ns);
            free_list(io.segment_marker_list, ns);
            free_list(io.edge_list, 2 * ne);
            free_list(io.edge_marker_list, ne);
            free_list(io.norm_list, 2 * ne);
        }
        io.point_list = ptr::null_mut();
        io.point_attribute_list = ptr::null_mut();
        io.point_marker_list = ptr::null_mut();
        io.triangle_list = ptr::null_mut();
        io.triangle_attribute_list = ptr::null_mut();
        io.triangle_area_list = ptr::null_mut();
        io.neighbor_list = ptr::null_mut();
        io.segment_list = ptr::null_mut();
        io.segment_marker_list = ptr::null_mut();
        io.edge_list = ptr::null_mut();
        io.edge_marker_list = ptr::null_mut();
        io.norm_list = ptr::null_mut();
        io.hole_list = ptr::null_mut();
        io.region_list = ptr::null_mut();
    }
}

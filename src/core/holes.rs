//! Hole-seed detection from boundary loops.
//!
//! Hole seeds are found without any caller hint: a constrained pass over
//! the points and segments (convex, quiet, no refinement) yields a mesh
//! whose triangles are partitioned into regions separated by boundary
//! edges. Each region is represented by the centroid of its largest
//! triangle, and the winding number of the input loops around that
//! centroid decides whether the region is material or a hole.

use rustc_hash::FxHashSet;

use crate::backend;
use crate::core::error::Error;
use crate::core::io::{view_pairs, view_triples, OwnedIo, TriangulateIo};
use crate::geometry::{centroid, signed_area2, winding_number};
use crate::{Index, Scalar};

/// Option string for the detection pass: constrained, convex, boundary
/// kept intact, quiet.
const DETECTION_SWITCHES: &str = "znepcYQ";

/// Regions whose winding number falls below this are holes. Material
/// regions wind to 1 or more, hole regions to 0 or less; the midpoint
/// absorbs numerical noise from the angle summation.
const HOLE_WINDING_THRESHOLD: Scalar = 0.5;

fn canon(a: Index, b: Index) -> (Index, Index) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Seeds, one per hole region implied by `segments`.
///
/// Returns an empty list when there are no segments to enclose anything.
pub(crate) fn detect(
    points: &[[Scalar; 2]],
    segments: &[[Index; 2]],
) -> Result<Vec<[Scalar; 2]>, Error> {
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    // Constrained pass over the caller's channels. All segment markers
    // are one so every boundary edge is identifiable in the edge output.
    let markers: Vec<Index> = vec![1; segments.len()];
    let mut scratch = TriangulateIo::new();
    scratch.point_list = points.as_ptr().cast::<Scalar>().cast_mut();
    scratch.number_of_points = points.len() as Index;
    scratch.segment_list = segments.as_ptr().cast::<Index>().cast_mut();
    scratch.number_of_segments = segments.len() as Index;
    scratch.segment_marker_list = markers.as_ptr().cast_mut();

    let mut out = OwnedIo::new();
    let mut vorout = OwnedIo::new();
    unsafe {
        backend::triangulate(DETECTION_SWITCHES, &scratch, &mut out.io, &mut vorout.io)?;
    }

    let mesh_points =
        unsafe { view_pairs::<Scalar>(out.io.point_list, out.io.number_of_points) };
    let triangles =
        unsafe { view_triples::<Index>(out.io.triangle_list, out.io.number_of_triangles) };
    let neighbors =
        unsafe { view_triples::<Index>(out.io.neighbor_list, out.io.number_of_triangles) };
    let subsegments =
        unsafe { view_pairs::<Index>(out.io.segment_list, out.io.number_of_segments) };

    let boundary: FxHashSet<(Index, Index)> = subsegments
        .iter()
        .map(|seg| canon(seg[0], seg[1]))
        .collect();

    let corner = |i: Index| -> Result<[Scalar; 2], Error> {
        mesh_points
            .get(i as usize)
            .copied()
            .ok_or_else(|| Error::InvariantViolation {
                message: format!("triangle corner {i} outside the detection mesh"),
            })
    };

    // Flood the triangles into regions without crossing boundary edges,
    // keeping the largest triangle of each region as its representative.
    let mut region = vec![usize::MAX; triangles.len()];
    let mut seeds = Vec::new();
    for start in 0..triangles.len() {
        if region[start] != usize::MAX {
            continue;
        }
        let id = seeds.len();
        let mut best_area = -1.0 as Scalar;
        let mut best = start;
        let mut stack = vec![start];
        region[start] = id;
        while let Some(t) = stack.pop() {
            let tri = triangles[t];
            let (a, b, c) = (corner(tri[0])?, corner(tri[1])?, corner(tri[2])?);
            let area = signed_area2(a, b, c).abs();
            if area > best_area {
                best_area = area;
                best = t;
            }
            for (k, nb) in neighbors[t].iter().enumerate() {
                if *nb < 0 {
                    continue;
                }
                let nb = *nb as usize;
                if nb >= triangles.len() {
                    return Err(Error::InvariantViolation {
                        message: format!("neighbor {nb} outside the detection mesh"),
                    });
                }
                if region[nb] != usize::MAX {
                    continue;
                }
                // The edge shared with neighbor k is opposite corner k.
                let shared = canon(tri[(k + 1) % 3], tri[(k + 2) % 3]);
                let common = triangles[nb]
                    .iter()
                    .filter(|v| tri.contains(v))
                    .count();
                if common != 2 {
                    return Err(Error::InvariantViolation {
                        message: format!(
                            "triangles {t} and {nb} are neighbors but share {common} corners"
                        ),
                    });
                }
                if boundary.contains(&shared) {
                    continue;
                }
                region[nb] = id;
                stack.push(nb);
            }
        }
        let tri = triangles[best];
        seeds.push(centroid(corner(tri[0])?, corner(tri[1])?, corner(tri[2])?));
    }

    // A region the input loops wind around less than half a turn is
    // outside every loop or inside an even nesting: a hole.
    seeds.retain(|seed| winding_number(*seed, points, segments) < HOLE_WINDING_THRESHOLD);
    Ok(seeds)
}
